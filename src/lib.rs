
//! Export framebuffer readbacks as scan line OpenEXR files.
//!
//! The pixels are borrowed from the caller, decoded to linear values,
//! stored as 16-bit or 32-bit float samples, optionally zip compressed,
//! and assembled into a complete single-part file in memory.
//! Any OpenEXR reader can load the resulting bytes.
//!
//! Start with the `prelude` and `RawPixels::write()`:
//! ```no_run
//!     use exr_export::prelude::*;
//!
//!     let readback = vec![ 255_u8; 4 * 16 * 16 ];
//!     let pixels = RawPixels::new((16, 16), ColorEncoding::SRGB, PixelSamples::U8(&readback));
//!
//!     pixels.write()
//!         .with_compression(Compression::ZIP16)
//!         .to_file("readback.exr").unwrap();
//! ```
//!
//! This crate never reads exr files.

#![warn(
    rust_2018_idioms,
    future_incompatible,
    unused_extern_crates,
    unused,

    missing_copy_implementations,
    missing_debug_implementations,
    trivial_numeric_casts,
)]

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod io;

pub mod math;
pub mod error;
pub mod meta;
pub mod compression;
pub mod block;
pub mod image;


/// Export the most important items from `exr_export`.
/// _Note: This includes a type called `Result`, possibly overwriting the default `std::Result` type usage._
pub mod prelude {

    /// Export the most important items from `exr_export`.
    /// _Note: This includes a type called `Result`, possibly overwriting the default `std::Result` type usage._
    pub use crate::image::{RawPixels, PixelSamples, ColorEncoding};
    pub use crate::image::write::{WritableImage, WriteImageWithOptions, write_rgba_f32_bytes, write_rgba_f32_file};
    pub use crate::compression::Compression;
    pub use crate::meta::attribute::SampleType;
    pub use crate::math::Vec2;
    pub use crate::error::{Result, Error};

    // re-export external stuff
    pub use half::f16;
}
