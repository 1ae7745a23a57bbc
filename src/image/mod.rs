
//! The pixels that can be exported, borrowed from a framebuffer readback.
//!
//! Create `RawPixels` from your readback, then call `pixels.write()`:
//! ```no_run
//!     use exr_export::prelude::*;
//!
//!     let readback = vec![ 0.5_f32; 4 * 64 * 32 ];
//!     let pixels = RawPixels::new((64, 32), ColorEncoding::Linear, PixelSamples::F32(&readback));
//!
//!     let bytes = pixels.write()
//!         .with_compression(Compression::ZIP16)
//!         .to_bytes().unwrap();
//! ```

pub mod decode;
pub mod planar;
pub mod write;


use crate::math::Vec2;
use crate::error::{Error, UnitResult};
use crate::meta::attribute::IntegerBounds;
use half::f16;


/// The number of components per texel in every readback: red, green, blue and alpha.
pub const INPUT_CHANNEL_COUNT: usize = 4;


/// A rectangular readback of pixels, four components per texel.
/// The first row of the samples is the bottom row of the image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPixels<'s> {

    /// Width and height of the readback, in pixels.
    pub size: Vec2<usize>,

    /// How the components are to be converted to linear values.
    pub encoding: ColorEncoding,

    /// The components of all texels, row by row, in red, green, blue, alpha order.
    pub samples: PixelSamples<'s>,
}

/// The components of a readback, borrowed from the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PixelSamples<'s> {

    /// Normalized 8-bit components. Divided by 255 before decoding.
    U8(&'s [u8]),

    /// Half float components. These are declined by the exporter.
    F16(&'s [f16]),

    /// Float components, decoded verbatim.
    F32(&'s [f32]),
}

/// The color space of the input components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorEncoding {

    /// The components are already linear.
    Linear,

    /// The color components use the sRGB transfer function. Alpha is linear.
    SRGB,

    /// The color components are raised to this power to become linear. Alpha is linear.
    Gamma(f32),

    /// The alpha component contains a shared exponent for the color components.
    /// The resulting image has no alpha channel.
    RGBE,
}

impl Default for ColorEncoding {
    fn default() -> Self { ColorEncoding::Linear }
}


impl<'s> RawPixels<'s> {

    /// Borrow the readback of an image.
    pub fn new(size: impl Into<Vec2<usize>>, encoding: ColorEncoding, samples: PixelSamples<'s>) -> Self {
        RawPixels { size: size.into(), encoding, samples }
    }

    /// Check that these pixels can be exported.
    /// Declines half float readbacks before checking anything else.
    pub fn validate(&self) -> UnitResult {
        if let PixelSamples::F16(_) = self.samples {
            return Err(Error::unsupported("half float readbacks cannot be exported"));
        }

        if self.size.width() == 0 || self.size.height() == 0 {
            return Err(Error::invalid("image must contain at least one pixel"));
        }

        IntegerBounds::from_dimensions(self.size).validate()?;

        let expected_len = self.size.area().checked_mul(INPUT_CHANNEL_COUNT)
            .ok_or(Error::invalid("image size exceeding memory"))?;

        if self.samples.len() != expected_len {
            return Err(Error::invalid(format!(
                "expected {} samples for {}x{} pixels, but found {}",
                expected_len, self.size.width(), self.size.height(), self.samples.len()
            )));
        }

        self.encoding.validate()
    }

    /// The number of channels in the exported file.
    pub fn output_channel_count(&self) -> usize {
        self.encoding.output_channel_count()
    }
}

impl PixelSamples<'_> {

    /// The number of components, not the number of texels.
    pub fn len(&self) -> usize {
        match self {
            PixelSamples::U8(samples) => samples.len(),
            PixelSamples::F16(samples) => samples.len(),
            PixelSamples::F32(samples) => samples.len(),
        }
    }

    /// Whether there are no components at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ColorEncoding {

    /// Whether the exported file has an alpha channel.
    pub fn has_alpha(self) -> bool {
        self != ColorEncoding::RGBE
    }

    /// The number of channels in the exported file.
    pub fn output_channel_count(self) -> usize {
        if self.has_alpha() { 4 } else { 3 }
    }

    /// Check that the gamma is usable.
    pub fn validate(self) -> UnitResult {
        match self {
            ColorEncoding::Gamma(gamma) if !gamma.is_finite() || gamma <= 0.0 =>
                Err(Error::invalid(format!("gamma {} (must be finite and positive)", gamma))),

            _ => Ok(())
        }
    }
}
