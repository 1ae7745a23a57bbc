
//! Export pixels to an exr file.
//!
//! First, call `my_pixels.write()`. The resulting value can be customized, like this:
//! ```no_run
//!     use exr_export::prelude::*;
//! #   let readback = vec![ 0_u8; 4 * 8 * 8 ];
//! #   let my_pixels = RawPixels::new((8, 8), ColorEncoding::SRGB, PixelSamples::U8(&readback));
//!
//!     my_pixels.write()
//!            .with_sample_type(SampleType::F32)
//!            .with_compression(Compression::ZIP1)
//!            .to_file("image.exr").unwrap();
//! ```
//!

use std::io::BufWriter;
use crate::io::Write;
use crate::error::{Result, UnitResult};
use crate::compression::{Compression, DEFAULT_ZIP_LEVEL, validate_zip_level};
use crate::meta::MetaData;
use crate::meta::attribute::SampleType;
use crate::meta::header::{Header, sorted_channels};
use crate::image::{RawPixels, PixelSamples, ColorEncoding};
use crate::image::planar::PlanarSamples;
use crate::block::{uncompressed_blocks, compress_all_blocks};
use crate::block::writer::chunks_to_bytes;


/// An oversimplified function for "just give me the bytes already" use cases.
/// The colors function is called with `x` and `y`, where `y` counts from the top of the image.
/// Writes linear half float samples without compression.
pub fn write_rgba_f32_bytes(
    width: usize, height: usize,
    colors: impl Fn(usize, usize) -> (f32, f32, f32, f32)
) -> Result<Vec<u8>> {
    let readback = rgba_readback(width, height, colors);
    RawPixels::new((width, height), ColorEncoding::Linear, PixelSamples::F32(&readback))
        .write().to_bytes()
}

/// An oversimplified function for "just write the damn file already" use cases.
/// The colors function is called with `x` and `y`, where `y` counts from the top of the image.
/// Writes linear half float samples with zip compression.
pub fn write_rgba_f32_file(
    path: impl AsRef<std::path::Path>, width: usize, height: usize,
    colors: impl Fn(usize, usize) -> (f32, f32, f32, f32)
) -> UnitResult {
    let readback = rgba_readback(width, height, colors);
    RawPixels::new((width, height), ColorEncoding::Linear, PixelSamples::F32(&readback))
        .write().with_compression(Compression::ZIP16).to_file(path)
}

/// Build a readback that starts at the bottom row.
fn rgba_readback(width: usize, height: usize, colors: impl Fn(usize, usize) -> (f32, f32, f32, f32)) -> Vec<f32> {
    let mut readback = Vec::with_capacity(width * height * 4);

    for readback_y in 0 .. height {
        for x in 0 .. width {
            let (r, g, b, a) = colors(x, height - 1 - readback_y);
            readback.extend_from_slice(&[ r, g, b, a ]);
        }
    }

    readback
}


/// Enables pixels to be exported. Call `pixels.write()` where this trait is implemented.
pub trait WritableImage<'s>: Sized {

    /// Create a temporary writer which can be configured and used to export the pixels.
    fn write(self) -> WriteImageWithOptions<'s>;
}

impl<'s> WritableImage<'s> for RawPixels<'s> {
    fn write(self) -> WriteImageWithOptions<'s> {
        WriteImageWithOptions {
            pixels: self,
            sample_type: SampleType::default(),
            compression: Compression::default(),
            zip_level: DEFAULT_ZIP_LEVEL,
            parallel: true,
        }
    }
}

impl<'s> WritableImage<'s> for &RawPixels<'s> {
    fn write(self) -> WriteImageWithOptions<'s> {
        (*self).write()
    }
}

/// A temporary writer which can be configured and used to export pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteImageWithOptions<'s> {
    pixels: RawPixels<'s>,
    sample_type: SampleType,
    compression: Compression,
    zip_level: u8,
    parallel: bool,
}


impl<'s> WriteImageWithOptions<'s> {

    /// Store the samples as half floats or as full floats. Half floats are the default.
    pub fn with_sample_type(self, sample_type: SampleType) -> Self { Self { sample_type, ..self } }

    /// Compress the scan lines. No compression is the default.
    pub fn with_compression(self, compression: Compression) -> Self { Self { compression, ..self } }

    /// The zlib level for zip compression, from zero to ten. Four is the default.
    pub fn with_zip_level(self, zip_level: u8) -> Self { Self { zip_level, ..self } }

    /// Do not compress multiple pixel blocks on multiple threads at once.
    /// Might use less memory and synchronization, but will be slower in most situations.
    pub fn non_parallel(self) -> Self { Self { parallel: false, ..self } }

    /// Generate file meta data for these pixels. The meta data structure is close to the data in the file.
    pub fn infer_meta_data(&self) -> MetaData {
        let channels = sorted_channels(self.sample_type, self.pixels.encoding.has_alpha());
        MetaData::new(Header::new(self.pixels.size, channels, self.compression))
    }

    /// Export the pixels to a new byte vector.
    /// Either the complete file is returned, or an error.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.pixels.validate()?;
        if self.compression.is_zip() { validate_zip_level(self.zip_level)?; }

        let meta = self.infer_meta_data();
        meta.validate()?;

        let planar = PlanarSamples::from_pixels(&self.pixels, self.sample_type)?;
        debug_assert_eq!(planar.bytes_per_line(), meta.header.bytes_per_line(), "planar line size bug");

        let blocks = uncompressed_blocks(&meta.header, planar.as_bytes())?;
        let chunks = compress_all_blocks(&meta.header, blocks, self.zip_level, self.parallel)?;
        let bytes = chunks_to_bytes(&meta, &chunks)?;

        log::debug!(
            "exported {}x{} pixels with {} {:?} channels, {}, {} chunks, {} bytes",
            self.pixels.size.width(), self.pixels.size.height(),
            meta.header.channels.list.len(), self.sample_type,
            self.compression, chunks.len(), bytes.len()
        );

        Ok(bytes)
    }

    /// Export the pixels to a file.
    /// Use `to_unbuffered` instead, if you do not have a file.
    /// If an error occurs, attempts to delete the partially written file.
    #[inline]
    pub fn to_file(&self, path: impl AsRef<std::path::Path>) -> UnitResult {
        crate::io::attempt_delete_file_on_write_error(path.as_ref(), move |write|
            self.to_unbuffered(write)
        )
    }

    /// Buffer the writer and then export the pixels to it.
    /// Use `to_buffered` instead, if your writer is an in-memory buffer.
    /// Use `to_file` instead, if you have a file path.
    #[inline]
    pub fn to_unbuffered(&self, unbuffered: impl Write) -> UnitResult {
        self.to_buffered(BufWriter::new(unbuffered))
    }

    /// Export the pixels to a writer.
    /// The file is assembled in memory first, so nothing is written if the export fails.
    pub fn to_buffered(&self, mut write: impl Write) -> UnitResult {
        let bytes = self.to_bytes()?;
        write.write_all(&bytes)?;
        write.flush()?;
        Ok(())
    }
}
