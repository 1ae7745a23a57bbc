//! Reorganize interleaved readback texels into the planar scan line layout of an exr file.

use crate::error::{Error, Result};
use crate::image::{RawPixels, PixelSamples};
use crate::image::decode::{Decoder, TexelSource, NormalizedBytes, Floats};
use crate::math::Vec2;
use crate::meta::attribute::SampleType;


/// The little-endian sample bytes of all scan lines, ready to be split into blocks.
/// The first line is the top line of the image, which is the last row of the readback.
/// Within a line, all samples of one channel are contiguous,
/// and the channels appear in alphabetical order.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanarSamples {

    /// Width and height of the image, in pixels.
    pub size: Vec2<usize>,

    /// Three or four.
    pub channel_count: usize,

    /// The type of each stored sample.
    pub sample_type: SampleType,

    bytes: Vec<u8>,
}


impl PlanarSamples {

    /// Decode all texels of the readback and store them as samples of the specified type.
    pub fn from_pixels(pixels: &RawPixels<'_>, sample_type: SampleType) -> Result<Self> {
        pixels.validate()?;

        let decoder = Decoder::for_encoding(pixels.encoding);

        match pixels.samples {
            PixelSamples::U8(bytes) => Ok(Self::reorganize(NormalizedBytes(bytes), decoder, pixels.size, sample_type)),
            PixelSamples::F32(floats) => Ok(Self::reorganize(Floats(floats), decoder, pixels.size, sample_type)),
            PixelSamples::F16(_) => Err(Error::unsupported("half float readbacks cannot be exported")),
        }
    }

    /// Assumes the size of the source has been validated.
    fn reorganize(source: impl TexelSource, decoder: Decoder, size: Vec2<usize>, sample_type: SampleType) -> Self {
        let Vec2(width, height) = size;

        let encode = sample_type.sample_encoder();
        let bytes_per_sample = sample_type.bytes_per_sample();
        let channel_count = decoder.channel_count();

        let bytes_per_line = width * channel_count * bytes_per_sample;
        let mut bytes = vec![ 0_u8; bytes_per_line * height ];

        // the readback starts at the bottom, the file starts at the top
        let lines = bytes.chunks_exact_mut(bytes_per_line).rev();

        for (y, line) in lines.enumerate() {
            for x in 0 .. width {
                let texel = decoder.decode(source.texel(y * width + x));

                for (channel_index, &value) in texel.sorted_samples().iter().enumerate() {
                    let start = (channel_index * width + x) * bytes_per_sample;
                    encode(value, &mut line[start .. start + bytes_per_sample]);
                }
            }
        }

        PlanarSamples { size, channel_count, sample_type, bytes }
    }

    /// The byte size of a single scan line.
    pub fn bytes_per_line(&self) -> usize {
        self.size.width() * self.channel_count * self.sample_type.bytes_per_sample()
    }

    /// The sample bytes of all lines.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Return the sample bytes of all lines.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
