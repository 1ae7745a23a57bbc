//! Convert the components of a single input texel to linear channel values.

use crate::image::{ColorEncoding, INPUT_CHANNEL_COUNT};


/// Converts texels from the color encoding of the readback to linear values.
/// Chosen once for each export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decoder {

    /// Keep all components.
    Linear,

    /// Apply the inverse sRGB transfer function to the color components.
    SRGB,

    /// Raise the color components to this power.
    Gamma(f32),

    /// Scale the color components by the shared exponent in the alpha component.
    RGBE,
}

/// The linear channel values of one texel.
/// Stored in alphabetical channel order: alpha, blue, green, red.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedTexel {
    sorted_values: [f32; 4],
    has_alpha: bool,
}


/// Provides the four components of each texel, as floats.
pub trait TexelSource {

    /// The red, green, blue and alpha component of the texel at this index.
    fn texel(&self, texel_index: usize) -> [f32; 4];
}

/// Normalized 8-bit components.
#[derive(Debug, Clone, Copy)]
pub struct NormalizedBytes<'s>(pub &'s [u8]);

/// Float components, used verbatim.
#[derive(Debug, Clone, Copy)]
pub struct Floats<'s>(pub &'s [f32]);

impl TexelSource for NormalizedBytes<'_> {
    #[inline]
    fn texel(&self, texel_index: usize) -> [f32; 4] {
        let start = texel_index * INPUT_CHANNEL_COUNT;
        let components = &self.0[start .. start + INPUT_CHANNEL_COUNT];

        let normalize = |component: u8| component as f32 / 255.0;
        [ normalize(components[0]), normalize(components[1]), normalize(components[2]), normalize(components[3]) ]
    }
}

impl TexelSource for Floats<'_> {
    #[inline]
    fn texel(&self, texel_index: usize) -> [f32; 4] {
        let start = texel_index * INPUT_CHANNEL_COUNT;
        let components = &self.0[start .. start + INPUT_CHANNEL_COUNT];
        [ components[0], components[1], components[2], components[3] ]
    }
}


impl Decoder {

    /// Select the decoder for a color encoding.
    pub fn for_encoding(encoding: ColorEncoding) -> Self {
        match encoding {
            ColorEncoding::Linear => Decoder::Linear,
            ColorEncoding::SRGB => Decoder::SRGB,
            ColorEncoding::Gamma(gamma) => Decoder::Gamma(gamma),
            ColorEncoding::RGBE => Decoder::RGBE,
        }
    }

    /// The number of channels in each decoded texel.
    pub fn channel_count(self) -> usize {
        match self {
            Decoder::RGBE => 3,
            _ => 4,
        }
    }

    /// Convert the red, green, blue and alpha component to linear values.
    #[inline]
    pub fn decode(self, [red, green, blue, alpha]: [f32; 4]) -> DecodedTexel {
        match self {
            Decoder::Linear => DecodedTexel::rgba(red, green, blue, alpha),

            Decoder::SRGB => DecodedTexel::rgba(
                srgb_to_linear(red), srgb_to_linear(green), srgb_to_linear(blue),
                alpha
            ),

            Decoder::Gamma(gamma) => DecodedTexel::rgba(
                red.powf(gamma), green.powf(gamma), blue.powf(gamma),
                alpha
            ),

            Decoder::RGBE => {
                let scale = 2.0_f32.powf(alpha * 255.0 - 128.0);
                DecodedTexel::rgb(red * scale, green * scale, blue * scale)
            },
        }
    }
}

/// The inverse of the sRGB transfer function.
#[inline]
pub fn srgb_to_linear(component: f32) -> f32 {
    if component > 0.04045 {
        (component * 0.9478672986 + 0.0521327014).powf(2.4)
    }
    else {
        component * 0.0773993808
    }
}


impl DecodedTexel {

    /// A texel with an alpha channel.
    pub fn rgba(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        DecodedTexel { sorted_values: [alpha, blue, green, red], has_alpha: true }
    }

    /// A texel without an alpha channel.
    pub fn rgb(red: f32, green: f32, blue: f32) -> Self {
        DecodedTexel { sorted_values: [0.0, blue, green, red], has_alpha: false }
    }

    /// The channel values in the order of the channel list: `A, B, G, R`, or `B, G, R` without alpha.
    #[inline]
    pub fn sorted_samples(&self) -> &[f32] {
        if self.has_alpha { &self.sorted_values } else { &self.sorted_values[1..] }
    }

    /// The red value.
    pub fn red(&self) -> f32 { self.sorted_values[3] }

    /// The green value.
    pub fn green(&self) -> f32 { self.sorted_values[2] }

    /// The blue value.
    pub fn blue(&self) -> f32 { self.sorted_values[1] }

    /// The alpha value, if this texel has alpha.
    pub fn alpha(&self) -> Option<f32> {
        if self.has_alpha { Some(self.sorted_values[0]) } else { None }
    }
}
