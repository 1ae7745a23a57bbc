//! Convert decoded channel values into the little-endian sample bytes of a block.

use half::f16;
use crate::meta::attribute::SampleType;


/// Convert an `f32` to the bits of an `f16`.
/// Rounds the mantissa to the nearest value, with ties rounding away from zero.
/// Values too small for a half float become signed zero,
/// values too large become signed infinity, and NaN stays NaN.
#[inline]
pub fn encode_f16_bits(value: f32) -> u16 {
    let x = value.to_bits();

    // one extra bit of mantissa for rounding
    let mut mantissa = (x >> 12) & 0x07ff;
    let exponent = (x >> 23) & 0xff;
    let mut bits = (x >> 16) & 0x8000;

    // too small, also covers zero and f32 denormals
    if exponent < 103 {
        return bits as u16;
    }

    // too large, infinity or nan
    if exponent > 142 {
        bits |= 0x7c00;

        // keep a single mantissa bit so that nan does not become infinity
        let is_nan = exponent == 255 && (x & 0x007f_ffff) != 0;
        bits |= is_nan as u32;

        return bits as u16;
    }

    // half denormal, shift the implicit one into the mantissa
    if exponent < 113 {
        mantissa |= 0x0800;
        bits |= (mantissa >> (114 - exponent)) + ((mantissa >> (113 - exponent)) & 1);
        return bits as u16;
    }

    bits |= ((exponent - 112) << 10) | (mantissa >> 1);

    // the carry may overflow into the exponent, which yields the correct result
    bits += mantissa & 1;
    bits as u16
}

/// Convert an `f32` to an `f16` using the rounding of `encode_f16_bits`.
#[inline]
pub fn encode_f16(value: f32) -> f16 {
    f16::from_bits(encode_f16_bits(value))
}


/// Writes one decoded value as the little-endian bytes of a sample.
/// The target slice has exactly the size of one sample.
pub type SampleEncoder = fn(f32, &mut [u8]);

fn write_f16_le(value: f32, target: &mut [u8]) {
    target.copy_from_slice(&encode_f16_bits(value).to_le_bytes());
}

fn write_f32_le(value: f32, target: &mut [u8]) {
    target.copy_from_slice(&value.to_le_bytes());
}

impl SampleType {

    /// Select the function that stores a decoded value as this type of sample.
    pub fn sample_encoder(self) -> SampleEncoder {
        match self {
            SampleType::F16 => write_f16_le,
            SampleType::F32 => write_f32_le,
        }
    }
}
