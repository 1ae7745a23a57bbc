
//! Contains the compression attribute definition
//! and methods to compress scan line blocks.


// private modules make non-breaking changes easier
mod zip;


use crate::error::{Result, Error};


/// A byte vector.
pub type ByteVec = Vec<u8>;

/// The zlib level used for zip compression if not specified otherwise.
pub const DEFAULT_ZIP_LEVEL: u8 = 4;

/// The highest zlib level that can be used for zip compression.
pub const MAX_ZIP_LEVEL: u8 = 10;


/// Specifies which compression method to use.
/// Use uncompressed data for fastest loading and writing speeds.
/// Use ZIP compression for slow processing with large memory savings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compression {

    /// Store uncompressed values.
    /// Produces large files that can be read and written very quickly.
    Uncompressed,

    /// Uses ZIP compression to compress each line. Slowly produces small images
    /// which can be read with moderate speed. This compression method is lossless.
    /// Might be slightly faster but larger than `ZIP16´.
    ZIP1,

    /// Uses ZIP compression to compress blocks of 16 lines. Slowly produces small images
    /// which can be read with moderate speed. This compression method is lossless.
    /// Might be slightly slower but smaller than `ZIP1´.
    ZIP16,
}

impl Default for Compression {
    fn default() -> Self { Compression::Uncompressed }
}

impl std::fmt::Display for Compression {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{} compression", match self {
            Compression::Uncompressed => "no",
            Compression::ZIP1 => "zip line",
            Compression::ZIP16 => "zip block",
        })
    }
}


impl Compression {

    /// Compress the little-endian bytes of one scan line block.
    /// The zip level is ignored for uncompressed blocks.
    /// Compressed blocks are kept even if they are larger than the raw bytes.
    pub fn compress_image_section(self, uncompressed_little_endian: ByteVec, zip_level: u8) -> Result<ByteVec> {
        use self::Compression::*;

        match self {
            Uncompressed => Ok(uncompressed_little_endian),
            ZIP1 | ZIP16 => zip::compress_bytes(uncompressed_little_endian, zip_level),
        }
    }

    /// For scan line images, one or more scan lines may be
    /// stored together as a scan line block. The number of scan lines per block
    /// depends on how the pixel data are compressed.
    pub fn scan_lines_per_block(self) -> usize {
        use self::Compression::*;
        match self {
            Uncompressed | ZIP1 => 1,
            ZIP16 => 16,
        }
    }

    /// Whether the blocks of this method are deflated.
    pub fn is_zip(self) -> bool {
        self != Compression::Uncompressed
    }
}

/// Check that the zlib level can be passed to the deflate encoder.
pub fn validate_zip_level(level: u8) -> Result<()> {
    if level > MAX_ZIP_LEVEL {
        Err(Error::invalid(format!("zip level {} (must be at most {})", level, MAX_ZIP_LEVEL)))
    }
    else {
        Ok(())
    }
}


/// A collection of functions used to prepare data for compression,
/// and their inverses to restore the original bytes.
pub mod optimize_bytes {

    /// Integrate over all differences to the previous value in order to reconstruct sample values.
    pub fn differences_to_samples(buffer: &mut [u8]) {
        for index in 1..buffer.len() {
            buffer[index] = buffer[index - 1].wrapping_add(buffer[index]).wrapping_sub(128);
        }
    }

    /// Derive over all values in order to produce differences to the previous value.
    /// The first byte is kept as is.
    pub fn samples_to_differences(buffer: &mut [u8]){
        // backwards, so that each difference uses the original previous byte
        for index in (1..buffer.len()).rev() {
            buffer[index] = buffer[index].wrapping_sub(buffer[index - 1]).wrapping_add(128);
        }
    }

    /// Interleave the bytes such that each other byte is taken from the second half of the array.
    pub fn interleave_byte_blocks(separated: &mut [u8]) {
        let (first_half, second_half) = separated.split_at((separated.len() + 1) / 2);
        let mut interleaved = Vec::with_capacity(separated.len());

        for (index, &even) in first_half.iter().enumerate() {
            interleaved.push(even);

            if let Some(&odd) = second_half.get(index) {
                interleaved.push(odd);
            }
        }

        separated.copy_from_slice(interleaved.as_slice())
    }

    /// Separate the bytes such that the first half contains the even bytes
    /// and the second half contains the odd bytes.
    pub fn separate_bytes_fragments(source: &mut [u8]) {
        let mut separated = Vec::with_capacity(source.len());
        separated.extend(source.iter().step_by(2));
        separated.extend(source.iter().skip(1).step_by(2));
        source.copy_from_slice(separated.as_slice());
    }


}


#[cfg(test)]
mod test {
    use super::*;

    fn inflate(bytes: &[u8]) -> ByteVec {
        miniz_oxide::inflate::decompress_to_vec_zlib(bytes).unwrap()
    }

    #[test]
    fn lines_per_block(){
        assert_eq!(Compression::Uncompressed.scan_lines_per_block(), 1);
        assert_eq!(Compression::ZIP1.scan_lines_per_block(), 1);
        assert_eq!(Compression::ZIP16.scan_lines_per_block(), 16);
        assert_eq!(Compression::default(), Compression::Uncompressed);
    }

    #[test]
    fn uncompressed_is_passthrough(){
        let bytes = vec![ 9, 8, 7, 6, 5 ];
        let result = Compression::Uncompressed.compress_image_section(bytes.clone(), MAX_ZIP_LEVEL + 1).unwrap();
        assert_eq!(result, bytes);
    }

    #[test]
    fn zip_payload_inflates_to_transformed_bytes(){
        let raw: ByteVec = (0 .. 256_u32).map(|index| (index * 7 % 13) as u8).collect();

        for &compression in &[ Compression::ZIP1, Compression::ZIP16 ] {
            let compressed = compression.compress_image_section(raw.clone(), DEFAULT_ZIP_LEVEL).unwrap();
            assert_eq!(&compressed[..1], &[0x78], "zlib header");

            let mut restored = inflate(&compressed);
            optimize_bytes::differences_to_samples(&mut restored);
            optimize_bytes::interleave_byte_blocks(&mut restored);
            assert_eq!(restored, raw);
        }
    }

    #[test]
    fn incompressible_blocks_stay_compressed(){
        let raw = vec![ 0x3c_u8, 0x00 ];
        let compressed = Compression::ZIP1.compress_image_section(raw.clone(), DEFAULT_ZIP_LEVEL).unwrap();

        assert!(compressed.len() > raw.len());
        assert_ne!(compressed, raw);
    }

    #[test]
    fn invalid_zip_level_fails(){
        assert!(validate_zip_level(MAX_ZIP_LEVEL).is_ok());
        assert!(validate_zip_level(MAX_ZIP_LEVEL + 1).is_err());

        let result = Compression::ZIP16.compress_image_section(vec![ 1, 2, 3 ], MAX_ZIP_LEVEL + 1);
        assert!(matches!(result, Err(Error::Invalid(_))));
    }
}
