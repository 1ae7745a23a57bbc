//! Write already compressed pixel data blocks.
//! Does not include the process of compression.

use crate::io::*;
use crate::error::*;


/// A `Block` of possibly compressed flat scan lines.
/// Corresponds to type attribute `scanlineimage`.
/// The byte data is in little-endian format,
/// as these bytes will be written into the file directly.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CompressedScanLineBlock {

    /// The block's y coordinate is the pixel space y coordinate of the top scan line in the block.
    /// The top scan line block in the image is aligned with the top edge of the data window.
    pub y_coordinate: i32,

    /// One or more scan lines may be stored together as a scan line block.
    /// The number of scan lines per block depends on how the pixel data are compressed.
    /// For each line in the block, for each channel, the row values are contiguous.
    /// This data is compressed and in little-endian format.
    pub compressed_pixels_le: Vec<u8>,
}


impl CompressedScanLineBlock {

    /// Number of bytes this chunk consumes in an exr file,
    /// including the y coordinate and the payload size.
    pub fn byte_size(&self) -> usize {
        2 * i32::BYTE_SIZE + self.compressed_pixels_le.len()
    }

    /// Without validation, write this instance to the byte stream.
    pub fn write<W: Write>(&self, write: &mut W) -> UnitResult {
        debug_assert_ne!(self.compressed_pixels_le.len(), 0, "empty blocks should not be put in the file bug");

        i32::write(self.y_coordinate, write)?;
        u8::write_i32_sized_slice(write, &self.compressed_pixels_le)?;
        Ok(())
    }
}
