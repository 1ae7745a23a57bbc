
//! Describes the meta data of an exported exr file.
//! The meta data is written before the offset table and the pixel chunks.

pub mod attribute;
pub mod header;


use crate::io::*;
use crate::error::*;
use crate::meta::header::Header;


/// Contains the complete meta data of an exported exr image.
/// Defines how the image is split up in the file
/// and the type of the contained channels.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaData {

    /// Some flags summarizing the features that must be supported to decode the file.
    pub requirements: Requirements,

    /// The single scan line header of the file.
    pub header: Header,
}


/// The absolute byte offsets of the chunks, one for each block, in increasing block order.
pub type OffsetTable = Vec<u64>;


/// A summary of requirements that must be met to read this exr file.
/// Includes the OpenEXR version number, which is always `2.0` for exported files.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct Requirements {

    /// Written as the least significant byte of the version word.
    file_format_version: u8,

    /// If true, this image has tiled blocks and contains only a single layer.
    is_single_layer_and_tiled: bool,

    /// Whether this file has strings with a length greater than 31.
    has_long_names: bool,

    /// This image contains at least one layer with deep data.
    has_deep_data: bool,

    /// Whether this file contains multiple layers.
    has_multiple_layers: bool,
}


/// The first four bytes of each exr file.
pub mod magic_number {
    use super::*;

    /// The first four bytes of each exr file.
    pub const BYTES: [u8; 4] = [0x76, 0x2f, 0x31, 0x01];

    /// Number of bytes this would consume in an exr file.
    pub fn byte_size() -> usize {
        BYTES.len()
    }

    /// Without validation, write this instance to the byte stream.
    pub fn write(write: &mut impl Write) -> Result<()> {
        u8::write_slice(write, &self::BYTES)
    }
}

/// A `0_u8` at the end of a sequence.
pub mod sequence_end {
    use super::*;

    /// Number of bytes this would consume in an exr file.
    pub fn byte_size() -> usize {
        1
    }

    /// Without validation, write this instance to the byte stream.
    pub fn write<W: Write>(write: &mut W) -> UnitResult {
        0_u8.write(write)
    }
}


/// Compute the number of blocks required to contain all lines.
pub fn compute_block_count(full_res: usize, block_size: usize) -> usize {
    // the last block may be only partially used
    (full_res + block_size - 1) / block_size
}

/// Calculate the size of a single block. If this is the last block,
/// this only returns the remaining size, which may be smaller than the default block size.
#[inline]
pub fn calculate_block_size(total_size: usize, block_size: usize, block_position: usize) -> Result<usize> {
    if block_position >= total_size {
        return Err(Error::invalid("block index"))
    }

    if block_position + block_size <= total_size {
        Ok(block_size)
    }
    else {
        Ok(total_size - block_position)
    }
}


impl MetaData {

    /// Wrap a single scan line header.
    pub fn new(header: Header) -> Self {
        MetaData { requirements: Requirements::scan_lines(), header }
    }

    /// Number of bytes the magic number, the version word and the header consume in an exr file.
    /// The offset table starts at this position.
    pub fn byte_size(&self) -> usize {
        magic_number::byte_size() + Requirements::byte_size() + self.header.byte_size()
    }

    /// Number of bytes the offset table consumes in an exr file.
    pub fn offset_table_byte_size(&self) -> usize {
        self.header.chunk_count * u64::BYTE_SIZE
    }

    /// Validates the meta data and then writes it to the byte stream.
    pub(crate) fn write_validating_to_buffered(&self, write: &mut impl Write) -> UnitResult {
        self.validate()?;
        self.write(write)
    }

    /// Without validation, write the magic number, the version word and the header.
    pub fn write(&self, write: &mut impl Write) -> UnitResult {
        magic_number::write(write)?;
        self.requirements.write(write)?;
        self.header.write(write)
    }

    /// Validate this instance.
    pub fn validate(&self) -> UnitResult {
        self.requirements.validate()?;
        self.header.validate()
    }

    /// Compute the absolute chunk offsets, given the payload byte size of each block.
    /// Each chunk consumes its y coordinate, its payload size and the payload.
    pub fn offset_table(&self, payload_sizes: impl IntoIterator<Item = usize>) -> Result<OffsetTable> {
        let mut offset = usize_to_u64(self.byte_size() + self.offset_table_byte_size());

        let table: OffsetTable = payload_sizes.into_iter()
            .map(|payload_size| {
                let chunk_offset = offset;
                offset += (2 * i32::BYTE_SIZE + payload_size) as u64;
                chunk_offset
            })
            .collect();

        if table.len() != self.header.chunk_count {
            return Err(Error::invalid("chunk count does not match the header"));
        }

        Ok(table)
    }
}


impl Requirements {

    /// The requirements of a single-part scan line file: version `2.0` without any feature flags.
    pub fn scan_lines() -> Self {
        Requirements {
            file_format_version: 2,
            is_single_layer_and_tiled: false,
            has_long_names: false,
            has_deep_data: false,
            has_multiple_layers: false,
        }
    }

    /// Number of bytes this would consume in an exr file.
    pub fn byte_size() -> usize {
        u32::BYTE_SIZE
    }

    /// Compose the version number and the feature flags into a single word.
    pub fn version_word(self) -> u32 {
        use ::bit_field::BitField;

        // the 8 least significant bits contain the file format version number
        let mut version_and_flags = self.file_format_version as u32;

        // the remaining bits are treated as a set of boolean flags
        version_and_flags.set_bit(9, self.is_single_layer_and_tiled);
        version_and_flags.set_bit(10, self.has_long_names);
        version_and_flags.set_bit(11, self.has_deep_data);
        version_and_flags.set_bit(12, self.has_multiple_layers);
        // all remaining bits except 9, 10, 11 and 12 are reserved and must be 0

        version_and_flags
    }

    /// Without validation, write this instance to the byte stream.
    pub fn write<W: Write>(self, write: &mut W) -> UnitResult {
        self.version_word().write(write)
    }

    /// Validate this instance.
    pub fn validate(&self) -> UnitResult {
        if self.file_format_version != 2 {
            return Err(Error::unsupported("only version `2.0` files are written"));
        }

        match (self.is_single_layer_and_tiled, self.has_deep_data, self.has_multiple_layers) {
            // single-part scan line, one normal scan line image
            (false, false, false) => Ok(()),
            _ => Err(Error::unsupported("only single-part scan line files are written")),
        }
    }
}
