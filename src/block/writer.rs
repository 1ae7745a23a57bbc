//! Assemble a complete exr file from the meta data and the compressed chunks.
//! Computes the offset table from the final chunk sizes.

use crate::block::chunk::CompressedScanLineBlock;
use crate::error::{Error, Result, usize_to_u64};
use crate::io::{Data, Tracking, Write};
use crate::meta::MetaData;


/// Write the magic number, the version, the header, the offset table and all chunks, in this order.
/// The chunks must be sorted by their block index.
/// Returns the byte destination after writing.
pub fn write_chunks_to_buffered<W: Write>(
    buffered_write: W, meta: &MetaData, chunks: &[CompressedScanLineBlock]
) -> Result<W>
{
    let mut write = Tracking::new(buffered_write);
    meta.write_validating_to_buffered(&mut write)?;
    debug_assert_eq!(write.byte_position(), meta.byte_size(), "header byte size bug");

    let offset_table = meta.offset_table(
        chunks.iter().map(|chunk| chunk.compressed_pixels_le.len())
    )?;

    u64::write_slice(&mut write, &offset_table)?;

    for (chunk, &offset) in chunks.iter().zip(&offset_table) {
        if usize_to_u64(write.byte_position()) != offset {
            return Err(Error::invalid("chunk position does not match the offset table"));
        }

        chunk.write(&mut write)?;
    }

    write.flush()?;
    Ok(write.into_inner())
}

/// Assemble the complete file in memory.
pub fn chunks_to_bytes(meta: &MetaData, chunks: &[CompressedScanLineBlock]) -> Result<Vec<u8>> {
    let byte_size = meta.byte_size()
        + meta.offset_table_byte_size()
        + chunks.iter().map(CompressedScanLineBlock::byte_size).sum::<usize>();

    let bytes = write_chunks_to_buffered(Vec::with_capacity(byte_size), meta, chunks)?;
    debug_assert_eq!(bytes.len(), byte_size, "file byte size bug");

    Ok(bytes)
}


#[cfg(test)]
mod test {
    use super::*;
    use crate::compression::Compression;
    use crate::meta::attribute::SampleType;
    use crate::meta::header::{Header, sorted_channels};

    fn meta(height: usize) -> MetaData {
        MetaData::new(Header::new((2, height), sorted_channels(SampleType::F32, false), Compression::ZIP16))
    }

    fn chunk(y_coordinate: i32, size: usize) -> CompressedScanLineBlock {
        CompressedScanLineBlock { y_coordinate, compressed_pixels_le: vec![ 7; size ] }
    }

    fn read_u64(bytes: &[u8], position: usize) -> u64 {
        let mut value = [ 0_u8; 8 ];
        value.copy_from_slice(&bytes[position .. position + 8]);
        u64::from_le_bytes(value)
    }

    #[test]
    fn offsets_point_to_chunks(){
        let meta = meta(20);
        let chunks = vec![ chunk(0, 13), chunk(16, 5) ];
        let bytes = chunks_to_bytes(&meta, &chunks).unwrap();

        let table_start = meta.byte_size();
        let first = read_u64(&bytes, table_start) as usize;
        let second = read_u64(&bytes, table_start + 8) as usize;

        assert_eq!(first, table_start + 16);
        assert_eq!(second, first + 8 + 13);
        assert_eq!(&bytes[second .. second + 8], &[ 16, 0, 0, 0, 5, 0, 0, 0 ]);
        assert_eq!(bytes.len(), second + 8 + 5);
    }

    #[test]
    fn missing_chunks_are_rejected(){
        let meta = meta(20);
        assert!(chunks_to_bytes(&meta, &[ chunk(0, 13) ]).is_err());
    }

    #[test]
    fn invalid_header_is_rejected(){
        let meta = MetaData::new(Header::new((0, 1), sorted_channels(SampleType::F32, false), Compression::ZIP1));
        assert!(chunks_to_bytes(&meta, &[ chunk(0, 1) ]).is_err());
    }
}
