//! Handle compressed and uncompressed pixel byte blocks.
//! Splits the planar pixel bytes into scan line blocks and compresses them,
//! either on the current thread or on a thread pool.

pub mod samples;
pub mod chunk;
pub mod writer;

use crate::compression::{ByteVec, Compression};
use crate::error::{Result, Error, usize_to_i32};
use crate::meta::calculate_block_size;
use crate::meta::header::Header;
use crate::block::chunk::CompressedScanLineBlock;


/// Contains a block of pixel data and where that data should be placed in the actual image.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct UncompressedBlock {

    /// The position of this block in the offset table.
    pub index: usize,

    /// Index of the top scan line of this block.
    pub y_coordinate: usize,

    /// Uncompressed pixel values of the whole block, in little-endian format.
    /// One or more scan lines may be stored together as a scan line block.
    /// This byte vector contains all pixel rows, one after another.
    /// For each line in the block, for each channel, the row values are contiguous.
    pub data: ByteVec,
}


/// Split the planar bytes of a whole image into scan line blocks, top to bottom.
/// The last block contains only the remaining lines.
pub fn uncompressed_blocks<'b>(header: &Header, planar_bytes: &'b [u8]) -> Result<impl 'b + Iterator<Item = UncompressedBlock>> {
    let bytes_per_line = header.bytes_per_line();
    let height = header.layer_size().height();
    let lines_per_block = header.compression.scan_lines_per_block();

    if planar_bytes.len() != bytes_per_line * height {
        return Err(Error::invalid("planar byte count does not match the header"));
    }

    let blocks = planar_bytes.chunks(bytes_per_line * lines_per_block).enumerate()
        .map(move |(index, bytes)| UncompressedBlock {
            index, y_coordinate: index * lines_per_block,
            data: bytes.to_vec(),
        });

    Ok(blocks)
}


impl UncompressedBlock {

    /// Consume this block by compressing it, returning a chunk.
    // for uncompressed data, the ByteVec in the chunk is moved all the way
    #[inline]
    pub fn compress_to_chunk(self, compression: Compression, zip_level: u8) -> Result<CompressedScanLineBlock> {
        let UncompressedBlock { index, y_coordinate, data } = self;
        let raw_byte_size = data.len();

        let compressed_pixels_le = compression.compress_image_section(data, zip_level)?;

        log::trace!(
            "compressed block {} at line {} from {} to {} bytes",
            index, y_coordinate, raw_byte_size, compressed_pixels_le.len()
        );

        Ok(CompressedScanLineBlock {
            y_coordinate: usize_to_i32(y_coordinate, "block y coordinate")?,
            compressed_pixels_le,
        })
    }
}


/// Compress all blocks, possibly on multiple threads.
/// The result is in block order, regardless of which block finished first.
/// Uncompressed images and single blocks are always processed on the current thread.
pub fn compress_all_blocks(
    header: &Header, blocks: impl Iterator<Item = UncompressedBlock>,
    zip_level: u8, parallel: bool,
) -> Result<Vec<CompressedScanLineBlock>>
{
    let parallel = parallel && header.compression.is_zip() && header.chunk_count > 1;

    #[cfg(feature = "rayon")]
    {
        if parallel {
            return compress_all_blocks_parallel(header, blocks, zip_level);
        }
    }

    #[cfg(not(feature = "rayon"))]
    {
        if parallel {
            log::debug!("parallel compression is not available without the `rayon` feature");
        }
    }

    compress_all_blocks_sequential(header, blocks, zip_level)
}

/// Compress all blocks, one after another, on the current thread.
pub fn compress_all_blocks_sequential(
    header: &Header, blocks: impl Iterator<Item = UncompressedBlock>, zip_level: u8
) -> Result<Vec<CompressedScanLineBlock>>
{
    let chunks = blocks
        .map(|block| {
            debug_assert_block_size(header, &block);
            block.compress_to_chunk(header.compression, zip_level)
        })
        .collect::<Result<Vec<_>>>()?;

    debug_assert_eq!(chunks.len(), header.chunk_count, "block count bug");
    Ok(chunks)
}

/// Compress all blocks on a thread pool.
/// Falls back to sequential compression if the thread pool cannot be created.
#[cfg(feature = "rayon")]
pub fn compress_all_blocks_parallel(
    header: &Header, blocks: impl Iterator<Item = UncompressedBlock>, zip_level: u8
) -> Result<Vec<CompressedScanLineBlock>>
{
    let maybe_pool = rayon_core::ThreadPoolBuilder::new()
        .thread_name(|index| format!("OpenEXR Block Compressor Thread #{}", index))
        .build();

    // thread pool creation may fail, for example on wasm
    let pool = match maybe_pool {
        Ok(pool) => pool,
        Err(error) => {
            log::debug!("compressing sequentially, as no thread pool could be created: {}", error);
            return compress_all_blocks_sequential(header, blocks, zip_level);
        }
    };

    let compression = header.compression;
    let (sender, receiver) = std::sync::mpsc::channel();

    for block in blocks {
        debug_assert_block_size(header, &block);

        let sender = sender.clone();
        pool.spawn_fifo(move || {
            let index = block.index;
            let compressed_or_err = block.compress_to_chunk(compression, zip_level);

            // by now, compressing could have failed in another thread.
            // the receiver is then dropped, so the result is silently discarded
            let _ = sender.send((index, compressed_or_err));
        });
    }

    // the receiver stops when all spawned jobs have dropped their sender
    drop(sender);

    let mut chunks = Vec::with_capacity(header.chunk_count);
    for (index, compressed_or_err) in receiver {
        chunks.push((index, compressed_or_err?));
    }

    chunks.sort_unstable_by_key(|&(index, _)| index);

    debug_assert!(
        chunks.iter().enumerate().all(|(expected, &(index, _))| expected == index),
        "missing or duplicate block bug"
    );

    debug_assert_eq!(chunks.len(), header.chunk_count, "block count bug");
    Ok(chunks.into_iter().map(|(_, chunk)| chunk).collect())
}

fn debug_assert_block_size(header: &Header, block: &UncompressedBlock) {
    debug_assert_eq!(
        calculate_block_size(
            header.layer_size().height(),
            header.compression.scan_lines_per_block(),
            block.y_coordinate
        ).map(|lines| lines * header.bytes_per_line()).ok(),
        Some(block.data.len()),
        "block byte size bug"
    );
}
