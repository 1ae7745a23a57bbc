
// see https://github.com/openexr/openexr/blob/master/OpenEXR/IlmImf/ImfZip.cpp


use super::*;
use super::optimize_bytes::*;


/// Deflate the little-endian bytes of one block, after separating
/// even and odd bytes and replacing each byte with its difference to the previous one.
pub fn compress_bytes(uncompressed_little_endian: ByteVec, level: u8) -> Result<ByteVec> {
    validate_zip_level(level)?;

    let mut packed = uncompressed_little_endian;
    separate_bytes_fragments(&mut packed);
    samples_to_differences(&mut packed);

    Ok(miniz_oxide::deflate::compress_to_vec_zlib(packed.as_slice(), level))
}
