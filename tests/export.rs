extern crate exr_export;

use exr_export::prelude::*;
use exr_export::compression::optimize_bytes;
use exr_export::image::planar::PlanarSamples;
use rand::Rng;


/// The value bytes of each attribute, and the byte position after the header.
fn parse_header(bytes: &[u8]) -> (Vec<(String, String, Vec<u8>)>, usize) {
    assert_eq!(&bytes[0..4], &[0x76, 0x2f, 0x31, 0x01], "magic number");
    assert_eq!(&bytes[4..8], &[0x02, 0x00, 0x00, 0x00], "version");

    let mut position = 8;
    let mut attributes = Vec::new();

    let null_terminated = |position: &mut usize| {
        let end = *position + bytes[*position ..].iter().position(|&byte| byte == 0).unwrap();
        let text = String::from_utf8(bytes[*position .. end].to_vec()).unwrap();
        *position = end + 1;
        text
    };

    while bytes[position] != 0 {
        let name = null_terminated(&mut position);
        let kind = null_terminated(&mut position);

        let size = i32_at(bytes, position) as usize;
        position += 4;

        attributes.push((name, kind, bytes[position .. position + size].to_vec()));
        position += size;
    }

    (attributes, position + 1)
}

fn i32_at(bytes: &[u8], position: usize) -> i32 {
    i32::from_le_bytes([ bytes[position], bytes[position + 1], bytes[position + 2], bytes[position + 3] ])
}

fn u64_at(bytes: &[u8], position: usize) -> u64 {
    let mut value = [0_u8; 8];
    value.copy_from_slice(&bytes[position .. position + 8]);
    u64::from_le_bytes(value)
}

fn u16_at(bytes: &[u8], position: usize) -> u16 {
    u16::from_le_bytes([ bytes[position], bytes[position + 1] ])
}

fn attribute<'a>(attributes: &'a [(String, String, Vec<u8>)], name: &str) -> &'a [u8] {
    &attributes.iter().find(|(attribute_name, _, _)| attribute_name == name).unwrap().2
}

/// The names of the channels in the channel list attribute.
fn channel_names(channel_list: &[u8]) -> Vec<String> {
    assert_eq!(channel_list.last(), Some(&0));

    channel_list[.. channel_list.len() - 1].chunks(18)
        .map(|channel| {
            assert_eq!(channel[1], 0, "single character channel name");
            assert_eq!(&channel[6..10], &[0, 0, 0, 0], "linear flag and reserved bytes");
            assert_eq!(i32_at(channel, 10), 1, "x sampling");
            assert_eq!(i32_at(channel, 14), 1, "y sampling");
            (channel[0] as char).to_string()
        })
        .collect()
}

/// The y coordinate and payload of each chunk, after checking the offset table.
fn chunks(bytes: &[u8], table_start: usize, chunk_count: usize) -> Vec<(i32, Vec<u8>)> {
    let offsets: Vec<usize> = (0 .. chunk_count)
        .map(|index| u64_at(bytes, table_start + index * 8) as usize)
        .collect();

    assert_eq!(offsets[0], table_start + chunk_count * 8, "first chunk follows the table");

    let chunks: Vec<(i32, Vec<u8>)> = offsets.iter()
        .map(|&offset| {
            let size = i32_at(bytes, offset + 4) as usize;
            (i32_at(bytes, offset), bytes[offset + 8 .. offset + 8 + size].to_vec())
        })
        .collect();

    for index in 1 .. chunk_count {
        assert_eq!(offsets[index] - offsets[index - 1], 8 + chunks[index - 1].1.len(), "consecutive offsets");
    }

    let last_end = offsets[chunk_count - 1] + 8 + chunks[chunk_count - 1].1.len();
    assert_eq!(last_end, bytes.len(), "no trailing bytes");

    chunks
}


#[test]
fn two_by_two_grey_image(){
    let readback = [ 0.5_f32, 0.5, 0.5, 1.0 ].repeat(4);
    let pixels = RawPixels::new((2, 2), ColorEncoding::Linear, PixelSamples::F32(&readback));

    let bytes = pixels.write()
        .with_sample_type(SampleType::F16)
        .with_compression(Compression::Uncompressed)
        .to_bytes().unwrap();

    assert_eq!(&bytes[0..8], &[ 0x76, 0x2F, 0x31, 0x01, 0x02, 0x00, 0x00, 0x00 ]);

    let (attributes, table_start) = parse_header(&bytes);

    let names: Vec<&str> = attributes.iter().map(|(name, _, _)| name.as_str()).collect();
    assert_eq!(names, vec![
        "compression", "screenWindowCenter", "screenWindowWidth", "pixelAspectRatio",
        "lineOrder", "dataWindow", "displayWindow", "channels",
    ]);

    let data_window = attribute(&attributes, "dataWindow");
    let data_window: Vec<i32> = (0..4).map(|index| i32_at(data_window, index * 4)).collect();
    assert_eq!(data_window, vec![ 0, 0, 1, 1 ]);

    assert_eq!(attribute(&attributes, "displayWindow"), attribute(&attributes, "dataWindow"));
    assert_eq!(attribute(&attributes, "compression"), &[ 0 ]);
    assert_eq!(attribute(&attributes, "lineOrder"), &[ 0 ]);
    assert_eq!(attribute(&attributes, "screenWindowWidth"), &1.0_f32.to_le_bytes());
    assert_eq!(attribute(&attributes, "pixelAspectRatio"), &1.0_f32.to_le_bytes());
    assert_eq!(attribute(&attributes, "screenWindowCenter"), &[ 0; 8 ]);
    assert_eq!(attribute(&attributes, "channels").len(), 18 * 4 + 1);

    let chunks = chunks(&bytes, table_start, 2);

    for (index, (y, payload)) in chunks.iter().enumerate() {
        assert_eq!(*y, index as i32);
        assert_eq!(payload.len(), 2 * 4 * 2);

        let samples: Vec<u16> = (0 .. 8).map(|sample| u16_at(payload, sample * 2)).collect();
        assert_eq!(samples, vec![
            0x3C00, 0x3C00, // alpha
            0x3800, 0x3800, // blue
            0x3800, 0x3800, // green
            0x3800, 0x3800, // red
        ]);
    }
}

#[test]
fn single_zip16_block(){
    let readback: Vec<f32> = (0 .. 16 * 4).map(|index| index as f32 * 0.125).collect();
    let pixels = RawPixels::new((1, 16), ColorEncoding::Linear, PixelSamples::F32(&readback));

    let bytes = pixels.write().with_compression(Compression::ZIP16).to_bytes().unwrap();
    let (attributes, table_start) = parse_header(&bytes);
    assert_eq!(attribute(&attributes, "compression"), &[ 3 ]);

    let chunks = chunks(&bytes, table_start, 1);
    let (y, payload) = &chunks[0];
    assert_eq!(*y, 0);

    let mut restored = zune_inflate::DeflateDecoder::new(payload).decode_zlib().unwrap();
    optimize_bytes::differences_to_samples(&mut restored);
    optimize_bytes::interleave_byte_blocks(&mut restored);

    let planar = PlanarSamples::from_pixels(&pixels, SampleType::F16).unwrap();
    assert_eq!(restored.as_slice(), planar.as_bytes());
}

#[test]
fn zip1_blocks_are_single_lines(){
    let readback = vec![ 0.25_f32; 3 * 5 * 4 ];
    let pixels = RawPixels::new((3, 5), ColorEncoding::Linear, PixelSamples::F32(&readback));

    let bytes = pixels.write().with_compression(Compression::ZIP1).to_bytes().unwrap();
    let (attributes, table_start) = parse_header(&bytes);
    assert_eq!(attribute(&attributes, "compression"), &[ 2 ]);

    let y_coordinates: Vec<i32> = chunks(&bytes, table_start, 5).iter().map(|(y, _)| *y).collect();
    assert_eq!(y_coordinates, vec![ 0, 1, 2, 3, 4 ]);
}

#[test]
fn offset_table_matches_chunks_for_random_images(){
    let mut random = rand::rng();

    for _ in 0 .. 24 {
        let width = random.random_range(1 .. 40);
        let height = random.random_range(1 .. 70);

        let readback: Vec<f32> = (0 .. width * height * 4)
            .map(|_| random.random_range(-4.0 .. 4.0))
            .collect();

        let pixels = RawPixels::new((width, height), ColorEncoding::Linear, PixelSamples::F32(&readback));

        for &compression in &[ Compression::Uncompressed, Compression::ZIP1, Compression::ZIP16 ] {
            for &sample_type in &[ SampleType::F16, SampleType::F32 ] {
                let bytes = pixels.write()
                    .with_compression(compression).with_sample_type(sample_type)
                    .to_bytes().unwrap();

                let lines_per_block = compression.scan_lines_per_block();
                let chunk_count = (height + lines_per_block - 1) / lines_per_block;

                let (_, table_start) = parse_header(&bytes);
                let chunks = chunks(&bytes, table_start, chunk_count);

                for (index, (y, payload)) in chunks.iter().enumerate() {
                    assert_eq!(*y as usize, index * lines_per_block);

                    if compression == Compression::Uncompressed {
                        let lines = lines_per_block.min(height - index * lines_per_block);
                        assert_eq!(payload.len(), lines * width * 4 * sample_type_size(sample_type));
                    }
                }
            }
        }
    }
}

fn sample_type_size(sample_type: SampleType) -> usize {
    match sample_type {
        SampleType::F16 => 2,
        SampleType::F32 => 4,
    }
}

#[test]
fn channel_order_depends_on_alpha(){
    let readback = vec![ 128_u8; 4 * 4 ];

    let rgba = RawPixels::new((2, 2), ColorEncoding::SRGB, PixelSamples::U8(&readback));
    let bytes = rgba.write().to_bytes().unwrap();
    let (attributes, _) = parse_header(&bytes);
    assert_eq!(channel_names(attribute(&attributes, "channels")), vec![ "A", "B", "G", "R" ]);

    let rgbe = RawPixels::new((2, 2), ColorEncoding::RGBE, PixelSamples::U8(&readback));
    let bytes = rgbe.write().with_sample_type(SampleType::F32).to_bytes().unwrap();
    let (attributes, _) = parse_header(&bytes);

    let channels = attribute(&attributes, "channels");
    assert_eq!(channels.len(), 18 * 3 + 1);
    assert_eq!(channel_names(channels), vec![ "B", "G", "R" ]);
    assert_eq!(i32_at(channels, 2), 2, "float sample type");
}

#[test]
fn declined_and_invalid_inputs(){
    let halfs = vec![ f16::ONE; 4 ];
    let result = RawPixels::new((1, 1), ColorEncoding::Linear, PixelSamples::F16(&halfs)).write().to_bytes();
    assert!(matches!(result, Err(Error::NotSupported(_))));

    let floats = vec![ 1.0_f32; 4 ];
    let result = RawPixels::new((0, 1), ColorEncoding::Linear, PixelSamples::F32(&floats)).write().to_bytes();
    assert!(matches!(result, Err(Error::Invalid(_))));

    let result = RawPixels::new((2, 1), ColorEncoding::Linear, PixelSamples::F32(&floats)).write().to_bytes();
    assert!(matches!(result, Err(Error::Invalid(_))));

    let result = RawPixels::new((1, 1), ColorEncoding::Gamma(0.0), PixelSamples::F32(&floats)).write().to_bytes();
    assert!(matches!(result, Err(Error::Invalid(_))));
}

#[test]
fn failed_file_export_leaves_no_file(){
    let path = std::env::temp_dir().join(format!("exr_export_failed_{}.exr", std::process::id()));

    let floats = vec![ 1.0_f32; 3 ];
    let result = RawPixels::new((1, 1), ColorEncoding::Linear, PixelSamples::F32(&floats))
        .write().to_file(&path);

    assert!(result.is_err());
    assert!(!path.exists());
}

#[test]
fn file_export_matches_bytes(){
    let path = std::env::temp_dir().join(format!("exr_export_file_{}.exr", std::process::id()));

    let floats: Vec<f32> = (0 .. 4 * 8 * 8).map(|index| (index % 9) as f32).collect();
    let writer = RawPixels::new((8, 8), ColorEncoding::Linear, PixelSamples::F32(&floats))
        .write().with_compression(Compression::ZIP16);

    writer.to_file(&path).unwrap();
    let written = std::fs::read(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(written, writer.to_bytes().unwrap());
}

#[test]
fn tiny_zip_blocks_stay_deflated_when_larger(){
    let floats = vec![ 0.5_f32; 4 ];
    let bytes = RawPixels::new((1, 1), ColorEncoding::Linear, PixelSamples::F32(&floats))
        .write().with_compression(Compression::ZIP1)
        .to_bytes().unwrap();

    let (_, table_start) = parse_header(&bytes);
    let chunks = chunks(&bytes, table_start, 1);
    let (_, payload) = &chunks[0];

    // four half float samples
    let raw_byte_size = 4 * 2;
    assert!(payload.len() > raw_byte_size);

    let mut restored = zune_inflate::DeflateDecoder::new(payload).decode_zlib().unwrap();
    optimize_bytes::differences_to_samples(&mut restored);
    optimize_bytes::interleave_byte_blocks(&mut restored);
    assert_eq!(restored, vec![ 0x00, 0x3C, 0x00, 0x38, 0x00, 0x38, 0x00, 0x38 ]);
}
