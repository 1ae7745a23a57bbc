
//! Contains the header of a single-part scan line file
//! and the fixed order in which its attributes are written.

use crate::meta::attribute::{self, *};
use crate::meta::{compute_block_count, sequence_end};
use crate::compression::Compression;
use crate::math::Vec2;
use crate::error::*;
use crate::io::Write;
use smallvec::SmallVec;


/// Describes a single scan line image.
/// Contains exactly the attributes that exported files carry.
#[derive(Clone, Debug, PartialEq)]
pub struct Header {

    /// List of channels in this image, sorted alphabetically.
    pub channels: ChannelList,

    /// How the pixel data of all channels in this image is compressed.
    pub compression: Compression,

    /// In what order the blocks of pixel data appear in the file.
    pub line_order: LineOrder,

    /// The rectangle that contains the pixels, starting at the origin.
    pub data_window: IntegerBounds,

    /// The rectangle anywhere in the global infinite 2D space
    /// that clips all contents of the file.
    pub display_window: IntegerBounds,

    /// Aspect ratio of each pixel in this image.
    pub pixel_aspect: f32,

    /// Part of the perspective projection. Default should be `(0, 0)`.
    pub screen_window_center: Vec2<f32>,

    /// Part of the perspective projection. Default should be `1`.
    pub screen_window_width: f32,

    /// The number of chunks in the offset table.
    /// Computed from the data window height and the compression method.
    pub chunk_count: usize,
}


/// Contains the names of the attributes an exported header consists of.
pub mod standard_names {
    macro_rules! define_required_attribute_names {
        ( $($name: ident  :  $value: expr),* ) => {
            $(
                /// The byte-string name of this required attribute as it appears in an exr file.
                pub const $name: &'static [u8] = $value;
            )*
        };
    }

    define_required_attribute_names! {
        COMPRESSION: b"compression",
        WINDOW_CENTER: b"screenWindowCenter",
        WINDOW_WIDTH: b"screenWindowWidth",
        PIXEL_ASPECT: b"pixelAspectRatio",
        LINE_ORDER: b"lineOrder",
        DATA_WINDOW: b"dataWindow",
        DISPLAY_WINDOW: b"displayWindow",
        CHANNELS: b"channels"
    }
}


impl Header {

    /// Create a new header with the specified channels and compression.
    /// The data window and the display window both start at the origin and cover the whole image.
    /// Does not validate the channels.
    pub fn new(size: impl Into<Vec2<usize>>, channels: ChannelList, compression: Compression) -> Self {
        let size = size.into();
        let window = IntegerBounds::from_dimensions(size);

        Header {
            chunk_count: compute_block_count(size.height(), compression.scan_lines_per_block()),
            channels, compression,
            line_order: LineOrder::Increasing,
            data_window: window,
            display_window: window,
            pixel_aspect: 1.0,
            screen_window_center: Vec2(0.0, 0.0),
            screen_window_width: 1.0,
        }
    }

    /// The number of pixels in this image.
    pub fn layer_size(&self) -> Vec2<usize> {
        self.data_window.size
    }

    /// The byte size of one full scan line in the planar pixel buffer.
    pub fn bytes_per_line(&self) -> usize {
        self.layer_size().width() * self.channels.bytes_per_pixel
    }

    /// The attributes of this header, in the order they appear in the file.
    fn attributes(&self) -> [(&'static [u8], AttributeValue); 8] {
        use self::standard_names::*;
        use self::AttributeValue::*;

        [
            (COMPRESSION, Compression(self.compression)),
            (WINDOW_CENTER, FloatVec2(self.screen_window_center)),
            (WINDOW_WIDTH, F32(self.screen_window_width)),
            (PIXEL_ASPECT, F32(self.pixel_aspect)),
            (LINE_ORDER, LineOrder(self.line_order)),
            (DATA_WINDOW, IntegerBounds(self.data_window)),
            (DISPLAY_WINDOW, IntegerBounds(self.display_window)),
            (CHANNELS, ChannelList(self.channels.clone())),
        ]
    }

    /// Number of bytes this header would consume in an exr file, including its sequence end.
    pub fn byte_size(&self) -> usize {
        self.attributes().iter()
            .map(|(name, value)| attribute::byte_size(name, value))
            .sum::<usize>()

            + sequence_end::byte_size()
    }

    /// Without validation, write this instance to the byte stream.
    pub fn write(&self, write: &mut impl Write) -> UnitResult {
        for (name, value) in self.attributes().iter() {
            attribute::write(name, value, write)?;
        }

        sequence_end::write(write)?;
        Ok(())
    }

    /// Validate this instance.
    pub fn validate(&self) -> UnitResult {
        self.channels.validate()?;
        self.data_window.validate()?;
        self.display_window.validate()?;

        if self.data_window.position != Vec2(0, 0) {
            return Err(Error::invalid("data window must start at the origin"));
        }

        let is_finite_and_positive = |value: f32| value.is_finite() && value > 0.0;

        if !is_finite_and_positive(self.pixel_aspect) {
            return Err(Error::invalid("pixel aspect ratio"));
        }

        if !is_finite_and_positive(self.screen_window_width) {
            return Err(Error::invalid("screen window width"));
        }

        let expected_chunks = compute_block_count(
            self.layer_size().height(), self.compression.scan_lines_per_block()
        );

        if self.chunk_count != expected_chunks {
            return Err(Error::invalid("chunk count attribute"));
        }

        Ok(())
    }
}

/// The channels written for an export, sorted alphabetically:
/// alpha, blue, green and red, or blue, green and red if the image has no alpha.
pub fn sorted_channels(sample_type: SampleType, has_alpha: bool) -> ChannelList {
    let names: &[&str] = if has_alpha { &["A", "B", "G", "R"] } else { &["B", "G", "R"] };

    let list: SmallVec<[ChannelDescription; 4]> = names.iter()
        .map(|&name| ChannelDescription::named(name, sample_type))
        .collect();

    ChannelList::new(list)
}


#[cfg(test)]
mod test {
    use super::*;

    fn header_bytes(header: &Header) -> Vec<u8> {
        let mut bytes = Vec::new();
        header.write(&mut bytes).unwrap();
        bytes
    }

    /// Returns the attribute names in the order they were written.
    fn attribute_names(mut bytes: &[u8]) -> Vec<String> {
        let mut names = Vec::new();

        while bytes[0] != 0 {
            let name_end = bytes.iter().position(|&byte| byte == 0).unwrap();
            names.push(String::from_utf8(bytes[..name_end].to_vec()).unwrap());
            bytes = &bytes[name_end + 1 ..];

            let type_end = bytes.iter().position(|&byte| byte == 0).unwrap();
            bytes = &bytes[type_end + 1 ..];

            let size = i32::from_le_bytes([ bytes[0], bytes[1], bytes[2], bytes[3] ]) as usize;
            bytes = &bytes[4 + size ..];
        }

        assert_eq!(bytes, &[0], "header must end with a single zero byte");
        names
    }

    #[test]
    fn attributes_are_written_in_fixed_order(){
        let header = Header::new((4, 4), sorted_channels(SampleType::F16, true), Compression::ZIP1);

        assert_eq!(attribute_names(&header_bytes(&header)), vec![
            "compression", "screenWindowCenter", "screenWindowWidth", "pixelAspectRatio",
            "lineOrder", "dataWindow", "displayWindow", "channels",
        ]);
    }

    #[test]
    fn byte_size_matches_written_header(){
        for &has_alpha in &[ true, false ] {
            for &sample_type in &[ SampleType::F16, SampleType::F32 ] {
                let header = Header::new((640, 17), sorted_channels(sample_type, has_alpha), Compression::ZIP16);
                header.validate().unwrap();
                assert_eq!(header.byte_size(), header_bytes(&header).len());
            }
        }
    }

    #[test]
    fn chunk_count_depends_on_compression(){
        let channels = sorted_channels(SampleType::F32, false);
        assert_eq!(Header::new((5, 33), channels.clone(), Compression::Uncompressed).chunk_count, 33);
        assert_eq!(Header::new((5, 33), channels.clone(), Compression::ZIP1).chunk_count, 33);
        assert_eq!(Header::new((5, 33), channels, Compression::ZIP16).chunk_count, 3);
    }

    #[test]
    fn sorted_channel_names(){
        let names = |list: ChannelList| list.list.iter().map(|channel| channel.name.to_string()).collect::<Vec<_>>();
        assert_eq!(names(sorted_channels(SampleType::F16, true)), vec![ "A", "B", "G", "R" ]);
        assert_eq!(names(sorted_channels(SampleType::F16, false)), vec![ "B", "G", "R" ]);
    }

    #[test]
    fn invalid_headers_are_rejected(){
        let valid = Header::new((2, 2), sorted_channels(SampleType::F16, true), Compression::Uncompressed);
        valid.validate().unwrap();

        let empty = Header::new((0, 2), sorted_channels(SampleType::F16, true), Compression::Uncompressed);
        assert!(empty.validate().is_err());

        let wrong_chunks = Header { chunk_count: 1, .. valid.clone() };
        assert!(wrong_chunks.validate().is_err());

        let shifted = Header { data_window: IntegerBounds { position: Vec2(1, 0), size: Vec2(2, 2) }, .. valid };
        assert!(shifted.validate().is_err());
    }
}
