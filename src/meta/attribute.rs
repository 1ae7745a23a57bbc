//! Contains the meta data attributes that a scan line export writes.
//! Each attribute is written as name, type name, byte size and value.

use smallvec::SmallVec;


/// Contains one of the attribute values that appear in an exported header.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {

    /// Channel meta data.
    ChannelList(ChannelList),

    /// Compression method of this layer.
    Compression(Compression),

    /// Order of the bocks in the file.
    LineOrder(LineOrder),

    /// 32-bit float
    F32(f32),

    /// 2D integer rectangle.
    IntegerBounds(IntegerBounds),

    /// 2D float vector.
    FloatVec2(Vec2<f32>),
}

/// A byte array with each byte being a char.
/// This is not UTF an must be constructed from a standard string.
#[derive(Clone, PartialEq, Eq, Ord, PartialOrd, Default, Hash)]
pub struct Text {
    bytes: TextBytes,
}

pub use crate::compression::Compression;

/// A rectangular section anywhere in 2D integer space.
/// Valid from minimum coordinate (including) `-1,073,741,822`
/// to maximum coordinate (including) `1,073,741,822`, the value of (`i32::MAX/2 -1`).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Default, Hash)]
pub struct IntegerBounds {

    /// The top left corner of this rectangle.
    /// The `Box2I32` includes this pixel if the size is not zero.
    pub position: Vec2<i32>,

    /// How many pixels to include in this `Box2I32`.
    /// Extends to the right and downwards.
    /// Does not include the actual boundary, just like `Vec::len()`.
    pub size: Vec2<usize>,
}

/// A List of channels. Channels are sorted alphabetically by name.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ChannelList {

    /// The channels in this list, sorted by name.
    pub list: SmallVec<[ChannelDescription; 4]>,

    /// The number of bytes that one pixel in this image needs.
    pub bytes_per_pixel: usize,
}

/// A single channel in an layer.
/// Does not contain the actual pixel data,
/// but instead merely describes it.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ChannelDescription {

    /// One of "A", "B", "G", or "R".
    pub name: Text,

    /// F16 or F32.
    pub sample_type: SampleType,

    /// This attribute only tells lossy compression methods
    /// whether this value should be quantized exponentially or linearly.
    /// Exports always write `false`, as their compression is lossless.
    pub quantize_linearly: bool,

    /// How many of the samples are skipped compared to the other channels in this layer.
    /// Always `(1,1)` for exported scan line images.
    pub sampling: Vec2<usize>,
}

/// The type of samples in this channel.
#[derive(Clone, Debug, Eq, PartialEq, Copy, Hash)]
pub enum SampleType {

    /// This channel contains 16-bit float values.
    F16,

    /// This channel contains 32-bit float values.
    F32,
}

impl Default for SampleType {
    fn default() -> Self { SampleType::F16 }
}

/// In what order the `Block`s of pixel data appear in a file.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum LineOrder {

    /// The blocks in the file are ordered by increasing y coordinate,
    /// so the top scan line block comes first.
    /// Exports always use this order, as all blocks are assembled before writing.
    Increasing,
}


/// The raw bytes that make up a string in an exr file.
/// Each `u8` is a single char.
// will mostly be "A", "B", "G", "R" or an attribute name
pub type TextBytes = SmallVec<[u8; 24]>;

/// A byte slice, interpreted as text.
pub type TextSlice = [u8];


use crate::io::*;
use crate::meta::{sequence_end};
use crate::error::*;
use crate::math::Vec2;
use half::f16;
use std::convert::TryFrom;


impl Text {

    /// Create a `Text` from an `str` reference.
    /// Returns `None` if this string contains unsupported chars.
    pub fn new_or_none(string: impl AsRef<str>) -> Option<Self> {
        let vec : Option<TextBytes> = string.as_ref().chars()
            .map(|character| u8::try_from(character as u64).ok())
            .collect();

        vec.map(Self::from_bytes_unchecked)
    }

    /// Create a `Text` from an `str` reference.
    /// Panics if this string contains unsupported chars.
    pub fn new_or_panic(string: impl AsRef<str>) -> Self {
        Self::new_or_none(string).expect("text contains unsupported characters")
    }

    /// Create a `Text` from the specified bytes object,
    /// without checking any of the bytes.
    pub fn from_bytes_unchecked(bytes: TextBytes) -> Self {
        Text { bytes }
    }

    /// The internal ASCII bytes this text is made of.
    pub fn as_slice(&self) -> &TextSlice {
        self.bytes.as_slice()
    }

    /// Check whether this string is valid as a null-terminated name.
    pub fn validate(&self) -> UnitResult {
        let text = self.as_slice();

        if text.is_empty() {
            return Err(Error::invalid("text must not be empty"));
        }

        if text.contains(&0) {
            return Err(Error::invalid("text must not contain null bytes"));
        }

        if text.len() >= 32 {
            return Err(Error::unsupported("long names are not written by exports"));
        }

        Ok(())
    }

    /// The byte count this string would occupy if it were encoded as a null-terminated string.
    pub fn null_terminated_byte_size(&self) -> usize {
        self.bytes.len() + sequence_end::byte_size()
    }

    /// Write the string contents and a null-terminator.
    pub fn write_null_terminated<W: Write>(&self, write: &mut W) -> UnitResult {
        Self::write_null_terminated_bytes(self.as_slice(), write)
    }

    /// Write the string contents and a null-terminator.
    fn write_null_terminated_bytes<W: Write>(bytes: &[u8], write: &mut W) -> UnitResult {
        debug_assert!(!bytes.is_empty(), "text is empty bug"); // required to avoid mixup with "sequence_end"

        u8::write_slice(write, bytes)?;
        sequence_end::write(write)?;
        Ok(())
    }
}

impl<'s> From<&'s str> for Text {

    /// Panics if the string contains an unsupported character
    fn from(str: &'s str) -> Self {
        Self::new_or_panic(str)
    }
}

impl ::std::fmt::Debug for Text {
    fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
        write!(f, "Text(\"{}\")", self)
    }
}

// automatically implements to_string for us
impl ::std::fmt::Display for Text {
    fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
        use std::fmt::Write;

        for &byte in self.bytes.iter() {
            f.write_char(byte as char)?;
        }

        Ok(())
    }
}


impl ChannelList {

    /// Does not validate channel order.
    pub fn new(channels: SmallVec<[ChannelDescription; 4]>) -> Self {
        ChannelList {
            bytes_per_pixel: channels.iter().map(|channel| channel.sample_type.bytes_per_sample()).sum(),
            list: channels,
        }
    }

    /// Number of bytes this would consume in an exr file.
    pub fn byte_size(&self) -> usize {
        self.list.iter().map(ChannelDescription::byte_size).sum::<usize>() + sequence_end::byte_size()
    }

    /// Without validation, write this instance to the byte stream.
    /// Assumes channels are sorted alphabetically and all values are validated.
    pub fn write(&self, write: &mut impl Write) -> UnitResult {
        for channel in &self.list {
            channel.write(write)?;
        }

        sequence_end::write(write)?;
        Ok(())
    }

    /// Check if channels are valid and sorted.
    pub fn validate(&self) -> UnitResult {
        let mut iter = self.list.iter().map(|chan| chan.validate().map(|_| &chan.name));
        let mut previous = iter.next().ok_or(Error::invalid("at least one channel is required"))??;

        for result in iter {
            let value = result?;
            if previous == value { return Err(Error::invalid("channel names are not unique")); }
            else if previous > value { return Err(Error::invalid("channel names are not sorted alphabetically")); }
            else { previous = value; }
        }

        Ok(())
    }
}


impl IntegerBounds {

    /// Create a box with a size starting at zero.
    pub fn from_dimensions(size: impl Into<Vec2<usize>>) -> Self {
        Self { position: Vec2(0, 0), size: size.into() }
    }

    /// Returns the maximum coordinate that a value in this rectangle may have.
    pub fn max(self) -> Result<Vec2<i32>> {
        let size = self.size.to_i32("window size exceeding integer maximum")?;
        Ok(self.position + size - Vec2(1, 1))
    }

    /// Validate this instance.
    pub fn validate(&self) -> UnitResult {
        if self.size.width() == 0 || self.size.height() == 0 {
            return Err(Error::invalid("window must contain at least one pixel"));
        }

        let max_box_size_as_usize = (i32::MAX / 2) as usize;
        if self.size.width() >= max_box_size_as_usize || self.size.height() >= max_box_size_as_usize {
            return Err(Error::invalid("window size exceeding integer maximum"));
        }

        let min_i64 = Vec2(self.position.x() as i64, self.position.y() as i64);

        let max_i64 = Vec2(
            self.position.x() as i64 + self.size.width() as i64,
            self.position.y() as i64 + self.size.height() as i64,
        );

        let max_box_size_as_i64 = (i32::MAX / 2) as i64; // as defined in the original c++ library

        if     max_i64.x() >=  max_box_size_as_i64
            || max_i64.y() >=  max_box_size_as_i64
            || min_i64.x() <= -max_box_size_as_i64
            || min_i64.y() <= -max_box_size_as_i64
        {
            return Err(Error::invalid("window size exceeding integer maximum"));
        }

        Ok(())
    }

    /// Number of bytes this would consume in an exr file.
    pub fn byte_size() -> usize {
        4 * i32::BYTE_SIZE
    }

    /// Without validation, write this instance to the byte stream.
    pub fn write<W: Write>(&self, write: &mut W) -> UnitResult {
        let Vec2(x_min, y_min) = self.position;
        let Vec2(x_max, y_max) = self.max()?;

        x_min.write(write)?;
        y_min.write(write)?;
        x_max.write(write)?;
        y_max.write(write)?;
        Ok(())
    }
}


impl SampleType {

    /// How many bytes a single sample takes up.
    pub fn bytes_per_sample(&self) -> usize {
        match self {
            SampleType::F16 => f16::BYTE_SIZE,
            SampleType::F32 => f32::BYTE_SIZE,
        }
    }

    /// Number of bytes this would consume in an exr file.
    pub fn byte_size() -> usize {
        i32::BYTE_SIZE
    }

    /// Without validation, write this instance to the byte stream.
    pub fn write<W: Write>(&self, write: &mut W) -> UnitResult {
        match *self {
            SampleType::F16 => 1_i32,
            SampleType::F32 => 2_i32,
        }.write(write)?;

        Ok(())
    }
}


impl ChannelDescription {

    /// Create a new channel with the specified sample type, a sampling rate of (1,1),
    /// and exponential quantization.
    pub fn named(name: impl Into<Text>, sample_type: SampleType) -> Self {
        Self { name: name.into(), sample_type, quantize_linearly: false, sampling: Vec2(1, 1) }
    }

    /// Number of bytes this would consume in an exr file.
    pub fn byte_size(&self) -> usize {
        self.name.null_terminated_byte_size()
            + SampleType::byte_size()
            + 1 // is_linear
            + 3 // reserved bytes
            + 2 * i32::BYTE_SIZE // sampling x, y
    }

    /// Without validation, write this instance to the byte stream.
    pub fn write<W: Write>(&self, write: &mut W) -> UnitResult {
        Text::write_null_terminated(&self.name, write)?;
        self.sample_type.write(write)?;

        match self.quantize_linearly {
            false => 0_u8,
            true  => 1_u8,
        }.write(write)?;

        u8::write_slice(write, &[0_u8, 0_u8, 0_u8])?;
        i32::write(usize_to_i32(self.sampling.x(), "x channel sampling")?, write)?;
        i32::write(usize_to_i32(self.sampling.y(), "y channel sampling")?, write)?;
        Ok(())
    }

    /// Validate this instance.
    pub fn validate(&self) -> UnitResult {
        self.name.validate()?;

        if self.sampling != Vec2(1,1) {
            return Err(Error::unsupported("channel subsampling is not written by exports"));
        }

        Ok(())
    }
}


impl Compression {

    /// Number of bytes this would consume in an exr file.
    pub fn byte_size() -> usize { u8::BYTE_SIZE }

    /// Without validation, write this instance to the byte stream.
    pub fn write<W: Write>(self, write: &mut W) -> UnitResult {
        use self::Compression::*;
        match self {
            Uncompressed => 0_u8,
            ZIP1 => 2_u8,
            ZIP16 => 3_u8,
        }.write(write)?;
        Ok(())
    }
}


impl LineOrder {

    /// Number of bytes this would consume in an exr file.
    pub fn byte_size() -> usize {
        u8::BYTE_SIZE
    }

    /// Without validation, write this instance to the byte stream.
    pub fn write<W: Write>(self, write: &mut W) -> UnitResult {
        match self {
            LineOrder::Increasing => 0_u8,
        }.write(write)?;

        Ok(())
    }
}


/// Number of bytes this attribute would consume in an exr file.
pub fn byte_size(name: &[u8], value: &AttributeValue) -> usize {
    name.len() + sequence_end::byte_size()
        + value.kind_name().len() + sequence_end::byte_size()
        + i32::BYTE_SIZE // serialized byte size
        + value.byte_size()
}

/// Without validation, write this attribute to the byte stream.
pub fn write<W: Write>(name: &[u8], value: &AttributeValue, write: &mut W) -> UnitResult {
    Text::write_null_terminated_bytes(name, write)?;
    Text::write_null_terminated_bytes(value.kind_name(), write)?;
    i32::write(usize_to_i32(value.byte_size(), "attribute size")?, write)?;
    value.write(write)
}


impl AttributeValue {

    /// Number of bytes this would consume in an exr file.
    pub fn byte_size(&self) -> usize {
        use self::AttributeValue::*;

        match *self {
            IntegerBounds(_) => self::IntegerBounds::byte_size(),
            F32(_) => f32::BYTE_SIZE,
            FloatVec2(_) => { 2 * f32::BYTE_SIZE },
            ChannelList(ref channels) => channels.byte_size(),
            Compression(_) => self::Compression::byte_size(),
            LineOrder(_) => self::LineOrder::byte_size(),
        }
    }

    /// The exr name string of the type that an attribute can have.
    pub fn kind_name(&self) -> &[u8] {
        use self::AttributeValue::*;
        use self::type_names as ty;

        match *self {
            IntegerBounds(_) =>  ty::I32BOX2,
            F32(_) =>  ty::F32,
            FloatVec2(_) => ty::F32VEC2,
            ChannelList(_) =>  ty::CHANNEL_LIST,
            Compression(_) =>  ty::COMPRESSION,
            LineOrder(_) =>  ty::LINE_ORDER,
        }
    }

    /// Without validation, write this instance to the byte stream.
    pub fn write<W: Write>(&self, write: &mut W) -> UnitResult {
        use self::AttributeValue::*;
        match *self {
            IntegerBounds(value) => value.write(write)?,
            F32(value) => value.write(write)?,
            FloatVec2(Vec2(x, y)) => { x.write(write)?; y.write(write)?; },
            ChannelList(ref channels) => channels.write(write)?,
            Compression(value) => value.write(write)?,
            LineOrder(value) => value.write(write)?,
        };

        Ok(())
    }
}


/// Contains string literals identifying the type of an attribute.
pub mod type_names {
    macro_rules! define_attribute_type_names {
        ( $($name: ident : $value: expr),* ) => {
            $(
                /// The byte-string name of this attribute type as it appears in an exr file.
                pub const $name: &'static [u8] = $value;
            )*
        };
    }

    define_attribute_type_names! {
        I32BOX2:        b"box2i",
        F32:            b"float",
        F32VEC2:        b"v2f",
        CHANNEL_LIST:   b"chlist",
        COMPRESSION:    b"compression",
        LINE_ORDER:     b"lineOrder"
    }
}
