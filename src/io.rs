
//! Specialized binary output.
//! Uses the error handling for this crate.

pub use ::std::io::Write;

use half::slice::{HalfFloatSliceExt};
use lebe::prelude::*;
use ::half::f16;
use crate::error::{Result, UnitResult};
use std::fs::File;
use std::path::Path;


/// Keep track of what byte we are at.
/// Used to compute the absolute file offset of each written chunk.
#[derive(Debug)]
pub struct Tracking<T> {

    /// Do not expose to prevent writing without updating position
    inner: T,

    position: usize,
}

impl<T: Write> Write for Tracking<T> {
    fn write(&mut self, buffer: &[u8]) -> std::io::Result<usize> {
        let count = self.inner.write(buffer)?;
        self.position += count;
        Ok(count)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl<T> Tracking<T> {

    /// Start counting at zero.
    /// If `inner` is a reference, it must never be written directly,
    /// but only through this `Tracking` instance.
    pub fn new(inner: T) -> Self {
        Tracking { inner, position: 0 }
    }

    /// Current number of bytes written.
    pub fn byte_position(&self) -> usize {
        self.position
    }

    /// Stop counting and return the wrapped writer.
    pub fn into_inner(self) -> T {
        self.inner
    }
}


/// Create a file at the specified path and write the contents with the closure.
/// If writing fails, the partially written file is deleted.
#[inline]
pub fn attempt_delete_file_on_write_error<'p>(path: &'p Path, write: impl FnOnce(File) -> UnitResult) -> UnitResult {
    match write(File::create(path)?) {
        Err(error) => {
            // the original error is more interesting than a failing cleanup
            let _deleted = std::fs::remove_file(path);
            Err(error)
        },

        ok => ok,
    }
}


/// Generic trait that defines common binary operations such as writing for this type.
pub trait Data: Sized + Default + Clone {

    /// Number of bytes this would consume in an exr file.
    const BYTE_SIZE: usize = ::std::mem::size_of::<Self>();

    /// Write this value to the writer.
    fn write(self, write: &mut impl Write) -> UnitResult;

    /// Write all values of that slice to the writer.
    fn write_slice(write: &mut impl Write, slice: &[Self]) -> UnitResult;

    /// Write the length of the slice and then its contents.
    #[inline]
    fn write_i32_sized_slice(write: &mut impl Write, slice: &[Self]) -> UnitResult {
        let size = crate::error::usize_to_i32(slice.len(), "slice too large for i32 size")?;
        i32::write(size, write)?;
        Self::write_slice(write, slice)
    }
}


macro_rules! implement_data_for_primitive {
    ($kind: ident) => {
        impl Data for $kind {
            #[inline]
            fn write(self, write: &mut impl Write) -> Result<()> {
                write.write_as_little_endian(&self)?;
                Ok(())
            }

            #[inline]
            fn write_slice(write: &mut impl Write, slice: &[Self]) -> Result<()> {
                write.write_as_little_endian(slice)?;
                Ok(())
            }
        }
    };
}

implement_data_for_primitive!(u8);
implement_data_for_primitive!(u16);
implement_data_for_primitive!(u32);
implement_data_for_primitive!(i32);
implement_data_for_primitive!(u64);
implement_data_for_primitive!(f32);


impl Data for f16 {
    #[inline]
    fn write(self, write: &mut impl Write) -> Result<()> {
        self.to_bits().write(write)
    }

    #[inline]
    fn write_slice(write: &mut impl Write, slice: &[Self]) -> Result<()> {
        let bits = slice.reinterpret_cast();
        u16::write_slice(write, bits)
    }
}
