//! Bounds-checked little-endian cursor over a [`ByteSource`].

use std::io::{self, Read, Seek, SeekFrom};

use binrw::BinRead;
use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{Error, Result};
use crate::source::ByteSource;

/// A typed read cursor over a byte range.
///
/// All reads are little-endian and fail with [`Error::Bounds`] when they
/// would run off the end of the source. The reader also implements
/// [`io::Read`] and [`io::Seek`], so [`binrw`] wire records can be parsed
/// directly from it with [`ByteReader::read_record`].
pub struct ByteReader {
    source: ByteSource,
    pos: u64,
}

macro_rules! read_primitive {
    ($name:ident, $ty:ty, $size:expr) => {
        #[doc = concat!("Read a little-endian `", stringify!($ty), "`.")]
        pub fn $name(&mut self) -> Result<$ty> {
            self.check( $size )?;
            Ok(ReadBytesExt::$name::<LittleEndian>(self)?)
        }
    };
}

impl ByteReader {
    pub fn new(source: ByteSource) -> Self {
        ByteReader { source, pos: 0 }
    }

    /// Total length of the underlying range.
    pub fn len(&self) -> u64 {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Current cursor position.
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Bytes between the cursor and the end of the range.
    pub fn remaining(&self) -> u64 {
        self.source.len() - self.pos
    }

    /// Move the cursor to an absolute offset.
    ///
    /// Seeking to `len` exactly is allowed; past it fails with
    /// [`Error::Bounds`].
    pub fn seek_to(&mut self, abs: u64) -> Result<()> {
        if abs > self.source.len() {
            return Err(Error::bounds(abs, 0, self.source.len()));
        }
        self.pos = abs;
        Ok(())
    }

    fn check(&self, n: u64) -> Result<()> {
        let end = self
            .pos
            .checked_add(n)
            .ok_or_else(|| Error::bounds(self.pos, n, self.source.len()))?;
        if end > self.source.len() {
            return Err(Error::bounds(self.pos, n, self.source.len()));
        }
        Ok(())
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        self.check(1)?;
        Ok(ReadBytesExt::read_u8(self)?)
    }

    /// Read a single signed byte.
    pub fn read_i8(&mut self) -> Result<i8> {
        self.check(1)?;
        Ok(ReadBytesExt::read_i8(self)?)
    }

    read_primitive!(read_u16, u16, 2);
    read_primitive!(read_i16, i16, 2);
    read_primitive!(read_u32, u32, 4);
    read_primitive!(read_i32, i32, 4);
    read_primitive!(read_u64, u64, 8);
    read_primitive!(read_i64, i64, 8);
    read_primitive!(read_f32, f32, 4);
    read_primitive!(read_f64, f64, 8);

    /// Read `n` bytes at the cursor.
    ///
    /// Zero-copy when the source is memory-backed; file-backed sources are
    /// read into a fresh buffer.
    pub fn read_bytes(&mut self, n: usize) -> Result<std::borrow::Cow<'_, [u8]>> {
        self.check(n as u64)?;
        let start = self.pos;
        self.pos += n as u64;
        match self.source.as_memory() {
            Some(slice) => Ok(std::borrow::Cow::Borrowed(
                &slice[start as usize..start as usize + n],
            )),
            None => {
                let mut buf = vec![0u8; n];
                self.source.read_at(start, &mut buf)?;
                Ok(std::borrow::Cow::Owned(buf))
            }
        }
    }

    /// Read a fixed-layout wire record.
    ///
    /// The record decodes its fields one by one in declared order, so the
    /// byte image is defined by the type's `binrw` attributes rather than
    /// by in-memory layout.
    pub fn read_record<T>(&mut self) -> Result<T>
    where
        T: for<'a> BinRead<Args<'a> = ()>,
    {
        Ok(T::read_le(self)?)
    }
}

impl Read for ByteReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.remaining() as usize);
        if n == 0 {
            return Ok(0);
        }
        self.source
            .read_at(self.pos, &mut buf[..n])
            .map_err(|e| io::Error::new(io::ErrorKind::UnexpectedEof, e.to_string()))?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl Seek for ByteReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(abs) => abs as i128,
            SeekFrom::End(rel) => self.source.len() as i128 + rel as i128,
            SeekFrom::Current(rel) => self.pos as i128 + rel as i128,
        };
        if target < 0 || target > self.source.len() as i128 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek outside byte range",
            ));
        }
        self.pos = target as u64;
        Ok(self.pos)
    }
}
