//! Position-tracking little-endian reader over a seekable byte stream.

use std::io::{self, Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{ExtractError, ExtractResult};

/// Reader that always knows its absolute position.
///
/// Every fixed-width read either consumes exactly its width or fails with
/// [`ExtractError::TruncatedRead`] carrying the offset of the field, leaving
/// the position at the start of that field.
#[derive(Debug)]
pub struct StreamCursor<R> {
    inner: R,
    pos: u64,
}

impl<R: Read + Seek> StreamCursor<R> {
    pub fn new(mut inner: R) -> ExtractResult<Self> {
        let pos = inner.stream_position()?;
        Ok(Self { inner, pos })
    }

    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Seek to an absolute offset.
    pub fn seek_to(&mut self, offset: u64) -> ExtractResult<()> {
        self.pos = self.inner.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    /// Move relative to the current position. Negative values rewind.
    ///
    /// Goes through [`Seek::seek_relative`], so a `BufReader` keeps its
    /// buffer when the target is already loaded.
    pub fn skip(&mut self, delta: i64) -> ExtractResult<()> {
        let target = self
            .pos
            .checked_add_signed(delta)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "seek before start"))?;
        self.inner.seek_relative(delta)?;
        self.pos = target;
        Ok(())
    }

    pub fn read_i16(&mut self) -> ExtractResult<i16> {
        self.field(2, |r| r.read_i16::<LittleEndian>())
    }

    pub fn read_u16(&mut self) -> ExtractResult<u16> {
        self.field(2, |r| r.read_u16::<LittleEndian>())
    }

    pub fn read_i32(&mut self) -> ExtractResult<i32> {
        self.field(4, |r| r.read_i32::<LittleEndian>())
    }

    pub fn read_f32(&mut self) -> ExtractResult<f32> {
        self.field(4, |r| r.read_f32::<LittleEndian>())
    }

    pub fn read_array<const N: usize>(&mut self) -> ExtractResult<[u8; N]> {
        self.field(N, |r| {
            let mut buf = [0u8; N];
            r.read_exact(&mut buf)?;
            Ok(buf)
        })
    }

    /// Run `read` and put the position back where it was, whether `read`
    /// succeeded or not.
    pub fn peek<T>(
        &mut self,
        read: impl FnOnce(&mut Self) -> ExtractResult<T>,
    ) -> ExtractResult<T> {
        let start = self.pos;
        let result = read(self);
        let restored = match &result {
            Ok(_) => self.skip(start as i64 - self.pos as i64),
            // A failed read may leave the inner reader anywhere.
            Err(_) => self.seek_to(start),
        };
        let value = result?;
        restored?;
        Ok(value)
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn field<T>(
        &mut self,
        wanted: usize,
        read: impl FnOnce(&mut R) -> io::Result<T>,
    ) -> ExtractResult<T> {
        let offset = self.pos;
        match read(&mut self.inner) {
            Ok(value) => {
                self.pos += wanted as u64;
                Ok(value)
            }
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                // A short read_exact leaves the inner position unspecified.
                self.seek_to(offset)?;
                Err(ExtractError::TruncatedRead { offset, wanted })
            }
            Err(err) => Err(err.into()),
        }
    }
}
