// SPDX-License-Identifier: MIT

use crate::{XvIO, XvIOError, XvIOResult};

/// In-memory, writable implementation of `XvIO`.
///
/// Used to build images in RAM (tests, benches, formatter output).
#[derive(Debug)]
pub struct MemXvIO<'a> {
    buffer: &'a mut [u8],
}

impl<'a> MemXvIO<'a> {
    #[inline]
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self { buffer }
    }

    /// Read-only view over the same bytes.
    #[inline]
    pub fn as_slice_io(&self) -> SliceXvIO<'_> {
        SliceXvIO::new(&*self.buffer)
    }
}

impl<'a> XvIO for MemXvIO<'a> {
    #[inline(always)]
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> XvIOResult {
        self.check_range(offset, buf.len())?;
        let start = offset as usize;
        buf.copy_from_slice(&self.buffer[start..start + buf.len()]);
        Ok(())
    }

    #[inline(always)]
    fn write_at(&mut self, offset: u64, data: &[u8]) -> XvIOResult {
        self.check_range(offset, data.len())?;
        let start = offset as usize;
        self.buffer[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }

    #[inline]
    fn flush(&mut self) -> XvIOResult {
        Ok(())
    }

    #[inline]
    fn len(&self) -> u64 {
        self.buffer.len() as u64
    }
}

/// Read-only view over a borrowed byte slice.
///
/// This is the image view handed to the checker: every access is bounds
/// checked and writes are rejected.
#[derive(Debug, Clone, Copy)]
pub struct SliceXvIO<'a> {
    bytes: &'a [u8],
}

impl<'a> SliceXvIO<'a> {
    #[inline]
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

impl<'a> XvIO for SliceXvIO<'a> {
    #[inline(always)]
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> XvIOResult {
        self.check_range(offset, buf.len())?;
        let start = offset as usize;
        buf.copy_from_slice(&self.bytes[start..start + buf.len()]);
        Ok(())
    }

    #[inline]
    fn write_at(&mut self, _offset: u64, _data: &[u8]) -> XvIOResult {
        Err(XvIOError::Unsupported)
    }

    #[inline]
    fn flush(&mut self) -> XvIOResult {
        Ok(())
    }

    #[inline]
    fn len(&self) -> u64 {
        self.bytes.len() as u64
    }
}
