// SPDX-License-Identifier: MIT

use std::io::{Error, ErrorKind, Read, Seek, SeekFrom, Write};

use crate::{XvIO, XvIOError, XvIOResult};

/// `XvIO` backend over any seekable stream (typically a `File`).
///
/// The stream length is captured once at construction; the image is assumed
/// not to change size while it is being read.
#[derive(Debug)]
pub struct StdXvIO<'a, T: Read + Write + Seek> {
    io: &'a mut T,
    len: u64,
}

impl<'a, T: Read + Write + Seek> StdXvIO<'a, T> {
    pub fn new(io: &'a mut T) -> XvIOResult<Self> {
        let len = io.seek(SeekFrom::End(0))?;
        io.seek(SeekFrom::Start(0))?;
        Ok(Self { io, len })
    }
}

impl<'a, T: Read + Write + Seek> XvIO for StdXvIO<'a, T> {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> XvIOResult {
        self.check_range(offset, buf.len())?;
        self.io.seek(SeekFrom::Start(offset))?;
        self.io.read_exact(buf)?;
        Ok(())
    }

    fn write_at(&mut self, offset: u64, data: &[u8]) -> XvIOResult {
        self.io.seek(SeekFrom::Start(offset))?;
        self.io.write_all(data)?;
        let end = offset + data.len() as u64;
        if end > self.len {
            self.len = end;
        }
        Ok(())
    }

    fn flush(&mut self) -> XvIOResult {
        self.io.flush()?;
        Ok(())
    }

    #[inline]
    fn len(&self) -> u64 {
        self.len
    }
}

impl From<Error> for XvIOError {
    #[cold]
    #[inline(never)]
    fn from(e: Error) -> Self {
        match e.kind() {
            ErrorKind::UnexpectedEof => XvIOError::OutOfBounds,
            ErrorKind::NotFound => XvIOError::Other("file not found"),
            ErrorKind::PermissionDenied => XvIOError::Other("permission denied"),
            ErrorKind::InvalidInput => XvIOError::Invalid("invalid seek or read"),
            ErrorKind::Unsupported => XvIOError::Unsupported,
            _ => XvIOError::Other("read/seek failed"),
        }
    }
}
