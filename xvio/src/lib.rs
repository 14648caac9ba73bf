// SPDX-License-Identifier: MIT
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

// Core modules
pub mod errors;
#[macro_use]
mod macros;
pub mod stats;

// Backend modules
#[cfg(feature = "mem")]
mod mem;

#[cfg(feature = "std")]
mod std;

// Prelude re-exports (central entrypoint)
pub mod prelude {
    pub use super::XvIO;
    pub use super::XvIOExt;
    pub use super::XvIOStructExt;
    pub use super::errors::*;
    pub use super::stats::*;

    #[cfg(feature = "mem")]
    pub use super::mem::{MemXvIO, SliceXvIO};

    #[cfg(feature = "std")]
    pub use super::std::StdXvIO;
}

// Internal use
use errors::*;

// Constants

/// Size of the internal scratch buffer used by chunked and struct operations.
/// Large enough for any xv6 block (512 bytes) and the common 4 KiB page.
pub const BLOCK_BUF_SIZE: usize = 4096;

// Traits

/// Image IO abstraction trait.
///
/// Offsets are absolute byte positions inside the image. Implementations may
/// target RAM, borrowed slices or files. Read-only backends reject writes with
/// [`XvIOError::Unsupported`].
pub trait XvIO {
    /// Reads `buf.len()` bytes into `buf` from `offset`.
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> XvIOResult;

    /// Writes `data` at `offset`.
    fn write_at(&mut self, offset: u64, data: &[u8]) -> XvIOResult;

    /// Flushes any buffered data (may be a no-op).
    fn flush(&mut self) -> XvIOResult;

    /// Total length of the image in bytes.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `Ok(())` when `[offset, offset + len)` lies inside the image.
    #[inline]
    fn check_range(&self, offset: u64, len: usize) -> XvIOResult {
        let end = offset
            .checked_add(len as u64)
            .ok_or(XvIOError::OutOfBounds)?;
        if end > self.len() {
            return Err(XvIOError::OutOfBounds);
        }
        Ok(())
    }
}

/// Extension helpers for XvIO.
///
/// - chunked reads/writes
/// - zero fill
/// - little-endian primitive reads/writes (`read_u32_at`, `write_u16_at`, ...)
pub trait XvIOExt: XvIO {
    /// Reads `buf.len()` bytes from `offset` in chunks of `chunk_size` or less.
    #[inline(always)]
    fn read_in_chunks(&mut self, offset: u64, buf: &mut [u8], chunk_size: usize) -> XvIOResult {
        let mut remaining = buf.len();
        let mut off = offset;
        let mut pos = 0;

        while remaining > 0 {
            let to_read = remaining.min(chunk_size);
            self.read_at(off, &mut buf[pos..pos + to_read])?;
            off += to_read as u64;
            pos += to_read;
            remaining -= to_read;
        }

        Ok(())
    }

    /// Writes `buf.len()` bytes at `offset` in chunks of `chunk_size` or less.
    #[inline(always)]
    fn write_in_chunks(&mut self, offset: u64, buf: &[u8], chunk_size: usize) -> XvIOResult {
        let mut remaining = buf.len();
        let mut off = offset;
        let mut pos = 0;

        while remaining > 0 {
            let to_write = remaining.min(chunk_size);
            self.write_at(off, &buf[pos..pos + to_write])?;
            off += to_write as u64;
            pos += to_write;
            remaining -= to_write;
        }

        Ok(())
    }

    /// Fills a region with zeroes.
    #[inline(always)]
    fn zero_fill(&mut self, offset: u64, len: usize) -> XvIOResult {
        const ZERO_BUF: [u8; BLOCK_BUF_SIZE] = [0u8; BLOCK_BUF_SIZE];
        let mut remaining = len;
        let mut off = offset;
        while remaining > 0 {
            let chunk = remaining.min(ZERO_BUF.len());
            self.write_at(off, &ZERO_BUF[..chunk])?;
            off += chunk as u64;
            remaining -= chunk;
        }
        Ok(())
    }

    // Implements read/write helpers for primitive types
    xvio_impl_primitive_rw!(u8, u16, u32, u64, i16, i32);
}

impl<T: XvIO + ?Sized> XvIOExt for T {}

/// Extension trait for reading and writing structs using zerocopy.
///
/// The struct must implement the zerocopy traits, which guarantees every byte
/// pattern read from the image is a valid value.
pub trait XvIOStructExt: XvIO {
    /// Reads a struct of type `T` from the given offset.
    fn read_struct<T: zerocopy::FromBytes + zerocopy::KnownLayout + zerocopy::Immutable>(
        &mut self,
        offset: u64,
    ) -> XvIOResult<T> {
        let size = core::mem::size_of::<T>();
        if size > BLOCK_BUF_SIZE {
            return Err(XvIOError::Invalid("read_struct: type too large"));
        }
        let mut buf = [0u8; BLOCK_BUF_SIZE];
        self.read_at(offset, &mut buf[..size])?;
        T::read_from_bytes(&buf[..size]).map_err(|_| XvIOError::Other("read_struct failed"))
    }

    /// Writes a struct of type `T` at the given offset.
    fn write_struct<T: zerocopy::IntoBytes + zerocopy::KnownLayout + zerocopy::Immutable>(
        &mut self,
        offset: u64,
        val: &T,
    ) -> XvIOResult {
        self.write_at(offset, val.as_bytes())
    }
}

impl<T: XvIO + ?Sized> XvIOStructExt for T {}
