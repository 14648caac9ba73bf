// SPDX-License-Identifier: MIT

use crate::{XvIO, XvIOResult};

/// Simple counters, no_std friendly.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct IoStats {
    pub reads: u64,
    pub read_bytes: u64,
    pub writes: u64,
    pub write_bytes: u64,
    pub flushes: u64,

    /// Reads starting and ending on `align` boundaries
    pub aligned_reads: u64,
    pub unaligned_reads: u64,

    pub max_read: u64,
}

impl IoStats {
    #[inline]
    pub fn reset(&mut self) {
        *self = IoStats::default();
    }
}

/// Transparent instrumentation wrapper.
pub struct IOCounter<'a, IO: XvIO + ?Sized> {
    inner: &'a mut IO,
    pub stats: IoStats,
    /// Alignment used to classify reads (block size, usually 512)
    pub align: u64,
}

impl<'a, IO: XvIO + ?Sized> IOCounter<'a, IO> {
    #[inline]
    pub fn new(inner: &'a mut IO) -> Self {
        Self {
            inner,
            stats: IoStats::default(),
            align: 1,
        }
    }

    #[inline]
    pub fn with_align(inner: &'a mut IO, align: u64) -> Self {
        let align = if align == 0 { 1 } else { align };
        Self {
            inner,
            stats: IoStats::default(),
            align,
        }
    }

    #[inline]
    pub fn snapshot(&self) -> IoStats {
        self.stats
    }

    #[inline]
    pub fn into_inner(self) -> &'a mut IO {
        self.inner
    }
}

impl<'a, IO: XvIO + ?Sized> XvIO for IOCounter<'a, IO> {
    #[inline]
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> XvIOResult {
        let aligned = offset % self.align == 0 && buf.len() as u64 % self.align == 0;
        if aligned {
            self.stats.aligned_reads += 1;
        } else {
            self.stats.unaligned_reads += 1;
        }

        self.stats.reads += 1;
        self.stats.read_bytes += buf.len() as u64;
        self.stats.max_read = self.stats.max_read.max(buf.len() as u64);

        self.inner.read_at(offset, buf)
    }

    #[inline]
    fn write_at(&mut self, offset: u64, data: &[u8]) -> XvIOResult {
        self.stats.writes += 1;
        self.stats.write_bytes += data.len() as u64;
        self.inner.write_at(offset, data)
    }

    #[inline]
    fn flush(&mut self) -> XvIOResult {
        self.stats.flushes += 1;
        self.inner.flush()
    }

    #[inline]
    fn len(&self) -> u64 {
        self.inner.len()
    }
}
