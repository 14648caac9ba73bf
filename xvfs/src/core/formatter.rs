// SPDX-License-Identifier: MIT

pub use crate::core::errors::{FsFormatterError, FsFormatterResult};

use crate::core::meta::FsMeta;
use xvio::{XvIO, XvIOExt};

/// A Formatter for a filesystem type.
///
/// Implementations own their I/O backend and metadata and lay down an empty,
/// consistent file system on it.
pub trait FsFormatter {
    /// Format the filesystem.
    ///
    /// - `full_format`: if `true`, zero the data region too
    #[must_use = "format result must be checked for errors"]
    fn format(&mut self, full_format: bool) -> FsFormatterResult;

    /// Flush any buffered writes to disk.
    #[must_use = "flush result must be checked for errors"]
    fn flush(&mut self) -> FsFormatterResult<()> {
        Ok(())
    }
}

/// Zeroes every block of the data region.
pub fn zero_data_region<M: FsMeta<u32>, IO: XvIO + ?Sized>(
    io: &mut IO,
    meta: &M,
) -> FsFormatterResult {
    let first = meta.first_data_unit();
    let last = meta.last_data_unit();
    if first > last {
        return Ok(());
    }

    let start = meta.unit_offset(first);
    let end = meta.unit_offset(last) + meta.unit_size() as u64;
    let len = end.saturating_sub(start) as usize;

    io.zero_fill(start, len)?;
    Ok(())
}
