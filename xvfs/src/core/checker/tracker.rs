// SPDX-License-Identifier: MIT

//! Block ownership tracker for a check run.
//!
//! One bit per unit: set once some owner (metadata region or an inode) has
//! claimed the unit. The bit layout matches [`BitmapOps`], so the tracker can
//! be compared byte by byte with an on-disk allocation bitmap.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use crate::core::utils::bitmap::BitmapOps;

#[derive(Debug, Clone)]
pub struct ReachabilityTracker {
    bitmap: Vec<u8>,
    base_unit: u32,
    count: usize,
}

impl ReachabilityTracker {
    /// Creates a tracker for `count` units starting at `base_unit`.
    pub fn new(base_unit: u32, count: usize) -> Self {
        Self {
            bitmap: vec![0u8; count.div_ceil(8)],
            base_unit,
            count,
        }
    }

    #[inline]
    fn index(&self, unit: u32) -> Option<usize> {
        let idx = unit.checked_sub(self.base_unit)? as usize;
        (idx < self.count).then_some(idx)
    }

    /// Marks a unit as claimed. Out of range units are ignored.
    #[inline]
    pub fn mark(&mut self, unit: u32) {
        if let Some(idx) = self.index(unit) {
            self.bitmap.set_bit(idx, true);
        }
    }

    /// Marks `[start, start + len)` as claimed.
    pub fn mark_range(&mut self, start: u32, len: u32) {
        for unit in start..start.saturating_add(len) {
            self.mark(unit);
        }
    }

    /// Claims `unit`, returning `false` if it was already claimed.
    ///
    /// Out of range units are never claimable.
    #[inline]
    pub fn claim(&mut self, unit: u32) -> bool {
        match self.index(unit) {
            Some(idx) if !self.bitmap.get_bit(idx) => {
                self.bitmap.set_bit(idx, true);
                true
            }
            _ => false,
        }
    }

    #[inline]
    pub fn is_marked(&self, unit: u32) -> bool {
        self.index(unit).is_some_and(|idx| self.bitmap.get_bit(idx))
    }

    /// Calls `f` for each unit set in `on_disk` but never claimed, in
    /// ascending order. Stops at the first error returned by `f`.
    pub fn try_for_each_orphan<E, F>(&self, on_disk: &[u8], mut f: F) -> Result<(), E>
    where
        F: FnMut(u32) -> Result<(), E>,
    {
        for (i, (disk_byte, reach_byte)) in on_disk.iter().zip(self.bitmap.iter()).enumerate() {
            let orphan_bits = disk_byte & !reach_byte;
            if orphan_bits == 0 {
                continue;
            }
            for bit in 0..8 {
                let idx = i * 8 + bit;
                if idx >= self.count {
                    return Ok(());
                }
                if orphan_bits & (1 << bit) != 0 {
                    f(self.base_unit + idx as u32)?;
                }
            }
        }
        Ok(())
    }
}
