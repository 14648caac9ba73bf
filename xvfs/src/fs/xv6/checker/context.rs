// SPDX-License-Identifier: MIT
#[cfg(not(feature = "std"))]
use alloc::{string::String, vec, vec::Vec};

use crate::{
    core::checker::{Finding, FsCheckerError, FsCheckerResult, ReachabilityTracker, Violation, VerifyReport},
    fs::xv6::meta::Xv6Meta,
};

/// Scratch state of one check run.
///
/// Created when a run starts and dropped when it ends, whatever the outcome.
#[derive(Debug)]
pub(crate) struct CheckRun {
    fail_fast: bool,
    /// Blocks claimed by the metadata region or some inode.
    pub used: ReachabilityTracker,
    /// Directory references per inode number, filled by the reference pass.
    pub refs: Vec<u32>,
    /// Set once the inode scan has covered the whole table.
    pub inodes_scanned: bool,
}

impl CheckRun {
    /// Boot block, superblock, inode table and bitmap start out claimed.
    pub fn new(meta: &Xv6Meta, fail_fast: bool) -> Self {
        let mut used = ReachabilityTracker::new(0, meta.size as usize);
        used.mark_range(0, meta.layout.metadata_blocks());
        Self {
            fail_fast,
            used,
            refs: vec![0; meta.ninodes as usize],
            inodes_scanned: false,
        }
    }

    /// Records `outcome` in the report.
    ///
    /// Returns `Ok(true)` when the rule held, `Ok(false)` when it was broken
    /// and the run keeps going, and `Err(Halted)` when it was broken in
    /// fail-fast mode.
    pub fn enforce<D>(
        &self,
        rep: &mut VerifyReport,
        outcome: Result<(), Violation>,
        detail: D,
    ) -> FsCheckerResult<bool>
    where
        D: FnOnce() -> String,
    {
        match outcome {
            Ok(()) => Ok(true),
            Err(rule) => {
                rep.push(Finding::violation(rule, detail()));
                if self.fail_fast {
                    Err(FsCheckerError::Halted)
                } else {
                    Ok(false)
                }
            }
        }
    }

    /// References counted for `inum`, zero for numbers outside the table.
    #[inline]
    pub fn refs_of(&self, inum: u32) -> u32 {
        self.refs.get(inum as usize).copied().unwrap_or(0)
    }

    #[inline]
    pub fn add_ref(&mut self, inum: u32) {
        if let Some(count) = self.refs.get_mut(inum as usize) {
            *count += 1;
        }
    }
}
