// SPDX-License-Identifier: MIT
#[cfg(not(feature = "std"))]
use alloc::format;

use xvio::XvIO;

pub use crate::core::checker::*;

mod bitmap;
mod context;
mod dirgraph;
pub mod rules;
mod scan;

use crate::fs::xv6::{constant::*, meta::*};
use context::CheckRun;
use scan::InodeScanner;

const NOT_STARTED: FsCheckerError = FsCheckerError::Invalid("check run not started");

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Xv6CheckOptions {
    pub phases: VerifyPhases,
    /// Stop at the first violation (default). When `false`, every violation
    /// is recorded.
    pub fail_fast: bool,
}

impl Default for Xv6CheckOptions {
    fn default() -> Self {
        Self {
            phases: VerifyPhases::ALL,
            fail_fast: true,
        }
    }
}

impl Xv6CheckOptions {
    /// Runs every phase and records every violation.
    pub fn accumulate() -> Self {
        Self {
            fail_fast: false,
            ..Self::default()
        }
    }
}

impl VerifierOptionsLike for Xv6CheckOptions {
    fn phases(&self) -> VerifyPhases {
        self.phases
    }
    fn fail_fast(&self) -> bool {
        self.fail_fast
    }
}

/// Read-only consistency checker for an xv6 image.
///
/// Phases run in this order: geometry, root identity, inode scan (types,
/// block addresses, directory formatting), bitmap sweep, then reference
/// counts. The image is only read.
pub struct Xv6Checker<'a, IO: XvIO + ?Sized> {
    io: &'a mut IO,
    meta: &'a Xv6Meta,
    run: Option<CheckRun>,
    stats: WalkerStats,
}

impl<'a, IO: XvIO + ?Sized> Xv6Checker<'a, IO> {
    pub fn new(io: &'a mut IO, meta: &'a Xv6Meta) -> Self {
        Self {
            io,
            meta,
            run: None,
            stats: WalkerStats::default(),
        }
    }

    /// Counters of the last run.
    pub fn stats(&self) -> WalkerStats {
        self.stats
    }
}

impl<'a, IO: XvIO + ?Sized> FsChecker for Xv6Checker<'a, IO> {
    type Options = Xv6CheckOptions;

    fn begin_run(&mut self, opt: &Self::Options) {
        self.stats = WalkerStats::default();
        self.run = Some(CheckRun::new(self.meta, opt.fail_fast));
    }

    fn end_run(&mut self) {
        self.run = None;
    }

    fn check_geometry(&mut self, _opt: &Self::Options, rep: &mut VerifyReport) -> FsCheckerResult<()> {
        let meta = self.meta;
        let layout = &meta.layout;

        rep.push(Finding::info(
            "GEO.OK",
            format!(
                "size={} nblocks={} ninodes={} inodes@{} bitmap@{} data@{}",
                meta.size,
                meta.nblocks,
                meta.ninodes,
                layout.inode_start,
                layout.bitmap_start,
                layout.first_data_block
            ),
        ));

        let image_len = self.io.len();
        if image_len < meta.size_bytes() {
            rep.push(Finding::warn(
                "GEO.LEN",
                format!(
                    "image holds {image_len} bytes, superblock describes {}",
                    meta.size_bytes()
                ),
            ));
        }
        let expected = meta.size.saturating_sub(layout.first_data_block);
        if meta.nblocks != expected {
            rep.push(Finding::warn(
                "GEO.NBLK",
                format!("nblocks is {}, layout leaves {expected}", meta.nblocks),
            ));
        }
        Ok(())
    }

    fn check_root(&mut self, _opt: &Self::Options, rep: &mut VerifyReport) -> FsCheckerResult<()> {
        let layout = self.meta.layout;
        let run = self.run.as_ref().ok_or(NOT_STARTED)?;
        dirgraph::check_root_identity(self.io, &layout, run, rep)?;
        if rep.ok() {
            rep.push(Finding::info("ROOT.OK", format!("root inode {XV6_ROOT_INODE} OK")));
        }
        Ok(())
    }

    fn check_inodes(&mut self, _opt: &Self::Options, rep: &mut VerifyReport) -> FsCheckerResult<()> {
        let layout = self.meta.layout;
        let run = self.run.as_mut().ok_or(NOT_STARTED)?;
        InodeScanner::new(self.io, &layout, run, &mut self.stats).scan(rep)?;
        rep.push(Finding::info(
            "INO.SCAN",
            format!(
                "{} inodes, {} dirs, {} files, {} devices, {} blocks claimed",
                self.stats.inodes_checked,
                self.stats.dirs_visited,
                self.stats.files_found,
                self.stats.devices_found,
                self.stats.blocks_claimed
            ),
        ));
        Ok(())
    }

    fn check_bitmap(&mut self, _opt: &Self::Options, rep: &mut VerifyReport) -> FsCheckerResult<()> {
        let layout = self.meta.layout;
        let run = self.run.as_ref().ok_or(NOT_STARTED)?;
        bitmap::sweep_unclaimed(self.io, &layout, run, rep)
    }

    fn check_refs(&mut self, _opt: &Self::Options, rep: &mut VerifyReport) -> FsCheckerResult<()> {
        let layout = self.meta.layout;
        let run = self.run.as_mut().ok_or(NOT_STARTED)?;
        dirgraph::count_references(self.io, &layout, run, &mut self.stats)?;
        dirgraph::check_reference_counts(self.io, &layout, run, rep)
    }
}
