// SPDX-License-Identifier: MIT

mod stats;
mod tracker;
mod types;
mod violation;

pub use stats::WalkerStats;
pub use tracker::ReachabilityTracker;
pub use types::{
    Finding, ReportDisplay, ReportDisplayOpts, Severity, VerifierOptionsLike, VerifyPhases,
    VerifyReport,
};
pub use violation::Violation;

pub use crate::core::errors::{FsCheckerError, FsCheckerResult};

/// Trait for verifying the integrity of a filesystem image.
///
/// Phases run in a fixed order. Rule violations are pushed to the report;
/// when the options ask for fail-fast, the phase that records the first
/// violation returns [`FsCheckerError::Halted`] and the remaining phases are
/// skipped. Any other error aborts the run.
pub trait FsChecker {
    type Options: VerifierOptionsLike + Default;

    fn check_with(&mut self, opt: &Self::Options) -> FsCheckerResult<VerifyReport> {
        let mut rep = VerifyReport::default();
        self.begin_run(opt);
        let outcome = self.run_phases(opt, &mut rep);
        self.end_run();

        match outcome {
            Ok(()) | Err(FsCheckerError::Halted) => Ok(rep),
            Err(e) => Err(e),
        }
    }

    fn check_all(&mut self) -> FsCheckerResult<VerifyReport> {
        self.check_with(&Self::Options::default())
    }

    /// Allocates per-run state. Called before the first phase.
    fn begin_run(&mut self, _opt: &Self::Options) {}

    /// Releases per-run state. Called after the last phase, even on error.
    fn end_run(&mut self) {}

    fn run_phases(&mut self, opt: &Self::Options, rep: &mut VerifyReport) -> FsCheckerResult<()> {
        self.run_phase(opt, rep, VerifyPhases::GEOMETRY, Self::check_geometry)?;
        self.run_phase(opt, rep, VerifyPhases::ROOT, Self::check_root)?;
        self.run_phase(opt, rep, VerifyPhases::INODES, Self::check_inodes)?;
        self.run_phase(opt, rep, VerifyPhases::BITMAP, Self::check_bitmap)?;
        self.run_phase(opt, rep, VerifyPhases::REFS, Self::check_refs)?;
        Ok(())
    }

    fn check_geometry(
        &mut self,
        _opt: &Self::Options,
        _rep: &mut VerifyReport,
    ) -> FsCheckerResult<()> {
        Ok(())
    }
    fn check_root(&mut self, _opt: &Self::Options, _rep: &mut VerifyReport) -> FsCheckerResult<()> {
        Ok(())
    }
    fn check_inodes(
        &mut self,
        _opt: &Self::Options,
        _rep: &mut VerifyReport,
    ) -> FsCheckerResult<()> {
        Ok(())
    }
    fn check_bitmap(
        &mut self,
        _opt: &Self::Options,
        _rep: &mut VerifyReport,
    ) -> FsCheckerResult<()> {
        Ok(())
    }
    fn check_refs(&mut self, _opt: &Self::Options, _rep: &mut VerifyReport) -> FsCheckerResult<()> {
        Ok(())
    }

    fn run_phase<F>(
        &mut self,
        opt: &Self::Options,
        rep: &mut VerifyReport,
        phase: VerifyPhases,
        f: F,
    ) -> FsCheckerResult<()>
    where
        F: Fn(&mut Self, &Self::Options, &mut VerifyReport) -> FsCheckerResult<()>,
    {
        if opt.phases().contains(phase) {
            f(self, opt, rep)?;
            if opt.fail_fast() && rep.has_error() {
                return Err(FsCheckerError::Halted);
            }
        }
        Ok(())
    }
}
