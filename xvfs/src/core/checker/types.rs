// SPDX-License-Identifier: MIT
#[cfg(not(feature = "std"))]
use alloc::{string::String, vec::Vec};

use core::fmt;

use bitflags::bitflags;

use super::violation::Violation;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

#[derive(Clone, Debug)]
pub struct Finding {
    pub sev: Severity,
    pub code: &'static str,
    pub msg: String,
    /// Rule broken, for error findings raised by a consistency rule.
    pub rule: Option<Violation>,
    /// Where the problem was seen (inode, block...).
    pub detail: Option<String>,
}

impl Finding {
    fn new(sev: Severity, code: &'static str, msg: String) -> Self {
        Self {
            sev,
            code,
            msg,
            rule: None,
            detail: None,
        }
    }

    pub fn info(code: &'static str, msg: impl Into<String>) -> Self {
        Self::new(Severity::Info, code, msg.into())
    }
    pub fn warn(code: &'static str, msg: impl Into<String>) -> Self {
        Self::new(Severity::Warn, code, msg.into())
    }
    pub fn err(code: &'static str, msg: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, msg.into())
    }

    pub fn violation(rule: Violation, detail: impl Into<String>) -> Self {
        Self {
            rule: Some(rule),
            detail: Some(detail.into()),
            ..Self::err(rule.code(), rule.msg())
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct VerifyReport {
    pub findings: Vec<Finding>,
}

impl VerifyReport {
    pub fn has_error(&self) -> bool {
        self.findings.iter().any(|f| f.sev == Severity::Error)
    }

    pub fn first_error(&self) -> Option<&str> {
        self.findings
            .iter()
            .find(|f| f.sev == Severity::Error)
            .map(|f| f.msg.as_str())
    }

    /// First rule violation recorded, in detection order.
    pub fn first_violation(&self) -> Option<Violation> {
        self.violations().next()
    }

    pub fn violations(&self) -> impl Iterator<Item = Violation> + '_ {
        self.findings.iter().filter_map(|f| f.rule)
    }

    pub fn ok(&self) -> bool {
        !self.has_error()
    }

    pub fn push(&mut self, f: Finding) {
        self.findings.push(f)
    }

    pub fn count(&self, s: Severity) -> usize {
        self.findings.iter().filter(|f| f.sev == s).count()
    }

    /// Display with options (filtering, prefix, summary...)
    pub fn display_with(&self, opts: ReportDisplayOpts) -> ReportDisplay<'_> {
        ReportDisplay::new(self, opts)
    }

    /// Display "only errors", default prefix, no summary
    pub fn errors_only(&self) -> ReportDisplay<'_> {
        self.display_with(ReportDisplayOpts {
            min_level: Severity::Error,
            ..ReportDisplayOpts::default()
        })
    }
}

#[derive(Copy, Clone, Debug)]
pub struct ReportDisplayOpts {
    pub min_level: Severity,
    pub prefix: &'static str,
    pub show_summary: bool,
    pub pad_code: usize,
}

impl Default for ReportDisplayOpts {
    fn default() -> Self {
        Self {
            min_level: Severity::Info,
            prefix: "",
            show_summary: false,
            pad_code: 10,
        }
    }
}

pub struct ReportDisplay<'a> {
    rep: &'a VerifyReport,
    opts: ReportDisplayOpts,
}

impl<'a> ReportDisplay<'a> {
    pub fn new(rep: &'a VerifyReport, opts: ReportDisplayOpts) -> Self {
        Self { rep, opts }
    }
}

impl fmt::Display for ReportDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut n_info = 0usize;
        let mut n_warn = 0usize;
        let mut n_err = 0usize;

        for it in &self.rep.findings {
            if it.sev < self.opts.min_level {
                continue;
            }
            let tag = match it.sev {
                Severity::Info => "INFO",
                Severity::Warn => "WARN",
                Severity::Error => "ERR ",
            };
            match it.sev {
                Severity::Info => n_info += 1,
                Severity::Warn => n_warn += 1,
                Severity::Error => n_err += 1,
            }

            write!(
                f,
                "{}{tag}: {:<width$} {}",
                self.opts.prefix,
                it.code,
                it.msg,
                width = self.opts.pad_code
            )?;
            match &it.detail {
                Some(detail) => writeln!(f, " ({detail})")?,
                None => writeln!(f)?,
            }
        }

        if self.opts.show_summary {
            writeln!(
                f,
                "{}Summary: errors={}  warns={}  infos={}",
                self.opts.prefix, n_err, n_warn, n_info
            )?;
        }

        Ok(())
    }
}

impl fmt::Display for VerifyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ReportDisplay::new(self, ReportDisplayOpts::default()).fmt(f)
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct VerifyPhases: u32 {
        /// Superblock sanity and image size.
        const GEOMETRY = 1 << 0;
        /// Root directory identity.
        const ROOT     = 1 << 1;
        /// Per-inode scan: types, block addresses, directory format.
        const INODES   = 1 << 2;
        /// Bitmap sweep for unclaimed blocks (needs INODES).
        const BITMAP   = 1 << 3;
        /// Directory reference counts.
        const REFS     = 1 << 4;
        const ALL      = u32::MAX;
    }
}

/// Generic options that the FS can encapsulate/extend.
pub trait VerifierOptionsLike {
    fn phases(&self) -> VerifyPhases {
        VerifyPhases::ALL
    }
    fn fail_fast(&self) -> bool {
        true
    }
}
