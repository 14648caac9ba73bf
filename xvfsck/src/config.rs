// SPDX-License-Identifier: MIT

use anyhow::{Context, bail};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use xvfs::xv6::{VerifyPhases, Xv6CheckOptions};

use crate::utils::LogLevel;

/// Optional `xvfsck.toml`:
///
/// ```toml
/// fail_fast = false
/// phases = ["root", "inodes", "bitmap"]
/// verbose = true
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub fail_fast: Option<bool>,
    pub phases: Option<Vec<String>>,
    pub verbose: Option<bool>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Maps phase names (`root`, `inodes`, ...) onto [`VerifyPhases`].
pub fn parse_phases<S: AsRef<str>>(names: &[S]) -> anyhow::Result<VerifyPhases> {
    let mut phases = VerifyPhases::empty();
    for name in names {
        let name = name.as_ref().trim();
        match VerifyPhases::from_name(&name.to_ascii_uppercase()) {
            Some(p) => phases |= p,
            None => bail!("unknown phase `{name}`"),
        }
    }
    Ok(phases)
}

/// Effective settings once the file and the command line are merged.
#[derive(Debug)]
pub struct Settings {
    pub options: Xv6CheckOptions,
    pub level: LogLevel,
}

/// Command-line values. `None`/`false` leaves the file's choice in place.
#[derive(Debug, Default)]
pub struct Overrides<'a> {
    pub all: bool,
    pub verbose: bool,
    pub quiet: bool,
    pub phases: Option<&'a [String]>,
}

impl Settings {
    pub fn resolve(file: &FileConfig, cli: &Overrides<'_>) -> anyhow::Result<Self> {
        let mut options = Xv6CheckOptions::default();

        if let Some(fail_fast) = file.fail_fast {
            options.fail_fast = fail_fast;
        }
        if cli.all {
            options.fail_fast = false;
        }

        let names = cli.phases.or(file.phases.as_deref());
        if let Some(names) = names {
            options.phases = parse_phases(names)?;
        }

        let level = if cli.quiet {
            LogLevel::Quiet
        } else if cli.verbose || file.verbose.unwrap_or(false) {
            LogLevel::Verbose
        } else {
            LogLevel::Normal
        };

        Ok(Self { options, level })
    }
}
