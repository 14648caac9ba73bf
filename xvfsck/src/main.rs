// SPDX-License-Identifier: MIT

mod config;
mod utils;

use anyhow::{Context, anyhow};
use clap::{Parser, error::ErrorKind};
use colored::Colorize;
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

use xvfs::xv6::*;
use xvio::prelude::{IOCounter, StdXvIO};

use crate::config::{FileConfig, Overrides, Settings};
use crate::utils::{LogLevel, log_level, set_log_level};

const USAGE: &str = "Usage: xvfsck <file_system_image>";

#[derive(Parser)]
#[command(name = "xvfsck", version, about = "xv6 file system checker", long_about = None)]
struct Cli {
    /// File system image to check
    image: PathBuf,

    /// Keep going after the first violation and report all of them
    #[arg(short, long)]
    all: bool,

    /// Print every finding, walker statistics and IO counters
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Print nothing, only set the exit code
    #[arg(short, long)]
    quiet: bool,

    /// Comma separated phases to run (geometry, root, inodes, bitmap, refs)
    #[arg(long, value_delimiter = ',')]
    phases: Option<Vec<String>>,

    /// TOML file with default options
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(_) => {
            eprintln!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            log_error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether the image is consistent.
fn run(cli: &Cli) -> anyhow::Result<bool> {
    let file_cfg = match &cli.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    let overrides = Overrides {
        all: cli.all,
        verbose: cli.verbose,
        quiet: cli.quiet,
        phases: cli.phases.as_deref(),
    };
    let settings = Settings::resolve(&file_cfg, &overrides)?;
    set_log_level(settings.level);

    let mut file = File::open(&cli.image).context("image not found.")?;
    let mut backend = StdXvIO::new(&mut file).context("image not found.")?;
    let mut io = IOCounter::with_align(&mut backend, XV6_BLOCK_SIZE as u64);

    let meta = Xv6Meta::from_io(&mut io).map_err(|e| fatal(e.into()))?;
    log_verbose!(
        "{}: {} blocks, {} inodes, data from block {}",
        cli.image.display(),
        meta.size,
        meta.ninodes,
        meta.layout.first_data_block
    );

    let mut checker = Xv6Checker::new(&mut io, &meta);
    let rep = checker
        .check_with(&settings.options)
        .map_err(|e| fatal(e.into()))?;
    let stats = checker.stats();

    for rule in rep.violations() {
        log_error!("{rule}");
    }

    if log_level() == LogLevel::Verbose {
        eprint!(
            "{}",
            rep.display_with(ReportDisplayOpts {
                prefix: "[xvfsck]   ",
                show_summary: true,
                ..Default::default()
            })
        );
        log_verbose!(
            "walked {} inodes: {} dirs, {} files, {} devices, {} entries, {} blocks ({} indirect)",
            stats.inodes_checked,
            stats.dirs_visited,
            stats.files_found,
            stats.devices_found,
            stats.entries_scanned,
            stats.blocks_claimed,
            stats.indirect_blocks
        );
        let io_stats = io.snapshot();
        log_verbose!(
            "io: {} reads, {} bytes, {} unaligned",
            io_stats.reads,
            io_stats.read_bytes,
            io_stats.unaligned_reads
        );
        let verdict = if rep.ok() {
            "consistent".green().bold()
        } else {
            "inconsistent".red().bold()
        };
        log_verbose!("{verdict}");
    }

    Ok(rep.ok())
}

/// Read failures and unusable superblocks, reported like violations.
fn fatal(e: FsError) -> anyhow::Error {
    anyhow!("ERROR: {}.", e.root_cause())
}
