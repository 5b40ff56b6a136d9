// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use stalecheck::{
    config::Specification,
    evaluate::{check, list_files, Freshness},
    path::normalize,
    resolve::TracingDiagnostics,
};

use anyhow::{Context, Result};
use clap::Parser;
use std::{
    io::{stderr, stdout, IsTerminal, Write},
    path::PathBuf,
    process::exit,
};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Check if the oldest target is at least as new as the newest dependency.
///
/// There should be one or more targets, and zero or more dependencies. Without
/// any dependency the targets are always considered fresh.
#[derive(Debug, Clone, Parser)]
#[command(
    about,
    long_about,
    after_help = "Exit status: 0 if targets are fresh, 1 if some dependency is newer \
                  than the oldest target, 2 if an error occurs (e.g., file not found).",
    version
)]
struct Cli {
    /// Path to specification file.
    #[arg(value_name = "spec")]
    pub spec: PathBuf,

    /// List resolved files instead of comparing modification times.
    #[arg(long)]
    pub files: bool,

    /// Show resolution details.
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only show errors.
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    fn run(self) -> Result<Freshness> {
        let path = normalize(&self.spec);
        let spec = Specification::load(&path)
            .with_context(|| format!("cannot use specification {:?}", path.display()))?;
        let mut diagnostics = TracingDiagnostics;

        if self.files {
            let mut out = stdout().lock();
            list_files(&spec, &mut diagnostics, &mut out)?;
            out.flush()?;
            return Ok(Freshness::Fresh);
        }

        check(&spec, &mut diagnostics).context("cannot resolve modification times")
    }

    fn default_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let layer = fmt::layer()
        .compact()
        .with_writer(stderr)
        .with_ansi(stderr().is_terminal())
        .with_target(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(cli.default_filter()))
        .unwrap();
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    match cli.run() {
        Ok(Freshness::Fresh) => exit(0),
        Ok(Freshness::Stale) => exit(1),
        Err(error) => {
            error!("{error:#}");
            exit(2);
        }
    }
}
