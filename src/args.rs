//! These structs provide the CLI interface for the bankstmt CLI.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::LevelFilter;

/// bankstmt: Bank statement tooling for testing statement parsers.
///
/// The `generate` command writes synthetic statements in the Inecobank XML, Inecobank Excel, Ameria
/// CSV and generic CSV layouts, with file names taken from the globs in the config file. The
/// `download` command fetches your MyAmeria transaction history into the generic CSV layout and
/// downloads the statements of the configured accounts.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Generate demo bank statements.
    ///
    /// Files are written next to the config file, named after the globs it configures. Old files
    /// matching a glob are removed before the first file of that format is written.
    Generate(GenerateArgs),
    /// Download the MyAmeria history and account statements.
    Download(DownloadArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,
}

impl Common {
    pub fn new(log_level: LevelFilter) -> Self {
        Self { log_level }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }
}

/// (Not shown): Args for the `bankstmt generate` command.
#[derive(Debug, Parser, Clone)]
pub struct GenerateArgs {
    /// Path to the config file with the file name globs and category groups.
    #[arg(long, default_value = "config-demo.yaml")]
    config: PathBuf,

    /// Also write the amounts, account pool sizes and category usage of every task as CSV series
    /// under tmp/demo_plots.
    #[arg(long)]
    plots: bool,

    /// Seed the random generator to get the same statements on every run.
    #[arg(long)]
    seed: Option<u64>,

    /// Do not remove previously generated files.
    #[arg(long)]
    keep_old: bool,
}

impl GenerateArgs {
    pub fn new(config: impl Into<PathBuf>, plots: bool, seed: Option<u64>, keep_old: bool) -> Self {
        Self {
            config: config.into(),
            plots,
            seed,
            keep_old,
        }
    }

    pub fn config(&self) -> &Path {
        &self.config
    }

    pub fn plots(&self) -> bool {
        self.plots
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn keep_old(&self) -> bool {
        self.keep_old
    }
}

/// (Not shown): Args for the `bankstmt download` command.
#[derive(Debug, Parser, Clone)]
pub struct DownloadArgs {
    /// Path to the downloader config file.
    #[arg(long, default_value = "bank_downloader_config.yaml")]
    config: PathBuf,
}

impl DownloadArgs {
    pub fn new(config: impl Into<PathBuf>) -> Self {
        Self {
            config: config.into(),
        }
    }

    pub fn config(&self) -> &Path {
        &self.config
    }
}
