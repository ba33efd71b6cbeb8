//! CLI parse: clap types for build-manifest. No behavior; definitions only.

use clap::Parser;
use std::path::PathBuf;

/// build-manifest - patch manifest and archive builder
#[derive(Parser, Debug)]
#[command(name = "build-manifest")]
#[command(about = "Scan an asset directory and write its patch manifest and tar archive")]
pub struct Cli {
    /// Directory to scan
    pub source_dir: PathBuf,

    /// Base URL clients fetch updates from
    pub update_url: Option<String>,

    /// Revision string; asked from the version oracle or derived from the clock when omitted
    pub version: Option<String>,

    /// Write only the manifest, no archive
    #[arg(long)]
    pub notar: bool,

    /// Gzip the archive
    #[arg(long)]
    pub gzip: bool,

    /// Directory receiving the manifest and archive
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Manifest file name
    #[arg(long, value_name = "NAME")]
    pub manifest_name: Option<String>,

    /// Archive file name
    #[arg(long, value_name = "NAME")]
    pub archive_name: Option<String>,

    /// Exclude rule (regex, anchored); repeatable
    #[arg(long = "exclude", value_name = "RE")]
    pub exclude: Vec<String>,

    /// Ignore rule (regex, anchored); repeatable
    #[arg(long = "ignore", value_name = "RE")]
    pub ignore: Vec<String>,

    /// File of `exclude <re>` / `ignore <re>` lines
    #[arg(long, value_name = "FILE")]
    pub pattern_file: Option<PathBuf>,

    /// Digest workers (0 = one per CPU, 1 = sequential)
    #[arg(long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Program printing the revision when no version is given
    #[arg(long, value_name = "PROGRAM")]
    pub oracle: Option<String>,

    /// Previous manifest to compare the new one against
    #[arg(long, value_name = "OLD")]
    pub compare: Option<PathBuf>,

    /// Configuration file path (replaces the global config file)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Debug-level logging
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, short = 'q', conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}
