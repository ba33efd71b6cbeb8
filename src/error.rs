//! Error types for the asset manifest builder.

use std::path::PathBuf;
use thiserror::Error;

use crate::patterns::RuleKind;

/// A malformed ignore/exclude rule. Raised while compiling the pattern set,
/// before any scanning starts.
#[derive(Debug, Error)]
#[error("Invalid {kind} pattern '{pattern}': {source}")]
pub struct PatternError {
    pub kind: RuleKind,
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

/// Scan-time errors that abort the build
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Source directory does not exist: {0}")]
    SourceRootMissing(PathBuf),

    #[error("Source path is not a directory: {0}")]
    SourceRootNotDirectory(PathBuf),

    #[error("Source directory is not readable: {path}: {source}")]
    SourceRootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to digest {path}: {source}")]
    Digest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Scan I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Archive-time errors. Every one of these is fatal: the manifest already
/// promises the file.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Failed to read manifested file {path}: {source}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Manifested file {path} changed since scan: expected {expected} bytes, found {actual}")]
    SourceChanged {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    #[error("Manifested file {path} changed since scan: expected sha1 {expected}, archived {actual}")]
    DigestMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("Archive I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors reading a manifest back from its XML form
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Malformed manifest at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("Manifest grammar failed to compile: {0}")]
    Grammar(#[source] regex::Error),

    #[error("Manifest I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level build errors
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Output error for {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<config::ConfigError> for BuildError {
    fn from(err: config::ConfigError) -> Self {
        BuildError::ConfigError(err.to_string())
    }
}
