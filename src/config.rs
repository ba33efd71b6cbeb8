//! Configuration System
//!
//! Layered build configuration: merge-policy defaults, then the user's global
//! config file (or an explicit `--config` file in its place), then
//! `BUILD_MANIFEST__SECTION__KEY` environment overrides. CLI flags are applied
//! on top by the caller.

use crate::error::BuildError;
use crate::logging::LoggingConfig;
use crate::patterns::{load_pattern_file, PatternSet, RuleKind};
use crate::tree::hasher::DEFAULT_CHUNK_SIZE;
use crate::version::VersionOracle;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Exclude rules applied when no configuration overrides them
pub const DEFAULT_EXCLUDES: &[&str] = &[r"(.*/)?\.svn", r"(.*/)?\.git"];

/// Ignore rules applied when no configuration overrides them
pub const DEFAULT_IGNORES: &[&str] = &[r"(.*/)?.*~", r"(.*/)?Thumbs\.db", r"(.*/)?\.DS_Store"];

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(default)]
    pub patterns: PatternConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub digest: DigestConfig,

    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub version: VersionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Ignore/exclude rule sources
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternConfig {
    #[serde(default = "default_excludes")]
    pub exclude: Vec<String>,

    #[serde(default = "default_ignores")]
    pub ignore: Vec<String>,

    /// Extra rules, one `exclude <re>` / `ignore <re>` per line
    #[serde(default)]
    pub pattern_file: Option<PathBuf>,
}

fn default_excludes() -> Vec<String> {
    DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect()
}

fn default_ignores() -> Vec<String> {
    DEFAULT_IGNORES.iter().map(|s| s.to_string()).collect()
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            exclude: default_excludes(),
            ignore: default_ignores(),
            pattern_file: None,
        }
    }
}

impl PatternConfig {
    /// Compile the configured rules: inline lists first, then the pattern file
    pub fn compile(&self) -> Result<PatternSet, BuildError> {
        let mut set = PatternSet::new(&self.exclude, &self.ignore)?;
        if let Some(ref path) = self.pattern_file {
            for (kind, pattern) in load_pattern_file(path)? {
                set.add(kind, &pattern)?;
            }
        }
        Ok(set)
    }

    /// Append rules given on the command line
    pub fn extend(&mut self, kind: RuleKind, patterns: &[String]) {
        match kind {
            RuleKind::Exclude => self.exclude.extend_from_slice(patterns),
            RuleKind::Ignore => self.ignore.extend_from_slice(patterns),
        }
    }
}

/// Where build artifacts land
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_manifest_name")]
    pub manifest_name: String,

    #[serde(default = "default_archive_name")]
    pub archive_name: String,

    /// Gzip the archive
    #[serde(default)]
    pub compress: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_manifest_name() -> String {
    crate::manifest::DEFAULT_MANIFEST_NAME.to_string()
}

fn default_archive_name() -> String {
    crate::archive::DEFAULT_ARCHIVE_NAME.to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            manifest_name: default_manifest_name(),
            archive_name: default_archive_name(),
            compress: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestConfig {
    /// Read buffer size in bytes
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Digest workers; 0 = one per CPU
    #[serde(default)]
    pub jobs: usize,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            jobs: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default = "default_true")]
    pub follow_symlinks: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: true,
        }
    }
}

/// External program consulted when no version is given
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionConfig {
    #[serde(default)]
    pub oracle: Option<String>,

    #[serde(default)]
    pub oracle_args: Vec<String>,
}

impl VersionConfig {
    pub fn oracle(&self) -> Option<VersionOracle> {
        self.oracle
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(|p| VersionOracle::new(p, self.oracle_args.clone()))
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Output(String),
    Digest(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Output(msg) => write!(f, "Output: {}", msg),
            ValidationError::Digest(msg) => write!(f, "Digest: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl OutputConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.manifest_name.trim().is_empty() {
            return Err("Manifest name cannot be empty".to_string());
        }
        if self.archive_name.trim().is_empty() {
            return Err("Archive name cannot be empty".to_string());
        }
        if self.manifest_name == self.archive_name {
            return Err(format!(
                "Manifest and archive share the name '{}'",
                self.manifest_name
            ));
        }
        Ok(())
    }
}

impl BuildConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.output.validate() {
            errors.push(ValidationError::Output(e));
        }
        if self.digest.chunk_size == 0 {
            errors.push(ValidationError::Digest(
                "chunk_size must be greater than zero".to_string(),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// [`BuildConfig::validate`] folded into a single [`BuildError`]
    pub fn ensure_valid(&self) -> Result<(), BuildError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            BuildError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })
    }
}
