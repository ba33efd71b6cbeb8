//! Revision resolution
//!
//! An explicit version wins. Otherwise an external oracle program may be asked
//! for one; any failure there falls back to a UTC timestamp so the build never
//! aborts for lack of a version string.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use std::process::Command;
use tracing::{debug, warn};

/// Timestamp layout for generated revisions
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// External program asked for a revision string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionOracle {
    pub program: String,
    pub args: Vec<String>,
}

impl VersionOracle {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Run the oracle and return the first non-empty line it prints
    pub fn query(&self) -> Result<String> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .with_context(|| format!("failed to run version oracle '{}'", self.program))?;
        if !output.status.success() {
            bail!(
                "version oracle '{}' exited with {}",
                self.program,
                output.status
            );
        }
        let stdout = String::from_utf8(output.stdout)
            .with_context(|| format!("version oracle '{}' printed non-UTF-8", self.program))?;
        match stdout.lines().map(str::trim).find(|l| !l.is_empty()) {
            Some(line) => Ok(line.to_string()),
            None => bail!("version oracle '{}' printed nothing", self.program),
        }
    }
}

/// Pick the revision for a build
pub fn resolve_version(explicit: Option<&str>, oracle: Option<&VersionOracle>) -> String {
    resolve_version_at(explicit, oracle, Utc::now())
}

fn resolve_version_at(
    explicit: Option<&str>,
    oracle: Option<&VersionOracle>,
    now: DateTime<Utc>,
) -> String {
    if let Some(version) = explicit.map(str::trim).filter(|v| !v.is_empty()) {
        return version.to_string();
    }
    if let Some(oracle) = oracle {
        match oracle.query() {
            Ok(version) => {
                debug!(program = %oracle.program, version = %version, "Version oracle answered");
                return version;
            }
            Err(e) => {
                warn!(error = %format!("{:#}", e), "Version oracle failed, using timestamp");
            }
        }
    }
    timestamp_version(now)
}

/// Revision derived from a point in time
pub fn timestamp_version(now: DateTime<Utc>) -> String {
    now.format(TIMESTAMP_FORMAT).to_string()
}
