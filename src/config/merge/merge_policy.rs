//! Merge rules: defaults, override order, conflict handling.
//!
//! Later sources replace earlier values key by key; lists are replaced whole,
//! never concatenated.

use crate::config::{DEFAULT_EXCLUDES, DEFAULT_IGNORES};
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("patterns.exclude", DEFAULT_EXCLUDES.to_vec())?
        .set_default("patterns.ignore", DEFAULT_IGNORES.to_vec())?
        .set_default("output.dir", ".")?
        .set_default("output.manifest_name", crate::manifest::DEFAULT_MANIFEST_NAME)?
        .set_default("output.archive_name", crate::archive::DEFAULT_ARCHIVE_NAME)?
        .set_default("output.compress", false)?
        .set_default("digest.chunk_size", crate::tree::hasher::DEFAULT_CHUNK_SIZE as u64)?
        .set_default("digest.jobs", 0u64)
}
