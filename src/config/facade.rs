//! Entry point for loading [`BuildConfig`]

use super::merge::merge_policy;
use super::sources::{environment, global_file};
use super::BuildConfig;
use crate::error::BuildError;
use config::{File, FileFormat};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads [`BuildConfig`] from defaults, files and the environment
pub struct ConfigLoader;

impl ConfigLoader {
    /// Defaults, then the global config file, then the environment
    pub fn load() -> Result<BuildConfig, BuildError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = environment::add_to_builder(builder);
        let config: BuildConfig = builder.build()?.try_deserialize()?;
        debug!("Configuration loaded");
        Ok(config)
    }

    /// Defaults, then `path` (which must exist), then the environment.
    /// The global config file is not consulted.
    pub fn load_from_file(path: &Path) -> Result<BuildConfig, BuildError> {
        if !path.is_file() {
            return Err(BuildError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let builder = merge_policy::builder_with_defaults()?
            .add_source(
                File::from(path.to_path_buf())
                    .format(FileFormat::Toml)
                    .required(true),
            );
        let builder = environment::add_to_builder(builder);
        let config: BuildConfig = builder.build()?.try_deserialize()?;
        debug!(config_path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// [`ConfigLoader::load_from_file`] when `path` is given, else [`ConfigLoader::load`]
    pub fn load_with(path: Option<&Path>) -> Result<BuildConfig, BuildError> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Self::load(),
        }
    }

    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }
}
