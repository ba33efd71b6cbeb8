//! CLI route: run context and the build pipeline behind the single command.
//!
//! scan -> manifest -> archive -> optional comparison, all against one
//! [`BuildContext`] created per invocation.

use crate::archive::{write_archive_file, ArchiveFormat};
use crate::cli::output::{format_build_summary, BuildSummary};
use crate::cli::parse::Cli;
use crate::config::{BuildConfig, ConfigLoader};
use crate::context::BuildContext;
use crate::error::BuildError;
use crate::manifest::{diff, write_manifest_file, Manifest};
use crate::patterns::{PatternSet, RuleKind};
use crate::tree::builder::TreeBuilder;
use crate::tree::hasher::ContentDigester;
use crate::tree::node::AssetTree;
use crate::tree::path;
use crate::version::{resolve_version, VersionOracle};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Runtime context for CLI execution: the loaded configuration.
/// Built from an optional config path using ConfigLoader only.
pub struct RunContext {
    config: BuildConfig,
}

impl RunContext {
    /// Load configuration: `config_path` when given, else the global config file
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, BuildError> {
        let config = ConfigLoader::load_with(config_path.as_deref())?;
        Ok(Self { config })
    }

    /// Use an already loaded configuration
    pub fn with_config(config: BuildConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Run one build and return the summary text for stdout
    pub fn execute(&self, cli: &Cli) -> Result<String, BuildError> {
        let settings = apply_cli_overrides(self.config.clone(), cli);
        settings.ensure_valid()?;

        // Rules compile before the source tree is touched
        let mut patterns = settings.patterns.compile()?;
        let source_root = path::canonicalize_root(&cli.source_dir)?;

        let output_dir = prepare_output_dir(&settings.output.dir)?;
        let format = if settings.output.compress {
            ArchiveFormat::TarGz
        } else {
            ArchiveFormat::Tar
        };
        let manifest_path = output_dir.join(&settings.output.manifest_name);
        let archive_path = output_dir.join(format.file_name(&settings.output.archive_name));
        exclude_outputs(
            &mut patterns,
            &source_root,
            &[manifest_path.as_path(), archive_path.as_path()],
        )?;

        let oracle = cli
            .oracle
            .as_ref()
            .map(|program| VersionOracle::new(program.as_str(), settings.version.oracle_args.clone()))
            .or_else(|| settings.version.oracle());
        let revision = resolve_version(cli.version.as_deref(), oracle.as_ref());

        let context = BuildContext::new(&source_root, patterns)?
            .with_digester(ContentDigester::new(settings.digest.chunk_size))
            .with_jobs(settings.digest.jobs)
            .with_follow_symlinks(settings.scan.follow_symlinks)
            .with_revision(revision)
            .with_url(cli.update_url.clone().unwrap_or_default());

        info!(
            source_root = %context.source_root().display(),
            revision = %context.revision(),
            "Building manifest"
        );
        let scan = TreeBuilder::build(&context)?;
        let report = scan.report();

        let manifest = Manifest::header_from_context(&context).with_tree(&scan.tree);
        let archive = if cli.notar {
            debug!("Archive suppressed by --notar");
            None
        } else {
            Some(archive_path)
        };
        publish_outputs(
            &manifest,
            &manifest_path,
            archive.as_deref().map(|path| (&scan.tree, path, format)),
        )?;

        let comparison = match cli.compare {
            Some(ref old_path) => {
                let old = Manifest::load(old_path)?;
                Some((old_path.clone(), diff(&old, &manifest)))
            }
            None => None,
        };

        Ok(format_build_summary(&BuildSummary {
            revision: context.revision(),
            manifest_path: &manifest_path,
            archive_path: archive.as_deref(),
            report: &report,
            comparison: comparison.as_ref().map(|(p, plan)| (p.as_path(), plan)),
        }))
    }
}

/// Fold command-line flags over the loaded configuration
pub fn apply_cli_overrides(mut config: BuildConfig, cli: &Cli) -> BuildConfig {
    config.patterns.extend(RuleKind::Exclude, &cli.exclude);
    config.patterns.extend(RuleKind::Ignore, &cli.ignore);
    if let Some(ref file) = cli.pattern_file {
        config.patterns.pattern_file = Some(file.clone());
    }
    if let Some(ref dir) = cli.output_dir {
        config.output.dir = dir.clone();
    }
    if let Some(ref name) = cli.manifest_name {
        config.output.manifest_name = name.clone();
    }
    if let Some(ref name) = cli.archive_name {
        config.output.archive_name = name.clone();
    }
    if cli.gzip {
        config.output.compress = true;
    }
    if let Some(jobs) = cli.jobs {
        config.digest.jobs = jobs;
    }
    config
}

fn prepare_output_dir(dir: &Path) -> Result<PathBuf, BuildError> {
    fs::create_dir_all(dir).map_err(|source| BuildError::Output {
        path: dir.to_path_buf(),
        source,
    })?;
    dunce::canonicalize(dir).map_err(|source| BuildError::Output {
        path: dir.to_path_buf(),
        source,
    })
}

/// Write the archive and then the manifest under staging names, and move
/// them into place only once both are complete. On failure the staging files
/// are removed and any previous outputs are left as they were.
fn publish_outputs(
    manifest: &Manifest,
    manifest_path: &Path,
    archive: Option<(&AssetTree, &Path, ArchiveFormat)>,
) -> Result<(), BuildError> {
    let staged_manifest = staging_path(manifest_path);
    let staged_archive =
        archive.map(|(tree, path, format)| (tree, path, staging_path(path), format));

    let result = (|| -> Result<(), BuildError> {
        if let Some((tree, _, staged, format)) = staged_archive.as_ref() {
            write_archive_file(tree, staged, *format)?;
        }
        write_manifest_file(manifest, &staged_manifest)?;
        if let Some((_, final_path, staged, _)) = staged_archive.as_ref() {
            rename_into_place(staged, final_path)?;
        }
        rename_into_place(&staged_manifest, manifest_path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&staged_manifest);
        if let Some((_, _, staged, _)) = staged_archive.as_ref() {
            let _ = fs::remove_file(staged);
        }
    }
    result
}

fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}

fn rename_into_place(staged: &Path, path: &Path) -> Result<(), BuildError> {
    fs::rename(staged, path).map_err(|source| BuildError::Output {
        path: path.to_path_buf(),
        source,
    })
}

/// Outputs written inside the scanned tree must never be manifested
fn exclude_outputs(
    patterns: &mut PatternSet,
    source_root: &Path,
    outputs: &[&Path],
) -> Result<(), BuildError> {
    for output in outputs {
        if let Some(relative) = path::relative_to_root(source_root, output) {
            if relative.is_empty() {
                continue;
            }
            debug!(path = %relative, "Excluding build output inside source tree");
            patterns.exclude_literal(&relative)?;
        }
    }
    Ok(())
}
