//! Tree builder: populates an [`AssetTree`] from the source directory
//!
//! Two entry points feed the same tree:
//!
//! - [`TreeBuilder::insert_path`] places one source path at an explicit
//!   destination, digesting it if it is a file.
//! - [`TreeBuilder::scan_directory`] discovers everything beneath a directory,
//!   applying the pattern set, digests the files (in parallel when configured)
//!   and inserts the results in sorted order on the calling thread.
//!
//! Per-entry anomalies (special files, dangling links, name clashes) are
//! logged and recorded as [`SkippedEntry`]; they never abort the build.
//! A file that was selected but cannot be digested does.

use crate::context::BuildContext;
use crate::error::ScanError;
use crate::tree::hasher::ContentDigest;
use crate::tree::node::{AssetNode, AssetTree, ManifestEntry};
use crate::tree::path;
use crate::tree::walker::{WalkEntry, Walker, WalkerConfig};
use rayon::prelude::*;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::time::Instant;
use tracing::{debug, info, instrument, trace, warn};

/// Why a path was left out of the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Special file, dangling symlink, or missing
    NotFileOrDirectory,
    /// Could not be listed or stat'ed
    Unreadable(String),
    /// Name is not valid UTF-8 and cannot be written to the manifest
    NonUtf8Name,
    /// The destination (or source) was already inserted
    DuplicateEntry,
    /// A file and a directory claim the same destination
    PathConflict,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotFileOrDirectory => f.write_str("not a regular file or directory"),
            SkipReason::Unreadable(msg) => write!(f, "unreadable ({})", msg),
            SkipReason::NonUtf8Name => f.write_str("name is not valid UTF-8"),
            SkipReason::DuplicateEntry => f.write_str("already in the manifest"),
            SkipReason::PathConflict => f.write_str("conflicts with an existing entry"),
        }
    }
}

/// A path that was skipped during the scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    /// Scan-relative path (lossy for non-UTF-8 names)
    pub path: String,
    pub reason: SkipReason,
}

/// What [`TreeBuilder::insert_path`] did with a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Directory,
    File,
    Skipped(SkipReason),
}

/// Summary counts for a finished scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub directories: usize,
    pub files: usize,
    pub total_bytes: u64,
    pub skipped: Vec<SkippedEntry>,
}

/// A finished scan: the immutable tree plus everything that was skipped
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub tree: AssetTree,
    pub skipped: Vec<SkippedEntry>,
}

impl ScanResult {
    pub fn report(&self) -> BuildReport {
        let root = self.tree.root();
        BuildReport {
            directories: root.directory_count(),
            files: root.file_count(),
            total_bytes: root.total_bytes(),
            skipped: self.skipped.clone(),
        }
    }
}

/// Builds one [`AssetTree`] per build invocation
pub struct TreeBuilder<'ctx> {
    context: &'ctx BuildContext,
    tree: AssetTree,
    sources: HashSet<String>,
    skipped: Vec<SkippedEntry>,
}

impl<'ctx> TreeBuilder<'ctx> {
    pub fn new(context: &'ctx BuildContext) -> Self {
        Self {
            context,
            tree: AssetTree::new(context.source_root().to_path_buf()),
            sources: HashSet::new(),
            skipped: Vec::new(),
        }
    }

    /// Scan the whole source root and return the finished tree
    pub fn build(context: &'ctx BuildContext) -> Result<ScanResult, ScanError> {
        let mut builder = Self::new(context);
        builder.scan_directory("")?;
        Ok(builder.finish())
    }

    /// Place `source_path` (relative to the scan root) at `dest_path`
    /// (relative to the install root).
    ///
    /// Directories become (possibly empty) listed nodes; regular files are
    /// digested. Anything else is logged and skipped.
    pub fn insert_path(
        &mut self,
        source_path: &str,
        dest_path: &str,
    ) -> Result<InsertOutcome, ScanError> {
        let source = path::normalize_relative(source_path)?;
        let dest = path::manifest_name(&path::normalize_relative(dest_path)?);
        let on_disk = path::on_disk(self.context.source_root(), &source);

        let metadata = match fs::metadata(&on_disk) {
            Ok(metadata) => metadata,
            Err(err) => {
                let reason = if err.kind() == std::io::ErrorKind::NotFound {
                    SkipReason::NotFileOrDirectory
                } else {
                    SkipReason::Unreadable(err.to_string())
                };
                return Ok(self.record_skip(&source, reason));
            }
        };

        if metadata.is_dir() {
            if dest.is_empty() {
                return Ok(InsertOutcome::Directory);
            }
            Ok(self.insert_directory(&source, &dest))
        } else if metadata.is_file() {
            if dest.is_empty() {
                return Err(ScanError::InvalidPath(format!(
                    "File '{}' needs a non-empty destination",
                    source
                )));
            }
            let digest = self.context.digester().digest(&on_disk)?;
            Ok(self.insert_file(&source, &dest, digest))
        } else {
            Ok(self.record_skip(&source, SkipReason::NotFileOrDirectory))
        }
    }

    /// Recursively add everything beneath `relative_dir` (not the directory
    /// itself), honouring the pattern set. Destinations mirror sources.
    #[instrument(skip(self), fields(source_root = %self.context.source_root().display()))]
    pub fn scan_directory(&mut self, relative_dir: &str) -> Result<(), ScanError> {
        let start = Instant::now();
        let relative_dir = path::normalize_relative(relative_dir)?;
        let dir_on_disk = path::on_disk(self.context.source_root(), &relative_dir);
        if !dir_on_disk.is_dir() {
            return Err(ScanError::InvalidPath(format!(
                "Not a directory under the source root: '{}'",
                relative_dir
            )));
        }
        // The start directory itself must be listable
        fs::read_dir(&dir_on_disk).map_err(|source| ScanError::SourceRootUnreadable {
            path: dir_on_disk.clone(),
            source,
        })?;

        let walker = Walker::with_config(
            self.context.source_root(),
            self.context.patterns(),
            WalkerConfig {
                follow_symlinks: self.context.follow_symlinks(),
            },
        );
        let entries = walker.walk(&relative_dir);

        let files: Vec<&str> = entries
            .iter()
            .filter_map(|e| match e {
                WalkEntry::File { relative } => Some(relative.as_str()),
                _ => None,
            })
            .collect();
        let mut digests = self.digest_all(&files)?.into_iter();

        for entry in &entries {
            match entry {
                WalkEntry::Directory { relative, ignored } => {
                    if *ignored {
                        trace!(path = %relative, "Ignored directory, descending");
                    } else {
                        self.insert_directory(relative, &path::manifest_name(relative));
                    }
                }
                WalkEntry::File { relative } => {
                    let digest = digests.next().ok_or_else(|| {
                        ScanError::InvalidPath(format!("Missing digest for '{}'", relative))
                    })?;
                    self.insert_file(relative, &path::manifest_name(relative), digest);
                }
                WalkEntry::Skipped(skipped) => self.skipped.push(skipped.clone()),
            }
        }

        info!(
            directory = %relative_dir,
            files = files.len(),
            duration_ms = start.elapsed().as_millis(),
            "Scan completed"
        );
        Ok(())
    }

    /// Stop inserting and hand back the tree
    pub fn finish(self) -> ScanResult {
        ScanResult {
            tree: self.tree,
            skipped: self.skipped,
        }
    }

    pub fn tree(&self) -> &AssetTree {
        &self.tree
    }

    pub fn skipped(&self) -> &[SkippedEntry] {
        &self.skipped
    }

    /// Digest files in walk order. Runs on a rayon pool unless `jobs == 1`;
    /// results come back in input order either way.
    fn digest_all(&self, files: &[&str]) -> Result<Vec<ContentDigest>, ScanError> {
        let root = self.context.source_root();
        let digester = self.context.digester();
        let digest_one = |relative: &&str| digester.digest(&path::on_disk(root, relative));

        let jobs = self.context.jobs();
        if jobs == 1 || files.len() < 2 {
            return files.iter().map(digest_one).collect();
        }

        match rayon::ThreadPoolBuilder::new().num_threads(jobs).build() {
            Ok(pool) => {
                debug!(
                    threads = pool.current_num_threads(),
                    files = files.len(),
                    "Digesting in parallel"
                );
                pool.install(|| files.par_iter().map(digest_one).collect())
            }
            Err(err) => {
                warn!("Falling back to sequential digests: {}", err);
                files.iter().map(digest_one).collect()
            }
        }
    }

    /// Walk to the parent of `dest`, creating unlisted nodes on the way
    fn parent_for<'t>(
        tree: &'t mut AssetTree,
        parents: &[&str],
    ) -> Result<&'t mut AssetNode, SkipReason> {
        let mut node = tree.root_mut();
        for part in parents {
            node = node.ensure_child(part, None, false)?;
        }
        Ok(node)
    }

    fn insert_directory(&mut self, source: &str, dest: &str) -> InsertOutcome {
        let parts = path::components(dest);
        let Some((name, parents)) = parts.split_last() else {
            return InsertOutcome::Directory;
        };
        let result = Self::parent_for(&mut self.tree, parents)
            .and_then(|parent| parent.ensure_child(name, Some(source), true).map(|_| ()));
        match result {
            Ok(()) => {
                trace!(source = %source, dest = %dest, "Inserted directory");
                InsertOutcome::Directory
            }
            Err(reason) => self.record_skip(source, reason),
        }
    }

    fn insert_file(&mut self, source: &str, dest: &str, digest: ContentDigest) -> InsertOutcome {
        if self.sources.contains(source) {
            return self.record_skip(source, SkipReason::DuplicateEntry);
        }
        let parts = path::components(dest);
        let Some((name, parents)) = parts.split_last() else {
            return self.record_skip(source, SkipReason::PathConflict);
        };
        let entry = ManifestEntry {
            source_path: source.to_string(),
            dest_path: dest.to_string(),
            file_name: (*name).to_string(),
            digest: digest.hex,
            content_length: digest.size,
        };
        let result = Self::parent_for(&mut self.tree, parents)
            .and_then(|parent| parent.insert_entry(entry));
        match result {
            Ok(()) => {
                trace!(source = %source, dest = %dest, "Inserted file");
                self.sources.insert(source.to_string());
                InsertOutcome::File
            }
            Err(reason) => self.record_skip(source, reason),
        }
    }

    fn record_skip(&mut self, source: &str, reason: SkipReason) -> InsertOutcome {
        warn!(path = %source, "Skipping: {}", reason);
        self.skipped.push(SkippedEntry {
            path: source.to_string(),
            reason: reason.clone(),
        });
        InsertOutcome::Skipped(reason)
    }
}
