//! Directory discovery for the recursive scan

use crate::patterns::PatternSet;
use crate::tree::builder::{SkipReason, SkippedEntry};
use crate::tree::path;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

/// One discovered path, already tested against the pattern set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkEntry {
    /// A regular file that is neither ignored nor excluded
    File { relative: String },
    /// A directory that was not excluded. Ignored directories are still
    /// reported so their contents can be placed, but get no entry.
    Directory { relative: String, ignored: bool },
    /// Neither a file nor a directory, or unreadable
    Skipped(SkippedEntry),
}

/// Walker configuration
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Follow symbolic links to their targets (default: true)
    pub follow_symlinks: bool,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: true,
        }
    }
}

/// Walks a directory below the scan root in sorted, pre-order sequence
pub struct Walker<'a> {
    root: &'a Path,
    patterns: &'a PatternSet,
    config: WalkerConfig,
}

impl<'a> Walker<'a> {
    pub fn new(root: &'a Path, patterns: &'a PatternSet) -> Self {
        Self {
            root,
            patterns,
            config: WalkerConfig::default(),
        }
    }

    pub fn with_config(root: &'a Path, patterns: &'a PatternSet, config: WalkerConfig) -> Self {
        Self {
            root,
            patterns,
            config,
        }
    }

    /// Collect everything beneath `relative_dir` (not the directory itself).
    ///
    /// Children are visited in file-name order. Excluded directories are
    /// pruned; ignored directories are descended into.
    pub fn walk(&self, relative_dir: &str) -> Vec<WalkEntry> {
        let start = path::on_disk(self.root, relative_dir);
        let mut entries = Vec::new();

        let mut iter = WalkDir::new(&start)
            .min_depth(1)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name()
            .into_iter();

        while let Some(next) = iter.next() {
            let entry = match next {
                Ok(entry) => entry,
                Err(err) => {
                    let at = err
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| start.clone());
                    let skipped = self.skip(&at, SkipReason::Unreadable(err.to_string()));
                    entries.push(WalkEntry::Skipped(skipped));
                    continue;
                }
            };

            let file_type = entry.file_type();
            let Some(relative) = path::relative_to_root(self.root, entry.path()) else {
                entries.push(WalkEntry::Skipped(
                    self.skip(entry.path(), SkipReason::NonUtf8Name),
                ));
                if file_type.is_dir() {
                    iter.skip_current_dir();
                }
                continue;
            };

            let matched = self.patterns.matches(&relative);
            if matched.excluded {
                trace!(path = %relative, "Excluded");
                if file_type.is_dir() {
                    iter.skip_current_dir();
                }
                continue;
            }

            if file_type.is_dir() {
                entries.push(WalkEntry::Directory {
                    relative,
                    ignored: matched.ignored,
                });
            } else if file_type.is_file() {
                if matched.ignored {
                    trace!(path = %relative, "Ignored");
                } else {
                    entries.push(WalkEntry::File { relative });
                }
            } else {
                let skipped = SkippedEntry {
                    path: relative,
                    reason: SkipReason::NotFileOrDirectory,
                };
                warn!(path = %skipped.path, "Skipping: {}", skipped.reason);
                entries.push(WalkEntry::Skipped(skipped));
            }
        }

        debug!(
            start = %start.display(),
            entry_count = entries.len(),
            "Walked directory"
        );
        entries
    }

    fn skip(&self, at: &Path, reason: SkipReason) -> SkippedEntry {
        let shown = path::relative_to_root(self.root, at)
            .unwrap_or_else(|| lossy_relative(self.root, at));
        warn!(path = %shown, "Skipping: {}", reason);
        SkippedEntry {
            path: shown,
            reason,
        }
    }
}

fn lossy_relative(root: &Path, at: &Path) -> String {
    at.strip_prefix(root)
        .map(PathBuf::from)
        .unwrap_or_else(|_| at.to_path_buf())
        .to_string_lossy()
        .into_owned()
}
