//! Per-build state shared by the scanner, serializer and archive writer
//!
//! A [`BuildContext`] is created once per invocation and passed by reference;
//! nothing survives between builds.

use crate::error::ScanError;
use crate::patterns::PatternSet;
use crate::tree::hasher::ContentDigester;
use crate::tree::path;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct BuildContext {
    source_root: PathBuf,
    patterns: PatternSet,
    digester: ContentDigester,
    /// Digest worker count; 0 means one per CPU, 1 means sequential
    jobs: usize,
    follow_symlinks: bool,
    revision: String,
    url: String,
}

impl BuildContext {
    /// Create a context for `source_root`, which must be an existing directory.
    /// The root is canonicalized.
    pub fn new(source_root: &Path, patterns: PatternSet) -> Result<Self, ScanError> {
        Ok(Self {
            source_root: path::canonicalize_root(source_root)?,
            patterns,
            digester: ContentDigester::default(),
            jobs: 0,
            follow_symlinks: true,
            revision: String::new(),
            url: String::new(),
        })
    }

    pub fn with_digester(mut self, digester: ContentDigester) -> Self {
        self.digester = digester;
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = revision.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    pub fn digester(&self) -> ContentDigester {
        self.digester
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    pub fn follow_symlinks(&self) -> bool {
        self.follow_symlinks
    }

    pub fn revision(&self) -> &str {
        &self.revision
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}
