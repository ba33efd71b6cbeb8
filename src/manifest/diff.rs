//! Patch planning: what a client holding one manifest must fetch to reach another
//!
//! Comparison is per path. A file is changed when its digest or size differs
//! under the same name; content that merely moved shows up as a removal plus
//! an addition.

use super::{Manifest, ManifestRecord};
use std::collections::BTreeMap;

/// Differences between two manifests, each list sorted by path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchPlan {
    pub added_files: Vec<String>,
    pub changed_files: Vec<String>,
    pub removed_files: Vec<String>,
    pub added_directories: Vec<String>,
    pub removed_directories: Vec<String>,
    pub unchanged_files: usize,
    /// Bytes of added plus changed files
    pub download_bytes: u64,
}

impl PatchPlan {
    /// No file or directory differs
    pub fn is_empty(&self) -> bool {
        self.added_files.is_empty()
            && self.changed_files.is_empty()
            && self.removed_files.is_empty()
            && self.added_directories.is_empty()
            && self.removed_directories.is_empty()
    }
}

type FileIndex<'a> = BTreeMap<&'a str, (&'a str, u64)>;

fn index(manifest: &Manifest) -> (FileIndex<'_>, BTreeMap<&str, ()>) {
    let mut files = BTreeMap::new();
    let mut dirs = BTreeMap::new();
    for record in &manifest.entries {
        match record {
            ManifestRecord::File {
                name,
                sha1_digest,
                size,
            } => {
                files.insert(name.as_str(), (sha1_digest.as_str(), *size));
            }
            ManifestRecord::Directory { name } => {
                dirs.insert(name.as_str(), ());
            }
        }
    }
    (files, dirs)
}

/// Compare a cached manifest (`old`) against a fresh one (`new`)
pub fn diff(old: &Manifest, new: &Manifest) -> PatchPlan {
    let (old_files, old_dirs) = index(old);
    let (new_files, new_dirs) = index(new);
    let mut plan = PatchPlan::default();

    for (name, (digest, size)) in &new_files {
        match old_files.get(name) {
            None => {
                plan.added_files.push(name.to_string());
                plan.download_bytes += size;
            }
            Some((old_digest, old_size)) => {
                if !old_digest.eq_ignore_ascii_case(digest) || old_size != size {
                    plan.changed_files.push(name.to_string());
                    plan.download_bytes += size;
                } else {
                    plan.unchanged_files += 1;
                }
            }
        }
    }
    plan.removed_files = old_files
        .keys()
        .filter(|name| !new_files.contains_key(*name))
        .map(|name| name.to_string())
        .collect();
    plan.added_directories = new_dirs
        .keys()
        .filter(|name| !old_dirs.contains_key(*name))
        .map(|name| name.to_string())
        .collect();
    plan.removed_directories = old_dirs
        .keys()
        .filter(|name| !new_dirs.contains_key(*name))
        .map(|name| name.to_string())
        .collect();
    plan
}
