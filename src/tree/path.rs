//! Relative path normalization for manifest names
//!
//! Source paths are `/`-separated, relative, with no `.`/`..` components and
//! no leading or trailing slash. They keep the on-disk spelling of each name;
//! manifest and archive names are the same paths in NFC.

use crate::error::ScanError;
use std::path::{Component, Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

/// Normalize a user-supplied relative path string.
///
/// Accepts `\` as a separator, drops empty and `.` components, and rejects
/// absolute paths and `..`. The empty string is the scan root.
pub fn normalize_relative(path: &str) -> Result<String, ScanError> {
    if path.starts_with('/') || path.starts_with('\\') {
        return Err(ScanError::InvalidPath(format!(
            "Expected a relative path, got '{}'",
            path
        )));
    }
    let mut parts = Vec::new();
    for part in path.split(['/', '\\']) {
        match part {
            "" | "." => continue,
            ".." => {
                return Err(ScanError::InvalidPath(format!(
                    "Parent components are not allowed: '{}'",
                    path
                )))
            }
            other => parts.push(other),
        }
    }
    Ok(parts.join("/"))
}

/// Manifest name for a source path: the same components in NFC, so a tree
/// scanned on a decomposing filesystem yields the same names
pub fn manifest_name(relative: &str) -> String {
    relative.nfc().collect()
}

/// Split a normalized relative path into its components
pub fn components(path: &str) -> Vec<&str> {
    path.split('/').filter(|c| !c.is_empty()).collect()
}

/// Express `path` relative to `root` as a manifest name.
///
/// Returns `None` when `path` is outside `root` or has a non-UTF-8 component.
pub fn relative_to_root(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(name) => parts.push(name.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(parts.join("/"))
}

/// Resolve a manifest-relative path against the source root on disk
pub fn on_disk(root: &Path, relative: &str) -> PathBuf {
    components(relative)
        .into_iter()
        .fold(root.to_path_buf(), |acc, part| acc.join(part))
}

/// Canonicalize the scan root (resolves symlinks, `.`, `..`)
pub fn canonicalize_root(root: &Path) -> Result<PathBuf, ScanError> {
    if !root.exists() {
        return Err(ScanError::SourceRootMissing(root.to_path_buf()));
    }
    let canonical = dunce::canonicalize(root)?;
    if !canonical.is_dir() {
        return Err(ScanError::SourceRootNotDirectory(canonical));
    }
    Ok(canonical)
}
