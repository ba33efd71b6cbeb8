//! Asset tree node types
//!
//! An [`AssetTree`] is built once per build, mutated only while scanning, and
//! then read by the manifest serializer and the archive writer. Children and
//! file entries are kept in name order so every traversal is deterministic.

use crate::tree::builder::SkipReason;
use crate::tree::path;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One file in the manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Path relative to the scan root
    pub source_path: String,
    /// Path relative to the install root
    pub dest_path: String,
    /// Last component of `dest_path`
    pub file_name: String,
    /// Lowercase hex SHA-1 of the content at scan time
    pub digest: String,
    pub content_length: u64,
}

/// One directory's worth of tree state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetNode {
    name: String,
    /// Install-relative path with a trailing `/`; empty for the root
    dest_prefix: String,
    /// Scan-relative directory this node was created from, if any
    source_dir: Option<String>,
    /// Inserted as a directory in its own right. Nodes created only as the
    /// parent of something else are walked but get no entry of their own.
    listed: bool,
    children: BTreeMap<String, AssetNode>,
    entries: BTreeMap<String, ManifestEntry>,
}

/// Either kind of item in the tree, borrowed
#[derive(Debug, Clone, Copy)]
pub enum TreeItem<'a> {
    Directory(&'a AssetNode),
    File(&'a ManifestEntry),
}

impl<'a> TreeItem<'a> {
    /// Install-relative path, no trailing slash
    pub fn dest_path(&self) -> &'a str {
        match *self {
            TreeItem::Directory(node) => node.dest_path(),
            TreeItem::File(entry) => &entry.dest_path,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(*self, TreeItem::Directory(_))
    }
}

impl AssetNode {
    fn root() -> Self {
        Self {
            name: String::new(),
            dest_prefix: String::new(),
            source_dir: Some(String::new()),
            listed: true,
            children: BTreeMap::new(),
            entries: BTreeMap::new(),
        }
    }

    fn child_of(parent: &AssetNode, name: &str, source_dir: Option<&str>, listed: bool) -> Self {
        Self {
            name: name.to_string(),
            dest_prefix: format!("{}{}/", parent.dest_prefix, name),
            source_dir: source_dir.map(str::to_string),
            listed,
            children: BTreeMap::new(),
            entries: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dest_prefix(&self) -> &str {
        &self.dest_prefix
    }

    /// Install-relative path of this directory; empty for the root
    pub fn dest_path(&self) -> &str {
        self.dest_prefix.trim_end_matches('/')
    }

    pub fn source_dir(&self) -> Option<&str> {
        self.source_dir.as_deref()
    }

    /// Whether this directory gets its own manifest and archive entry
    pub fn is_listed(&self) -> bool {
        self.listed
    }

    pub fn is_root(&self) -> bool {
        self.dest_prefix.is_empty()
    }

    pub fn child(&self, name: &str) -> Option<&AssetNode> {
        self.children.get(name)
    }

    /// Direct child directories in name order
    pub fn children(&self) -> impl Iterator<Item = &AssetNode> {
        self.children.values()
    }

    /// Direct file entries in name order
    pub fn entries(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.entries.values()
    }

    pub fn entry(&self, file_name: &str) -> Option<&ManifestEntry> {
        self.entries.get(file_name)
    }

    /// Listed child directories first, then direct files
    pub fn items(&self) -> impl Iterator<Item = TreeItem<'_>> {
        self.children()
            .filter(|c| c.listed)
            .map(TreeItem::Directory)
            .chain(self.entries().map(TreeItem::File))
    }

    /// Get or create the child directory `name`. A node once listed stays listed.
    ///
    /// Fails when a file entry of the same name already exists here.
    pub(crate) fn ensure_child(
        &mut self,
        name: &str,
        source_dir: Option<&str>,
        listed: bool,
    ) -> Result<&mut AssetNode, SkipReason> {
        if self.entries.contains_key(name) {
            return Err(SkipReason::PathConflict);
        }
        if !self.children.contains_key(name) {
            let child = AssetNode::child_of(self, name, source_dir, listed);
            self.children.insert(name.to_string(), child);
        }
        let child = self
            .children
            .get_mut(name)
            .ok_or(SkipReason::PathConflict)?;
        if child.source_dir.is_none() {
            child.source_dir = source_dir.map(str::to_string);
        }
        child.listed |= listed;
        Ok(child)
    }

    /// Add a file entry. The first entry for a name wins.
    pub(crate) fn insert_entry(&mut self, entry: ManifestEntry) -> Result<(), SkipReason> {
        if self.children.contains_key(&entry.file_name) {
            return Err(SkipReason::PathConflict);
        }
        if self.entries.contains_key(&entry.file_name) {
            return Err(SkipReason::DuplicateEntry);
        }
        self.entries.insert(entry.file_name.clone(), entry);
        Ok(())
    }

    /// Number of listed directories beneath this node, excluding itself
    pub fn directory_count(&self) -> usize {
        self.children
            .values()
            .map(|c| usize::from(c.listed) + c.directory_count())
            .sum()
    }

    /// Number of files in this subtree
    pub fn file_count(&self) -> usize {
        self.entries.len() + self.children.values().map(AssetNode::file_count).sum::<usize>()
    }

    /// Total content bytes in this subtree
    pub fn total_bytes(&self) -> u64 {
        self.entries.values().map(|e| e.content_length).sum::<u64>()
            + self.children.values().map(AssetNode::total_bytes).sum::<u64>()
    }

    fn collect_preorder<'a>(&'a self, out: &mut Vec<TreeItem<'a>>) {
        out.extend(self.items());
        for child in self.children() {
            child.collect_preorder(out);
        }
    }
}

/// The scanned tree plus the root it was scanned from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetTree {
    source_root: PathBuf,
    root: AssetNode,
}

impl AssetTree {
    pub fn new(source_root: PathBuf) -> Self {
        Self {
            source_root,
            root: AssetNode::root(),
        }
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn root(&self) -> &AssetNode {
        &self.root
    }

    pub(crate) fn root_mut(&mut self) -> &mut AssetNode {
        &mut self.root
    }

    /// Find the directory node at an install-relative path
    pub fn find_directory(&self, dest_path: &str) -> Option<&AssetNode> {
        path::components(dest_path)
            .into_iter()
            .try_fold(&self.root, |node, part| node.child(part))
    }

    /// Find a file entry by install-relative path
    pub fn find_entry(&self, dest_path: &str) -> Option<&ManifestEntry> {
        let (parent, name) = match dest_path.rsplit_once('/') {
            Some((parent, name)) => (parent, name),
            None => ("", dest_path),
        };
        self.find_directory(parent)?.entry(name)
    }

    /// Every item in manifest order: a node's directories, then its files,
    /// then each child directory's subtree in name order
    pub fn items(&self) -> Vec<TreeItem<'_>> {
        let mut out = Vec::new();
        self.root.collect_preorder(&mut out);
        out
    }

    /// Absolute on-disk path of a manifest entry's source
    pub fn source_path_of(&self, entry: &ManifestEntry) -> PathBuf {
        path::on_disk(&self.source_root, &entry.source_path)
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty() && self.root.entries.is_empty()
    }
}
