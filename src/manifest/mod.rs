//! Patch manifest: the XML inventory clients diff against
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <patch_data revision="REV" url="URL">
//!   <exclude pattern="REGEX"/>
//!   <ignore pattern="REGEX"/>
//!   <entry name="sub" kind="dir" />
//!   <entry name="sub/b.txt" kind="file" sha1_digest="HEX" size="5" />
//! </patch_data>
//! ```
//!
//! Entries are written depth-first: a directory's listed subdirectories, then
//! its files, then each subdirectory's contents in name order.

pub mod diff;
pub mod reader;
pub mod writer;

use crate::context::BuildContext;
use crate::tree::node::{AssetTree, TreeItem};

pub use diff::{diff, PatchPlan};
pub use writer::{serialize, write_manifest_file};

/// Conventional manifest file name
pub const DEFAULT_MANIFEST_NAME: &str = "mv.patch";

/// One `<entry>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestRecord {
    Directory {
        name: String,
    },
    File {
        name: String,
        sha1_digest: String,
        size: u64,
    },
}

impl ManifestRecord {
    pub fn name(&self) -> &str {
        match self {
            ManifestRecord::Directory { name } | ManifestRecord::File { name, .. } => name,
        }
    }
}

impl<'a> From<TreeItem<'a>> for ManifestRecord {
    fn from(item: TreeItem<'a>) -> Self {
        match item {
            TreeItem::Directory(node) => ManifestRecord::Directory {
                name: node.dest_path().to_string(),
            },
            TreeItem::File(entry) => ManifestRecord::File {
                name: entry.dest_path.clone(),
                sha1_digest: entry.digest.clone(),
                size: entry.content_length,
            },
        }
    }
}

/// A manifest as data, either rendered from a tree or parsed from XML
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub revision: String,
    pub url: String,
    pub excludes: Vec<String>,
    pub ignores: Vec<String>,
    pub entries: Vec<ManifestRecord>,
}

impl Manifest {
    /// Header fields only, no entries
    pub fn header(
        revision: impl Into<String>,
        url: impl Into<String>,
        excludes: Vec<String>,
        ignores: Vec<String>,
    ) -> Self {
        Self {
            revision: revision.into(),
            url: url.into(),
            excludes,
            ignores,
            entries: Vec::new(),
        }
    }

    /// Header taken from the build context: revision, url and both rule lists
    pub fn header_from_context(context: &BuildContext) -> Self {
        let patterns = context.patterns();
        Self::header(
            context.revision(),
            context.url(),
            patterns.exclude_patterns().map(str::to_string).collect(),
            patterns.ignore_patterns().map(str::to_string).collect(),
        )
    }

    /// Fill entries from `tree` in manifest order
    pub fn with_tree(mut self, tree: &AssetTree) -> Self {
        self.entries = tree.items().into_iter().map(ManifestRecord::from).collect();
        self
    }

    pub fn files(&self) -> impl Iterator<Item = &ManifestRecord> {
        self.entries
            .iter()
            .filter(|e| matches!(e, ManifestRecord::File { .. }))
    }
}
