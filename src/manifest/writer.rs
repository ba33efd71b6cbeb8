//! Manifest XML rendering

use super::{Manifest, ManifestRecord};
use crate::error::BuildError;
use crate::tree::node::AssetTree;
use std::fs;
use std::path::Path;
use tracing::info;

/// Render a tree to manifest XML
pub fn serialize(
    tree: &AssetTree,
    revision: &str,
    url: &str,
    exclude_patterns: &[String],
    ignore_patterns: &[String],
) -> String {
    let manifest = Manifest::header(
        revision,
        url,
        exclude_patterns.to_vec(),
        ignore_patterns.to_vec(),
    )
    .with_tree(tree);
    render(&manifest)
}

/// Render manifest data to XML. Pure; entry order is taken as given.
pub fn render(manifest: &Manifest) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
    xml.push('\n');
    xml.push_str(&format!(
        r#"<patch_data revision="{}" url="{}">"#,
        escape(&manifest.revision),
        escape(&manifest.url)
    ));
    xml.push('\n');

    for pattern in &manifest.excludes {
        xml.push_str(&format!("  <exclude pattern=\"{}\"/>\n", escape(pattern)));
    }
    for pattern in &manifest.ignores {
        xml.push_str(&format!("  <ignore pattern=\"{}\"/>\n", escape(pattern)));
    }

    for record in &manifest.entries {
        match record {
            ManifestRecord::Directory { name } => {
                xml.push_str(&format!(
                    "  <entry name=\"{}\" kind=\"dir\" />\n",
                    escape(name)
                ));
            }
            ManifestRecord::File {
                name,
                sha1_digest,
                size,
            } => {
                xml.push_str(&format!(
                    "  <entry name=\"{}\" kind=\"file\" sha1_digest=\"{}\" size=\"{}\" />\n",
                    escape(name),
                    sha1_digest,
                    size
                ));
            }
        }
    }

    xml.push_str("</patch_data>\n");
    xml
}

/// Render `manifest` and write it to `path`
pub fn write_manifest_file(manifest: &Manifest, path: &Path) -> Result<(), BuildError> {
    let xml = render(manifest);
    fs::write(path, xml.as_bytes()).map_err(|source| BuildError::Output {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        path = %path.display(),
        entries = manifest.entries.len(),
        "Wrote manifest"
    );
    Ok(())
}

pub(crate) fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
