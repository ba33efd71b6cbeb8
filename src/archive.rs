//! Tar packaging of a scanned asset tree
//!
//! The archive is written from the same [`AssetTree`] as the manifest, so the
//! two always agree: one header per listed directory (mode copied from the
//! source directory), one header plus content per file, archive paths equal to
//! manifest names. The root directory is the `./` base entry.
//!
//! Headers are deterministic apart from modes: uid/gid 0 and mtime 0.

use crate::error::{ArchiveError, BuildError};
use crate::tree::hasher::DigestingReader;
use crate::tree::node::{AssetNode, AssetTree, ManifestEntry};
use crate::tree::path;
use flate2::write::GzEncoder;
use flate2::GzBuilder;
use std::fs::{self, File, Metadata};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tar::{Builder, EntryType, Header};
use tracing::{debug, info, instrument};

/// Conventional archive file name
pub const DEFAULT_ARCHIVE_NAME: &str = "mv.tar";

const DEFAULT_DIR_MODE: u32 = 0o755;
const DEFAULT_FILE_MODE: u32 = 0o644;

/// Archive container format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArchiveFormat {
    #[default]
    Tar,
    TarGz,
}

impl ArchiveFormat {
    /// File name for this format given the configured base name
    pub fn file_name(&self, base: &str) -> String {
        match self {
            ArchiveFormat::Tar => base.to_string(),
            ArchiveFormat::TarGz if base.ends_with(".gz") => base.to_string(),
            ArchiveFormat::TarGz => format!("{}.gz", base),
        }
    }
}

/// Write `tree` as a tar stream into `out` and return the writer
#[instrument(skip_all, fields(source_root = %tree.source_root().display()))]
pub fn write_tar<W: Write>(tree: &AssetTree, out: W) -> Result<W, ArchiveError> {
    let mut builder = Builder::new(out);
    let mut writer = TreeArchiver {
        tree,
        builder: &mut builder,
        files: 0,
        bytes: 0,
    };
    writer.append_directory(tree.root())?;
    writer.append_node(tree.root())?;
    let (files, bytes) = (writer.files, writer.bytes);
    let out = builder.into_inner()?;
    info!(files, bytes, "Wrote archive stream");
    Ok(out)
}

/// Write `tree` as a gzip-compressed tar stream into `out`
pub fn write_tar_gz<W: Write>(tree: &AssetTree, out: W) -> Result<W, ArchiveError> {
    let encoder: GzEncoder<W> = GzBuilder::new()
        .mtime(0)
        .operating_system(255)
        .write(out, flate2::Compression::best());
    let encoder = write_tar(tree, encoder)?;
    Ok(encoder.finish()?)
}

/// Write the archive for `tree` to `path`
pub fn write_archive_file(
    tree: &AssetTree,
    path: &Path,
    format: ArchiveFormat,
) -> Result<(), BuildError> {
    let output_error = |source: io::Error| BuildError::Output {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(output_error)?;
    let writer = BufWriter::new(file);
    let writer = match format {
        ArchiveFormat::Tar => write_tar(tree, writer)?,
        ArchiveFormat::TarGz => write_tar_gz(tree, writer)?,
    };
    writer
        .into_inner()
        .map_err(|e| output_error(e.into_error()))?
        .sync_all()
        .map_err(output_error)?;
    info!(path = %path.display(), ?format, "Wrote archive");
    Ok(())
}

struct TreeArchiver<'a, W: Write> {
    tree: &'a AssetTree,
    builder: &'a mut Builder<W>,
    files: usize,
    bytes: u64,
}

impl<'a, W: Write> TreeArchiver<'a, W> {
    /// Files of `node`, then each child directory's header and subtree
    fn append_node(&mut self, node: &AssetNode) -> Result<(), ArchiveError> {
        for entry in node.entries() {
            self.append_file(entry)?;
        }
        for child in node.children() {
            if child.is_listed() {
                self.append_directory(child)?;
            }
            self.append_node(child)?;
        }
        Ok(())
    }

    fn append_directory(&mut self, node: &AssetNode) -> Result<(), ArchiveError> {
        let mode = match node.source_dir() {
            Some(source_dir) => {
                let on_disk = path::on_disk(self.tree.source_root(), source_dir);
                let metadata = fs::metadata(&on_disk).map_err(|source| {
                    ArchiveError::SourceRead {
                        path: on_disk.clone(),
                        source,
                    }
                })?;
                mode_of(&metadata, DEFAULT_DIR_MODE)
            }
            None => DEFAULT_DIR_MODE,
        };
        let archive_path = if node.is_root() {
            "./".to_string()
        } else {
            node.dest_prefix().to_string()
        };

        let mut header = deterministic_header(EntryType::Directory, 0, mode);
        self.builder
            .append_data(&mut header, &archive_path, io::empty())?;
        debug!(path = %archive_path, mode = %format!("{:o}", mode), "Archived directory");
        Ok(())
    }

    fn append_file(&mut self, entry: &ManifestEntry) -> Result<(), ArchiveError> {
        let on_disk: PathBuf = self.tree.source_path_of(entry);
        let read_error = |source: io::Error| ArchiveError::SourceRead {
            path: on_disk.clone(),
            source,
        };
        let file = File::open(&on_disk).map_err(read_error)?;
        let metadata = file.metadata().map_err(read_error)?;
        if !metadata.is_file() || metadata.len() != entry.content_length {
            return Err(ArchiveError::SourceChanged {
                path: on_disk.clone(),
                expected: entry.content_length,
                actual: metadata.len(),
            });
        }

        let mut header = deterministic_header(
            EntryType::Regular,
            entry.content_length,
            mode_of(&metadata, DEFAULT_FILE_MODE),
        );
        let mut content = DigestingReader::new(file.take(entry.content_length));
        self.builder
            .append_data(&mut header, &entry.dest_path, &mut content)
            .map_err(read_error)?;
        let archived = content.finish();
        if archived.size != entry.content_length {
            return Err(ArchiveError::SourceChanged {
                path: on_disk,
                expected: entry.content_length,
                actual: archived.size,
            });
        }
        if archived.hex != entry.digest {
            return Err(ArchiveError::DigestMismatch {
                path: on_disk,
                expected: entry.digest.clone(),
                actual: archived.hex,
            });
        }

        self.files += 1;
        self.bytes += entry.content_length;
        Ok(())
    }
}

fn deterministic_header(entry_type: EntryType, size: u64, mode: u32) -> Header {
    let mut header = Header::new_gnu();
    header.set_entry_type(entry_type);
    header.set_size(size);
    header.set_mode(mode);
    header.set_uid(0);
    header.set_gid(0);
    header.set_mtime(0);
    header
}

#[cfg(unix)]
fn mode_of(metadata: &Metadata, _default: u32) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn mode_of(metadata: &Metadata, default: u32) -> u32 {
    if metadata.permissions().readonly() {
        default & !0o222
    } else {
        default
    }
}
