//! Archive contents agree with the manifest, and survive extraction

use super::test_utils::{manifest_xml, sample_tree, scan};
use asset_manifest::archive::{write_archive_file, write_tar, ArchiveFormat};
use asset_manifest::manifest::{Manifest, ManifestRecord};
use std::fs;
use std::io::Read;
use std::path::Path;
use tempfile::TempDir;

fn richer_tree(root: &Path) {
    sample_tree(root);
    fs::create_dir_all(root.join("sub/deeper/deepest")).unwrap();
    fs::create_dir_all(root.join("empty")).unwrap();
    fs::write(root.join("sub/deeper/c.dat"), vec![7u8; 70_000]).unwrap();
    fs::write(root.join("sub/deeper/deepest/d.txt"), "d").unwrap();
}

fn archive_names(bytes: &[u8]) -> Vec<String> {
    let mut archive = tar::Archive::new(bytes);
    archive
        .entries()
        .unwrap()
        .map(|e| {
            let e = e.unwrap();
            let path = e.path().unwrap().to_string_lossy().into_owned();
            path.trim_end_matches('/').to_string()
        })
        .collect()
}

#[test]
fn test_archive_paths_equal_manifest_names() {
    let temp_dir = TempDir::new().unwrap();
    richer_tree(temp_dir.path());
    let (_, result) = scan(temp_dir.path(), &[], &[]);
    let manifest = Manifest::default().with_tree(&result.tree);

    let bytes = write_tar(&result.tree, Vec::new()).unwrap();
    let mut in_archive = archive_names(&bytes);
    assert_eq!(in_archive.remove(0), ".");
    in_archive.sort();

    let mut in_manifest: Vec<String> = manifest
        .entries
        .iter()
        .map(|e| e.name().to_string())
        .collect();
    in_manifest.sort();
    assert_eq!(in_archive, in_manifest);
}

#[test]
fn test_extract_and_rescan_is_identical() {
    let source = TempDir::new().unwrap();
    richer_tree(source.path());
    let original = manifest_xml(source.path(), &[], &[]);

    let out = TempDir::new().unwrap();
    let archive_path = out.path().join("mv.tar");
    let (_, result) = scan(source.path(), &[], &[]);
    write_archive_file(&result.tree, &archive_path, ArchiveFormat::Tar).unwrap();

    let extracted = TempDir::new().unwrap();
    tar::Archive::new(fs::File::open(&archive_path).unwrap())
        .unpack(extracted.path())
        .unwrap();

    assert_eq!(manifest_xml(extracted.path(), &[], &[]), original);
}

#[test]
fn test_extract_and_rescan_with_rules() {
    let source = TempDir::new().unwrap();
    richer_tree(source.path());
    let exclude = ["empty"];
    let ignore = [r"a\.txt", "sub/deeper"];
    let original = manifest_xml(source.path(), &exclude, &ignore);

    let (_, result) = scan(source.path(), &exclude, &ignore);
    let bytes = write_tar(&result.tree, Vec::new()).unwrap();
    assert!(!archive_names(&bytes).contains(&"sub/deeper".to_string()));

    let extracted = TempDir::new().unwrap();
    tar::Archive::new(bytes.as_slice())
        .unpack(extracted.path())
        .unwrap();
    assert_eq!(manifest_xml(extracted.path(), &exclude, &ignore), original);
}

#[test]
fn test_archive_file_bytes_match_manifest_sizes() {
    let temp_dir = TempDir::new().unwrap();
    richer_tree(temp_dir.path());
    let (_, result) = scan(temp_dir.path(), &[], &[]);
    let manifest = Manifest::default().with_tree(&result.tree);
    let bytes = write_tar(&result.tree, Vec::new()).unwrap();

    let mut archive = tar::Archive::new(bytes.as_slice());
    for entry in archive.entries().unwrap() {
        let mut entry = entry.unwrap();
        if entry.header().entry_type() != tar::EntryType::Regular {
            continue;
        }
        let name = entry.path().unwrap().to_string_lossy().into_owned();
        let mut content = Vec::new();
        entry.read_to_end(&mut content).unwrap();
        let record = manifest.entries.iter().find(|e| e.name() == name).unwrap();
        match record {
            ManifestRecord::File { size, .. } => assert_eq!(*size, content.len() as u64),
            other => panic!("archive file {} listed as {:?}", name, other),
        }
    }
}

#[test]
fn test_gzip_archive_file() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("src");
    fs::create_dir_all(&source).unwrap();
    sample_tree(&source);
    let (_, result) = scan(&source, &[], &[]);

    let path = temp_dir.path().join(ArchiveFormat::TarGz.file_name("mv.tar"));
    write_archive_file(&result.tree, &path, ArchiveFormat::TarGz).unwrap();

    let decoder = flate2::read::GzDecoder::new(fs::File::open(&path).unwrap());
    let mut decoded = Vec::new();
    std::io::BufReader::new(decoder).read_to_end(&mut decoded).unwrap();
    assert_eq!(decoded, write_tar(&result.tree, Vec::new()).unwrap());
}
