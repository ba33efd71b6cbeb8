//! Exclude and ignore behavior across a scanned tree

use super::test_utils::{entry_names, manifest_xml, scan};
use std::fs;
use tempfile::TempDir;

fn layered_tree(root: &std::path::Path) {
    for dir in ["keep", "keep/.svn", "cache", "cache/deep", "docs"] {
        fs::create_dir_all(root.join(dir)).unwrap();
    }
    fs::write(root.join("keep/a.txt"), "a").unwrap();
    fs::write(root.join("keep/.svn/entries"), "svn").unwrap();
    fs::write(root.join("cache/c.bin"), "c").unwrap();
    fs::write(root.join("cache/deep/d.bin"), "d").unwrap();
    fs::write(root.join("docs/readme.txt~"), "backup").unwrap();
    fs::write(root.join("docs/readme.txt"), "readme").unwrap();
}

#[test]
fn test_excluded_directory_hides_whole_subtree() {
    let temp_dir = TempDir::new().unwrap();
    layered_tree(temp_dir.path());

    let names = entry_names(&manifest_xml(temp_dir.path(), &[r"(.*/)?\.svn", "cache"], &[]));
    assert!(names.iter().all(|n| !n.contains(".svn")));
    assert!(names.iter().all(|n| !n.starts_with("cache")));
    assert!(names.contains(&"keep/a.txt".to_string()));
}

#[test]
fn test_ignored_directory_is_recursed() {
    let temp_dir = TempDir::new().unwrap();
    layered_tree(temp_dir.path());

    let names = entry_names(&manifest_xml(temp_dir.path(), &[], &["cache"]));
    assert!(!names.contains(&"cache".to_string()));
    assert!(names.contains(&"cache/c.bin".to_string()));
    assert!(names.contains(&"cache/deep".to_string()));
    assert!(names.contains(&"cache/deep/d.bin".to_string()));
}

#[test]
fn test_ignore_rule_only_drops_own_entry() {
    let temp_dir = TempDir::new().unwrap();
    layered_tree(temp_dir.path());

    let names = entry_names(&manifest_xml(temp_dir.path(), &[], &[r"(.*/)?.*~"]));
    assert!(!names.contains(&"docs/readme.txt~".to_string()));
    assert!(names.contains(&"docs/readme.txt".to_string()));
}

#[test]
fn test_prefix_match_does_not_apply() {
    let temp_dir = TempDir::new().unwrap();
    layered_tree(temp_dir.path());

    // "kee" matches a prefix of "keep" only
    let names = entry_names(&manifest_xml(temp_dir.path(), &["kee"], &["docs/readme"]));
    assert!(names.contains(&"keep".to_string()));
    assert!(names.contains(&"docs/readme.txt".to_string()));
}

#[test]
fn test_exclude_wins_over_ignore() {
    let temp_dir = TempDir::new().unwrap();
    layered_tree(temp_dir.path());

    let (_, result) = scan(temp_dir.path(), &["cache"], &["cache"]);
    assert!(result.tree.find_directory("cache").is_none());
    assert!(result.tree.find_entry("cache/c.bin").is_none());
}

#[test]
fn test_rules_match_relative_paths_not_absolute() {
    let temp_dir = TempDir::new().unwrap();
    layered_tree(temp_dir.path());
    let absolute = format!("{}.*", regex::escape(&temp_dir.path().to_string_lossy()));

    let names = entry_names(&manifest_xml(temp_dir.path(), &[&absolute], &[]));
    assert!(names.contains(&"keep/a.txt".to_string()));
}
