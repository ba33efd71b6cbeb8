//! Shared test utilities for integration tests

use asset_manifest::context::BuildContext;
use asset_manifest::manifest::{self, Manifest};
use asset_manifest::patterns::PatternSet;
use asset_manifest::tree::builder::{ScanResult, TreeBuilder};
use std::fs;
use std::path::Path;

pub const HELLO_SHA1: &str = "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d";
pub const WORLD_SHA1: &str = "7c211433f02071597741e6ff5a8ea34789abbf43";

/// `root/{a.txt:"hello", sub/b.txt:"world"}`
pub fn sample_tree(root: &Path) {
    fs::write(root.join("a.txt"), "hello").unwrap();
    fs::create_dir_all(root.join("sub")).unwrap();
    fs::write(root.join("sub").join("b.txt"), "world").unwrap();
}

pub fn context(root: &Path, exclude: &[&str], ignore: &[&str]) -> BuildContext {
    let patterns = PatternSet::new(exclude, ignore).unwrap();
    BuildContext::new(root, patterns)
        .unwrap()
        .with_revision("1")
        .with_url("http://patch.example/")
}

pub fn scan(root: &Path, exclude: &[&str], ignore: &[&str]) -> (BuildContext, ScanResult) {
    let ctx = context(root, exclude, ignore);
    let result = TreeBuilder::build(&ctx).unwrap();
    (ctx, result)
}

/// Manifest XML for `root` scanned with the given rules
pub fn manifest_xml(root: &Path, exclude: &[&str], ignore: &[&str]) -> String {
    let (ctx, result) = scan(root, exclude, ignore);
    let exclude: Vec<String> = exclude.iter().map(|s| s.to_string()).collect();
    let ignore: Vec<String> = ignore.iter().map(|s| s.to_string()).collect();
    manifest::serialize(&result.tree, ctx.revision(), ctx.url(), &exclude, &ignore)
}

/// Entry names in manifest order
pub fn entry_names(xml: &str) -> Vec<String> {
    Manifest::parse(xml)
        .unwrap()
        .entries
        .iter()
        .map(|e| e.name().to_string())
        .collect()
}
