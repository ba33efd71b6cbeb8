//! Asset manifest builder
//!
//! Scans an asset directory, records every file's SHA-1 digest and size in an
//! XML patch manifest, and packs the same tree into a tar archive. Update
//! clients compare manifests per path and download only what changed.

pub mod archive;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod patterns;
pub mod tree;
pub mod version;
