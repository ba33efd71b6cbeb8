//! Asset tree
//!
//! In-memory inventory of a source directory: one [`node::AssetNode`] per
//! directory and one [`node::ManifestEntry`] per file, each file carrying the
//! SHA-1 digest and size of its content at scan time.

pub mod builder;
pub mod hasher;
pub mod node;
pub mod path;
pub mod walker;
