//! Integration tests for the asset manifest builder

mod archive_roundtrip;
mod cli;
mod config_integration;
mod pattern_semantics;
mod test_utils;
