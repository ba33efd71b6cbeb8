//! Property-based tests for digest and matching guarantees

mod determinism;
