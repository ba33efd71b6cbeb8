//! Property-based tests for determinism guarantees

use asset_manifest::patterns::PatternSet;
use asset_manifest::tree::hasher::{compute_content_hash, ContentDigester};
use proptest::prelude::*;

proptest! {
    /// Chunk size never changes the digest
    #[test]
    fn test_digest_independent_of_chunk_size(
        content in proptest::collection::vec(any::<u8>(), 0..4096),
        chunk in 1usize..512,
    ) {
        let whole = compute_content_hash(&content);
        let digest = ContentDigester::new(chunk)
            .digest_reader(content.as_slice())
            .unwrap();
        prop_assert_eq!(digest.hex, whole);
        prop_assert_eq!(digest.size, content.len() as u64);
    }

    /// A literal rule covers exactly its own path
    #[test]
    fn test_literal_rule_is_anchored(
        name in "[a-z]{1,8}",
        suffix in "[a-z./]{1,6}",
    ) {
        let mut set = PatternSet::empty();
        set.exclude_literal(&name).unwrap();
        prop_assert!(set.is_excluded(&name));
        let longer = format!("{}{}", name, suffix);
        let prefixed = format!("x{}", name);
        prop_assert!(!set.is_excluded(&longer));
        prop_assert!(!set.is_excluded(&prefixed));
    }

    /// Digest is a 40-char lowercase hex string
    #[test]
    fn test_digest_shape(content in proptest::collection::vec(any::<u8>(), 0..256)) {
        let hex = compute_content_hash(&content);
        prop_assert_eq!(hex.len(), 40);
        prop_assert!(hex.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)));
    }
}
