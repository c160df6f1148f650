// tests/property/ring_test.rs

//! Property-based tests for ring construction and lookup

use proptest::prelude::*;
use ringprobe::core::hashing::{Node, build_ring};
use ringprobe::core::hashing::jump::jump_hash;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 100,
        ..ProptestConfig::default()
    })]

    #[test]
    fn test_lookup_always_returns_a_member(
        algorithm in prop::sample::select(vec!["carbon", "jump_fnv1a"]),
        tokens in prop::collection::vec("[a-z]{1,8}(:[0-9])?", 1..=8),
        key in ".{0,64}",
    ) {
        let mut ring = build_ring(algorithm, 2).unwrap();
        for t in &tokens {
            ring.add_node(Node::parse(t));
        }

        let owner = ring.get_node(&key).unwrap();
        prop_assert!(ring.nodes().contains(owner));
        prop_assert_eq!(ring.len(), tokens.len());
    }

    #[test]
    fn test_identically_built_rings_agree(
        algorithm in prop::sample::select(vec!["carbon", "jump_fnv1a"]),
        tokens in prop::collection::vec("[a-z]{1,8}(:[0-9])?", 1..=8),
        keys in prop::collection::vec("[a-z.]{1,32}", 1..=16),
    ) {
        let mut first = build_ring(algorithm, 1).unwrap();
        let mut second = build_ring(algorithm, 1).unwrap();
        for t in &tokens {
            first.add_node(Node::parse(t));
            second.add_node(Node::parse(t));
        }

        for key in &keys {
            prop_assert_eq!(first.get_node(key), second.get_node(key));
        }
    }

    #[test]
    fn test_jump_hash_in_range(key in any::<u64>(), buckets in 1usize..10_000) {
        let bucket = jump_hash(key, buckets).unwrap();
        prop_assert!(bucket < buckets);
    }
}
