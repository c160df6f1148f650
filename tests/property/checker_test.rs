// tests/property/checker_test.rs

//! Property-based tests for the consistency checker

use proptest::prelude::*;
use ringprobe::topology::checker::check;
use ringprobe::topology::{Inconsistency, PeerSnapshot, RingSnapshot};

fn node_tokens() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,8}(:[0-9]{1,2})?", 1..=12)
}

fn peers_of(snapshot: &RingSnapshot, count: usize) -> Vec<PeerSnapshot> {
    (0..count)
        .map(|i| PeerSnapshot::Reported {
            addr: format!("peer{i}:4242"),
            snapshot: snapshot.clone(),
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 200,
        ..ProptestConfig::default()
    })]

    #[test]
    fn test_identical_snapshots_are_always_healthy(
        nodes in node_tokens(),
        algorithm in prop::sample::select(vec!["carbon", "jump_fnv1a"]),
        peer_count in 0usize..6,
    ) {
        let seed = RingSnapshot::new(algorithm, 1, nodes);
        let peers = peers_of(&seed, peer_count);
        prop_assert_eq!(check(&seed, &peers, peer_count), Ok(()));
    }

    #[test]
    fn test_any_positional_difference_is_detected(
        nodes in node_tokens(),
        index in any::<prop::sample::Index>(),
        replacement in "[A-Z]{1,8}",
    ) {
        let seed = RingSnapshot::new("carbon", 1, nodes.clone());
        let at = index.index(nodes.len());
        let mut changed = nodes;
        changed[at] = replacement.clone();
        let peer = RingSnapshot::new("carbon", 1, changed);

        let result = check(&seed, &peers_of(&peer, 1), 1);

        prop_assert_eq!(
            result,
            Err(Inconsistency::NodeOrderMismatch {
                peer: "peer0:4242".to_string(),
                index: at,
                expected: seed.nodes[at].clone(),
                found: replacement,
            })
        );
    }

    #[test]
    fn test_rotation_of_distinct_nodes_is_unhealthy(
        nodes in prop::collection::btree_set("[a-z]{1,8}", 2..=10),
        shift in 1usize..10,
    ) {
        let nodes: Vec<String> = nodes.into_iter().collect();
        let mut rotated = nodes.clone();
        rotated.rotate_left(shift % nodes.len());
        prop_assume!(rotated != nodes);

        let seed = RingSnapshot::new("jump_fnv1a", 1, nodes);
        let peer = RingSnapshot::new("jump_fnv1a", 1, rotated);

        prop_assert!(check(&seed, &peers_of(&peer, 1), 1).is_err());
    }
}
