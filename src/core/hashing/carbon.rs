// src/core/hashing/carbon.rs

//! The ring used by carbon-cache.py's `ConsistentHashRing`.
//!
//! Each node owns `CARBON_REPLICAS` positions on a 16-bit ring. A position is
//! the first two bytes of the MD5 digest of `"<node key>:<i>"`, where the node
//! key is the Python tuple repr carbon itself hashes, e.g. `('host', 'a')` or
//! `('host', None)`.

use super::{HashRing, Node, RingAlgorithm};
use md5::{Digest, Md5};
use tracing::debug;

/// Positions per node, fixed by carbon-cache.
pub const CARBON_REPLICAS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct RingEntry {
    position: u16,
    key: String,
    node_index: usize,
}

#[derive(Debug, Clone, Default)]
pub struct CarbonHashRing {
    nodes: Vec<Node>,
    ring: Vec<RingEntry>,
}

impl CarbonHashRing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of occupied positions on the ring.
    pub fn position_count(&self) -> usize {
        self.ring.len()
    }

    /// Index into `ring` of the first entry at or after the key's position.
    fn first_entry(&self, key: &str) -> Option<usize> {
        if self.ring.is_empty() {
            return None;
        }
        let position = ring_position(key);
        let idx = self.ring.partition_point(|e| e.position < position);
        Some(if idx == self.ring.len() { 0 } else { idx })
    }
}

/// The string carbon hashes for a node: `('name', 'instance')` or `('name', None)`.
pub fn node_key(node: &Node) -> String {
    if node.instance.is_empty() {
        format!("('{}', None)", node.name)
    } else {
        format!("('{}', '{}')", node.name, node.instance)
    }
}

/// Maps a key onto the 16-bit ring.
pub fn ring_position(key: &str) -> u16 {
    let digest = Md5::digest(key.as_bytes());
    u16::from_be_bytes([digest[0], digest[1]])
}

impl HashRing for CarbonHashRing {
    fn algorithm(&self) -> RingAlgorithm {
        RingAlgorithm::Carbon
    }

    fn add_node(&mut self, node: Node) {
        let key = node_key(&node);
        let node_index = self.nodes.len();
        for i in 0..CARBON_REPLICAS {
            self.ring.push(RingEntry {
                position: ring_position(&format!("{key}:{i}")),
                key: key.clone(),
                node_index,
            });
        }
        self.ring.sort();
        debug!(node = %node, "added node to carbon ring");
        self.nodes.push(node);
    }

    fn get_node(&self, key: &str) -> Option<&Node> {
        self.first_entry(key)
            .map(|idx| &self.nodes[self.ring[idx].node_index])
    }

    fn get_nodes(&self, key: &str, count: usize) -> Vec<&Node> {
        let Some(start) = self.first_entry(key) else {
            return Vec::new();
        };
        let wanted = count.min(self.nodes.len());
        let mut seen: Vec<usize> = Vec::with_capacity(wanted);
        // Walk clockwise, wrapping once, collecting distinct nodes.
        for entry in self.ring[start..].iter().chain(self.ring[..start].iter()) {
            if seen.len() == wanted {
                break;
            }
            if !seen.contains(&entry.node_index) {
                seen.push(entry.node_index);
            }
        }
        seen.into_iter().map(|i| &self.nodes[i]).collect()
    }

    fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}

