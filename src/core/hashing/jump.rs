// src/core/hashing/jump.rs

//! Jump consistent hashing (Lamping & Veach) over FNV-1a 64-bit key hashes.
//!
//! Unlike the carbon ring, bucket assignment depends on the order nodes were
//! added, which is why every daemon must list its nodes identically.

use super::{HashRing, Node, RingAlgorithm};
use tracing::debug;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

pub fn fnv1a_64(data: &[u8]) -> u64 {
    data.iter().fold(FNV_OFFSET_BASIS, |hash, &b| {
        (hash ^ u64::from(b)).wrapping_mul(FNV_PRIME)
    })
}

/// Maps a 64-bit key to a bucket in `0..buckets`. Returns `None` for zero buckets.
pub fn jump_hash(mut key: u64, buckets: usize) -> Option<usize> {
    if buckets == 0 {
        return None;
    }
    let mut b: i64 = -1;
    let mut j: i64 = 0;
    while j < buckets as i64 {
        b = j;
        key = key.wrapping_mul(2_862_933_555_777_941_757).wrapping_add(1);
        j = ((b + 1) as f64 * ((1u64 << 31) as f64 / ((key >> 33) + 1) as f64)) as i64;
    }
    Some(b as usize)
}

#[derive(Debug, Clone, Default)]
pub struct JumpHashRing {
    nodes: Vec<Node>,
    replicas: usize,
}

impl JumpHashRing {
    pub fn new(replicas: usize) -> Self {
        Self {
            nodes: Vec::new(),
            replicas,
        }
    }

    /// The replica count this ring was seeded with.
    pub fn replicas(&self) -> usize {
        self.replicas
    }

    fn bucket(&self, key: &str) -> Option<usize> {
        jump_hash(fnv1a_64(key.as_bytes()), self.nodes.len())
    }
}

impl HashRing for JumpHashRing {
    fn algorithm(&self) -> RingAlgorithm {
        RingAlgorithm::JumpFnv1a
    }

    fn add_node(&mut self, node: Node) {
        debug!(node = %node, replicas = self.replicas, "added node to jump ring");
        self.nodes.push(node);
    }

    fn get_node(&self, key: &str) -> Option<&Node> {
        self.bucket(key).map(|b| &self.nodes[b])
    }

    fn get_nodes(&self, key: &str, count: usize) -> Vec<&Node> {
        let Some(start) = self.bucket(key) else {
            return Vec::new();
        };
        let n = self.nodes.len();
        (0..count.min(n))
            .map(|offset| &self.nodes[(start + offset) % n])
            .collect()
    }

    fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}

