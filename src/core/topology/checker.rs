// src/core/topology/checker.rs

//! Decides whether every daemon in the fleet agrees with the seed's ring.
//!
//! The comparison is strict: same algorithm, same number of nodes, and the
//! same node token at every index. Ring placement depends on node order, so
//! two daemons that list the same members in a different order would route
//! metrics differently. Replica counts are not compared, since not every
//! algorithm has a meaningful one.

use super::snapshot::{PeerSnapshot, RingSnapshot};
use thiserror::Error;
use tracing::warn;

/// The first disagreement found between the seed and its peers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Inconsistency {
    #[error("expected {expected} peer snapshots but collected {actual}")]
    PeerCountMismatch { expected: usize, actual: usize },

    #[error("peer {peer} did not report its ring: {reason}")]
    PeerUnreachable { peer: String, reason: String },

    #[error("peer {peer} uses algorithm '{found}' but the seed uses '{expected}'")]
    AlgorithmMismatch {
        peer: String,
        expected: String,
        found: String,
    },

    #[error("peer {peer} reports {found} nodes but the seed reports {expected}")]
    NodeCountMismatch {
        peer: String,
        expected: usize,
        found: usize,
    },

    #[error("peer {peer} lists '{found}' at position {index} where the seed lists '{expected}'")]
    NodeOrderMismatch {
        peer: String,
        index: usize,
        expected: String,
        found: String,
    },
}

impl Inconsistency {
    /// The peer responsible, if the problem is tied to a single one.
    pub fn peer(&self) -> Option<&str> {
        match self {
            Inconsistency::PeerCountMismatch { .. } => None,
            Inconsistency::PeerUnreachable { peer, .. }
            | Inconsistency::AlgorithmMismatch { peer, .. }
            | Inconsistency::NodeCountMismatch { peer, .. }
            | Inconsistency::NodeOrderMismatch { peer, .. } => Some(peer),
        }
    }
}

/// Compares every peer against `reference`, in probe order, and returns the
/// first inconsistency.
///
/// `expected_peers` is the number of peers discovery attempted to probe.
pub fn check(
    reference: &RingSnapshot,
    peers: &[PeerSnapshot],
    expected_peers: usize,
) -> Result<(), Inconsistency> {
    if peers.len() != expected_peers {
        return Err(Inconsistency::PeerCountMismatch {
            expected: expected_peers,
            actual: peers.len(),
        });
    }

    for peer in peers {
        let snapshot = match peer {
            PeerSnapshot::Reported { snapshot, .. } => snapshot,
            PeerSnapshot::Unreachable { addr, reason } => {
                return Err(Inconsistency::PeerUnreachable {
                    peer: addr.clone(),
                    reason: reason.clone(),
                });
            }
        };
        compare(reference, peer.addr(), snapshot)?;
    }

    Ok(())
}

fn compare(reference: &RingSnapshot, peer: &str, other: &RingSnapshot) -> Result<(), Inconsistency> {
    if other.algorithm != reference.algorithm {
        return Err(Inconsistency::AlgorithmMismatch {
            peer: peer.to_string(),
            expected: reference.algorithm.clone(),
            found: other.algorithm.clone(),
        });
    }
    if other.nodes.len() != reference.nodes.len() {
        return Err(Inconsistency::NodeCountMismatch {
            peer: peer.to_string(),
            expected: reference.nodes.len(),
            found: other.nodes.len(),
        });
    }
    if let Some((index, (expected, found))) = reference
        .nodes
        .iter()
        .zip(&other.nodes)
        .enumerate()
        .find(|(_, (a, b))| a != b)
    {
        return Err(Inconsistency::NodeOrderMismatch {
            peer: peer.to_string(),
            index,
            expected: expected.clone(),
            found: found.clone(),
        });
    }
    Ok(())
}

/// Like [`check`], but logs the reason and collapses the result to a verdict.
pub fn is_healthy(reference: &RingSnapshot, peers: &[PeerSnapshot], expected_peers: usize) -> bool {
    match check(reference, peers, expected_peers) {
        Ok(()) => true,
        Err(reason) => {
            warn!("Cluster is unhealthy: {}", reason);
            false
        }
    }
}
