// src/core/hashing/mod.rs

//! Consistent-hashing rings used by the storage fleet, and the factory that
//! selects one from the algorithm name a daemon reports.

pub mod carbon;
pub mod jump;

use crate::core::RingProbeError;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use strum_macros::{Display, EnumString};

pub use carbon::CarbonHashRing;
pub use jump::JumpHashRing;

/// One physical daemon instance as it appears on a ring.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Node {
    /// The hostname, unique within a cluster.
    pub name: String,
    /// Optional sub-instance label. Empty when the token carried none.
    pub instance: String,
}

impl Node {
    pub fn new(name: impl Into<String>, instance: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instance: instance.into(),
        }
    }

    /// Parses a `name` or `name:instance` token, splitting on the first colon.
    pub fn parse(token: &str) -> Self {
        match token.split_once(':') {
            Some((name, instance)) => Self::new(name, instance),
            None => Self::new(token, ""),
        }
    }
}

impl FromStr for Node {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}:{}", self.name, self.instance)
        }
    }
}

/// The ring algorithms a daemon may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum RingAlgorithm {
    /// carbon-cache.py compatible ring; ignores the replica count.
    #[strum(serialize = "carbon")]
    Carbon,
    /// Jump consistent hashing over FNV-1a 64-bit key hashes.
    #[strum(serialize = "jump_fnv1a")]
    JumpFnv1a,
}

/// A consistent-hashing ring populated with the fleet's nodes.
pub trait HashRing: fmt::Debug + Send + Sync {
    fn algorithm(&self) -> RingAlgorithm;

    /// Adds a member. Nodes sharing a hostname but not an instance are distinct.
    fn add_node(&mut self, node: Node);

    /// Returns the node that owns `key`, or `None` on an empty ring.
    fn get_node(&self, key: &str) -> Option<&Node>;

    /// Returns up to `count` distinct nodes for `key`, primary owner first.
    fn get_nodes(&self, key: &str, count: usize) -> Vec<&Node>;

    /// All members in the order they were added.
    fn nodes(&self) -> &[Node];

    fn len(&self) -> usize {
        self.nodes().len()
    }

    fn is_empty(&self) -> bool {
        self.nodes().is_empty()
    }
}

/// Constructs an empty ring for the named algorithm.
///
/// `replicas` seeds the jump ring and is ignored by the carbon ring.
pub fn build_ring(algorithm: &str, replicas: usize) -> Result<Box<dyn HashRing>, RingProbeError> {
    let algo = RingAlgorithm::from_str(algorithm)
        .map_err(|_| RingProbeError::UnknownAlgorithm(algorithm.to_string()))?;
    Ok(match algo {
        RingAlgorithm::Carbon => Box::new(CarbonHashRing::new()),
        RingAlgorithm::JumpFnv1a => Box::new(JumpHashRing::new(replicas)),
    })
}
