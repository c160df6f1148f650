// src/core/topology/mod.rs

//! Topology discovery: probing daemons for their view of the ring,
//! cross-checking those views, and caching the validated result.

pub mod cache;
pub mod checker;
pub mod prober;
pub mod snapshot;

// Re-export key types for easier access from other modules.
pub use cache::{ClusterConfig, DiscoveryOptions, TopologyCache};
pub use checker::Inconsistency;
pub use prober::{HttpProber, TopologyProber};
pub use snapshot::{PeerSnapshot, RingSnapshot};
