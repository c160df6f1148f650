// src/core/errors.rs

//! Defines the primary error type for topology discovery.

use std::time::Duration;
use thiserror::Error;

/// Every failure that discovery can report.
///
/// Only `Probe`, `UnknownAlgorithm` and `AddressFormat` ever reach a caller of
/// `TopologyCache::get_cluster_config`. Failures while probing a peer are
/// folded into the health verdict as `PeerSnapshot::Unreachable`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RingProbeError {
    /// The seed daemon could not be queried.
    #[error("Cannot communicate with daemon at {addr}: {reason}")]
    Probe { addr: String, reason: String },

    #[error("Unknown consistent hash algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("Invalid host:port representation: {0}")]
    AddressFormat(String),

    #[error("Probe of {addr} timed out after {after:?}")]
    Timeout { addr: String, after: Duration },

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("Internal Error: {0}")]
    Internal(String),
}

impl RingProbeError {
    /// Rewrites a transport-level failure as a fatal seed probe error.
    pub fn into_seed_failure(self, addr: &str) -> Self {
        match self {
            e @ (RingProbeError::Probe { .. }
            | RingProbeError::UnknownAlgorithm(_)
            | RingProbeError::AddressFormat(_)) => e,
            other => RingProbeError::Probe {
                addr: addr.to_string(),
                reason: other.to_string(),
            },
        }
    }
}

// --- From trait implementations for easy error conversion ---

impl From<reqwest::Error> for RingProbeError {
    fn from(e: reqwest::Error) -> Self {
        RingProbeError::Http(e.to_string())
    }
}

impl From<serde_json::Error> for RingProbeError {
    fn from(e: serde_json::Error) -> Self {
        RingProbeError::Http(format!("malformed hashring reply: {e}"))
    }
}
