// src/core/topology/snapshot.rs

//! Defines what a single daemon reports about the ring, and the address
//! formats used to reach daemons.

use crate::core::RingProbeError;
use serde::{Deserialize, Serialize};

/// One daemon's self-reported view of the cluster.
///
/// The serialized field names match the JSON that daemons serve from their
/// hashring endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RingSnapshot {
    /// The reporting daemon's own hostname.
    #[serde(rename = "Name", default)]
    pub name: String,
    /// Ring members as `name` or `name:instance` tokens. Order is significant.
    #[serde(rename = "Nodes", default)]
    pub nodes: Vec<String>,
    #[serde(rename = "Algo")]
    pub algorithm: String,
    /// Algorithm-specific; unused by the carbon ring.
    #[serde(rename = "Replicas", default)]
    pub replicas: usize,
}

impl RingSnapshot {
    pub fn new<I, S>(algorithm: &str, replicas: usize, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: String::new(),
            nodes: nodes.into_iter().map(Into::into).collect(),
            algorithm: algorithm.to_string(),
            replicas,
        }
    }
}

/// The outcome of probing one peer: either its snapshot, or an explicit
/// record that it could not be reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerSnapshot {
    Reported { addr: String, snapshot: RingSnapshot },
    Unreachable { addr: String, reason: String },
}

impl PeerSnapshot {
    /// The `host:port` the peer was probed at.
    pub fn addr(&self) -> &str {
        match self {
            PeerSnapshot::Reported { addr, .. } | PeerSnapshot::Unreachable { addr, .. } => addr,
        }
    }
}

/// Splits `host:port` into its parts. IPv6 hosts must be bracketed
/// (`[::1]:4242`); the brackets are stripped from the returned host.
pub fn split_host_port(addr: &str) -> Result<(String, String), RingProbeError> {
    let malformed = || RingProbeError::AddressFormat(addr.to_string());

    let (host, port) = if let Some(rest) = addr.strip_prefix('[') {
        let (host, tail) = rest.split_once(']').ok_or_else(malformed)?;
        (host, tail.strip_prefix(':').ok_or_else(malformed)?)
    } else {
        let (host, port) = addr.rsplit_once(':').ok_or_else(malformed)?;
        if host.contains(':') {
            return Err(malformed());
        }
        (host, port)
    };

    if host.is_empty() || port.parse::<u16>().is_err() {
        return Err(malformed());
    }
    Ok((host.to_string(), port.to_string()))
}

/// The inverse of [`split_host_port`].
pub fn join_host_port(host: &str, port: &str) -> String {
    if host.contains(':') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}
