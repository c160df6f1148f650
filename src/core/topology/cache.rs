// src/core/topology/cache.rs

//! Runs topology discovery once per process and memoizes the result.
//!
//! Discovery probes the seed daemon, builds the ring it describes, probes
//! every other daemon on that ring and checks that they all agree. The
//! result is assembled in a local value and published only when the seed
//! phase succeeds; a failed attempt leaves the cache empty so a later call
//! can try again.

use super::checker::{self, Inconsistency};
use super::prober::TopologyProber;
use super::snapshot::{PeerSnapshot, RingSnapshot, join_host_port, split_host_port};
use crate::config::ProbeConfig;
use crate::core::RingProbeError;
use crate::core::hashing::{HashRing, Node, build_ring};
use crate::core::metrics::{
    CLUSTER_HEALTHY, DISCOVERIES_TOTAL, PROBE_FAILURES_TOTAL, PROBE_LATENCY_SECONDS, PROBES_TOTAL,
};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{error, info, warn};

/// The process-wide cache installed by [`TopologyCache::install_global`].
static GLOBAL_CACHE: once_cell::sync::OnceCell<TopologyCache> = once_cell::sync::OnceCell::new();

/// Knobs for a discovery run.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Upper bound on a single probe, seed or peer.
    pub probe_timeout: Duration,
    /// How many peer probes may be in flight at once.
    pub max_concurrent_probes: usize,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(5),
            max_concurrent_probes: 8,
        }
    }
}

impl From<&ProbeConfig> for DiscoveryOptions {
    fn from(config: &ProbeConfig) -> Self {
        Self {
            probe_timeout: config.timeout,
            max_concurrent_probes: config.max_concurrent,
        }
    }
}

/// The validated topology of the fleet, as described by the seed daemon.
#[derive(Debug)]
pub struct ClusterConfig {
    port: String,
    servers: Vec<String>,
    hash_ring: Box<dyn HashRing>,
    healthy: bool,
    inconsistency: Option<Inconsistency>,
    seed: RingSnapshot,
}

impl ClusterConfig {
    /// The port every daemon in the fleet listens on.
    pub fn port(&self) -> &str {
        &self.port
    }

    /// One hostname per ring node, in the seed's order.
    pub fn servers(&self) -> &[String] {
        &self.servers
    }

    pub fn hash_ring(&self) -> &dyn HashRing {
        self.hash_ring.as_ref()
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy
    }

    /// Why the cluster was judged unhealthy, if it was.
    pub fn inconsistency(&self) -> Option<&Inconsistency> {
        self.inconsistency.as_ref()
    }

    /// The snapshot the ring was built from.
    pub fn seed_snapshot(&self) -> &RingSnapshot {
        &self.seed
    }

    /// `server:port` for every server.
    pub fn host_ports(&self) -> Vec<String> {
        self.servers
            .iter()
            .map(|server| join_host_port(server, &self.port))
            .collect()
    }
}

/// Memoizes the fleet's [`ClusterConfig`].
///
/// The first successful [`get_cluster_config`](Self::get_cluster_config)
/// publishes the result; every later call returns it without probing.
/// Concurrent first callers wait on a single discovery.
pub struct TopologyCache {
    prober: Arc<dyn TopologyProber>,
    options: DiscoveryOptions,
    published: OnceCell<Arc<ClusterConfig>>,
}

impl TopologyCache {
    pub fn new(prober: impl TopologyProber + 'static, options: DiscoveryOptions) -> Self {
        Self::with_prober(Arc::new(prober), options)
    }

    pub fn with_prober(prober: Arc<dyn TopologyProber>, options: DiscoveryOptions) -> Self {
        Self {
            prober,
            options,
            published: OnceCell::new(),
        }
    }

    /// Makes `self` the process-wide cache. Fails if one is already installed.
    pub fn install_global(self) -> Result<&'static TopologyCache, RingProbeError> {
        GLOBAL_CACHE.try_insert(self).map_err(|_| {
            RingProbeError::Internal("a process-wide topology cache is already installed".into())
        })
    }

    /// The process-wide cache, if one has been installed.
    pub fn global() -> Option<&'static TopologyCache> {
        GLOBAL_CACHE.get()
    }

    /// Returns the cached topology, discovering it from `seed` (`host:port`)
    /// if nothing has been published yet.
    pub async fn get_cluster_config(&self, seed: &str) -> Result<Arc<ClusterConfig>, RingProbeError> {
        self.published
            .get_or_try_init(|| self.discover(seed))
            .await
            .map(Arc::clone)
    }

    /// The published topology, without triggering discovery.
    pub fn cluster(&self) -> Option<Arc<ClusterConfig>> {
        self.published.get().cloned()
    }

    /// `server:port` for every server, or nothing if discovery has not succeeded.
    pub fn host_ports(&self) -> Vec<String> {
        self.published
            .get()
            .map(|c| c.host_ports())
            .unwrap_or_default()
    }

    /// The published verdict; `false` until discovery has succeeded.
    pub fn is_healthy(&self) -> bool {
        self.published.get().is_some_and(|c| c.is_healthy())
    }

    async fn discover(&self, seed: &str) -> Result<Arc<ClusterConfig>, RingProbeError> {
        DISCOVERIES_TOTAL.inc();

        let (seed_server, port) = split_host_port(seed).inspect_err(|_| {
            error!("Abort: Invalid host:port representation: {}", seed);
        })?;

        let reference = self
            .probe_with_timeout(seed, "seed")
            .await
            .map_err(|e| {
                error!("Abort: Cannot communicate with initial daemon at {}: {}", seed, e);
                e.into_seed_failure(seed)
            })?;

        let mut hash_ring = build_ring(&reference.algorithm, reference.replicas).inspect_err(|e| {
            error!("Abort: {}", e);
        })?;

        let mut servers = Vec::with_capacity(reference.nodes.len());
        for token in &reference.nodes {
            let node = Node::parse(token);
            servers.push(node.name.clone());
            hash_ring.add_node(node);
        }

        let peer_addrs = peer_addresses(&seed_server, &port, &servers);
        let expected_peers = peer_addrs.len();
        let peers = self.probe_peers(peer_addrs).await;

        let inconsistency = checker::check(&reference, &peers, expected_peers).err();
        let healthy = inconsistency.is_none();
        match &inconsistency {
            None => info!(
                "Cluster of {} node(s) using '{}' is healthy.",
                servers.len(),
                reference.algorithm
            ),
            Some(reason) => warn!("Cluster is unhealthy: {}", reason),
        }
        CLUSTER_HEALTHY.set(if healthy { 1.0 } else { 0.0 });

        Ok(Arc::new(ClusterConfig {
            port,
            servers,
            hash_ring,
            healthy,
            inconsistency,
            seed: reference,
        }))
    }

    /// Probes every peer with bounded concurrency. Results come back in the
    /// order of `addrs`, whatever order the probes complete in.
    async fn probe_peers(&self, addrs: Vec<String>) -> Vec<PeerSnapshot> {
        stream::iter(addrs)
            .map(|addr| async move {
                match self.probe_with_timeout(&addr, "peer").await {
                    Ok(snapshot) => PeerSnapshot::Reported { addr, snapshot },
                    Err(e) => {
                        let reason = e.to_string();
                        warn!("Cluster unhealthy: {}: {}", addr, reason);
                        PeerSnapshot::Unreachable { addr, reason }
                    }
                }
            })
            .buffered(self.options.max_concurrent_probes.max(1))
            .collect()
            .await
    }

    async fn probe_with_timeout(&self, addr: &str, phase: &str) -> Result<RingSnapshot, RingProbeError> {
        PROBES_TOTAL.with_label_values(&[phase]).inc();
        let timer = PROBE_LATENCY_SECONDS.start_timer();
        let after = self.options.probe_timeout;

        let result = match tokio::time::timeout(after, self.prober.probe(addr)).await {
            Ok(result) => result,
            Err(_) => Err(RingProbeError::Timeout {
                addr: addr.to_string(),
                after,
            }),
        };

        timer.observe_duration();
        if result.is_err() {
            PROBE_FAILURES_TOTAL.with_label_values(&[phase]).inc();
        }
        result
    }
}

/// Addresses of every server except the seed, each host once, in ring order.
fn peer_addresses(seed_server: &str, port: &str, servers: &[String]) -> Vec<String> {
    let mut hosts: Vec<&str> = Vec::with_capacity(servers.len());
    for server in servers {
        if server != seed_server && !hosts.contains(&server.as_str()) {
            hosts.push(server);
        }
    }
    hosts
        .into_iter()
        .map(|host| join_host_port(host, port))
        .collect()
}
