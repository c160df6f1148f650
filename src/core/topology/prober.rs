// src/core/topology/prober.rs

//! Asks a daemon for its view of the ring.

use super::snapshot::RingSnapshot;
use crate::config::ProbeConfig;
use crate::core::RingProbeError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Anything that can fetch a [`RingSnapshot`] from a `host:port`.
///
/// Transport, encoding and retries are the implementor's business. Discovery
/// applies its own per-probe timeout on top.
#[async_trait]
pub trait TopologyProber: Send + Sync {
    async fn probe(&self, host_port: &str) -> Result<RingSnapshot, RingProbeError>;
}

#[async_trait]
impl<P: TopologyProber + ?Sized> TopologyProber for Arc<P> {
    async fn probe(&self, host_port: &str) -> Result<RingSnapshot, RingProbeError> {
        (**self).probe(host_port).await
    }
}

/// Fetches `GET http://<host:port><path>` and decodes the JSON ring reply.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: reqwest::Client,
    path: String,
}

impl HttpProber {
    pub fn new(timeout: Duration, path: impl Into<String>) -> Result<Self, RingProbeError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            path: path.into(),
        })
    }

    pub fn from_config(config: &ProbeConfig) -> Result<Self, RingProbeError> {
        Self::new(config.timeout, config.path.clone())
    }

    fn url_for(&self, host_port: &str) -> String {
        format!("http://{}{}", host_port, self.path)
    }
}

#[async_trait]
impl TopologyProber for HttpProber {
    async fn probe(&self, host_port: &str) -> Result<RingSnapshot, RingProbeError> {
        let url = self.url_for(host_port);
        debug!("Requesting hash ring from {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RingProbeError::Http(format!("{url} returned {status}")));
        }

        let body = response.bytes().await?;
        let snapshot: RingSnapshot = serde_json::from_slice(&body)?;
        debug!(
            "{} reports algorithm '{}' with {} node(s)",
            host_port,
            snapshot.algorithm,
            snapshot.nodes.len()
        );
        Ok(snapshot)
    }
}
