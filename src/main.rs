// src/main.rs

//! The main entry point for the ringprobe command-line tool.

use anyhow::{Result, anyhow};
use ringprobe::config::Config;
use ringprobe::core::hashing::RingAlgorithm;
use ringprobe::core::metrics::gather_metrics;
use ringprobe::topology::{DiscoveryOptions, HttpProber, TopologyCache};
use std::env;
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::filter::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "ringprobe.toml";

#[tokio::main]
async fn main() -> Result<()> {
    match run_app().await {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(1),
        Err(e) => Err(e),
    }
}

/// Returns the value following `flag`, if the flag is present.
fn flag_value<'a>(args: &'a [String], flag: &str) -> Result<Option<&'a str>> {
    match args.iter().position(|arg| arg == flag) {
        Some(i) => args
            .get(i + 1)
            .map(|s| Some(s.as_str()))
            .ok_or_else(|| anyhow!("{flag} flag requires a value")),
        None => Ok(None),
    }
}

/// Returns `Ok(true)` when the cluster is healthy.
async fn run_app() -> Result<bool> {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let args: Vec<String> = env::args().collect();

    if args.contains(&"--version".to_string()) {
        println!("ringprobe version {VERSION}");
        return Ok(true);
    }

    // An explicit --config must exist; the default path is optional.
    let config = match flag_value(&args, "--config")? {
        Some(path) => Config::from_file(path)?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => Config::from_file(DEFAULT_CONFIG_PATH)?,
        None => Config::default(),
    };

    let seed = match flag_value(&args, "--host")?.map(str::to_string).or(config.seed.clone()) {
        Some(seed) => seed,
        None => {
            eprintln!(
                "Usage: ringprobe [--config PATH] [--host HOST:PORT] [--locate KEY] [--metrics]"
            );
            std::process::exit(2);
        }
    };
    let locate = flag_value(&args, "--locate")?;

    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level))
        .compact()
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .init();

    let prober = HttpProber::from_config(&config.probe)?;
    let cache = TopologyCache::new(prober, DiscoveryOptions::from(&config.probe)).install_global()?;

    info!("Discovering cluster topology from {}", seed);
    let cluster = match cache.get_cluster_config(&seed).await {
        Ok(cluster) => cluster,
        Err(e) => {
            error!("Topology discovery failed: {}", e);
            return Err(e.into());
        }
    };

    let ring = cluster.hash_ring();
    println!("Algorithm: {}", ring.algorithm());
    println!("Nodes: {}", ring.len());
    for host_port in cluster.host_ports() {
        println!("  {host_port}");
    }
    match cluster.inconsistency() {
        None => println!("Healthy: yes"),
        Some(reason) => println!("Healthy: no ({reason})"),
    }

    if let Some(key) = locate {
        // The carbon ring has no replica concept of its own.
        let count = match ring.algorithm() {
            RingAlgorithm::Carbon => 1,
            _ => cluster.seed_snapshot().replicas.max(1),
        };
        let owners: Vec<String> = ring
            .get_nodes(key, count)
            .into_iter()
            .map(|n| n.to_string())
            .collect();
        println!("{key}: {}", owners.join(", "));
    }

    if args.contains(&"--metrics".to_string()) {
        print!("{}", gather_metrics());
    }

    Ok(cache.is_healthy())
}
