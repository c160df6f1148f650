// src/core/mod.rs

//! The central module containing the core logic and data structures of ringprobe.

pub mod errors;
pub mod hashing;
pub mod metrics;
pub mod topology;

pub use errors::RingProbeError;
pub use hashing::{HashRing, Node};
