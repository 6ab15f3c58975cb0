//! Peer discovery probing.
mod unicast;
pub use unicast::*;


use std::any::Any;

use serde::Deserialize;
use serde::Serialize;

use crate::DiscoveryConfig;
use crate::DiscoveryNode;
use crate::Result;

/// Addresses a prober should try
pub trait UnicastHostsProvider: Send + Sync + 'static {
    fn seed_addresses(&self) -> Vec<String>;
}

/// Seed hosts taken verbatim from `discovery.seed_hosts`
#[derive(Debug, Clone)]
pub struct SettingsHostsProvider {
    seed_hosts: Vec<String>,
}

impl SettingsHostsProvider {
    pub fn new(config: &DiscoveryConfig) -> Self {
        Self {
            seed_hosts: config.seed_hosts.clone(),
        }
    }
}

impl UnicastHostsProvider for SettingsHostsProvider {
    fn seed_addresses(&self) -> Vec<String> {
        self.seed_hosts.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingResponse {
    pub node: DiscoveryNode,
    pub cluster_name: String,
}

impl PingResponse {
    pub fn of(node: &DiscoveryNode) -> Self {
        Self {
            node: node.clone(),
            cluster_name: node.cluster_name.clone(),
        }
    }
}

pub trait PeerProber: Send + Sync + 'static {
    fn start(&self) -> Result<()>;

    /// One round of pings; returns the peers of the same cluster that answered
    fn ping(&self) -> Result<Vec<PingResponse>>;

    fn close(&self);

    fn as_any(&self) -> &dyn Any;
}
