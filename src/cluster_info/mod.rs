//! Disk usage collection across the nodes a client can reach.
mod internal;
mod node_client;
pub use internal::*;
pub use node_client::*;


use std::any::Any;
use std::collections::BTreeMap;

use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskUsage {
    pub node_id: String,
    pub node_name: String,
    pub path: String,
    pub total_bytes: u64,
    pub free_bytes: u64,
}

impl DiskUsage {
    pub fn used_bytes(&self) -> u64 {
        self.total_bytes.saturating_sub(self.free_bytes)
    }

    pub fn free_percent(&self) -> f64 {
        if self.total_bytes == 0 {
            return 100.0;
        }
        100.0 * self.free_bytes as f64 / self.total_bytes as f64
    }
}

/// Snapshot produced by one refresh, keyed by node id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterInfo {
    pub disk_usages: BTreeMap<String, DiskUsage>,
}

impl ClusterInfo {
    pub fn from_usages(usages: Vec<DiskUsage>) -> Self {
        Self {
            disk_usages: usages.into_iter().map(|u| (u.node_id.clone(), u)).collect(),
        }
    }
}

pub trait ClusterInfoService: Send + Sync + 'static {
    /// Latest snapshot, without collecting
    fn cluster_info(&self) -> ClusterInfo;

    fn refresh(&self) -> Result<ClusterInfo>;

    fn start(&self) -> Result<()>;

    fn stop(&self);

    fn as_any(&self) -> &dyn Any;
}
