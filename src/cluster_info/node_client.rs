use std::path::PathBuf;

#[cfg(test)]
use mockall::automock;

use super::DiskUsage;
use crate::DiscoveryNode;
use crate::Result;

/// Source of per-node statistics
#[cfg_attr(test, automock)]
pub trait NodeClient: Send + Sync + 'static {
    fn disk_usages(&self) -> Result<Vec<DiskUsage>>;
}

/// Reports the filesystem holding the local data path
pub struct LocalNodeClient {
    node: DiscoveryNode,
    data_path: PathBuf,
}

impl LocalNodeClient {
    pub fn new(
        node: DiscoveryNode,
        data_path: PathBuf,
    ) -> Self {
        Self { node, data_path }
    }
}

impl NodeClient for LocalNodeClient {
    fn disk_usages(&self) -> Result<Vec<DiskUsage>> {
        let total_bytes = fs2::total_space(&self.data_path)?;
        let free_bytes = fs2::available_space(&self.data_path)?;
        Ok(vec![DiskUsage {
            node_id: self.node.id.clone(),
            node_name: self.node.name.clone(),
            path: self.data_path.display().to_string(),
            total_bytes,
            free_bytes,
        }])
    }
}
