use std::any::Any;
use std::sync::Arc;

use arc_swap::ArcSwap;
use dashmap::DashMap;

use crate::ClusterInfo;
use crate::ClusterInfoParams;
use crate::ClusterInfoService;
use crate::Marker;
use crate::MarkerId;
use crate::NodeClient;
use crate::Plugin;
use crate::Result;

pub enum MockClusterInfoMarker {}

impl Marker for MockClusterInfoMarker {
    const NAME: &'static str = "mock-cluster-info";
}

#[derive(Debug, Default)]
pub struct MockClusterInfoPlugin;

impl Plugin for MockClusterInfoPlugin {
    fn name(&self) -> &'static str {
        "mock-cluster-info"
    }

    fn markers(&self) -> Vec<MarkerId> {
        vec![MarkerId::of::<MockClusterInfoMarker>()]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DiskOverride {
    total_bytes: u64,
    free_bytes: u64,
}

/// Cluster info refreshed only on demand, with per-node disk figures that
/// tests can pin.
pub struct MockInternalClusterInfoService {
    client: Arc<dyn NodeClient>,
    current: ArcSwap<ClusterInfo>,
    overrides: DashMap<String, DiskOverride>,
}

impl MockInternalClusterInfoService {
    pub fn new(params: ClusterInfoParams<'_>) -> Result<Self> {
        Ok(Self {
            client: params.client,
            current: ArcSwap::from_pointee(ClusterInfo::default()),
            overrides: DashMap::new(),
        })
    }

    /// Reported for `node_id` by every later refresh
    pub fn set_disk_usage(
        &self,
        node_id: &str,
        total_bytes: u64,
        free_bytes: u64,
    ) {
        self.overrides.insert(
            node_id.to_string(),
            DiskOverride {
                total_bytes,
                free_bytes: free_bytes.min(total_bytes),
            },
        );
    }

    pub fn clear_disk_usage_overrides(&self) {
        self.overrides.clear();
    }
}

impl ClusterInfoService for MockInternalClusterInfoService {
    fn cluster_info(&self) -> ClusterInfo {
        self.current.load().as_ref().clone()
    }

    fn refresh(&self) -> Result<ClusterInfo> {
        let mut usages = self.client.disk_usages()?;
        for usage in usages.iter_mut() {
            if let Some(pinned) = self.overrides.get(&usage.node_id) {
                usage.total_bytes = pinned.total_bytes;
                usage.free_bytes = pinned.free_bytes;
            }
        }
        let info = ClusterInfo::from_usages(usages);
        self.current.store(Arc::new(info.clone()));
        Ok(info)
    }

    fn start(&self) -> Result<()> {
        Ok(())
    }

    fn stop(&self) {}

    fn as_any(&self) -> &dyn Any {
        self
    }
}
