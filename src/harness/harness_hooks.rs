use std::sync::Arc;

use super::mock::bind_chunk_size_setting;
use super::mock::MockArena;
use super::mock::MockInternalClusterInfoService;
use super::mock::MockPeerProber;
use super::mock::MockSearchService;
use super::mock::MockTransportService;
use super::HarnessNode;
use super::HookId;
use super::HookTable;
use crate::Arena;
use crate::ArenaParams;
use crate::ChildNode;
use crate::ClusterInfoParams;
use crate::ClusterInfoService;
use crate::ClusterSettings;
use crate::NodeConfig;
use crate::NodeHooks;
use crate::PeerProber;
use crate::PeerProberParams;
use crate::PluginDescriptor;
use crate::PluginsService;
use crate::ProductionHooks;
use crate::RecoverySettings;
use crate::Result;
use crate::SearchService;
use crate::SearchServiceParams;
use crate::TransportService;
use crate::TransportServiceParams;

/// Node hooks that switch each subsystem to its mock when the matching
/// marker is active, and otherwise defer to [`ProductionHooks`].
#[derive(Debug, Clone)]
pub struct HarnessHooks {
    table: HookTable,
    base: ProductionHooks,
}

impl HarnessHooks {
    pub fn new(plugins: &PluginsService) -> Self {
        Self {
            table: HookTable::resolve(plugins),
            base: ProductionHooks,
        }
    }

    pub fn table(&self) -> &HookTable {
        &self.table
    }
}

impl NodeHooks for HarnessHooks {
    fn create_arena(
        &self,
        params: ArenaParams<'_>,
    ) -> Result<Arc<dyn Arena>> {
        self.table.dispatch(
            HookId::Arena,
            params,
            |params| self.base.create_arena(params),
            |params| Ok(Arc::new(MockArena::new(params)?) as Arc<dyn Arena>),
        )
    }

    fn new_transport_service(
        &self,
        params: TransportServiceParams<'_>,
    ) -> Result<Arc<dyn TransportService>> {
        self.table.dispatch(
            HookId::Transport,
            params,
            |params| self.base.new_transport_service(params),
            |params| Ok(Arc::new(MockTransportService::new(params)?) as Arc<dyn TransportService>),
        )
    }

    fn new_search_service(
        &self,
        params: SearchServiceParams<'_>,
    ) -> Result<Arc<dyn SearchService>> {
        self.table.dispatch(
            HookId::Search,
            params,
            |params| self.base.new_search_service(params),
            |params| Ok(Arc::new(MockSearchService::new(params)?) as Arc<dyn SearchService>),
        )
    }

    fn new_peer_prober(
        &self,
        params: PeerProberParams<'_>,
    ) -> Result<Arc<dyn PeerProber>> {
        self.table.dispatch(
            HookId::PeerProber,
            params,
            |params| self.base.new_peer_prober(params),
            |params| Ok(Arc::new(MockPeerProber::new(params)?) as Arc<dyn PeerProber>),
        )
    }

    fn new_cluster_info_service(
        &self,
        params: ClusterInfoParams<'_>,
    ) -> Result<Arc<dyn ClusterInfoService>> {
        self.table.dispatch(
            HookId::ClusterInfo,
            params,
            |params| self.base.new_cluster_info_service(params),
            |params| Ok(Arc::new(MockInternalClusterInfoService::new(params)?) as Arc<dyn ClusterInfoService>),
        )
    }

    fn process_recovery_settings(
        &self,
        cluster_settings: &ClusterSettings,
        recovery_settings: &Arc<RecoverySettings>,
    ) -> Result<()> {
        self.table.dispatch(
            HookId::RecoverySettings,
            (cluster_settings, recovery_settings),
            |(cluster_settings, recovery_settings)| {
                self.base.process_recovery_settings(cluster_settings, recovery_settings)
            },
            |(cluster_settings, recovery_settings)| bind_chunk_size_setting(cluster_settings, recovery_settings),
        )
    }

    /// Nested nodes are harness nodes too, so their hooks follow the same rule.
    fn new_child_node(
        &self,
        config: NodeConfig,
        plugins: Vec<PluginDescriptor>,
    ) -> Result<Box<dyn ChildNode>> {
        Ok(Box::new(HarnessNode::new(config, &plugins)?))
    }
}
