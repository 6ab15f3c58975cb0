//! Construction points a [`Node`](crate::Node) calls once during startup.
//!
//! Every hook takes a params struct, so a replacement implementation sees
//! exactly the inputs the production one does.

use std::sync::Arc;

use crate::Arena;
use crate::ChildNode;
use crate::CircuitBreaker;
use crate::ClusterInfoService;
use crate::ClusterSettings;
use crate::DefaultSearchService;
use crate::DefaultTransportService;
use crate::DiscoveryNode;
use crate::InternalClusterInfoService;
use crate::Node;
use crate::NodeClient;
use crate::NodeConfig;
use crate::PeerProber;
use crate::PluginDescriptor;
use crate::PooledArena;
use crate::RecoverySettings;
use crate::Result;
use crate::SearchService;
use crate::ThreadPool;
use crate::Transport;
use crate::TransportInterceptor;
use crate::TransportService;
use crate::UnicastHostsProvider;
use crate::UnicastPeerProber;

pub struct ArenaParams<'a> {
    pub config: &'a NodeConfig,
    pub breaker: Arc<CircuitBreaker>,
}

pub struct TransportServiceParams<'a> {
    pub config: &'a NodeConfig,
    pub local_node: DiscoveryNode,
    pub transport: Arc<dyn Transport>,
    /// Combined interceptors of every loaded plugin
    pub interceptor: Arc<dyn TransportInterceptor>,
    pub cluster_settings: &'a ClusterSettings,
}

pub struct SearchServiceParams<'a> {
    pub config: &'a NodeConfig,
    pub arena: Arc<dyn Arena>,
    pub cluster_settings: &'a ClusterSettings,
}

pub struct PeerProberParams<'a> {
    pub config: &'a NodeConfig,
    pub transport_service: Arc<dyn TransportService>,
    pub hosts_provider: Arc<dyn UnicastHostsProvider>,
}

pub struct ClusterInfoParams<'a> {
    pub config: &'a NodeConfig,
    pub thread_pool: Arc<ThreadPool>,
    pub client: Arc<dyn NodeClient>,
    pub cluster_settings: &'a ClusterSettings,
}

pub trait NodeHooks: Send + Sync + 'static {
    fn create_arena(
        &self,
        params: ArenaParams<'_>,
    ) -> Result<Arc<dyn Arena>>;

    fn new_transport_service(
        &self,
        params: TransportServiceParams<'_>,
    ) -> Result<Arc<dyn TransportService>>;

    fn new_search_service(
        &self,
        params: SearchServiceParams<'_>,
    ) -> Result<Arc<dyn SearchService>>;

    fn new_peer_prober(
        &self,
        params: PeerProberParams<'_>,
    ) -> Result<Arc<dyn PeerProber>>;

    fn new_cluster_info_service(
        &self,
        params: ClusterInfoParams<'_>,
    ) -> Result<Arc<dyn ClusterInfoService>>;

    /// Extra wiring between dynamic settings and recovery, after both exist
    fn process_recovery_settings(
        &self,
        cluster_settings: &ClusterSettings,
        recovery_settings: &Arc<RecoverySettings>,
    ) -> Result<()>;

    /// Builds a nested node, e.g. for a federation child
    fn new_child_node(
        &self,
        config: NodeConfig,
        plugins: Vec<PluginDescriptor>,
    ) -> Result<Box<dyn ChildNode>>;
}

/// The hooks of a plain server. Markers are never consulted here.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProductionHooks;

impl NodeHooks for ProductionHooks {
    fn create_arena(
        &self,
        params: ArenaParams<'_>,
    ) -> Result<Arc<dyn Arena>> {
        Ok(Arc::new(PooledArena::new(params)?))
    }

    fn new_transport_service(
        &self,
        params: TransportServiceParams<'_>,
    ) -> Result<Arc<dyn TransportService>> {
        Ok(Arc::new(DefaultTransportService::new(params)?))
    }

    fn new_search_service(
        &self,
        params: SearchServiceParams<'_>,
    ) -> Result<Arc<dyn SearchService>> {
        Ok(Arc::new(DefaultSearchService::new(params)?))
    }

    fn new_peer_prober(
        &self,
        params: PeerProberParams<'_>,
    ) -> Result<Arc<dyn PeerProber>> {
        Ok(Arc::new(UnicastPeerProber::new(params)?))
    }

    fn new_cluster_info_service(
        &self,
        params: ClusterInfoParams<'_>,
    ) -> Result<Arc<dyn ClusterInfoService>> {
        Ok(Arc::new(InternalClusterInfoService::new(params)?))
    }

    fn process_recovery_settings(
        &self,
        _cluster_settings: &ClusterSettings,
        _recovery_settings: &Arc<RecoverySettings>,
    ) -> Result<()> {
        Ok(())
    }

    fn new_child_node(
        &self,
        config: NodeConfig,
        plugins: Vec<PluginDescriptor>,
    ) -> Result<Box<dyn ChildNode>> {
        Ok(Box::new(Node::new(config, &plugins)?))
    }
}
