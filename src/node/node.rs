//! The base server node.
//!
//! ## Startup
//! [`Node::with_hooks`] runs a single construction pass. Each subsystem is
//! built exactly once, in dependency order, through the matching
//! [`NodeHooks`] method:
//!
//! 1. arena (backed by the request circuit breaker)
//! 2. transport service
//! 3. search service
//! 4. peer prober
//! 5. cluster info service
//! 6. recovery settings wiring
//! 7. one child node per `federation.children` entry
//!
//! Any error aborts construction and is returned unchanged.
//!
//! ## Example
//! ```ignore
//! let node = Node::new(NodeConfig::new()?, &[])?;
//! node.start()?;
//! ```

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use nanoid::nanoid;
use parking_lot::Mutex;
use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::ArenaParams;
use super::ClusterInfoParams;
use super::NodeHooks;
use super::PeerProberParams;
use super::ProductionHooks;
use super::SearchServiceParams;
use super::TransportServiceParams;
use crate::constants::ARENA_BREAKER_NAME;
use crate::constants::GENERIC_POOL;
use crate::constants::SEARCH_REAPER_INTERVAL;
use crate::Arena;
use crate::ChildNodeConfig;
use crate::CircuitBreaker;
use crate::ClusterInfoService;
use crate::ClusterSettings;
use crate::DiscoveryNode;
use crate::Error;
use crate::InterceptorChain;
use crate::LocalNodeClient;
use crate::LocalTransport;
use crate::NodeConfig;
use crate::PeerProber;
use crate::PluginDescriptor;
use crate::PluginsService;
use crate::RecoverySettings;
use crate::Result;
use crate::SearchService;
use crate::SettingsHostsProvider;
use crate::ThreadPool;
use crate::Transport;
use crate::TransportService;

/// A nested node owned by its parent.
pub trait ChildNode: Send + Sync + 'static {
    fn node(&self) -> &Node;

    fn as_any(&self) -> &dyn Any;
}

pub struct Node {
    config: NodeConfig,
    local_node: DiscoveryNode,
    classpath_plugins: Vec<PluginDescriptor>,
    plugins: Arc<PluginsService>,
    hooks: Arc<dyn NodeHooks>,

    thread_pool: Arc<ThreadPool>,
    cluster_settings: Arc<ClusterSettings>,
    breaker: Arc<CircuitBreaker>,
    arena: Arc<dyn Arena>,
    transport_service: Arc<dyn TransportService>,
    search_service: Arc<dyn SearchService>,
    peer_prober: Arc<dyn PeerProber>,
    cluster_info_service: Arc<dyn ClusterInfoService>,
    recovery_settings: Arc<RecoverySettings>,

    children: RwLock<BTreeMap<String, Arc<dyn ChildNode>>>,

    started: AtomicBool,
    shutdown_tx: Mutex<Option<watch::Sender<()>>>,
}

impl Debug for Node {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("local_node", &self.local_node)
            .field("plugins", &self.plugins)
            .field("children", &self.child_names())
            .finish()
    }
}

impl Node {
    /// A plain server node: every subsystem comes from [`ProductionHooks`].
    pub fn new(
        config: NodeConfig,
        plugins: &[PluginDescriptor],
    ) -> Result<Self> {
        Self::with_hooks(config, plugins, |_| Arc::new(ProductionHooks) as Arc<dyn NodeHooks>)
    }

    /// Builds a node whose hooks are chosen once the plugins are resolved.
    pub fn with_hooks<F>(
        config: NodeConfig,
        classpath_plugins: &[PluginDescriptor],
        make_hooks: F,
    ) -> Result<Self>
    where
        F: FnOnce(&Arc<PluginsService>) -> Arc<dyn NodeHooks>,
    {
        let config = config.validate()?;
        let plugins = Arc::new(PluginsService::new(classpath_plugins));
        let hooks = make_hooks(&plugins);

        let transport: Arc<dyn Transport> = Arc::new(LocalTransport::new(&config.network.listen_address)?);
        let local_node = DiscoveryNode {
            id: config.cluster.node_id.clone().unwrap_or_else(|| nanoid!()),
            name: config.cluster.node_name.clone(),
            address: transport.local_address(),
            cluster_name: config.cluster.cluster_name.clone(),
        };

        let thread_pool = Arc::new(ThreadPool::new(&local_node.name, &config.thread_pool)?);
        let cluster_settings = Arc::new(ClusterSettings::for_node(&config)?);
        let breaker = Arc::new(CircuitBreaker::new(
            ARENA_BREAKER_NAME,
            config.arena.breaker_limit_bytes,
        ));

        let arena = hooks.create_arena(ArenaParams {
            config: &config,
            breaker: breaker.clone(),
        })?;

        let transport_service = hooks.new_transport_service(TransportServiceParams {
            config: &config,
            local_node: local_node.clone(),
            transport,
            interceptor: Arc::new(InterceptorChain::new(plugins.transport_interceptors())),
            cluster_settings: &cluster_settings,
        })?;

        let search_service = hooks.new_search_service(SearchServiceParams {
            config: &config,
            arena: arena.clone(),
            cluster_settings: &cluster_settings,
        })?;

        let peer_prober = hooks.new_peer_prober(PeerProberParams {
            config: &config,
            transport_service: transport_service.clone(),
            hosts_provider: Arc::new(SettingsHostsProvider::new(&config.discovery)),
        })?;

        let cluster_info_service = hooks.new_cluster_info_service(ClusterInfoParams {
            config: &config,
            thread_pool: thread_pool.clone(),
            client: Arc::new(LocalNodeClient::new(
                local_node.clone(),
                config.cluster.data_path.clone(),
            )),
            cluster_settings: &cluster_settings,
        })?;

        let recovery_settings = RecoverySettings::new(&cluster_settings)?;
        hooks.process_recovery_settings(&cluster_settings, &recovery_settings)?;

        let mut children: BTreeMap<String, Arc<dyn ChildNode>> = BTreeMap::new();
        for (name, child) in &config.federation.children {
            let child_node = hooks.new_child_node(config.child_config(name, child), classpath_plugins.to_vec())?;
            children.insert(name.clone(), Arc::from(child_node));
        }

        info!(
            "node [{}] of cluster [{}] constructed at {} with plugins {:?}",
            local_node.name,
            local_node.cluster_name,
            local_node.address,
            plugins.plugin_names()
        );

        Ok(Self {
            config,
            local_node,
            classpath_plugins: classpath_plugins.to_vec(),
            plugins,
            hooks,
            thread_pool,
            cluster_settings,
            breaker,
            arena,
            transport_service,
            search_service,
            peer_prober,
            cluster_info_service,
            recovery_settings,
            children: RwLock::new(children),
            started: AtomicBool::new(false),
            shutdown_tx: Mutex::new(None),
        })
    }

    /// Starts serving: binds the transport, then starts discovery, cluster
    /// info, the search reaper and every child. A failure closes whatever
    /// already started.
    pub fn start(&self) -> Result<()> {
        if self.started.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        if let Err(e) = self.start_subsystems() {
            warn!("node [{}] failed to start: {}", self.local_node.name, e);
            self.close();
            return Err(e);
        }
        info!("node [{}] started at {}", self.local_node.name, self.local_node.address);
        Ok(())
    }

    fn start_subsystems(&self) -> Result<()> {
        self.transport_service.start()?;
        self.peer_prober.start()?;
        self.cluster_info_service.start()?;
        self.start_search_reaper()?;

        let children: Vec<Arc<dyn ChildNode>> = self.children.read().values().cloned().collect();
        for child in children {
            child.node().start()?;
        }
        Ok(())
    }

    fn start_search_reaper(&self) -> Result<()> {
        let (tx, mut rx) = watch::channel(());
        let search_service = self.search_service.clone();
        self.thread_pool.spawn(GENERIC_POOL, async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(SEARCH_REAPER_INTERVAL) => {
                        let reaped = search_service.reap_expired();
                        if reaped > 0 {
                            debug!("reaped {} expired search contexts", reaped);
                        }
                    }
                    _ = rx.changed() => break,
                }
            }
        })?;
        *self.shutdown_tx.lock() = Some(tx);
        Ok(())
    }

    /// Stops children first, then this node's subsystems in reverse start order.
    pub fn close(&self) {
        if !self.started.swap(false, Ordering::AcqRel) {
            return;
        }

        let children: Vec<Arc<dyn ChildNode>> = self.children.read().values().cloned().collect();
        for child in children.iter().rev() {
            child.node().close();
        }

        self.shutdown_tx.lock().take();
        self.cluster_info_service.stop();
        self.peer_prober.close();
        self.transport_service.stop();
        info!("node [{}] closed", self.local_node.name);
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    /// Builds an extra child node through this node's child hook.
    ///
    /// The child inherits this node's plugins unless `plugins` is given, and
    /// is started right away when this node is running.
    pub fn spawn_child_node(
        &self,
        name: &str,
        child: &ChildNodeConfig,
        plugins: Option<Vec<PluginDescriptor>>,
    ) -> Result<Arc<dyn ChildNode>> {
        if self.children.read().contains_key(name) {
            return Err(Error::NodeStartFailed(format!(
                "child node [{name}] already exists on [{}]",
                self.local_node.name
            )));
        }

        let plugins = plugins.unwrap_or_else(|| self.classpath_plugins.clone());
        let child_node: Arc<dyn ChildNode> =
            Arc::from(self.hooks.new_child_node(self.config.child_config(name, child), plugins)?);
        if self.is_started() {
            child_node.node().start()?;
        }

        let mut children = self.children.write();
        if children.contains_key(name) {
            child_node.node().close();
            return Err(Error::NodeStartFailed(format!(
                "child node [{name}] already exists on [{}]",
                self.local_node.name
            )));
        }
        children.insert(name.to_string(), child_node.clone());
        Ok(child_node)
    }

    pub fn child(
        &self,
        name: &str,
    ) -> Option<Arc<dyn ChildNode>> {
        self.children.read().get(name).cloned()
    }

    pub fn child_names(&self) -> Vec<String> {
        self.children.read().keys().cloned().collect()
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn local_node(&self) -> &DiscoveryNode {
        &self.local_node
    }

    /// Plugin types this node was constructed with, duplicates included
    pub fn classpath_plugins(&self) -> &[PluginDescriptor] {
        &self.classpath_plugins
    }

    pub fn plugins(&self) -> &Arc<PluginsService> {
        &self.plugins
    }

    pub fn thread_pool(&self) -> &Arc<ThreadPool> {
        &self.thread_pool
    }

    pub fn cluster_settings(&self) -> &Arc<ClusterSettings> {
        &self.cluster_settings
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    pub fn arena(&self) -> &Arc<dyn Arena> {
        &self.arena
    }

    pub fn transport_service(&self) -> &Arc<dyn TransportService> {
        &self.transport_service
    }

    pub fn search_service(&self) -> &Arc<dyn SearchService> {
        &self.search_service
    }

    pub fn peer_prober(&self) -> &Arc<dyn PeerProber> {
        &self.peer_prober
    }

    pub fn cluster_info_service(&self) -> &Arc<dyn ClusterInfoService> {
        &self.cluster_info_service
    }

    pub fn recovery_settings(&self) -> &Arc<RecoverySettings> {
        &self.recovery_settings
    }
}

impl ChildNode for Node {
    fn node(&self) -> &Node {
        self
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        self.close();
    }
}
