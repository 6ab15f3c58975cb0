//! Configuration management for a harness node.
//!
//! Provides hierarchical configuration loading and validation with:
//! - Default values as code base
//! - Configuration file support (`CONFIG_PATH`)
//! - Environment variable overrides (`NODE__` prefix)
//! - Section-wise validation
mod cluster;
mod federation;
mod network;
mod subsystems;
mod thread_pool;
pub use cluster::*;
pub use federation::*;
pub use network::*;
pub use subsystems::*;
pub use thread_pool::*;


use std::env;
use std::fmt::Debug;

use config::Config;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Main configuration container for a node and every subsystem it builds
///
/// Combines all subsystem configurations with hierarchical override support:
/// 1. Default values from code implementation
/// 2. Configuration file specified by `CONFIG_PATH`
/// 3. Environment variables (highest priority)
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct NodeConfig {
    /// Cluster membership and node identity
    #[serde(default)]
    pub cluster: ClusterConfig,
    /// Transport listen address
    #[serde(default)]
    pub network: NetworkConfig,
    /// Peer discovery
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub cluster_info: ClusterInfoConfig,
    #[serde(default)]
    pub arena: ArenaConfig,
    #[serde(default)]
    pub recovery: RecoveryConfig,
    #[serde(default)]
    pub thread_pool: ThreadPoolConfig,
    /// Nested child nodes started alongside this one
    #[serde(default)]
    pub federation: FederationConfig,
}

impl Debug for NodeConfig {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("NodeConfig")
            .field("cluster", &self.cluster)
            .field("network", &self.network)
            .finish()
    }
}

impl NodeConfig {
    /// Loads configuration from hierarchical sources without validation.
    ///
    /// Configuration sources are merged in the following order (later sources override earlier):
    /// 1. Type defaults (lowest priority)
    /// 2. Configuration file from `CONFIG_PATH` environment variable (if set)
    /// 3. Environment variables with `NODE__` prefix (highest priority)
    ///
    /// # Note
    /// Validation is deferred to allow further overrides via `with_override_config()`.
    /// [`crate::Node::new`] validates before the startup pass.
    ///
    /// # Examples
    /// ```ignore
    /// std::env::set_var("NODE__CLUSTER__NODE_NAME", "node-7");
    /// let cfg = NodeConfig::new()?.validate()?;
    /// ```
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        let config: Self = builder.add_source(env_source()).build()?.try_deserialize()?;
        Ok(config)
    }

    /// Applies additional configuration overrides from file without validation.
    ///
    /// Merging order (later sources override earlier):
    /// 1. Current configuration values
    /// 2. New configuration file
    /// 3. Latest environment variables (highest priority)
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(env_source())
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Validates every section and returns the validated instance.
    pub fn validate(self) -> Result<Self> {
        self.cluster.validate()?;
        self.network.validate()?;
        self.discovery.validate()?;
        self.search.validate()?;
        self.cluster_info.validate()?;
        self.arena.validate()?;
        self.recovery.validate()?;
        self.thread_pool.validate()?;
        self.federation.validate()?;
        Ok(self)
    }

    /// Derives the configuration of a nested child node.
    ///
    /// The child keeps every subsystem section of its parent, takes its identity
    /// and discovery from `child`, and never inherits federation entries.
    pub fn child_config(
        &self,
        name: &str,
        child: &ChildNodeConfig,
    ) -> Self {
        let mut config = self.clone();
        config.cluster.node_name = format!("{}/{}", self.cluster.node_name, name);
        config.cluster.node_id = None;
        config.cluster.cluster_name = child.cluster_name.clone();
        config.network.listen_address = child.listen_address.clone();
        config.discovery.seed_hosts = child.seed_hosts.clone();
        config.federation = FederationConfig::default();
        config
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("NODE")
        .separator("__")
        .ignore_empty(true)
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("discovery.seed_hosts")
}

pub(super) fn invalid(message: impl Into<String>) -> Error {
    Error::Config(ConfigError::Message(message.into()))
}
