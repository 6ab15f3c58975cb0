use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use super::invalid;
use crate::constants::EPHEMERAL_ADDRESS;
use crate::transport::parse_local_address;
use crate::Result;

/// Child nodes that bridge this node into other clusters.
///
/// ```toml
/// [federation.children.t1]
/// cluster_name = "remote-a"
/// seed_hosts = ["local:9300"]
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct FederationConfig {
    #[serde(default)]
    pub children: BTreeMap<String, ChildNodeConfig>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChildNodeConfig {
    pub cluster_name: String,

    #[serde(default)]
    pub seed_hosts: Vec<String>,

    /// Default: `local:0`
    #[serde(default = "default_child_listen_address")]
    pub listen_address: String,
}

impl ChildNodeConfig {
    pub fn new(cluster_name: impl Into<String>) -> Self {
        Self {
            cluster_name: cluster_name.into(),
            seed_hosts: vec![],
            listen_address: default_child_listen_address(),
        }
    }
}

impl FederationConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, child) in &self.children {
            if name.trim().is_empty() || name.contains('/') {
                return Err(invalid(format!("federation child name [{name}] is invalid")));
            }
            if child.cluster_name.trim().is_empty() {
                return Err(invalid(format!(
                    "federation.children.{name}.cluster_name cannot be empty"
                )));
            }
            parse_local_address(&child.listen_address).map_err(|_| {
                invalid(format!(
                    "federation.children.{name}.listen_address [{}] is invalid",
                    child.listen_address
                ))
            })?;
        }
        Ok(())
    }
}

fn default_child_listen_address() -> String {
    EPHEMERAL_ADDRESS.to_string()
}
