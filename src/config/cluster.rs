use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use super::invalid;
use crate::Result;

/// Node identity and cluster membership
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ClusterConfig {
    /// Nodes only discover peers that report the same cluster name
    ///
    /// Default: `harness`
    #[serde(default = "default_cluster_name")]
    pub cluster_name: String,

    /// Human readable node name, also used for thread names
    ///
    /// Default: `node-0`
    #[serde(default = "default_node_name")]
    pub node_name: String,

    /// Persistent node id. A random id is generated when absent.
    #[serde(default)]
    pub node_id: Option<String>,

    /// Directory whose filesystem is reported by node stats
    ///
    /// Default: `./data`
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            cluster_name: default_cluster_name(),
            node_name: default_node_name(),
            node_id: None,
            data_path: default_data_path(),
        }
    }
}

impl ClusterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.cluster_name.trim().is_empty() {
            return Err(invalid("cluster.cluster_name cannot be empty"));
        }

        if self.node_name.trim().is_empty() {
            return Err(invalid("cluster.node_name cannot be empty"));
        }

        if let Some(id) = &self.node_id {
            if id.trim().is_empty() {
                return Err(invalid("cluster.node_id cannot be blank when set"));
            }
        }

        if self.data_path.as_os_str().is_empty() {
            return Err(invalid("cluster.data_path cannot be empty"));
        }

        Ok(())
    }
}

fn default_cluster_name() -> String {
    "harness".to_string()
}
fn default_node_name() -> String {
    "node-0".to_string()
}
fn default_data_path() -> PathBuf {
    PathBuf::from("./data")
}
