use serde::Deserialize;
use serde::Serialize;

use super::invalid;
use crate::constants::EPHEMERAL_ADDRESS;
use crate::transport::parse_local_address;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NetworkConfig {
    /// In-process transport address (`local:<port>`); port 0 picks a free one
    ///
    /// Default: `local:0`
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
        }
    }
}

impl NetworkConfig {
    pub fn validate(&self) -> Result<()> {
        parse_local_address(&self.listen_address)
            .map_err(|_| invalid(format!("network.listen_address [{}] is invalid", self.listen_address)))?;
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct DiscoveryConfig {
    /// Addresses pinged by the unicast prober
    #[serde(default)]
    pub seed_hosts: Vec<String>,
}

impl DiscoveryConfig {
    pub fn validate(&self) -> Result<()> {
        for host in &self.seed_hosts {
            match parse_local_address(host) {
                Ok(0) => {
                    return Err(invalid(format!(
                        "discovery.seed_hosts entry [{host}] cannot use an ephemeral port"
                    )))
                }
                Ok(_) => {}
                Err(_) => return Err(invalid(format!("discovery.seed_hosts entry [{host}] is invalid"))),
            }
        }

        Ok(())
    }
}

fn default_listen_address() -> String {
    EPHEMERAL_ADDRESS.to_string()
}
