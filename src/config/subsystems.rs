use serde::Deserialize;
use serde::Serialize;

use super::invalid;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SearchConfig {
    /// Open search contexts allowed at once per node
    ///
    /// Default: 500
    #[serde(default = "default_max_open_contexts")]
    pub max_open_contexts: usize,

    /// Idle time after which a context is reaped (milliseconds).
    /// Seeds the dynamic `search.default_keep_alive` setting.
    ///
    /// Default: 300000 (5m)
    #[serde(default = "default_keep_alive_ms")]
    pub default_keep_alive_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_open_contexts: default_max_open_contexts(),
            default_keep_alive_ms: default_keep_alive_ms(),
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_open_contexts == 0 {
            return Err(invalid("search.max_open_contexts must be greater than 0"));
        }
        if self.default_keep_alive_ms == 0 {
            return Err(invalid("search.default_keep_alive_ms must be greater than 0"));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ClusterInfoConfig {
    /// Whether the background refresh loop runs after start
    ///
    /// Default: true
    #[serde(default = "default_cluster_info_enabled")]
    pub enabled: bool,

    /// Seeds the dynamic `cluster.info.update.interval` setting (milliseconds)
    ///
    /// Default: 30000
    #[serde(default = "default_update_interval_ms")]
    pub update_interval_ms: u64,
}

impl Default for ClusterInfoConfig {
    fn default() -> Self {
        Self {
            enabled: default_cluster_info_enabled(),
            update_interval_ms: default_update_interval_ms(),
        }
    }
}

impl ClusterInfoConfig {
    pub fn validate(&self) -> Result<()> {
        if self.update_interval_ms < 10 {
            return Err(invalid("cluster_info.update_interval_ms must be at least 10"));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ArenaConfig {
    /// Size of a recyclable page
    ///
    /// Default: 16384
    #[serde(default = "default_page_size_bytes")]
    pub page_size_bytes: usize,

    /// Free pages kept for reuse
    ///
    /// Default: 256
    #[serde(default = "default_max_pooled_pages")]
    pub max_pooled_pages: usize,

    /// Limit of the request circuit breaker guarding all arena allocations
    ///
    /// Default: 256MB
    #[serde(default = "default_breaker_limit_bytes")]
    pub breaker_limit_bytes: u64,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            page_size_bytes: default_page_size_bytes(),
            max_pooled_pages: default_max_pooled_pages(),
            breaker_limit_bytes: default_breaker_limit_bytes(),
        }
    }
}

impl ArenaConfig {
    pub fn validate(&self) -> Result<()> {
        if self.page_size_bytes == 0 {
            return Err(invalid("arena.page_size_bytes must be greater than 0"));
        }
        if self.breaker_limit_bytes < self.page_size_bytes as u64 {
            return Err(invalid(format!(
                "arena.breaker_limit_bytes ({}) must hold at least one page ({})",
                self.breaker_limit_bytes, self.page_size_bytes
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RecoveryConfig {
    /// Seeds `indices.recovery.chunk_size`
    ///
    /// Default: 512kb
    #[serde(default = "default_chunk_size_bytes")]
    pub chunk_size_bytes: u64,

    /// Seeds `indices.recovery.max_bytes_per_sec`
    ///
    /// Default: 40mb
    #[serde(default = "default_max_bytes_per_sec")]
    pub max_bytes_per_sec: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            chunk_size_bytes: default_chunk_size_bytes(),
            max_bytes_per_sec: default_max_bytes_per_sec(),
        }
    }
}

impl RecoveryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size_bytes == 0 {
            return Err(invalid("recovery.chunk_size_bytes must be greater than 0"));
        }
        Ok(())
    }
}

fn default_max_open_contexts() -> usize {
    500
}
fn default_keep_alive_ms() -> u64 {
    300_000
}
fn default_cluster_info_enabled() -> bool {
    true
}
fn default_update_interval_ms() -> u64 {
    30_000
}
fn default_page_size_bytes() -> usize {
    16 * 1024
}
fn default_max_pooled_pages() -> usize {
    256
}
fn default_breaker_limit_bytes() -> u64 {
    256 * 1024 * 1024
}
fn default_chunk_size_bytes() -> u64 {
    512 * 1024
}
fn default_max_bytes_per_sec() -> u64 {
    40 * 1024 * 1024
}
