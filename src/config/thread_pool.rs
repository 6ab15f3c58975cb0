use serde::Deserialize;
use serde::Serialize;

use super::invalid;
use crate::Result;

/// Sizes of the node runtime and of each named pool carved out of it
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ThreadPoolConfig {
    /// Worker threads of the node runtime
    ///
    /// Default: 2
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,

    /// Concurrent tasks on the `generic` pool
    #[serde(default = "default_generic")]
    pub generic: usize,

    /// Concurrent tasks on the `search` pool
    #[serde(default = "default_search")]
    pub search: usize,

    /// Concurrent tasks on the `management` pool
    #[serde(default = "default_management")]
    pub management: usize,
}

impl Default for ThreadPoolConfig {
    fn default() -> Self {
        Self {
            worker_threads: default_worker_threads(),
            generic: default_generic(),
            search: default_search(),
            management: default_management(),
        }
    }
}

impl ThreadPoolConfig {
    pub fn validate(&self) -> Result<()> {
        if self.worker_threads == 0 {
            return Err(invalid("thread_pool.worker_threads must be greater than 0"));
        }
        for (name, size) in [
            ("generic", self.generic),
            ("search", self.search),
            ("management", self.management),
        ] {
            if size == 0 {
                return Err(invalid(format!("thread_pool.{name} must be greater than 0")));
            }
        }
        Ok(())
    }
}

fn default_worker_threads() -> usize {
    2
}
fn default_generic() -> usize {
    4
}
fn default_search() -> usize {
    2
}
fn default_management() -> usize {
    1
}
