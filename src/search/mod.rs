//! Search execution: per-shard reader contexts kept alive between phases.
mod search_service;
pub use search_service::*;


use std::any::Any;
use std::time::Duration;

use crate::Result;

pub type ContextId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardSearchRequest {
    pub index: String,
    pub shard: u32,
    pub query: String,
    /// Overrides `search.default_keep_alive` for this context
    pub keep_alive: Option<Duration>,
}

impl ShardSearchRequest {
    pub fn new(
        index: impl Into<String>,
        shard: u32,
        query: impl Into<String>,
    ) -> Self {
        Self {
            index: index.into(),
            shard,
            query: query.into(),
            keep_alive: None,
        }
    }
}

pub trait SearchService: Send + Sync + 'static {
    fn create_context(
        &self,
        request: ShardSearchRequest,
    ) -> Result<ContextId>;

    /// Resets the idle clock of a context
    fn touch_context(
        &self,
        id: ContextId,
    ) -> Result<()>;

    /// Returns `false` if the context was already gone
    fn free_context(
        &self,
        id: ContextId,
    ) -> bool;

    fn active_contexts(&self) -> usize;

    /// Frees every context idle for longer than its keep-alive
    fn reap_expired(&self) -> usize;

    fn as_any(&self) -> &dyn Any;
}
