//! Per-node task scheduling.
//!
//! Each node owns one tokio runtime. Named pools (`generic`, `search`,
//! `management`) share its workers and are bounded by semaphores, so a
//! flood on one pool cannot starve the others of permits.


use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::runtime::Runtime;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::constants::GENERIC_POOL;
use crate::constants::MANAGEMENT_POOL;
use crate::constants::SEARCH_POOL;
use crate::Error;
use crate::Result;
use crate::ThreadPoolConfig;

struct Pool {
    size: usize,
    permits: Arc<Semaphore>,
}

pub struct ThreadPool {
    node_name: String,
    runtime: Option<Runtime>,
    handle: Handle,
    pools: HashMap<&'static str, Pool>,
}

impl ThreadPool {
    pub fn new(
        node_name: &str,
        config: &ThreadPoolConfig,
    ) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(config.worker_threads)
            .thread_name(format!("{node_name}[worker]"))
            .enable_all()
            .build()?;
        let handle = runtime.handle().clone();

        let pools = [
            (GENERIC_POOL, config.generic),
            (SEARCH_POOL, config.search),
            (MANAGEMENT_POOL, config.management),
        ]
        .into_iter()
        .map(|(name, size)| {
            (
                name,
                Pool {
                    size,
                    permits: Arc::new(Semaphore::new(size)),
                },
            )
        })
        .collect();

        Ok(Self {
            node_name: node_name.to_string(),
            runtime: Some(runtime),
            handle,
            pools,
        })
    }

    /// Runs `future` on the named pool once a permit is free.
    pub fn spawn<F>(
        &self,
        pool: &str,
        future: F,
    ) -> Result<JoinHandle<F::Output>>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let permits = self
            .pools
            .get(pool)
            .map(|p| p.permits.clone())
            .ok_or_else(|| Error::UnknownThreadPool(pool.to_string()))?;

        Ok(self.handle.spawn(async move {
            let _permit = permits.acquire_owned().await;
            future.await
        }))
    }

    pub fn pool_size(
        &self,
        pool: &str,
    ) -> Option<usize> {
        self.pools.get(pool).map(|p| p.size)
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            debug!("shutting down thread pool of [{}]", self.node_name);
            runtime.shutdown_background();
        }
    }
}
