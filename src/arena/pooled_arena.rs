use std::any::Any;
use std::sync::Arc;

use parking_lot::Mutex;

use super::Arena;
use super::ArenaBlock;
use super::CircuitBreaker;
use crate::ArenaParams;
use crate::Result;

/// Production arena: page-sized blocks are recycled instead of freed.
///
/// Recycled pages keep their previous contents.
pub struct PooledArena {
    page_size: usize,
    max_pooled_pages: usize,
    breaker: Arc<CircuitBreaker>,
    free_pages: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl PooledArena {
    pub fn new(params: ArenaParams<'_>) -> Result<Self> {
        Ok(Self {
            page_size: params.config.arena.page_size_bytes,
            max_pooled_pages: params.config.arena.max_pooled_pages,
            breaker: params.breaker,
            free_pages: Arc::new(Mutex::new(Vec::new())),
        })
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn pooled_pages(&self) -> usize {
        self.free_pages.lock().len()
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }
}

impl Arena for PooledArena {
    fn allocate(
        &self,
        bytes: usize,
        label: &str,
    ) -> Result<ArenaBlock> {
        self.breaker.add_estimate_bytes_and_maybe_break(bytes as u64, label)?;

        let data = if bytes == self.page_size {
            self.free_pages.lock().pop().unwrap_or_else(|| vec![0; bytes])
        } else {
            vec![0; bytes]
        };

        let breaker = self.breaker.clone();
        let free_pages = self.free_pages.clone();
        let page_size = self.page_size;
        let max_pooled_pages = self.max_pooled_pages;
        Ok(ArenaBlock::new(data, move |data| {
            breaker.release(data.len() as u64);
            if data.len() == page_size {
                let mut pages = free_pages.lock();
                if pages.len() < max_pooled_pages {
                    pages.push(data);
                }
            }
        }))
    }

    fn used_bytes(&self) -> u64 {
        self.breaker.used()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
