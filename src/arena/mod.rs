//! Memory arena backing large, short-lived buffers (search contexts,
//! aggregations). Every allocation is accounted against a circuit breaker.
mod breaker;
mod pooled_arena;
pub use breaker::*;
pub use pooled_arena::*;

#[cfg(test)]
mod arena_test;

use std::any::Any;
use std::fmt::Debug;

use crate::Result;

pub trait Arena: Send + Sync + 'static {
    /// Hands out a block of exactly `bytes` bytes, charged to the breaker
    /// until the block is dropped. Contents are unspecified.
    fn allocate(
        &self,
        bytes: usize,
        label: &str,
    ) -> Result<ArenaBlock>;

    fn used_bytes(&self) -> u64;

    fn as_any(&self) -> &dyn Any;
}

type Release = Box<dyn FnOnce(Vec<u8>) + Send + Sync>;

/// Memory returned to its arena on drop
pub struct ArenaBlock {
    data: Vec<u8>,
    release: Option<Release>,
}

impl ArenaBlock {
    pub(crate) fn new(
        data: Vec<u8>,
        release: impl FnOnce(Vec<u8>) + Send + Sync + 'static,
    ) -> Self {
        Self {
            data,
            release: Some(Box::new(release)),
        }
    }

    /// Runs `hook` right before the block goes back to its arena
    pub fn on_release(
        mut self,
        hook: impl FnOnce() + Send + Sync + 'static,
    ) -> Self {
        let inner = self.release.take();
        self.release = Some(Box::new(move |data| {
            hook();
            if let Some(inner) = inner {
                inner(data);
            }
        }));
        self
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl Debug for ArenaBlock {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("ArenaBlock").field("len", &self.data.len()).finish()
    }
}

impl Drop for ArenaBlock {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release(std::mem::take(&mut self.data));
        }
    }
}
