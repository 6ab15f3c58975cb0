use std::any::Any;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use dashmap::DashMap;
use rand::Rng;
use tracing::warn;

use crate::Arena;
use crate::ArenaBlock;
use crate::ArenaError;
use crate::ArenaParams;
use crate::CircuitBreaker;
use crate::Marker;
use crate::MarkerId;
use crate::Plugin;
use crate::Result;

pub enum MockArenaMarker {}

impl Marker for MockArenaMarker {
    const NAME: &'static str = "mock-arena";
}

/// Node-level memory checks; carries the arena marker
#[derive(Debug, Default)]
pub struct NodeMocksPlugin;

impl Plugin for NodeMocksPlugin {
    fn name(&self) -> &'static str {
        "node-mocks"
    }

    fn markers(&self) -> Vec<MarkerId> {
        vec![MarkerId::of::<MockArenaMarker>()]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Arena that never recycles, hands out random garbage and tracks every
/// block until it is dropped.
pub struct MockArena {
    breaker: Arc<CircuitBreaker>,
    next_block: AtomicU64,
    outstanding: Arc<DashMap<u64, String>>,
}

impl MockArena {
    pub fn new(params: ArenaParams<'_>) -> Result<Self> {
        Ok(Self {
            breaker: params.breaker,
            next_block: AtomicU64::new(0),
            outstanding: Arc::new(DashMap::new()),
        })
    }

    pub fn outstanding_blocks(&self) -> usize {
        self.outstanding.len()
    }

    /// Fails listing the labels of blocks still alive
    pub fn ensure_all_released(&self) -> Result<()> {
        if self.outstanding.is_empty() {
            return Ok(());
        }
        let mut labels: Vec<String> = self.outstanding.iter().map(|e| e.value().clone()).collect();
        labels.sort();
        warn!("{} arena blocks still outstanding", labels.len());
        Err(ArenaError::Leaked(labels.len(), labels).into())
    }
}

impl Arena for MockArena {
    fn allocate(
        &self,
        bytes: usize,
        label: &str,
    ) -> Result<ArenaBlock> {
        self.breaker.add_estimate_bytes_and_maybe_break(bytes as u64, label)?;

        let mut data = vec![0u8; bytes];
        rand::thread_rng().fill(&mut data[..]);

        let id = self.next_block.fetch_add(1, Ordering::Relaxed);
        self.outstanding.insert(id, label.to_string());

        let breaker = self.breaker.clone();
        let outstanding = self.outstanding.clone();
        Ok(ArenaBlock::new(data, move |data| {
            breaker.release(data.len() as u64);
            outstanding.remove(&id);
        }))
    }

    fn used_bytes(&self) -> u64 {
        self.breaker.used()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
