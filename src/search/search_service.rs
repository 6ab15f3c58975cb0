use std::any::Any;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use dashmap::DashMap;
use tracing::debug;

use super::ContextId;
use super::SearchService;
use super::ShardSearchRequest;
use crate::Arena;
use crate::ArenaBlock;
use crate::Result;
use crate::SearchError;
use crate::SearchServiceParams;
use crate::DEFAULT_KEEP_ALIVE_SETTING;

struct SearchContext {
    request: ShardSearchRequest,
    last_access: Instant,
    _buffer: ArenaBlock,
}

pub struct DefaultSearchService {
    contexts: DashMap<ContextId, SearchContext>,
    next_id: AtomicU64,
    /// Reserved slots; never exceeds `max_open_contexts`
    open_slots: AtomicUsize,
    max_open_contexts: usize,
    buffer_size: usize,
    default_keep_alive_ms: Arc<AtomicU64>,
    arena: Arc<dyn Arena>,
}

impl DefaultSearchService {
    pub fn new(params: SearchServiceParams<'_>) -> Result<Self> {
        let keep_alive = params.cluster_settings.get(&DEFAULT_KEEP_ALIVE_SETTING)?;
        let default_keep_alive_ms = Arc::new(AtomicU64::new(keep_alive.as_millis() as u64));

        let target = default_keep_alive_ms.clone();
        params
            .cluster_settings
            .add_settings_update_consumer(&DEFAULT_KEEP_ALIVE_SETTING, move |keep_alive: Duration| {
                target.store(keep_alive.as_millis() as u64, Ordering::Release);
            })?;

        Ok(Self {
            contexts: DashMap::new(),
            next_id: AtomicU64::new(1),
            open_slots: AtomicUsize::new(0),
            max_open_contexts: params.config.search.max_open_contexts,
            buffer_size: params.config.arena.page_size_bytes,
            default_keep_alive_ms,
            arena: params.arena,
        })
    }

    pub fn default_keep_alive(&self) -> Duration {
        Duration::from_millis(self.default_keep_alive_ms.load(Ordering::Acquire))
    }

    pub fn context_ids(&self) -> Vec<ContextId> {
        self.contexts.iter().map(|e| *e.key()).collect()
    }

    /// Frees every expired context and returns the ids it freed
    pub fn reap_expired_ids(&self) -> Vec<ContextId> {
        let default_keep_alive = self.default_keep_alive();
        let mut reaped = Vec::new();
        self.contexts.retain(|id, context| {
            let keep_alive = context.request.keep_alive.unwrap_or(default_keep_alive);
            let alive = context.last_access.elapsed() <= keep_alive;
            if !alive {
                debug!("freeing expired search context [{}]", id);
                reaped.push(*id);
            }
            alive
        });
        self.open_slots.fetch_sub(reaped.len(), Ordering::AcqRel);
        reaped
    }

    fn reserve_slot(&self) -> Result<()> {
        let mut current = self.open_slots.load(Ordering::Acquire);
        loop {
            if current >= self.max_open_contexts {
                return Err(SearchError::TooManyContexts(self.max_open_contexts).into());
            }
            match self
                .open_slots
                .compare_exchange_weak(current, current + 1, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return Ok(()),
                Err(actual) => current = actual,
            }
        }
    }

    pub fn context_request(
        &self,
        id: ContextId,
    ) -> Option<ShardSearchRequest> {
        self.contexts.get(&id).map(|c| c.request.clone())
    }
}

impl SearchService for DefaultSearchService {
    fn create_context(
        &self,
        request: ShardSearchRequest,
    ) -> Result<ContextId> {
        self.reserve_slot()?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let buffer = match self.arena.allocate(self.buffer_size, &format!("search_context[{id}]")) {
            Ok(buffer) => buffer,
            Err(e) => {
                self.open_slots.fetch_sub(1, Ordering::AcqRel);
                return Err(e);
            }
        };
        self.contexts.insert(
            id,
            SearchContext {
                request,
                last_access: Instant::now(),
                _buffer: buffer,
            },
        );
        Ok(id)
    }

    fn touch_context(
        &self,
        id: ContextId,
    ) -> Result<()> {
        let mut context = self.contexts.get_mut(&id).ok_or(SearchError::ContextMissing(id))?;
        context.last_access = Instant::now();
        Ok(())
    }

    fn free_context(
        &self,
        id: ContextId,
    ) -> bool {
        let freed = self.contexts.remove(&id).is_some();
        if freed {
            self.open_slots.fetch_sub(1, Ordering::AcqRel);
        }
        freed
    }

    fn active_contexts(&self) -> usize {
        self.contexts.len()
    }

    fn reap_expired(&self) -> usize {
        self.reap_expired_ids().len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
