use std::any::Any;

use dashmap::DashMap;
use parking_lot::RwLock;

use crate::ContextId;
use crate::DefaultSearchService;
use crate::Marker;
use crate::MarkerId;
use crate::Plugin;
use crate::Result;
use crate::SearchError;
use crate::SearchService;
use crate::SearchServiceParams;
use crate::ShardSearchRequest;

pub enum MockSearchMarker {}

impl Marker for MockSearchMarker {
    const NAME: &'static str = "mock-search";
}

#[derive(Debug, Default)]
pub struct MockSearchPlugin;

impl Plugin for MockSearchPlugin {
    fn name(&self) -> &'static str {
        "mock-search"
    }

    fn markers(&self) -> Vec<MarkerId> {
        vec![MarkerId::of::<MockSearchMarker>()]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Search service that remembers every context it opened until freed
pub struct MockSearchService {
    delegate: DefaultSearchService,
    in_flight: DashMap<ContextId, String>,
    /// Held shared while a context is opened and tracked, exclusively while
    /// reaped contexts are forgotten
    tracking: RwLock<()>,
}

impl MockSearchService {
    pub fn new(params: SearchServiceParams<'_>) -> Result<Self> {
        Ok(Self {
            delegate: DefaultSearchService::new(params)?,
            in_flight: DashMap::new(),
            tracking: RwLock::new(()),
        })
    }

    pub fn in_flight_contexts(&self) -> usize {
        self.in_flight.len()
    }

    /// Fails listing the open contexts, if any are left
    pub fn assert_no_in_flight_contexts(&self) -> Result<()> {
        if self.in_flight.is_empty() {
            return Ok(());
        }
        let mut open: Vec<(ContextId, String)> =
            self.in_flight.iter().map(|e| (*e.key(), e.value().clone())).collect();
        open.sort();
        Err(SearchError::InFlightContexts(
            open.len(),
            open.into_iter().map(|(id, shard)| format!("[{id}] {shard}")).collect(),
        )
        .into())
    }

    pub fn delegate(&self) -> &DefaultSearchService {
        &self.delegate
    }
}

impl SearchService for MockSearchService {
    fn create_context(
        &self,
        request: ShardSearchRequest,
    ) -> Result<ContextId> {
        let shard = format!("{}[{}]", request.index, request.shard);
        let _tracking = self.tracking.read();
        let id = self.delegate.create_context(request)?;
        self.in_flight.insert(id, shard);
        Ok(id)
    }

    fn touch_context(
        &self,
        id: ContextId,
    ) -> Result<()> {
        self.delegate.touch_context(id)
    }

    fn free_context(
        &self,
        id: ContextId,
    ) -> bool {
        self.in_flight.remove(&id);
        self.delegate.free_context(id)
    }

    fn active_contexts(&self) -> usize {
        self.delegate.active_contexts()
    }

    fn reap_expired(&self) -> usize {
        let _tracking = self.tracking.write();
        let reaped = self.delegate.reap_expired_ids();
        for id in &reaped {
            self.in_flight.remove(id);
        }
        reaped.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
