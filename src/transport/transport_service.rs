use std::any::Any;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Weak;

use dashmap::DashMap;
use tracing::debug;

use super::DiscoveryNode;
use super::RequestDispatcher;
use super::RequestHandler;
use super::Transport;
use super::TransportInterceptor;
use super::TransportService;
use crate::Result;
use crate::TransportError;
use crate::TransportServiceParams;

/// Action name -> handler table, shared with the bound transport
#[derive(Default)]
pub(crate) struct HandlerRegistry {
    handlers: DashMap<String, RequestHandler>,
}

impl RequestDispatcher for HandlerRegistry {
    fn dispatch(
        &self,
        action: &str,
        payload: &[u8],
    ) -> Result<Vec<u8>> {
        let handler = self
            .handlers
            .get(action)
            .map(|h| h.value().clone())
            .ok_or_else(|| TransportError::ActionNotFound(action.to_string()))?;
        handler(payload)
    }
}

pub struct DefaultTransportService {
    local_node: DiscoveryNode,
    transport: Arc<dyn Transport>,
    interceptor: Arc<dyn TransportInterceptor>,
    handlers: Arc<HandlerRegistry>,
    started: AtomicBool,
}

impl DefaultTransportService {
    pub fn new(params: TransportServiceParams<'_>) -> Result<Self> {
        Ok(Self {
            local_node: params.local_node,
            transport: params.transport,
            interceptor: params.interceptor,
            handlers: Arc::new(HandlerRegistry::default()),
            started: AtomicBool::new(false),
        })
    }

    pub fn registered_actions(&self) -> Vec<String> {
        let mut actions: Vec<String> = self.handlers.handlers.iter().map(|e| e.key().clone()).collect();
        actions.sort();
        actions
    }
}

impl TransportService for DefaultTransportService {
    fn local_node(&self) -> &DiscoveryNode {
        &self.local_node
    }

    fn register_handler(
        &self,
        action: &str,
        handler: RequestHandler,
    ) {
        let handler = self.interceptor.intercept_handler(action, handler);
        if self.handlers.handlers.insert(action.to_string(), handler).is_some() {
            debug!("replaced request handler for [{}]", action);
        }
    }

    fn send_request(
        &self,
        address: &str,
        action: &str,
        payload: &[u8],
    ) -> Result<Vec<u8>> {
        if !self.is_started() {
            return Err(TransportError::NotStarted.into());
        }
        self.transport.send(address, action, payload)
    }

    fn start(&self) -> Result<()> {
        if self.started.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let registry: Arc<dyn RequestDispatcher> = self.handlers.clone();
        let dispatcher: Weak<dyn RequestDispatcher> = Arc::downgrade(&registry);
        if let Err(e) = self.transport.bind(dispatcher) {
            self.started.store(false, Ordering::Release);
            return Err(e);
        }
        Ok(())
    }

    fn stop(&self) {
        if self.started.swap(false, Ordering::AcqRel) {
            self.transport.unbind();
        }
    }

    fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
