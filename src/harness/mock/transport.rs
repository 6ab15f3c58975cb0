use std::any::Any;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::trace;

use crate::DefaultTransportService;
use crate::DiscoveryNode;
use crate::Marker;
use crate::MarkerId;
use crate::Plugin;
use crate::RequestHandler;
use crate::Result;
use crate::TransportError;
use crate::TransportService;
use crate::TransportServiceParams;

pub enum MockTransportMarker {}

impl Marker for MockTransportMarker {
    const NAME: &'static str = "mock-transport";
}

#[derive(Debug, Default)]
pub struct MockTransportPlugin;

impl Plugin for MockTransportPlugin {
    fn name(&self) -> &'static str {
        "mock-transport"
    }

    fn markers(&self) -> Vec<MarkerId> {
        vec![MarkerId::of::<MockTransportMarker>()]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Fault injected for every request sent to one address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportRule {
    /// Fails right away as if the connection was refused
    Disconnect,
    /// Swallows the request; the sender observes a timeout
    Unresponsive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentRequest {
    pub address: String,
    pub action: String,
}

/// Production transport service plus per-address fault rules and a log of
/// every outgoing request.
pub struct MockTransportService {
    delegate: DefaultTransportService,
    rules: DashMap<String, TransportRule>,
    sent: Mutex<Vec<SentRequest>>,
}

impl MockTransportService {
    pub fn new(params: TransportServiceParams<'_>) -> Result<Self> {
        Ok(Self {
            delegate: DefaultTransportService::new(params)?,
            rules: DashMap::new(),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn add_rule(
        &self,
        address: &str,
        rule: TransportRule,
    ) {
        self.rules.insert(address.to_string(), rule);
    }

    pub fn clear_rule(
        &self,
        address: &str,
    ) {
        self.rules.remove(address);
    }

    pub fn clear_rules(&self) {
        self.rules.clear();
    }

    pub fn sent_requests(&self) -> Vec<SentRequest> {
        self.sent.lock().clone()
    }

    pub fn delegate(&self) -> &DefaultTransportService {
        &self.delegate
    }
}

impl TransportService for MockTransportService {
    fn local_node(&self) -> &DiscoveryNode {
        self.delegate.local_node()
    }

    fn register_handler(
        &self,
        action: &str,
        handler: RequestHandler,
    ) {
        self.delegate.register_handler(action, handler)
    }

    fn send_request(
        &self,
        address: &str,
        action: &str,
        payload: &[u8],
    ) -> Result<Vec<u8>> {
        self.sent.lock().push(SentRequest {
            address: address.to_string(),
            action: action.to_string(),
        });

        let rule = self.rules.get(address).map(|r| *r.value());
        match rule {
            Some(TransportRule::Disconnect) => {
                trace!("dropping [{}] to disconnected [{}]", action, address);
                Err(TransportError::ConnectFailed(address.to_string()).into())
            }
            Some(TransportRule::Unresponsive) => {
                trace!("blackholing [{}] to unresponsive [{}]", action, address);
                Err(TransportError::ReceiveTimeout {
                    address: address.to_string(),
                    action: action.to_string(),
                }
                .into())
            }
            None => self.delegate.send_request(address, action, payload),
        }
    }

    fn start(&self) -> Result<()> {
        self.delegate.start()
    }

    fn stop(&self) {
        self.delegate.stop()
    }

    fn is_started(&self) -> bool {
        self.delegate.is_started()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
