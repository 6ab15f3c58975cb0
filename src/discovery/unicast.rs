use std::any::Any;
use std::collections::HashSet;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tracing::debug;
use tracing::trace;
use tracing::warn;

use super::PeerProber;
use super::PingResponse;
use super::UnicastHostsProvider;
use crate::constants::DISCOVERY_PING_ACTION;
use crate::DiscoveryError;
use crate::PeerProberParams;
use crate::Result;
use crate::TransportService;

/// Pings every seed host over the transport service
pub struct UnicastPeerProber {
    transport_service: Arc<dyn TransportService>,
    hosts_provider: Arc<dyn UnicastHostsProvider>,
    closed: AtomicBool,
}

impl UnicastPeerProber {
    /// Also answers pings from other nodes on this node's transport service.
    pub fn new(params: PeerProberParams<'_>) -> Result<Self> {
        let local = PingResponse::of(params.transport_service.local_node());
        let response = bincode::serialize(&local)?;
        params.transport_service.register_handler(
            DISCOVERY_PING_ACTION,
            Arc::new(move |payload: &[u8]| -> Result<Vec<u8>> {
                let from: PingResponse = bincode::deserialize(payload)?;
                trace!("ping from [{}] of cluster [{}]", from.node.name, from.cluster_name);
                Ok(response.clone())
            }),
        );

        Ok(Self {
            transport_service: params.transport_service,
            hosts_provider: params.hosts_provider,
            closed: AtomicBool::new(false),
        })
    }
}

impl PeerProber for UnicastPeerProber {
    fn start(&self) -> Result<()> {
        self.closed.store(false, Ordering::Release);
        Ok(())
    }

    fn ping(&self) -> Result<Vec<PingResponse>> {
        if self.closed.load(Ordering::Acquire) {
            return Err(DiscoveryError::Closed.into());
        }

        let local = self.transport_service.local_node();
        let request = bincode::serialize(&PingResponse::of(local))?;

        let mut seen = HashSet::new();
        let mut responses = Vec::new();
        for address in self.hosts_provider.seed_addresses() {
            if address == local.address {
                continue;
            }
            let bytes = match self.transport_service.send_request(&address, DISCOVERY_PING_ACTION, &request) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("failed to ping [{}]: {}", address, e);
                    continue;
                }
            };
            let response: PingResponse = match bincode::deserialize(&bytes) {
                Ok(response) => response,
                Err(e) => {
                    warn!("dropping malformed ping response from [{}]: {}", address, e);
                    continue;
                }
            };
            if response.cluster_name != local.cluster_name {
                debug!(
                    "ignoring ping response from [{}] of cluster [{}]",
                    response.node.name, response.cluster_name
                );
                continue;
            }
            if seen.insert(response.node.id.clone()) {
                responses.push(response);
            }
        }
        Ok(responses)
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
