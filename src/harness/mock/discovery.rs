use std::any::Any;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use lazy_static::lazy_static;
use parking_lot::Mutex;
use tracing::debug;

use crate::DiscoveryError;
use crate::Marker;
use crate::MarkerId;
use crate::PeerProber;
use crate::PeerProberParams;
use crate::PingResponse;
use crate::Plugin;
use crate::Result;

pub enum MockPeerProberMarker {}

impl Marker for MockPeerProberMarker {
    const NAME: &'static str = "mock-peer-prober";
}

#[derive(Debug, Default)]
pub struct MockPeerProberPlugin;

impl Plugin for MockPeerProberPlugin {
    fn name(&self) -> &'static str {
        "mock-peer-prober"
    }

    fn markers(&self) -> Vec<MarkerId> {
        vec![MarkerId::of::<MockPeerProberMarker>()]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

lazy_static! {
    /// cluster name -> node id -> started prober of this process
    static ref ACTIVE_PROBERS: Mutex<HashMap<String, BTreeMap<String, PingResponse>>> =
        Mutex::new(HashMap::new());
}

/// Finds peers through a process-wide table instead of the network.
///
/// A ping returns every other started prober of the same cluster.
pub struct MockPeerProber {
    local: PingResponse,
    closed: AtomicBool,
}

impl MockPeerProber {
    pub fn new(params: PeerProberParams<'_>) -> Result<Self> {
        Ok(Self {
            local: PingResponse::of(params.transport_service.local_node()),
            closed: AtomicBool::new(false),
        })
    }

    /// Node ids of every started prober of `cluster_name`
    pub fn active_nodes(cluster_name: &str) -> Vec<String> {
        ACTIVE_PROBERS
            .lock()
            .get(cluster_name)
            .map(|nodes| nodes.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn deregister(&self) {
        let mut probers = ACTIVE_PROBERS.lock();
        if let Some(nodes) = probers.get_mut(&self.local.cluster_name) {
            nodes.remove(&self.local.node.id);
            if nodes.is_empty() {
                probers.remove(&self.local.cluster_name);
            }
        }
    }
}

impl PeerProber for MockPeerProber {
    fn start(&self) -> Result<()> {
        self.closed.store(false, Ordering::Release);
        ACTIVE_PROBERS
            .lock()
            .entry(self.local.cluster_name.clone())
            .or_default()
            .insert(self.local.node.id.clone(), self.local.clone());
        debug!("mock prober of [{}] registered", self.local.node.name);
        Ok(())
    }

    fn ping(&self) -> Result<Vec<PingResponse>> {
        if self.closed.load(Ordering::Acquire) {
            return Err(DiscoveryError::Closed.into());
        }
        let probers = ACTIVE_PROBERS.lock();
        Ok(probers
            .get(&self.local.cluster_name)
            .map(|nodes| {
                nodes
                    .values()
                    .filter(|r| r.node.id != self.local.node.id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.deregister();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for MockPeerProber {
    fn drop(&mut self) {
        self.deregister();
    }
}
