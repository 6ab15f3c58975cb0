use std::sync::atomic::AtomicU16;
use std::sync::atomic::Ordering;
use std::sync::Weak;

use dashmap::DashMap;
use lazy_static::lazy_static;
use parking_lot::Mutex;
use tracing::debug;
use tracing::trace;

use super::format_local_address;
use super::parse_local_address;
use super::RequestDispatcher;
use super::Transport;
use crate::Result;
use crate::TransportError;

const FIRST_EPHEMERAL_PORT: u16 = 32768;

lazy_static! {
    /// Every bound in-process address of this process
    static ref BOUND_ADDRESSES: DashMap<u16, Weak<dyn RequestDispatcher>> = DashMap::new();
}

static NEXT_EPHEMERAL_PORT: AtomicU16 = AtomicU16::new(FIRST_EPHEMERAL_PORT);

/// Transport over a process-wide address table.
///
/// Unbinds itself on drop.
pub struct LocalTransport {
    port: u16,
    bound: Mutex<Option<Weak<dyn RequestDispatcher>>>,
}

impl LocalTransport {
    /// Resolves `listen_address`; port 0 picks an address no live transport holds.
    pub fn new(listen_address: &str) -> Result<Self> {
        let mut port = parse_local_address(listen_address)?;
        if port == 0 {
            port = next_ephemeral_port();
        }
        Ok(Self {
            port,
            bound: Mutex::new(None),
        })
    }
}

fn next_ephemeral_port() -> u16 {
    loop {
        let candidate = NEXT_EPHEMERAL_PORT.fetch_add(1, Ordering::Relaxed);
        if candidate < FIRST_EPHEMERAL_PORT {
            // wrapped around u16::MAX
            NEXT_EPHEMERAL_PORT.store(FIRST_EPHEMERAL_PORT, Ordering::Relaxed);
            continue;
        }
        if !BOUND_ADDRESSES.contains_key(&candidate) {
            return candidate;
        }
    }
}

impl Transport for LocalTransport {
    fn local_address(&self) -> String {
        format_local_address(self.port)
    }

    fn bind(
        &self,
        dispatcher: Weak<dyn RequestDispatcher>,
    ) -> Result<()> {
        let mut bound = self.bound.lock();
        match BOUND_ADDRESSES.entry(self.port) {
            dashmap::mapref::entry::Entry::Occupied(mut entry) => {
                if entry.get().upgrade().is_some() {
                    return Err(TransportError::AddressInUse(self.local_address()).into());
                }
                entry.insert(dispatcher.clone());
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(dispatcher.clone());
            }
        }
        *bound = Some(dispatcher);
        debug!("bound local transport at {}", self.local_address());
        Ok(())
    }

    fn unbind(&self) {
        if let Some(ours) = self.bound.lock().take() {
            BOUND_ADDRESSES.remove_if(&self.port, |_, current| current.ptr_eq(&ours));
            debug!("unbound local transport at {}", self.local_address());
        }
    }

    fn send(
        &self,
        address: &str,
        action: &str,
        payload: &[u8],
    ) -> Result<Vec<u8>> {
        let port = parse_local_address(address)?;
        // Clone out of the map before dispatching: the remote handler may send in turn.
        let target = BOUND_ADDRESSES.get(&port).map(|entry| entry.value().clone());
        let dispatcher = target
            .and_then(|weak| weak.upgrade())
            .ok_or_else(|| TransportError::ConnectFailed(address.to_string()))?;

        trace!("[{}] -> [{}] {}", self.local_address(), address, action);
        dispatcher.dispatch(action, payload)
    }
}

impl Drop for LocalTransport {
    fn drop(&mut self) {
        self.unbind();
    }
}
