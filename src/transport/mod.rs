//! In-process transport layer.
//!
//! [`Transport`] moves raw request bytes between bound addresses;
//! [`TransportService`] is the subsystem the node hands out, owning request
//! handlers and the local node identity. The service is one of the hooks a
//! harness node may substitute.
mod local_transport;
mod transport_service;
pub use local_transport::*;
pub use transport_service::*;


use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;
use std::sync::Weak;

#[cfg(test)]
use mockall::automock;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::LOCAL_SCHEME;
use crate::Result;
use crate::TransportError;

pub type RequestHandler = Arc<dyn Fn(&[u8]) -> Result<Vec<u8>> + Send + Sync>;

/// Identity a node advertises to its peers
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiscoveryNode {
    pub id: String,
    pub name: String,
    pub address: String,
    pub cluster_name: String,
}

/// Receives requests addressed to a bound transport
pub trait RequestDispatcher: Send + Sync {
    fn dispatch(
        &self,
        action: &str,
        payload: &[u8],
    ) -> Result<Vec<u8>>;
}

#[cfg_attr(test, automock)]
pub trait Transport: Send + Sync + 'static {
    /// Address this transport answers on once bound
    fn local_address(&self) -> String;

    fn bind(
        &self,
        dispatcher: Weak<dyn RequestDispatcher>,
    ) -> Result<()>;

    fn unbind(&self);

    fn send(
        &self,
        address: &str,
        action: &str,
        payload: &[u8],
    ) -> Result<Vec<u8>>;
}

/// Wraps request handlers as they are registered
pub trait TransportInterceptor: Send + Sync {
    fn intercept_handler(
        &self,
        _action: &str,
        handler: RequestHandler,
    ) -> RequestHandler {
        handler
    }
}

/// Applies a list of interceptors in order
#[derive(Default, Clone)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn TransportInterceptor>>,
}

impl InterceptorChain {
    pub fn new(interceptors: Vec<Arc<dyn TransportInterceptor>>) -> Self {
        Self { interceptors }
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }
}

impl TransportInterceptor for InterceptorChain {
    fn intercept_handler(
        &self,
        action: &str,
        handler: RequestHandler,
    ) -> RequestHandler {
        self.interceptors
            .iter()
            .fold(handler, |handler, interceptor| interceptor.intercept_handler(action, handler))
    }
}

/// The transport subsystem handed out by a node's transport hook
pub trait TransportService: Send + Sync + 'static {
    fn local_node(&self) -> &DiscoveryNode;

    fn register_handler(
        &self,
        action: &str,
        handler: RequestHandler,
    );

    fn send_request(
        &self,
        address: &str,
        action: &str,
        payload: &[u8],
    ) -> Result<Vec<u8>>;

    fn start(&self) -> Result<()>;

    fn stop(&self);

    fn is_started(&self) -> bool;

    fn as_any(&self) -> &dyn Any;
}

impl Debug for dyn TransportService {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("TransportService").field("local_node", self.local_node()).finish()
    }
}

/// Parses `local:<port>` and returns the port
pub fn parse_local_address(address: &str) -> Result<u16> {
    let invalid = || TransportError::InvalidAddress(address.to_string());
    let (scheme, port) = address.trim().split_once(':').ok_or_else(invalid)?;
    if scheme != LOCAL_SCHEME {
        return Err(invalid().into());
    }
    port.parse::<u16>().map_err(|_| invalid().into())
}

pub fn format_local_address(port: u16) -> String {
    format!("{LOCAL_SCHEME}:{port}")
}
