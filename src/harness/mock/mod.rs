//! Instrumented stand-ins for node subsystems, each enabled by its own
//! plugin marker.
mod arena;
mod cluster_info;
mod discovery;
mod recovery;
mod search;
mod transport;
pub use arena::*;
pub use cluster_info::*;
pub use discovery::*;
pub use recovery::*;
pub use search::*;
pub use transport::*;

#[cfg(test)]
mod mock_test;
