//! A test node that swaps individual server subsystems for instrumented or
//! fault-injecting equivalents, selected per run by plugin markers.
mod arena;
mod cluster_info;
mod config;
mod discovery;
mod errors;
mod harness;
mod node;
mod plugins;
mod recovery;
mod search;
mod settings;
mod threadpool;
mod transport;

pub mod constants;
pub mod utils;

pub use arena::*;
pub use cluster_info::*;
pub use self::config::*;
pub use discovery::*;
pub use errors::*;
pub use harness::*;
pub use node::*;
pub use plugins::*;
pub use recovery::*;
pub use search::*;
pub use settings::*;
pub use threadpool::*;
pub use transport::*;
