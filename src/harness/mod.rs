//! Test node that swaps individual subsystems for mocks.
//!
//! Each overridable hook has one marker. A [`HarnessNode`] resolves the
//! active markers once, right after its plugins load, into a [`HookTable`];
//! every hook then runs either the production factory or the mock one with
//! the same inputs. Hooks without an active marker behave exactly as on a
//! plain [`Node`](crate::Node).
//!
//! ```ignore
//! let node = HarnessNode::new(config, &[PluginDescriptor::of::<MockSearchPlugin>()])?;
//! assert!(node.search_service().as_any().is::<MockSearchService>());
//! ```
mod harness_hooks;
mod harness_node;
mod hook_table;
pub mod mock;
pub use harness_hooks::*;
pub use harness_node::*;
pub use hook_table::*;
