mod hooks;
mod node;

pub use hooks::*;
pub use node::*;
