use std::any::Any;
use std::collections::HashSet;
use std::ops::Deref;
use std::sync::Arc;

use super::HarnessHooks;
use crate::ChildNode;
use crate::Node;
use crate::NodeConfig;
use crate::NodeHooks;
use crate::Plugin;
use crate::PluginDescriptor;
use crate::Result;

/// A [`Node`] whose subsystems can be swapped for mocks by plugin markers.
///
/// Constructed exactly like a node, so it drops in wherever one is built.
#[derive(Debug)]
pub struct HarnessNode {
    node: Node,
    requested_plugins: HashSet<PluginDescriptor>,
}

impl HarnessNode {
    pub fn new(
        config: NodeConfig,
        plugins: &[PluginDescriptor],
    ) -> Result<Self> {
        let node = Node::with_hooks(config, plugins, |plugins| {
            Arc::new(HarnessHooks::new(plugins)) as Arc<dyn NodeHooks>
        })?;
        Ok(Self {
            node,
            requested_plugins: plugins.iter().copied().collect(),
        })
    }

    /// Plugin types passed to the constructor
    pub fn requested_plugins(&self) -> &HashSet<PluginDescriptor> {
        &self.requested_plugins
    }

    pub fn has_requested<P: Plugin>(&self) -> bool {
        self.requested_plugins.iter().any(|d| d.is::<P>())
    }

    pub fn node(&self) -> &Node {
        &self.node
    }
}

impl Deref for HarnessNode {
    type Target = Node;

    fn deref(&self) -> &Node {
        &self.node
    }
}

impl ChildNode for HarnessNode {
    fn node(&self) -> &Node {
        &self.node
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
