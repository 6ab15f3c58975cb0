//! Extension modules and the activation registry derived from them.
//!
//! A node is handed a list of [`PluginDescriptor`]s. [`PluginsService`]
//! instantiates each distinct plugin once and freezes the union of the
//! markers they carry. Nothing mutates the registry afterwards, so every
//! reader observes the same snapshot.
mod marker;
pub use marker::*;

#[cfg(test)]
mod plugins_test;

use std::any::Any;
use std::any::TypeId;
use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;
use std::hash::Hasher;
use std::sync::Arc;

use tracing::debug;

use crate::transport::TransportInterceptor;

pub trait Plugin: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    /// Overrides this plugin asks a harness node for
    fn markers(&self) -> Vec<MarkerId> {
        Vec::new()
    }

    /// Wrappers applied to every transport request handler, in order
    fn transport_interceptors(&self) -> Vec<Arc<dyn TransportInterceptor>> {
        Vec::new()
    }

    fn as_any(&self) -> &dyn Any;
}

/// Identity of a plugin type plus a way to build it.
#[derive(Clone, Copy)]
pub struct PluginDescriptor {
    type_id: TypeId,
    type_name: &'static str,
    create: fn() -> Box<dyn Plugin>,
}

impl PluginDescriptor {
    pub fn of<P: Plugin + Default>() -> Self {
        Self {
            type_id: TypeId::of::<P>(),
            type_name: std::any::type_name::<P>(),
            create: || Box::new(P::default()),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<P: Plugin>(&self) -> bool {
        self.type_id == TypeId::of::<P>()
    }

    fn instantiate(&self) -> Box<dyn Plugin> {
        (self.create)()
    }
}

impl PartialEq for PluginDescriptor {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.type_id == other.type_id
    }
}
impl Eq for PluginDescriptor {}

impl Hash for PluginDescriptor {
    fn hash<H: Hasher>(
        &self,
        state: &mut H,
    ) {
        self.type_id.hash(state);
    }
}

impl Debug for PluginDescriptor {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}

/// The resolved plugins of one node and the markers they activate.
pub struct PluginsService {
    plugins: Vec<Box<dyn Plugin>>,
    markers: HashSet<MarkerId>,
}

impl Debug for PluginsService {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("PluginsService")
            .field("plugins", &self.plugin_names())
            .field("markers", &self.markers)
            .finish()
    }
}

impl PluginsService {
    /// Instantiates every distinct descriptor, keeping first-seen order.
    pub fn new(descriptors: &[PluginDescriptor]) -> Self {
        let mut seen = HashSet::new();
        let mut plugins = Vec::new();
        for descriptor in descriptors {
            if !seen.insert(*descriptor) {
                debug!("plugin {:?} requested twice, ignoring duplicate", descriptor);
                continue;
            }
            plugins.push(descriptor.instantiate());
        }

        let markers = plugins.iter().flat_map(|p| p.markers()).collect();
        Self { plugins, markers }
    }

    pub fn has_marker(
        &self,
        marker: MarkerId,
    ) -> bool {
        self.markers.contains(&marker)
    }

    pub fn active_markers(&self) -> &HashSet<MarkerId> {
        &self.markers
    }

    /// All loaded plugins of type `P`
    pub fn filter_plugins<P: Plugin>(&self) -> Vec<&P> {
        self.plugins
            .iter()
            .filter_map(|p| p.as_any().downcast_ref::<P>())
            .collect()
    }

    pub fn plugin_names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    pub fn transport_interceptors(&self) -> Vec<Arc<dyn TransportInterceptor>> {
        self.plugins.iter().flat_map(|p| p.transport_interceptors()).collect()
    }
}
