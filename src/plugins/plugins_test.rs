use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use super::*;
use crate::RequestHandler;

enum AlphaMarker {}
impl Marker for AlphaMarker {
    const NAME: &'static str = "alpha";
}

enum BetaMarker {}
impl Marker for BetaMarker {
    const NAME: &'static str = "beta";
}

#[derive(Default)]
struct AlphaPlugin;
impl Plugin for AlphaPlugin {
    fn name(&self) -> &'static str {
        "alpha"
    }

    fn markers(&self) -> Vec<MarkerId> {
        vec![MarkerId::of::<AlphaMarker>()]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Default)]
struct BetaPlugin;
impl Plugin for BetaPlugin {
    fn name(&self) -> &'static str {
        "beta"
    }

    fn markers(&self) -> Vec<MarkerId> {
        vec![MarkerId::of::<BetaMarker>(), MarkerId::of::<AlphaMarker>()]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

static PLAIN_PLUGIN_CREATED: AtomicUsize = AtomicUsize::new(0);

struct PlainPlugin;
impl Default for PlainPlugin {
    fn default() -> Self {
        PLAIN_PLUGIN_CREATED.fetch_add(1, Ordering::SeqCst);
        PlainPlugin
    }
}
impl Plugin for PlainPlugin {
    fn name(&self) -> &'static str {
        "plain"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct Tagging;
impl TransportInterceptor for Tagging {
    fn intercept_handler(
        &self,
        _action: &str,
        handler: RequestHandler,
    ) -> RequestHandler {
        Arc::new(move |payload: &[u8]| -> crate::Result<Vec<u8>> {
            let mut out = handler(payload)?;
            out.push(b'!');
            Ok(out)
        })
    }
}

#[derive(Default)]
struct InterceptingPlugin;
impl Plugin for InterceptingPlugin {
    fn name(&self) -> &'static str {
        "intercepting"
    }

    fn transport_interceptors(&self) -> Vec<Arc<dyn TransportInterceptor>> {
        vec![Arc::new(Tagging)]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[test]
fn test_marker_identity_is_by_type() {
    assert_eq!(MarkerId::of::<AlphaMarker>(), MarkerId::of::<AlphaMarker>());
    assert_ne!(MarkerId::of::<AlphaMarker>(), MarkerId::of::<BetaMarker>());
    assert_eq!(MarkerId::of::<BetaMarker>().name(), "beta");
    assert_eq!(format!("{:?}", MarkerId::of::<AlphaMarker>()), "Marker(alpha)");
}

#[test]
fn test_empty_registry_has_no_markers() {
    let plugins = PluginsService::new(&[]);
    assert!(plugins.active_markers().is_empty());
    assert!(!plugins.has_marker(MarkerId::of::<AlphaMarker>()));
    assert!(plugins.plugin_names().is_empty());
}

#[test]
fn test_markers_are_union_of_plugins() {
    let plugins = PluginsService::new(&[PluginDescriptor::of::<BetaPlugin>(), PluginDescriptor::of::<PlainPlugin>()]);

    assert!(plugins.has_marker(MarkerId::of::<AlphaMarker>()));
    assert!(plugins.has_marker(MarkerId::of::<BetaMarker>()));
    assert_eq!(plugins.active_markers().len(), 2);
}

#[test]
fn test_duplicate_descriptors_collapse() {
    let before = PLAIN_PLUGIN_CREATED.load(Ordering::SeqCst);
    let plugins = PluginsService::new(&[
        PluginDescriptor::of::<PlainPlugin>(),
        PluginDescriptor::of::<AlphaPlugin>(),
        PluginDescriptor::of::<PlainPlugin>(),
    ]);

    assert_eq!(plugins.plugin_names(), vec!["plain", "alpha"]);
    assert!(PLAIN_PLUGIN_CREATED.load(Ordering::SeqCst) - before >= 1);
    assert_eq!(plugins.filter_plugins::<PlainPlugin>().len(), 1);
}

#[test]
fn test_filter_plugins_by_type() {
    let plugins = PluginsService::new(&[PluginDescriptor::of::<AlphaPlugin>(), PluginDescriptor::of::<BetaPlugin>()]);

    assert_eq!(plugins.filter_plugins::<AlphaPlugin>().len(), 1);
    assert!(plugins.filter_plugins::<PlainPlugin>().is_empty());
}

#[test]
fn test_descriptor_identity() {
    let alpha = PluginDescriptor::of::<AlphaPlugin>();
    assert_eq!(alpha, PluginDescriptor::of::<AlphaPlugin>());
    assert_ne!(alpha, PluginDescriptor::of::<BetaPlugin>());
    assert!(alpha.is::<AlphaPlugin>());
    assert!(!alpha.is::<BetaPlugin>());
    assert!(alpha.type_name().ends_with("AlphaPlugin"));
}

#[test]
fn test_transport_interceptors_are_collected_in_order() {
    let plugins = PluginsService::new(&[
        PluginDescriptor::of::<InterceptingPlugin>(),
        PluginDescriptor::of::<AlphaPlugin>(),
    ]);
    let interceptors = plugins.transport_interceptors();
    assert_eq!(interceptors.len(), 1);

    let handler: RequestHandler = Arc::new(|payload: &[u8]| -> crate::Result<Vec<u8>> { Ok(payload.to_vec()) });
    let wrapped = interceptors[0].intercept_handler("test", handler);
    assert_eq!(wrapped(b"hi").unwrap(), b"hi!".to_vec());
}
