use std::any::Any;
use std::sync::Arc;

use crate::ClusterSettings;
use crate::Marker;
use crate::MarkerId;
use crate::Plugin;
use crate::RecoverySettings;
use crate::Result;
use crate::CHUNK_SIZE_SETTING;

pub enum RecoveryChunkSizeMarker {}

impl Marker for RecoveryChunkSizeMarker {
    const NAME: &'static str = "recovery-chunk-size";
}

/// Lets tests shrink recovery chunks through `indices.recovery.chunk_size`
#[derive(Debug, Default)]
pub struct RecoveryChunkSizePlugin;

impl Plugin for RecoveryChunkSizePlugin {
    fn name(&self) -> &'static str {
        "recovery-chunk-size"
    }

    fn markers(&self) -> Vec<MarkerId> {
        vec![MarkerId::of::<RecoveryChunkSizeMarker>()]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Wires the chunk size setting into `recovery_settings`
pub fn bind_chunk_size_setting(
    cluster_settings: &ClusterSettings,
    recovery_settings: &Arc<RecoverySettings>,
) -> Result<()> {
    let target = recovery_settings.clone();
    cluster_settings.add_settings_update_consumer(&CHUNK_SIZE_SETTING, move |bytes: u64| target.set_chunk_size(bytes))
}
