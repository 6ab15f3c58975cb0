//! Shard recovery throttling knobs.

#[cfg(test)]
mod recovery_test;

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tracing::debug;

use crate::ClusterSettings;
use crate::Result;
use crate::CHUNK_SIZE_SETTING;
use crate::MAX_BYTES_PER_SEC_SETTING;

/// Live recovery parameters shared by every recovery of a node.
///
/// Only `max_bytes_per_sec` follows its setting on its own; chunk size
/// changes reach this struct only through [`RecoverySettings::set_chunk_size`].
#[derive(Debug)]
pub struct RecoverySettings {
    chunk_size: AtomicU64,
    chunk_size_updates: AtomicU64,
    max_bytes_per_sec: AtomicU64,
}

impl RecoverySettings {
    pub fn new(cluster_settings: &ClusterSettings) -> Result<Arc<Self>> {
        let settings = Arc::new(Self {
            chunk_size: AtomicU64::new(cluster_settings.get(&CHUNK_SIZE_SETTING)?),
            chunk_size_updates: AtomicU64::new(0),
            max_bytes_per_sec: AtomicU64::new(cluster_settings.get(&MAX_BYTES_PER_SEC_SETTING)?),
        });

        let target = settings.clone();
        cluster_settings.add_settings_update_consumer(&MAX_BYTES_PER_SEC_SETTING, move |bytes: u64| {
            target.set_max_bytes_per_sec(bytes)
        })?;
        Ok(settings)
    }

    pub fn chunk_size(&self) -> u64 {
        self.chunk_size.load(Ordering::Acquire)
    }

    pub fn set_chunk_size(
        &self,
        bytes: u64,
    ) {
        debug!("recovery chunk size set to {}b", bytes);
        self.chunk_size.store(bytes, Ordering::Release);
        self.chunk_size_updates.fetch_add(1, Ordering::AcqRel);
    }

    /// Number of `set_chunk_size` calls since construction
    pub fn chunk_size_updates(&self) -> u64 {
        self.chunk_size_updates.load(Ordering::Acquire)
    }

    pub fn max_bytes_per_sec(&self) -> u64 {
        self.max_bytes_per_sec.load(Ordering::Acquire)
    }

    pub fn set_max_bytes_per_sec(
        &self,
        bytes: u64,
    ) {
        debug!("recovery throttle set to {}b/s", bytes);
        self.max_bytes_per_sec.store(bytes, Ordering::Release);
    }
}
