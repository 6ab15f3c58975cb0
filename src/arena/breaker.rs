use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use tracing::debug;

use crate::ArenaError;
use crate::Result;

/// Byte accounting with a hard limit
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    limit: u64,
    used: AtomicU64,
    trip_count: AtomicU64,
}

impl CircuitBreaker {
    pub fn new(
        name: &str,
        limit: u64,
    ) -> Self {
        Self {
            name: name.to_string(),
            limit,
            used: AtomicU64::new(0),
            trip_count: AtomicU64::new(0),
        }
    }

    /// Reserves `bytes`, or trips without reserving anything
    pub fn add_estimate_bytes_and_maybe_break(
        &self,
        bytes: u64,
        label: &str,
    ) -> Result<()> {
        let mut current = self.used.load(Ordering::Acquire);
        loop {
            let wanted = current.saturating_add(bytes);
            if wanted > self.limit {
                self.trip_count.fetch_add(1, Ordering::Relaxed);
                debug!("[{}] tripped for [{}]: {} > {}", self.name, label, wanted, self.limit);
                return Err(ArenaError::CircuitBreaking {
                    breaker: self.name.clone(),
                    label: label.to_string(),
                    wanted,
                    limit: self.limit,
                }
                .into());
            }
            match self.used.compare_exchange_weak(current, wanted, Ordering::AcqRel, Ordering::Acquire) {
                Ok(_) => return Ok(()),
                Err(actual) => current = actual,
            }
        }
    }

    pub fn release(
        &self,
        bytes: u64,
    ) {
        self.used.fetch_sub(bytes, Ordering::AcqRel);
    }

    pub fn used(&self) -> u64 {
        self.used.load(Ordering::Acquire)
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn trip_count(&self) -> u64 {
        self.trip_count.load(Ordering::Relaxed)
    }
}
