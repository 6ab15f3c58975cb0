use std::time::Duration;

use super::parse_string;
use super::Setting;
use crate::utils::units::parse_byte_size;
use crate::utils::units::parse_time_value;

pub const CLUSTER_NAME_SETTING: Setting<String> = Setting::fixed("cluster.name", "harness", parse_string);

/// Size of a single file chunk sent during shard recovery.
///
/// Registered on every node but only consumed when the recovery tuning
/// plugin is active.
pub const CHUNK_SIZE_SETTING: Setting<u64> =
    Setting::dynamic("indices.recovery.chunk_size", "512kb", parse_byte_size);

pub const MAX_BYTES_PER_SEC_SETTING: Setting<u64> =
    Setting::dynamic("indices.recovery.max_bytes_per_sec", "40mb", parse_byte_size);

pub const DEFAULT_KEEP_ALIVE_SETTING: Setting<Duration> =
    Setting::dynamic("search.default_keep_alive", "5m", parse_time_value);

pub const CLUSTER_INFO_UPDATE_INTERVAL_SETTING: Setting<Duration> =
    Setting::dynamic("cluster.info.update.interval", "30s", parse_time_value);
