use super::*;
use crate::NodeConfig;

fn settings() -> ClusterSettings {
    ClusterSettings::for_node(&NodeConfig::default()).unwrap()
}

#[test]
fn test_initial_values_come_from_cluster_settings() {
    let cluster_settings = settings();
    let recovery = RecoverySettings::new(&cluster_settings).unwrap();

    assert_eq!(recovery.chunk_size(), 512 * 1024);
    assert_eq!(recovery.max_bytes_per_sec(), 40 * 1024 * 1024);
}

#[test]
fn test_max_bytes_per_sec_follows_setting() {
    let cluster_settings = settings();
    let recovery = RecoverySettings::new(&cluster_settings).unwrap();

    cluster_settings
        .apply_settings(&[("indices.recovery.max_bytes_per_sec", "10mb")])
        .unwrap();
    assert_eq!(recovery.max_bytes_per_sec(), 10 * 1024 * 1024);
}

#[test]
fn test_chunk_size_is_not_consumed_by_default() {
    let cluster_settings = settings();
    let recovery = RecoverySettings::new(&cluster_settings).unwrap();

    cluster_settings
        .apply_settings(&[("indices.recovery.chunk_size", "1mb")])
        .unwrap();
    assert_eq!(recovery.chunk_size(), 512 * 1024);
    assert_eq!(cluster_settings.get(&CHUNK_SIZE_SETTING).unwrap(), 1024 * 1024);
}
