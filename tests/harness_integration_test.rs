mod common;

use std::time::Duration;

use common::node_config;
use common::start_node;
use common::unique_cluster;
use common::wait_until;
use node_harness::mock::MockArena;
use node_harness::mock::MockPeerProber;
use node_harness::mock::MockPeerProberPlugin;
use node_harness::mock::MockSearchPlugin;
use node_harness::mock::MockSearchService;
use node_harness::mock::MockTransportPlugin;
use node_harness::mock::MockTransportService;
use node_harness::mock::NodeMocksPlugin;
use node_harness::mock::RecoveryChunkSizePlugin;
use node_harness::mock::TransportRule;
use node_harness::HarnessNode;
use node_harness::NodeConfig;
use node_harness::PluginDescriptor;
use node_harness::SearchService;
use node_harness::ShardSearchRequest;

fn mock_transport(node: &HarnessNode) -> &MockTransportService {
    node.transport_service()
        .as_any()
        .downcast_ref::<MockTransportService>()
        .expect("mock transport should be active")
}

#[test]
fn test_partitioned_node_drops_out_of_discovery() {
    let cluster = unique_cluster("partition");
    let plugins = [PluginDescriptor::of::<MockTransportPlugin>()];

    let a = start_node(node_config(&cluster, "a", &[]), &plugins);
    let b = start_node(node_config(&cluster, "b", &[a.local_node().address.clone()]), &plugins);
    let seeds = vec![a.local_node().address.clone(), b.local_node().address.clone()];
    let c = start_node(node_config(&cluster, "c", &seeds), &plugins);

    assert_eq!(c.peer_prober().ping().unwrap().len(), 2);

    // cut c off from b in both directions
    mock_transport(&c).add_rule(&b.local_node().address, TransportRule::Unresponsive);
    mock_transport(&b).add_rule(&c.local_node().address, TransportRule::Disconnect);

    let peers = c.peer_prober().ping().unwrap();
    assert_eq!(peers.len(), 1);
    assert_eq!(peers[0].node.name, "a");

    mock_transport(&c).clear_rules();
    mock_transport(&b).clear_rules();
    assert_eq!(c.peer_prober().ping().unwrap().len(), 2);
}

#[test]
fn test_search_workload_leaves_no_leaks() {
    let plugins = [
        PluginDescriptor::of::<MockSearchPlugin>(),
        PluginDescriptor::of::<NodeMocksPlugin>(),
    ];
    let node = start_node(node_config(&unique_cluster("search"), "searcher", &[]), &plugins);
    let search = node
        .search_service()
        .as_any()
        .downcast_ref::<MockSearchService>()
        .unwrap();
    let arena = node.arena().as_any().downcast_ref::<MockArena>().unwrap();

    let ids: Vec<u64> = (0..8)
        .map(|shard| {
            search
                .create_context(ShardSearchRequest::new("logs", shard, "level:error"))
                .unwrap()
        })
        .collect();
    assert!(search.assert_no_in_flight_contexts().is_err());
    assert_eq!(arena.outstanding_blocks(), 8);

    for id in ids {
        assert!(search.free_context(id));
    }
    search.assert_no_in_flight_contexts().unwrap();
    arena.ensure_all_released().unwrap();
}

#[test]
fn test_expired_contexts_are_reaped_by_a_started_node() {
    let plugins = [PluginDescriptor::of::<MockSearchPlugin>()];
    let node = start_node(node_config(&unique_cluster("reaper"), "reaper", &[]), &plugins);
    let search = node
        .search_service()
        .as_any()
        .downcast_ref::<MockSearchService>()
        .unwrap();

    let mut request = ShardSearchRequest::new("logs", 0, "*");
    request.keep_alive = Some(Duration::from_millis(1));
    search.create_context(request).unwrap();

    assert!(wait_until(|| search.assert_no_in_flight_contexts().is_ok()));
}

#[test]
fn test_federated_children_join_their_own_cluster() {
    let remote = unique_cluster("remote");
    let remote_plugins = [PluginDescriptor::of::<MockPeerProberPlugin>()];
    let remote_node = start_node(node_config(&remote, "remote-0", &[]), &remote_plugins);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("federation.toml");
    std::fs::write(
        &path,
        format!(
            r#"
            [federation.children.bridge]
            cluster_name = "{remote}"
            "#
        ),
    )
    .unwrap();
    let config = node_config(&unique_cluster("gateway"), "gateway", &[])
        .with_override_config(path.to_str().unwrap())
        .unwrap();

    let gateway = start_node(config, &remote_plugins);
    let child = gateway.child("bridge").expect("child should be built from config");
    let child = child
        .as_any()
        .downcast_ref::<HarnessNode>()
        .expect("children of a harness node are harness nodes");

    assert!(child.has_requested::<MockPeerProberPlugin>());
    assert!(child.peer_prober().as_any().is::<MockPeerProber>());
    assert_eq!(child.local_node().name, "gateway/bridge");

    let peers = child.peer_prober().ping().unwrap();
    assert_eq!(peers.len(), 1);
    assert_eq!(peers[0].node.id, remote_node.local_node().id);

    // the gateway itself lives in a cluster of its own
    assert!(gateway.peer_prober().ping().unwrap().is_empty());
}

#[test]
fn test_recovery_chunk_size_is_tunable_at_runtime() {
    let plugins = [PluginDescriptor::of::<RecoveryChunkSizePlugin>()];
    let tuned = start_node(node_config(&unique_cluster("recovery"), "tuned", &[]), &plugins);
    let plain = start_node(node_config(&unique_cluster("recovery"), "plain", &[]), &[]);

    for node in [&tuned, &plain] {
        node.cluster_settings()
            .apply_settings(&[("indices.recovery.chunk_size", "4kb")])
            .unwrap();
    }

    assert_eq!(tuned.recovery_settings().chunk_size(), 4 * 1024);
    assert_eq!(
        plain.recovery_settings().chunk_size(),
        NodeConfig::default().recovery.chunk_size_bytes
    );
}
