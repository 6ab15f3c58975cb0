use std::sync::Arc;

use super::*;
use crate::Arena;
use crate::ArenaError;
use crate::ClusterInfoService;
use crate::DiscoveryError;
use crate::Error;
use crate::HarnessNode;
use crate::NodeConfig;
use crate::PluginDescriptor;
use crate::RequestHandler;
use crate::SearchError;
use crate::SearchService;
use crate::ShardSearchRequest;
use crate::TransportError;
use crate::TransportService;

fn test_config(cluster_name: &str) -> NodeConfig {
    let mut config = NodeConfig::default();
    config.cluster.cluster_name = cluster_name.to_string();
    config.cluster.data_path = std::env::temp_dir();
    config.thread_pool.worker_threads = 1;
    config
}

fn unique_cluster() -> String {
    format!("mock-test-{}", nanoid::nanoid!(8))
}

fn harness_node<P: crate::Plugin + Default>(cluster_name: &str) -> HarnessNode {
    HarnessNode::new(test_config(cluster_name), &[PluginDescriptor::of::<P>()]).unwrap()
}

fn mock_transport(node: &HarnessNode) -> &MockTransportService {
    node.transport_service()
        .as_any()
        .downcast_ref::<MockTransportService>()
        .unwrap()
}

#[test]
fn test_mock_transport_applies_rules_and_records_requests() {
    let cluster = unique_cluster();
    let server = harness_node::<MockTransportPlugin>(&cluster);
    let client = harness_node::<MockTransportPlugin>(&cluster);
    let echo: RequestHandler = Arc::new(|payload: &[u8]| -> crate::Result<Vec<u8>> { Ok(payload.to_vec()) });
    server.transport_service().register_handler("test:echo", echo);
    server.start().unwrap();
    client.start().unwrap();

    let transport = mock_transport(&client);
    let target = server.local_node().address.clone();
    assert_eq!(
        transport.send_request(&target, "test:echo", b"hi").unwrap(),
        b"hi".to_vec()
    );

    transport.add_rule(&target, TransportRule::Disconnect);
    assert!(matches!(
        transport.send_request(&target, "test:echo", b"hi"),
        Err(Error::Transport(TransportError::ConnectFailed(_)))
    ));

    transport.add_rule(&target, TransportRule::Unresponsive);
    assert!(matches!(
        transport.send_request(&target, "test:echo", b"hi"),
        Err(Error::Transport(TransportError::ReceiveTimeout { .. }))
    ));

    transport.clear_rules();
    assert!(transport.send_request(&target, "test:echo", b"hi").is_ok());

    let sent = transport.sent_requests();
    assert_eq!(sent.len(), 4);
    assert!(sent.iter().all(|r| r.address == target && r.action == "test:echo"));
}

#[test]
fn test_disconnect_rule_hides_peer_from_unicast_discovery() {
    let cluster = unique_cluster();
    let a = harness_node::<MockTransportPlugin>(&cluster);
    a.start().unwrap();

    let mut config = test_config(&cluster);
    config.discovery.seed_hosts = vec![a.local_node().address.clone()];
    let b = HarnessNode::new(config, &[PluginDescriptor::of::<MockTransportPlugin>()]).unwrap();
    b.start().unwrap();
    assert_eq!(b.peer_prober().ping().unwrap().len(), 1);

    mock_transport(&b).add_rule(&a.local_node().address, TransportRule::Disconnect);
    assert!(b.peer_prober().ping().unwrap().is_empty());

    mock_transport(&b).clear_rule(&a.local_node().address);
    assert_eq!(b.peer_prober().ping().unwrap().len(), 1);
}

#[test]
fn test_mock_search_tracks_in_flight_contexts() {
    let node = harness_node::<MockSearchPlugin>(&unique_cluster());
    let search = node
        .search_service()
        .as_any()
        .downcast_ref::<MockSearchService>()
        .unwrap();

    let first = search.create_context(ShardSearchRequest::new("logs", 0, "*")).unwrap();
    let second = search.create_context(ShardSearchRequest::new("logs", 1, "*")).unwrap();
    assert_eq!(search.in_flight_contexts(), 2);

    match search.assert_no_in_flight_contexts() {
        Err(Error::Search(SearchError::InFlightContexts(2, open))) => {
            assert!(open[0].contains("logs[0]"));
            assert!(open[1].contains("logs[1]"));
        }
        other => panic!("unexpected {other:?}"),
    }

    assert!(search.free_context(first));
    assert!(search.assert_no_in_flight_contexts().is_err());
    assert!(search.free_context(second));
    assert!(search.assert_no_in_flight_contexts().is_ok());
    assert_eq!(search.delegate().active_contexts(), 0);
}

#[test]
fn test_mock_search_forgets_reaped_contexts() {
    let node = harness_node::<MockSearchPlugin>(&unique_cluster());
    let search = node
        .search_service()
        .as_any()
        .downcast_ref::<MockSearchService>()
        .unwrap();

    let mut request = ShardSearchRequest::new("logs", 0, "*");
    request.keep_alive = Some(std::time::Duration::ZERO);
    search.create_context(request).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));

    assert_eq!(search.reap_expired(), 1);
    assert!(search.assert_no_in_flight_contexts().is_ok());
}

#[test]
fn test_mock_search_keeps_tracking_contexts_created_while_reaping() {
    let mut config = test_config(&unique_cluster());
    config.search.max_open_contexts = 10_000;
    config.arena.page_size_bytes = 64;
    let node = HarnessNode::new(config, &[PluginDescriptor::of::<MockSearchPlugin>()]).unwrap();
    let search = node
        .search_service()
        .as_any()
        .downcast_ref::<MockSearchService>()
        .unwrap();
    let done = std::sync::atomic::AtomicBool::new(false);

    std::thread::scope(|s| {
        s.spawn(|| {
            for shard in 0..4000 {
                let mut request = ShardSearchRequest::new("logs", shard, "*");
                if shard % 2 == 0 {
                    request.keep_alive = Some(std::time::Duration::ZERO);
                }
                search.create_context(request).unwrap();
            }
            done.store(true, std::sync::atomic::Ordering::SeqCst);
        });
        s.spawn(|| {
            while !done.load(std::sync::atomic::Ordering::SeqCst) {
                search.reap_expired();
            }
        });
    });

    std::thread::sleep(std::time::Duration::from_millis(5));
    search.reap_expired();
    assert_eq!(search.active_contexts(), 2000);
    assert_eq!(search.in_flight_contexts(), 2000);
}

#[test]
fn test_mock_peer_prober_sees_started_nodes_of_its_cluster() {
    let cluster = unique_cluster();
    let a = harness_node::<MockPeerProberPlugin>(&cluster);
    let b = harness_node::<MockPeerProberPlugin>(&cluster);
    let idle = harness_node::<MockPeerProberPlugin>(&cluster);
    let stranger = harness_node::<MockPeerProberPlugin>(&unique_cluster());
    a.start().unwrap();
    b.start().unwrap();
    stranger.start().unwrap();

    let peers = a.peer_prober().ping().unwrap();
    assert_eq!(peers.len(), 1);
    assert_eq!(peers[0].node, *b.local_node());
    assert!(!MockPeerProber::active_nodes(&cluster).contains(&idle.local_node().id));

    b.close();
    assert!(a.peer_prober().ping().unwrap().is_empty());
    assert_eq!(MockPeerProber::active_nodes(&cluster), vec![a.local_node().id.clone()]);

    a.close();
    assert!(matches!(a.peer_prober().ping(), Err(Error::Discovery(DiscoveryError::Closed))));
    assert!(MockPeerProber::active_nodes(&cluster).is_empty());
}

#[test]
fn test_mock_cluster_info_applies_disk_overrides() {
    let node = harness_node::<MockClusterInfoPlugin>(&unique_cluster());
    let service = node
        .cluster_info_service()
        .as_any()
        .downcast_ref::<MockInternalClusterInfoService>()
        .unwrap();
    let id = node.local_node().id.clone();

    node.start().unwrap();
    // no background refresh
    assert!(service.cluster_info().disk_usages.is_empty());

    service.set_disk_usage(&id, 1000, 5000);
    let info = service.refresh().unwrap();
    assert_eq!(info.disk_usages[&id].total_bytes, 1000);
    assert_eq!(info.disk_usages[&id].free_bytes, 1000);
    assert_eq!(service.cluster_info(), info);

    service.clear_disk_usage_overrides();
    let info = service.refresh().unwrap();
    assert!(info.disk_usages[&id].total_bytes > 0);
}

#[test]
fn test_mock_arena_reports_leaks_until_released() {
    let node = harness_node::<NodeMocksPlugin>(&unique_cluster());
    let arena = node.arena().as_any().downcast_ref::<MockArena>().unwrap();

    let block = arena.allocate(4096, "leaky").unwrap();
    assert_eq!(arena.outstanding_blocks(), 1);
    assert_eq!(node.breaker().used(), 4096);
    // random fill; all zeroes is practically impossible
    assert!(block.as_slice().iter().any(|b| *b != 0));

    match arena.ensure_all_released() {
        Err(Error::Arena(ArenaError::Leaked(1, labels))) => assert_eq!(labels, vec!["leaky".to_string()]),
        other => panic!("unexpected {other:?}"),
    }

    drop(block);
    assert!(arena.ensure_all_released().is_ok());
    assert_eq!(node.breaker().used(), 0);
}

#[test]
fn test_mock_arena_still_honours_breaker() {
    let mut config = test_config(&unique_cluster());
    config.arena.page_size_bytes = 16;
    config.arena.breaker_limit_bytes = 32;
    let node = HarnessNode::new(config, &[PluginDescriptor::of::<NodeMocksPlugin>()]).unwrap();

    let _held = node.arena().allocate(32, "fills-it").unwrap();
    assert!(matches!(
        node.arena().allocate(1, "one-more"),
        Err(Error::Arena(ArenaError::CircuitBreaking { .. }))
    ));
}

#[test]
fn test_search_on_mock_arena_releases_everything() {
    let plugins = [
        PluginDescriptor::of::<MockSearchPlugin>(),
        PluginDescriptor::of::<NodeMocksPlugin>(),
    ];
    let node = HarnessNode::new(test_config(&unique_cluster()), &plugins).unwrap();
    let arena = node.arena().as_any().downcast_ref::<MockArena>().unwrap();

    let id = node
        .search_service()
        .create_context(ShardSearchRequest::new("logs", 0, "*"))
        .unwrap();
    assert!(arena.ensure_all_released().is_err());

    node.search_service().free_context(id);
    assert!(arena.ensure_all_released().is_ok());
}

#[test]
fn test_chunk_size_binding() {
    let config = NodeConfig::default();
    let cluster_settings = crate::ClusterSettings::for_node(&config).unwrap();
    let recovery = crate::RecoverySettings::new(&cluster_settings).unwrap();

    bind_chunk_size_setting(&cluster_settings, &recovery).unwrap();
    cluster_settings
        .apply_settings(&[("indices.recovery.chunk_size", "64kb")])
        .unwrap();
    assert_eq!(recovery.chunk_size(), 64 * 1024);
}
