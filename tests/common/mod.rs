use std::time::Duration;
use std::time::Instant;

use node_harness::HarnessNode;
use node_harness::NodeConfig;
use node_harness::PluginDescriptor;

pub const WAIT_TIMEOUT: Duration = Duration::from_secs(10);

/// A cluster name no other test in this process uses
pub fn unique_cluster(prefix: &str) -> String {
    format!("{prefix}-{}", nanoid::nanoid!(8))
}

pub fn node_config(
    cluster_name: &str,
    node_name: &str,
    seed_hosts: &[String],
) -> NodeConfig {
    let mut config = NodeConfig::default();
    config.cluster.cluster_name = cluster_name.to_string();
    config.cluster.node_name = node_name.to_string();
    config.cluster.data_path = std::env::temp_dir();
    config.discovery.seed_hosts = seed_hosts.to_vec();
    config.thread_pool.worker_threads = 1;
    config
}

pub fn start_node(
    config: NodeConfig,
    plugins: &[PluginDescriptor],
) -> HarnessNode {
    let node = HarnessNode::new(config, plugins).expect("harness node should build");
    node.start().expect("harness node should start");
    node
}

/// Polls `condition` until it holds or [`WAIT_TIMEOUT`] passes
pub fn wait_until(condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + WAIT_TIMEOUT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    condition()
}
