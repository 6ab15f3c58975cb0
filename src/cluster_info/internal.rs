use std::any::Any;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::debug;
use tracing::warn;

use super::ClusterInfo;
use super::ClusterInfoService;
use super::NodeClient;
use crate::constants::MANAGEMENT_POOL;
use crate::ClusterInfoParams;
use crate::Result;
use crate::ThreadPool;
use crate::CLUSTER_INFO_UPDATE_INTERVAL_SETTING;

struct Collector {
    client: Arc<dyn NodeClient>,
    current: ArcSwap<ClusterInfo>,
    update_interval_ms: AtomicU64,
}

impl Collector {
    fn refresh(&self) -> Result<ClusterInfo> {
        let info = ClusterInfo::from_usages(self.client.disk_usages()?);
        self.current.store(Arc::new(info.clone()));
        Ok(info)
    }

    fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms.load(Ordering::Acquire))
    }
}

/// Production collector; refreshes on the management pool once started
pub struct InternalClusterInfoService {
    collector: Arc<Collector>,
    thread_pool: Arc<ThreadPool>,
    enabled: bool,
    shutdown_tx: Mutex<Option<watch::Sender<()>>>,
}

impl InternalClusterInfoService {
    pub fn new(params: ClusterInfoParams<'_>) -> Result<Self> {
        let interval = params.cluster_settings.get(&CLUSTER_INFO_UPDATE_INTERVAL_SETTING)?;
        let collector = Arc::new(Collector {
            client: params.client,
            current: ArcSwap::from_pointee(ClusterInfo::default()),
            update_interval_ms: AtomicU64::new(interval.as_millis() as u64),
        });

        let target = collector.clone();
        params.cluster_settings.add_settings_update_consumer(
            &CLUSTER_INFO_UPDATE_INTERVAL_SETTING,
            move |interval: Duration| {
                debug!("cluster info update interval set to {:?}", interval);
                target.update_interval_ms.store(interval.as_millis() as u64, Ordering::Release);
            },
        )?;

        Ok(Self {
            collector,
            thread_pool: params.thread_pool,
            enabled: params.config.cluster_info.enabled,
            shutdown_tx: Mutex::new(None),
        })
    }

    pub fn update_interval(&self) -> Duration {
        self.collector.update_interval()
    }

    pub fn is_refreshing(&self) -> bool {
        self.shutdown_tx.lock().is_some()
    }
}

impl ClusterInfoService for InternalClusterInfoService {
    fn cluster_info(&self) -> ClusterInfo {
        self.collector.current.load().as_ref().clone()
    }

    fn refresh(&self) -> Result<ClusterInfo> {
        self.collector.refresh()
    }

    fn start(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        let mut shutdown_tx = self.shutdown_tx.lock();
        if shutdown_tx.is_some() {
            return Ok(());
        }

        let (tx, mut rx) = watch::channel(());
        let collector = self.collector.clone();
        self.thread_pool.spawn(MANAGEMENT_POOL, async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(collector.update_interval()) => {
                        if let Err(e) = collector.refresh() {
                            warn!("failed to refresh cluster info: {}", e);
                        }
                    }
                    _ = rx.changed() => {
                        debug!("cluster info refresh loop stopped");
                        break;
                    }
                }
            }
        })?;
        *shutdown_tx = Some(tx);
        Ok(())
    }

    fn stop(&self) {
        // dropping the sender ends the refresh loop
        self.shutdown_tx.lock().take();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
