use std::fmt::Display;

use tracing::debug;

use super::mock::MockArenaMarker;
use super::mock::MockClusterInfoMarker;
use super::mock::MockPeerProberMarker;
use super::mock::MockSearchMarker;
use super::mock::MockTransportMarker;
use super::mock::RecoveryChunkSizeMarker;
use crate::MarkerId;
use crate::PluginsService;
use crate::Result;

/// The overridable construction points of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HookId {
    Transport,
    Search,
    PeerProber,
    ClusterInfo,
    Arena,
    RecoverySettings,
}

impl HookId {
    pub const ALL: [HookId; 6] = [
        HookId::Transport,
        HookId::Search,
        HookId::PeerProber,
        HookId::ClusterInfo,
        HookId::Arena,
        HookId::RecoverySettings,
    ];

    pub fn name(self) -> &'static str {
        match self {
            HookId::Transport => "new_transport_service",
            HookId::Search => "new_search_service",
            HookId::PeerProber => "new_peer_prober",
            HookId::ClusterInfo => "new_cluster_info_service",
            HookId::Arena => "create_arena",
            HookId::RecoverySettings => "process_recovery_settings",
        }
    }

    /// The one marker that switches this hook to its alternate factory.
    ///
    /// Exhaustive match: a hook cannot be added without a marker, and no
    /// marker is listed twice.
    pub fn marker(self) -> MarkerId {
        match self {
            HookId::Transport => MarkerId::of::<MockTransportMarker>(),
            HookId::Search => MarkerId::of::<MockSearchMarker>(),
            HookId::PeerProber => MarkerId::of::<MockPeerProberMarker>(),
            HookId::ClusterInfo => MarkerId::of::<MockClusterInfoMarker>(),
            HookId::Arena => MarkerId::of::<MockArenaMarker>(),
            HookId::RecoverySettings => MarkerId::of::<RecoveryChunkSizeMarker>(),
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl Display for HookId {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    Production,
    Alternate,
}

/// Branch decision of every hook, fixed from one registry snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookTable {
    branches: [Branch; 6],
}

impl HookTable {
    pub fn resolve(plugins: &PluginsService) -> Self {
        let mut branches = [Branch::Production; 6];
        for hook in HookId::ALL {
            if plugins.has_marker(hook.marker()) {
                branches[hook.index()] = Branch::Alternate;
            }
        }
        Self { branches }
    }

    pub fn branch(
        &self,
        hook: HookId,
    ) -> Branch {
        self.branches[hook.index()]
    }

    /// Hooks switched to their alternate factory
    pub fn alternates(&self) -> Vec<HookId> {
        HookId::ALL
            .into_iter()
            .filter(|hook| self.branch(*hook) == Branch::Alternate)
            .collect()
    }

    /// Runs exactly one of the two factories with `args`; its result,
    /// error included, is returned as is.
    pub fn dispatch<A, T, P, F>(
        &self,
        hook: HookId,
        args: A,
        production: P,
        alternate: F,
    ) -> Result<T>
    where
        P: FnOnce(A) -> Result<T>,
        F: FnOnce(A) -> Result<T>,
    {
        match self.branch(hook) {
            Branch::Production => production(args),
            Branch::Alternate => {
                debug!("{} uses its alternate factory, requested by {:?}", hook, hook.marker());
                alternate(args)
            }
        }
    }
}
