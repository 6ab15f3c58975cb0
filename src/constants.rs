use std::time::Duration;

// -
// Thread pool names

pub const GENERIC_POOL: &str = "generic";
pub const SEARCH_POOL: &str = "search";
pub const MANAGEMENT_POOL: &str = "management";

// -
// Transport

/// Address scheme used by the in-process transport
pub const LOCAL_SCHEME: &str = "local";

/// Listen address that asks the transport for a fresh ephemeral address
pub const EPHEMERAL_ADDRESS: &str = "local:0";

/// Action served by every unicast prober
pub(crate) const DISCOVERY_PING_ACTION: &str = "internal:discovery/zen/unicast";

// -
// Arena

pub(crate) const ARENA_BREAKER_NAME: &str = "request";

// -
// Search

/// How often a started node frees expired search contexts
pub(crate) const SEARCH_REAPER_INTERVAL: Duration = Duration::from_secs(1);
