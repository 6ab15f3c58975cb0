use config::ConfigError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    //===== Config errors ====
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Codec(#[from] bincode::Error),

    //===== Subsystem errors ====
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Arena(#[from] ArenaError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    //===== Node lifecycle errors ====
    #[error("Node failed to start: {0}")]
    NodeStartFailed(String),

    #[error("Thread pool [{0}] does not exist")]
    UnknownThreadPool(String),
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("unknown setting [{0}]")]
    Unknown(String),

    #[error("setting [{0}] is not dynamically updateable")]
    NotDynamic(String),

    #[error("failed to parse value [{value}] for setting [{key}]: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("address [{0}] is already bound")]
    AddressInUse(String),

    #[error("invalid transport address [{0}]")]
    InvalidAddress(String),

    #[error("connect to [{0}] failed")]
    ConnectFailed(String),

    #[error("no handler registered for action [{0}]")]
    ActionNotFound(String),

    #[error("request [{action}] to [{address}] timed out")]
    ReceiveTimeout { address: String, action: String },

    #[error("transport service is not started")]
    NotStarted,
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("trying to create too many search contexts, limit is [{0}]")]
    TooManyContexts(usize),

    #[error("search context [{0}] not found")]
    ContextMissing(u64),

    #[error("{0} search contexts are still in flight: {1:?}")]
    InFlightContexts(usize, Vec<String>),
}

#[derive(Debug, Error)]
pub enum ArenaError {
    #[error("[{breaker}] data for [{label}] would be [{wanted}] bytes, which is larger than the limit of [{limit}] bytes")]
    CircuitBreaking {
        breaker: String,
        label: String,
        wanted: u64,
        limit: u64,
    },

    #[error("{0} arena blocks have not been released: {1:?}")]
    Leaked(usize, Vec<String>),
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("peer prober is closed")]
    Closed,
}
