//! Node-wide dynamic settings with live-update subscriptions.
//!
//! Subsystems subscribe to a [`Setting`] with
//! [`ClusterSettings::add_settings_update_consumer`]. An update passes
//! through [`ClusterSettings::apply_settings`], which validates every value
//! before any consumer runs, then invokes each consumer at most once and only
//! when its parsed value actually changed.
mod builtin;
mod setting;
pub use builtin::*;
pub use setting::*;


use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::Mutex;
use parking_lot::RwLock;
use tracing::debug;

use crate::utils::units::format_byte_size;
use crate::utils::units::format_time_value;
use crate::NodeConfig;
use crate::Result;
use crate::SettingsError;

type Apply = Box<dyn FnOnce() + Send>;
type Prepare = Box<dyn Fn(&str, &str) -> Result<Option<Apply>> + Send + Sync>;

struct Registered {
    default: &'static str,
    dynamic: bool,
    validate: Box<dyn Fn(&str) -> Result<()> + Send + Sync>,
}

struct Consumer {
    key: &'static str,
    prepare: Prepare,
}

pub struct ClusterSettings {
    registered: HashMap<&'static str, Registered>,
    /// Explicitly set raw values; absent keys fall back to their default
    values: RwLock<HashMap<&'static str, String>>,
    consumers: Mutex<Vec<Arc<Consumer>>>,
    /// Held from commit until every consumer ran, so consumers see batches
    /// in commit order
    apply_lock: Mutex<()>,
}

impl Debug for ClusterSettings {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("ClusterSettings")
            .field("registered", &self.registered.len())
            .field("values", &*self.values.read())
            .finish()
    }
}

impl Default for ClusterSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl ClusterSettings {
    pub fn new() -> Self {
        Self {
            registered: HashMap::new(),
            values: RwLock::new(HashMap::new()),
            consumers: Mutex::new(Vec::new()),
            apply_lock: Mutex::new(()),
        }
    }

    /// Registry with every built-in setting, seeded from the node configuration
    pub fn for_node(config: &NodeConfig) -> Result<Self> {
        let mut settings = Self::new();
        settings.register(&CLUSTER_NAME_SETTING);
        settings.register(&CHUNK_SIZE_SETTING);
        settings.register(&MAX_BYTES_PER_SEC_SETTING);
        settings.register(&DEFAULT_KEEP_ALIVE_SETTING);
        settings.register(&CLUSTER_INFO_UPDATE_INTERVAL_SETTING);

        settings.seed(CLUSTER_NAME_SETTING.key(), &config.cluster.cluster_name)?;
        settings.seed(
            CHUNK_SIZE_SETTING.key(),
            &format_byte_size(config.recovery.chunk_size_bytes),
        )?;
        settings.seed(
            MAX_BYTES_PER_SEC_SETTING.key(),
            &format_byte_size(config.recovery.max_bytes_per_sec),
        )?;
        settings.seed(
            DEFAULT_KEEP_ALIVE_SETTING.key(),
            &format_time_value(std::time::Duration::from_millis(config.search.default_keep_alive_ms)),
        )?;
        settings.seed(
            CLUSTER_INFO_UPDATE_INTERVAL_SETTING.key(),
            &format_time_value(std::time::Duration::from_millis(config.cluster_info.update_interval_ms)),
        )?;
        Ok(settings)
    }

    pub fn register<T: 'static>(
        &mut self,
        setting: &Setting<T>,
    ) {
        let key = setting.key();
        let parser = setting.parser();
        self.registered.insert(
            key,
            Registered {
                default: setting.default_raw(),
                dynamic: setting.is_dynamic(),
                validate: Box::new(move |raw| {
                    parser(raw).map(|_| ()).map_err(|reason| {
                        SettingsError::InvalidValue {
                            key: key.to_string(),
                            value: raw.to_string(),
                            reason,
                        }
                        .into()
                    })
                }),
            },
        );
    }

    /// Sets the initial value of a registered setting without notifying consumers
    pub fn seed(
        &mut self,
        key: &str,
        raw: &str,
    ) -> Result<()> {
        let (key, registered) = self.lookup(key)?;
        (registered.validate)(raw)?;
        self.values.get_mut().insert(key, raw.to_string());
        Ok(())
    }

    pub fn is_registered(
        &self,
        key: &str,
    ) -> bool {
        self.registered.contains_key(key)
    }

    /// Current value of `setting`, falling back to its default
    pub fn get<T>(
        &self,
        setting: &Setting<T>,
    ) -> Result<T> {
        let values = self.values.read();
        let raw = values.get(setting.key()).map(String::as_str).unwrap_or(setting.default_raw());
        setting.parse(raw)
    }

    /// Subscribes `consumer` to changes of a registered dynamic setting.
    pub fn add_settings_update_consumer<T, F>(
        &self,
        setting: &Setting<T>,
        consumer: F,
    ) -> Result<()>
    where
        T: PartialEq + Send + 'static,
        F: Fn(T) + Send + Sync + 'static,
    {
        let (key, registered) = self.lookup(setting.key())?;
        if !registered.dynamic {
            return Err(SettingsError::NotDynamic(key.to_string()).into());
        }

        let parser = setting.parser();
        let consumer = Arc::new(consumer);
        let prepare: Prepare = Box::new(move |old, new| {
            let invalid = |raw: &str, reason: String| SettingsError::InvalidValue {
                key: key.to_string(),
                value: raw.to_string(),
                reason,
            };
            let old_value = parser(old).map_err(|reason| invalid(old, reason))?;
            let new_value = parser(new).map_err(|reason| invalid(new, reason))?;
            if old_value == new_value {
                return Ok(None);
            }
            let consumer = consumer.clone();
            Ok(Some(Box::new(move || consumer(new_value)) as Apply))
        });

        self.consumers.lock().push(Arc::new(Consumer { key, prepare }));
        Ok(())
    }

    /// Applies a batch of updates.
    ///
    /// Either every update is valid and committed, or none is. Consumers run
    /// after the commit, in registration order. Consumers must not apply
    /// settings themselves.
    pub fn apply_settings(
        &self,
        updates: &[(&str, &str)],
    ) -> Result<()> {
        let mut resolved = Vec::with_capacity(updates.len());
        for (key, raw) in updates {
            let (key, registered) = self.lookup(key)?;
            if !registered.dynamic {
                return Err(SettingsError::NotDynamic(key.to_string()).into());
            }
            (registered.validate)(raw)?;
            resolved.push((key, *raw));
        }

        let _applying = self.apply_lock.lock();
        let consumers: Vec<Arc<Consumer>> = self.consumers.lock().clone();

        let appliers = {
            let mut values = self.values.write();
            let mut next = values.clone();
            for (key, raw) in &resolved {
                next.insert(*key, raw.to_string());
            }

            let mut appliers = Vec::new();
            for consumer in consumers.iter().filter(|c| resolved.iter().any(|(k, _)| *k == c.key)) {
                let default = self.registered[consumer.key].default;
                let old = values.get(consumer.key).map(String::as_str).unwrap_or(default);
                let new = next.get(consumer.key).map(String::as_str).unwrap_or(default);
                if let Some(apply) = (consumer.prepare)(old, new)? {
                    appliers.push(apply);
                }
            }

            *values = next;
            appliers
        };

        debug!(
            "applied {} setting updates, notifying {} consumers",
            resolved.len(),
            appliers.len()
        );
        for apply in appliers {
            apply();
        }
        Ok(())
    }

    fn lookup(
        &self,
        key: &str,
    ) -> Result<(&'static str, &Registered)> {
        self.registered
            .get_key_value(key)
            .map(|(k, r)| (*k, r))
            .ok_or_else(|| SettingsError::Unknown(key.to_string()).into())
    }
}
