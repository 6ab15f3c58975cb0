use std::fmt::Debug;

use crate::Result;
use crate::SettingsError;

/// A typed, statically declared setting key.
///
/// The default is kept in raw form so every value, default or not, passes
/// through the same parser.
pub struct Setting<T> {
    key: &'static str,
    default: &'static str,
    parser: fn(&str) -> std::result::Result<T, String>,
    dynamic: bool,
}

impl<T> Setting<T> {
    /// A setting that may be changed while the node runs
    pub const fn dynamic(
        key: &'static str,
        default: &'static str,
        parser: fn(&str) -> std::result::Result<T, String>,
    ) -> Self {
        Self {
            key,
            default,
            parser,
            dynamic: true,
        }
    }

    /// A setting fixed for the lifetime of the node
    pub const fn fixed(
        key: &'static str,
        default: &'static str,
        parser: fn(&str) -> std::result::Result<T, String>,
    ) -> Self {
        Self {
            key,
            default,
            parser,
            dynamic: false,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn default_raw(&self) -> &'static str {
        self.default
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    pub fn parse(
        &self,
        raw: &str,
    ) -> Result<T> {
        (self.parser)(raw).map_err(|reason| {
            SettingsError::InvalidValue {
                key: self.key.to_string(),
                value: raw.to_string(),
                reason,
            }
            .into()
        })
    }

    pub(crate) fn parser(&self) -> fn(&str) -> std::result::Result<T, String> {
        self.parser
    }
}

impl<T> Debug for Setting<T> {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Setting")
            .field("key", &self.key)
            .field("default", &self.default)
            .field("dynamic", &self.dynamic)
            .finish()
    }
}

pub fn parse_string(raw: &str) -> std::result::Result<String, String> {
    if raw.trim().is_empty() {
        return Err("value cannot be empty".to_string());
    }
    Ok(raw.to_string())
}
