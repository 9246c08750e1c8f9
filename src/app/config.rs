use std::env;

use kvstore::{KVDb, KVStoreError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::constants::{defaults, envvars, keys};
use crate::node_mgmt::ReconnectFailurePolicy;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not parse app config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] KVStoreError),
    #[error("invalid value in {var}: {reason}")]
    InvalidEnv { var: &'static str, reason: String },
    #[error("unknown app config field '{0}'")]
    UnknownField(String),
    #[error("invalid value for '{field}': {reason}")]
    InvalidField { field: String, reason: String },
}

/// Application settings, stored as JSON under `app_config`
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub publisher_id: String,
    pub gateway_address: String,
    pub gateway_id: String,
    pub zone: String,
    /// Seconds between gateway polls
    pub poll_interval: u64,
    pub reconnect_failure: ReconnectFailurePolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            publisher_id: String::new(),
            gateway_address: String::new(),
            gateway_id: String::new(),
            zone: defaults::ZONE.to_string(),
            poll_interval: defaults::POLL_INTERVAL_SECS,
            reconnect_failure: ReconnectFailurePolicy::default(),
        }
    }
}

pub fn from_str(config_raw: &str) -> Result<AppConfig, ConfigError> {
    serde_json::from_str::<AppConfig>(config_raw).map_err(Into::into)
}

impl AppConfig {
    pub fn load(kvs: &KVDb) -> Result<Self, ConfigError> {
        Ok(kvs.get(keys::APP_CONFIG)?.unwrap_or_default())
    }

    pub fn save(&self, kvs: &KVDb) -> Result<(), ConfigError> {
        kvs.set(keys::APP_CONFIG, self)?;
        Ok(())
    }

    /// Stored config, overridden from the environment, with defaults filled in
    pub fn resolve(kvs: &KVDb) -> Result<Self, ConfigError> {
        Ok(Self::load(kvs)?.apply_env_overrides()?.with_defaults())
    }

    pub fn apply_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(v) = env::var(envvars::PUBLISHER_ID) {
            self.publisher_id = v;
        }
        if let Ok(v) = env::var(envvars::GATEWAY_ADDRESS) {
            self.gateway_address = v;
        }
        if let Ok(v) = env::var(envvars::GATEWAY_ID) {
            self.gateway_id = v;
        }
        if let Ok(v) = env::var(envvars::ZONE) {
            self.zone = v;
        }
        if let Ok(v) = env::var(envvars::POLL_INTERVAL) {
            self.poll_interval = v.parse().map_err(|e| ConfigError::InvalidEnv {
                var: envvars::POLL_INTERVAL,
                reason: format!("{e}"),
            })?;
        }
        if let Ok(v) = env::var(envvars::RECONNECT_FAILURE) {
            self.reconnect_failure = v.parse().map_err(|reason| ConfigError::InvalidEnv {
                var: envvars::RECONNECT_FAILURE,
                reason,
            })?;
        }
        Ok(self)
    }

    /// Empty publisher and gateway ids fall back to `onewire` and `gateway`
    pub fn with_defaults(mut self) -> Self {
        if self.publisher_id.is_empty() {
            self.publisher_id = defaults::APP_ID.to_string();
        }
        if self.gateway_id.is_empty() {
            self.gateway_id = defaults::GATEWAY_ID.to_string();
        }
        if self.zone.is_empty() {
            self.zone = defaults::ZONE.to_string();
        }
        if self.poll_interval == 0 {
            self.poll_interval = defaults::POLL_INTERVAL_SECS;
        }
        self
    }

    /// Read one field by its JSON name
    pub fn get_field(&self, field: &str) -> Result<Value, ConfigError> {
        let mut value = serde_json::to_value(self)?;
        value
            .get_mut(field)
            .map(Value::take)
            .ok_or_else(|| ConfigError::UnknownField(field.to_string()))
    }

    /// Set one field by its JSON name. Non-string fields are parsed from `raw`.
    pub fn set_field(&mut self, field: &str, raw: &str) -> Result<(), ConfigError> {
        let mut value = serde_json::to_value(&*self)?;
        let slot = value
            .get_mut(field)
            .ok_or_else(|| ConfigError::UnknownField(field.to_string()))?;
        // Keep the input as a plain string unless the field is numeric
        *slot = if slot.is_number() {
            serde_json::from_str(raw).map_err(|e| ConfigError::InvalidField {
                field: field.to_string(),
                reason: e.to_string(),
            })?
        } else {
            Value::String(raw.to_string())
        };
        *self = serde_json::from_value(value).map_err(|e| ConfigError::InvalidField {
            field: field.to_string(),
            reason: e.to_string(),
        })?;
        Ok(())
    }
}
