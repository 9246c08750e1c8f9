use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::gateway::{ActiveGateway, ConnectorError, GatewayConnector};
use super::node::{ConfigAttr, NodeAttr};
use super::registry::{NodeRegistry, RegistryError};
use super::state::StateTracker;

/// What to do when the gateway cannot be reached at a newly configured address
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconnectFailurePolicy {
    /// Keep the new address stored; connecting is retried by later polls
    #[default]
    Keep,
    /// Restore the previous address and reject the command
    Rollback,
}

impl std::str::FromStr for ReconnectFailurePolicy {
    type Err = String;
    fn from_str(value: &str) -> Result<Self, String> {
        match value {
            "keep" => Ok(Self::Keep),
            "rollback" => Ok(Self::Rollback),
            _ => Err(format!(
                "reconnect failure policy must be 'keep' or 'rollback', not '{value}'"
            )),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigCommandError {
    #[error("node {0} is not handled here")]
    UnknownNode(String),
    #[error("unknown configuration attribute '{0}'")]
    UnknownAttribute(String),
    #[error("invalid value for '{attr}': {reason}")]
    InvalidValue { attr: NodeAttr, reason: String },
    #[error("could not connect to gateway at {address}; previous address restored")]
    ReconnectFailed {
        address: String,
        #[source]
        source: ConnectorError,
    },
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Receives configuration updates for nodes
pub trait ConfigHandler: Send + Sync {
    fn handle_config_command(
        &self,
        node_address: &str,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigCommandError>;
}

fn validate_value(attr: NodeAttr, spec: &ConfigAttr, value: &str) -> Result<(), ConfigCommandError> {
    let invalid = |reason: String| ConfigCommandError::InvalidValue { attr, reason };

    spec.datatype.check(value).map_err(invalid)?;
    if attr == NodeAttr::Address {
        if value.is_empty() {
            return Err(invalid("address must not be empty".into()));
        }
        if value.chars().any(char::is_whitespace) {
            return Err(invalid(format!("'{value}' contains whitespace")));
        }
    }
    Ok(())
}

/// Applies configuration commands to the gateway node
pub struct GatewayConfigHandler {
    registry: Arc<dyn NodeRegistry>,
    node_address: String,
    active: ActiveGateway,
    state: Arc<StateTracker>,
    connector: Arc<dyn GatewayConnector>,
    on_reconnect_failure: ReconnectFailurePolicy,
    /// Held for the whole of one command
    command_lock: Mutex<()>,
}

impl GatewayConfigHandler {
    pub fn new(
        registry: Arc<dyn NodeRegistry>,
        node_address: String,
        active: ActiveGateway,
        state: Arc<StateTracker>,
        connector: Arc<dyn GatewayConnector>,
        on_reconnect_failure: ReconnectFailurePolicy,
    ) -> Self {
        GatewayConfigHandler {
            registry,
            node_address,
            active,
            state,
            connector,
            on_reconnect_failure,
            command_lock: Mutex::new(()),
        }
    }

    fn apply(&self, node_address: &str, key: &str, value: &str) -> Result<(), ConfigCommandError> {
        if node_address != self.node_address {
            return Err(ConfigCommandError::UnknownNode(node_address.to_string()));
        }
        let attr: NodeAttr = key
            .parse()
            .map_err(|_| ConfigCommandError::UnknownAttribute(key.to_string()))?;

        let _guard = self
            .command_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let node = self
            .registry
            .get_node_by_address(node_address)?
            .ok_or_else(|| RegistryError::NodeNotFound(node_address.to_string()))?;
        let spec = node
            .config
            .get(&attr)
            .ok_or_else(|| ConfigCommandError::UnknownAttribute(key.to_string()))?;
        validate_value(attr, spec, value)?;

        self.state.begin_reconfigure();
        let result = self.store(attr, spec.value.clone(), value);
        self.state.settle(self.active.snapshot().is_configured());
        result
    }

    fn store(
        &self,
        attr: NodeAttr,
        previous_value: Option<String>,
        value: &str,
    ) -> Result<(), ConfigCommandError> {
        self.registry
            .set_node_config_value(&self.node_address, attr, Some(value.to_string()))?;
        let previous = self.active.set(attr, value);

        if attr != NodeAttr::Address || previous.address == value {
            return Ok(());
        }

        match self.connector.connect(&self.active.snapshot()) {
            Ok(()) => Ok(()),
            Err(e) => match self.on_reconnect_failure {
                ReconnectFailurePolicy::Keep => {
                    log::warn!("Gateway not reachable at new address {value}: {e}");
                    Ok(())
                }
                ReconnectFailurePolicy::Rollback => {
                    log::warn!(
                        "Gateway not reachable at new address {value}: {e}; restoring {}",
                        previous.address
                    );
                    self.active.replace(previous);
                    self.registry
                        .set_node_config_value(&self.node_address, attr, previous_value)?;
                    Err(ConfigCommandError::ReconnectFailed {
                        address: value.to_string(),
                        source: e,
                    })
                }
            },
        }
    }
}

impl ConfigHandler for GatewayConfigHandler {
    fn handle_config_command(
        &self,
        node_address: &str,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigCommandError> {
        let result = self.apply(node_address, key, value);
        match &result {
            Ok(()) => log::info!("Updated '{key}' on {node_address}"),
            Err(e) => log::warn!("Rejected update of '{key}' on {node_address}: {e}"),
        }
        result
    }
}
