use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;

use super::node::{Node, NodeAttr};

/// Connection settings of the physical gateway, as currently in use
#[derive(Clone, Default, PartialEq)]
pub struct GatewaySettings {
    pub address: String,
    pub login_name: String,
    pub password: String,
}

impl GatewaySettings {
    pub fn from_node(node: &Node) -> Self {
        let value = |attr| node.config_value(attr).unwrap_or_default().to_string();
        GatewaySettings {
            address: value(NodeAttr::Address),
            login_name: value(NodeAttr::LoginName),
            password: value(NodeAttr::Password),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.address.is_empty() && !self.login_name.is_empty()
    }

    pub fn set(&mut self, attr: NodeAttr, value: &str) {
        let field = match attr {
            NodeAttr::Address => &mut self.address,
            NodeAttr::LoginName => &mut self.login_name,
            NodeAttr::Password => &mut self.password,
        };
        *field = value.to_string();
    }
}

impl fmt::Debug for GatewaySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewaySettings")
            .field("address", &self.address)
            .field("login_name", &self.login_name)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Settings shared between the poll callback and the configuration handler
#[derive(Clone, Debug, Default)]
pub struct ActiveGateway(Arc<RwLock<GatewaySettings>>);

impl ActiveGateway {
    pub fn new(settings: GatewaySettings) -> Self {
        ActiveGateway(Arc::new(RwLock::new(settings)))
    }

    pub fn snapshot(&self) -> GatewaySettings {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn address(&self) -> String {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .address
            .clone()
    }

    /// Set one field, returning the settings as they were before
    pub fn set(&self, attr: NodeAttr, value: &str) -> GatewaySettings {
        let mut settings = self.0.write().unwrap_or_else(PoisonError::into_inner);
        let previous = settings.clone();
        settings.set(attr, value);
        previous
    }

    pub fn replace(&self, settings: GatewaySettings) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = settings;
    }
}

#[derive(Error, Debug)]
pub enum ConnectorError {
    #[error("gateway at {address} is unreachable: {reason}")]
    Unreachable { address: String, reason: String },
    #[error("gateway at {0} rejected the credentials")]
    Unauthorized(String),
    #[error("unexpected gateway response: {0}")]
    Protocol(String),
}

/// Access to the physical gateway device
pub trait GatewayConnector: Send + Sync {
    /// (Re-)establish the device connection using `settings`
    fn connect(&self, settings: &GatewaySettings) -> Result<(), ConnectorError>;

    /// Read the devices behind the gateway, returning the number of readings taken
    fn poll(&self, settings: &GatewaySettings) -> Result<usize, ConnectorError>;
}

/// Connector that only logs; no device protocol is wired in
#[derive(Debug, Default)]
pub struct LogConnector;

impl GatewayConnector for LogConnector {
    fn connect(&self, settings: &GatewaySettings) -> Result<(), ConnectorError> {
        log::info!("Using gateway at {}", settings.address);
        Ok(())
    }

    fn poll(&self, settings: &GatewaySettings) -> Result<usize, ConnectorError> {
        log::debug!("Polling gateway at {}", settings.address);
        Ok(0)
    }
}
