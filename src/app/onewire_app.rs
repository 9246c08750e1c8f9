use std::sync::Arc;

use thiserror::Error;

use crate::node_mgmt::{
    declare_gateway_attributes, ensure_gateway_node, ActiveGateway, ConfigHandler,
    GatewayConfigHandler, GatewayConnector, GatewayPoller, GatewaySettings, GatewayState,
    NodeRegistry, Poller, RegistryError, SchemaError, StateTracker,
};
use crate::publisher::Publisher;

use super::config::AppConfig;

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("could not register gateway node: {0}")]
    Registry(#[from] RegistryError),
    #[error("could not declare gateway configuration: {0}")]
    Schema(#[from] SchemaError),
}

/// The gateway node with its poll and configuration callbacks
pub struct OnewireApp {
    config: AppConfig,
    gateway_node_address: String,
    active: ActiveGateway,
    state: Arc<StateTracker>,
    handler: Arc<GatewayConfigHandler>,
    poller: Arc<GatewayPoller>,
}

impl OnewireApp {
    /// Register the gateway node and its configuration schema.
    ///
    /// The registry must already be addressed with the (defaulted) zone and publisher id.
    pub fn setup(
        config: AppConfig,
        registry: Arc<dyn NodeRegistry>,
        connector: Arc<dyn GatewayConnector>,
    ) -> Result<Self, SetupError> {
        let config = config.with_defaults();
        log::info!("Setting up gateway node '{}'", config.gateway_id);

        let gateway_node_address = ensure_gateway_node(registry.as_ref(), &config.gateway_id)?;
        declare_gateway_attributes(
            registry.as_ref(),
            &gateway_node_address,
            &config.gateway_address,
        )?;

        let node = registry
            .get_node_by_address(&gateway_node_address)?
            .ok_or_else(|| RegistryError::NodeNotFound(gateway_node_address.clone()))?;
        let settings = GatewaySettings::from_node(&node);
        let state = Arc::new(StateTracker::new(GatewayState::settled(
            settings.is_configured(),
        )));
        log::info!("Gateway node {gateway_node_address} is {}", state.current());

        let active = ActiveGateway::new(settings);
        let handler = Arc::new(GatewayConfigHandler::new(
            registry,
            gateway_node_address.clone(),
            active.clone(),
            state.clone(),
            connector.clone(),
            config.reconnect_failure,
        ));
        let poller = Arc::new(GatewayPoller::new(active.clone(), connector));

        Ok(OnewireApp {
            config,
            gateway_node_address,
            active,
            state,
            handler,
            poller,
        })
    }

    /// Hand the poll and configuration callbacks to `publisher`
    pub fn register(&self, publisher: &mut Publisher) {
        let poller: Arc<dyn Poller> = self.poller.clone();
        let handler: Arc<dyn ConfigHandler> = self.handler.clone();
        publisher.set_poll_interval(self.config.poll_interval, poller);
        publisher.set_node_config_handler(handler);
    }

    pub fn gateway_node_address(&self) -> &str {
        &self.gateway_node_address
    }

    pub fn active_gateway(&self) -> &ActiveGateway {
        &self.active
    }

    pub fn state(&self) -> Arc<StateTracker> {
        self.state.clone()
    }

    pub fn config_handler(&self) -> Arc<dyn ConfigHandler> {
        self.handler.clone()
    }
}
