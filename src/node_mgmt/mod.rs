mod address;
mod config_handler;
mod config_schema;
mod gateway;
mod node;
mod poller;
mod registrar;
mod registry;
mod snapshot;
mod state;

pub use address::{configure_topic, make_node_discovery_address, node_address_from_configure_topic};
pub use config_handler::{
    ConfigCommandError, ConfigHandler, GatewayConfigHandler, ReconnectFailurePolicy,
};
pub use config_schema::{declare_attribute, declare_gateway_attributes, gateway_schema, SchemaError};
pub use gateway::{ActiveGateway, ConnectorError, GatewayConnector, GatewaySettings, LogConnector};
pub use node::{ConfigAttr, DataType, Node, NodeAttr, NodeType};
pub use poller::{GatewayPoller, Poller};
pub use registrar::ensure_gateway_node;
pub use registry::{NodeList, NodeRegistry, RegistryError};
pub use snapshot::DiscoverySnapshot;
pub use state::{GatewayState, StateTracker};
