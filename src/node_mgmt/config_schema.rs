use thiserror::Error;

use super::node::{ConfigAttr, DataType, NodeAttr, NodeType};
use super::registry::{NodeRegistry, RegistryError};

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("cannot declare '{attr}': no node registered at {address}")]
    NodeNotFound { address: String, attr: NodeAttr },
    #[error("{node_type} nodes do not accept attribute '{attr}'")]
    UnsupportedAttribute { node_type: NodeType, attr: NodeAttr },
    #[error("secret attribute '{0}' must not have a default value")]
    SecretWithDefault(NodeAttr),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Declare (or redeclare) one configuration attribute on an existing node
pub fn declare_attribute(
    registry: &dyn NodeRegistry,
    node_address: &str,
    attr: NodeAttr,
    spec: ConfigAttr,
) -> Result<(), SchemaError> {
    let node = registry
        .get_node_by_address(node_address)?
        .ok_or_else(|| SchemaError::NodeNotFound {
            address: node_address.to_string(),
            attr,
        })?;

    if !node.node_type.accepts(attr) {
        return Err(SchemaError::UnsupportedAttribute {
            node_type: node.node_type,
            attr,
        });
    }
    if spec.secret && spec.default.is_some() {
        return Err(SchemaError::SecretWithDefault(attr));
    }

    log::debug!("Declaring '{attr}' on {node_address}");
    registry.update_node_config(node_address, attr, spec)?;
    Ok(())
}

/// Attributes accepted by an EDS gateway node.
///
/// Only `address` is seeded with a default; login name and password are secret.
pub fn gateway_schema(default_address: &str) -> Vec<(NodeAttr, ConfigAttr)> {
    let mut address = ConfigAttr::new(DataType::String, "EDS Gateway IP address");
    if !default_address.is_empty() {
        address = address.with_default(default_address);
    }
    vec![
        (NodeAttr::Address, address),
        (
            NodeAttr::LoginName,
            ConfigAttr::new(DataType::String, "Login name of the onewire gateway").secret(),
        ),
        (
            NodeAttr::Password,
            ConfigAttr::new(DataType::String, "Password of the onewire gateway").secret(),
        ),
    ]
}

pub fn declare_gateway_attributes(
    registry: &dyn NodeRegistry,
    node_address: &str,
    default_address: &str,
) -> Result<(), SchemaError> {
    for (attr, spec) in gateway_schema(default_address) {
        declare_attribute(registry, node_address, attr, spec)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node_mgmt::registrar::ensure_gateway_node;
    use crate::node_mgmt::registry::NodeList;

    #[test]
    fn gateway_schema_secrecy() {
        for (attr, spec) in gateway_schema("10.0.0.5") {
            match attr {
                NodeAttr::Address => {
                    assert!(!spec.secret);
                    assert_eq!(spec.default.as_deref(), Some("10.0.0.5"));
                }
                NodeAttr::LoginName | NodeAttr::Password => {
                    assert!(spec.secret);
                    assert_eq!(spec.default, None);
                }
            }
            assert_eq!(spec.datatype, DataType::String);
        }
        let (_, address) = &gateway_schema("")[0];
        assert_eq!(address.default, None);
    }

    #[test]
    fn declaring_before_node_exists_fails() {
        let registry = NodeList::in_memory("local", "onewire");
        let addr = registry.make_node_discovery_address("gateway");
        let res = declare_gateway_attributes(&registry, &addr, "10.0.0.5");
        assert!(matches!(res, Err(SchemaError::NodeNotFound { .. })));
        assert!(registry.nodes().unwrap().is_empty());
    }

    #[test]
    fn secret_with_default_is_rejected() {
        let registry = NodeList::in_memory("local", "onewire");
        let addr = ensure_gateway_node(&registry, "gateway").unwrap();
        let spec = ConfigAttr::new(DataType::String, "pwd")
            .with_default("admin")
            .secret();
        assert!(matches!(
            declare_attribute(&registry, &addr, NodeAttr::Password, spec),
            Err(SchemaError::SecretWithDefault(NodeAttr::Password))
        ));
        let node = registry.get_node_by_address(&addr).unwrap().unwrap();
        assert!(node.config.is_empty());
    }

    #[test]
    fn sensor_nodes_reject_gateway_attributes() {
        let registry = NodeList::in_memory("local", "onewire");
        let node = registry.new_node("probe", NodeType::Sensor).unwrap();
        let (attr, spec) = gateway_schema("10.0.0.5").remove(0);
        assert!(matches!(
            declare_attribute(&registry, &node.discovery_address, attr, spec),
            Err(SchemaError::UnsupportedAttribute { .. })
        ));
    }

    #[test]
    fn redeclaring_is_last_write_wins() {
        let registry = NodeList::in_memory("local", "onewire");
        let addr = ensure_gateway_node(&registry, "gateway").unwrap();
        declare_gateway_attributes(&registry, &addr, "10.0.0.5").unwrap();
        declare_gateway_attributes(&registry, &addr, "10.0.0.6").unwrap();

        let node = registry.get_node_by_address(&addr).unwrap().unwrap();
        assert_eq!(node.config.len(), 3);
        assert_eq!(node.network_address(), Some("10.0.0.6"));
    }
}
