use crate::constants::defaults;

use super::node::NodeType;
use super::registry::{NodeRegistry, RegistryError};

/// Make sure the gateway node exists, returning its discovery address.
///
/// An empty `gateway_id` means the default `gateway`. Safe to call on every start;
/// an existing node is left untouched.
pub fn ensure_gateway_node(
    registry: &dyn NodeRegistry,
    gateway_id: &str,
) -> Result<String, RegistryError> {
    let gateway_id = if gateway_id.is_empty() {
        defaults::GATEWAY_ID
    } else {
        gateway_id
    };

    if let Some(node) = registry.get_node_by_id(gateway_id)? {
        if node.node_type != NodeType::Gateway {
            return Err(RegistryError::NodeTypeMismatch {
                id: node.id,
                existing: node.node_type,
                requested: NodeType::Gateway,
            });
        }
        log::debug!("Gateway node already registered at {}", node.discovery_address);
        return Ok(node.discovery_address);
    }

    let node = registry.new_node(gateway_id, NodeType::Gateway)?;
    Ok(node.discovery_address)
}
