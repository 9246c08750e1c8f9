use std::collections::BTreeMap;

use serde::Serialize;

use super::node::{ConfigAttr, Node, NodeAttr, NodeType};

/// Publishable view of a node. Secret attribute values and defaults are withheld.
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverySnapshot {
    pub id: String,
    pub address: String,
    pub node_type: NodeType,
    pub config: BTreeMap<NodeAttr, ConfigAttr>,
    pub timestamp: String,
}

impl From<&Node> for DiscoverySnapshot {
    fn from(node: &Node) -> Self {
        DiscoverySnapshot {
            id: node.id.clone(),
            address: node.discovery_address.clone(),
            node_type: node.node_type,
            config: node
                .config
                .iter()
                .map(|(attr, spec)| (*attr, spec.redacted()))
                .collect(),
            timestamp: node.timestamp.clone(),
        }
    }
}

impl DiscoverySnapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
