use std::collections::BTreeMap;
use std::sync::{Mutex, RwLock};

use kvstore::{KVDb, KVStoreError};
use thiserror::Error;

use crate::constants::keys;
use crate::helpers::now_iso;

use super::address::make_node_discovery_address;
use super::node::{ConfigAttr, Node, NodeAttr, NodeType};

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("node id must not be empty")]
    EmptyNodeId,
    #[error("no node registered at {0}")]
    NodeNotFound(String),
    #[error("node {id} is registered as {existing}, not {requested}")]
    NodeTypeMismatch {
        id: String,
        existing: NodeType,
        requested: NodeType,
    },
    #[error("attribute '{attr}' is not declared on {address}")]
    AttributeNotDeclared { address: String, attr: NodeAttr },
    #[error("registry store error: {0}")]
    Store(#[from] KVStoreError),
    #[error("registry lock poisoned")]
    Poisoned,
}

/// Registry of the nodes served by one publisher
pub trait NodeRegistry: Send + Sync {
    fn make_node_discovery_address(&self, node_id: &str) -> String;

    fn get_node_by_id(&self, node_id: &str) -> Result<Option<Node>, RegistryError>;

    fn get_node_by_address(&self, address: &str) -> Result<Option<Node>, RegistryError>;

    /// Create a node, or return the existing one if a node of that type already has this id
    fn new_node(&self, node_id: &str, node_type: NodeType) -> Result<Node, RegistryError>;

    /// Upsert an attribute definition. A live value already set on the node is kept.
    fn update_node_config(
        &self,
        address: &str,
        attr: NodeAttr,
        spec: ConfigAttr,
    ) -> Result<(), RegistryError>;

    /// Set (or with `None`, clear) the live value of a declared attribute
    fn set_node_config_value(
        &self,
        address: &str,
        attr: NodeAttr,
        value: Option<String>,
    ) -> Result<(), RegistryError>;

    fn nodes(&self) -> Result<Vec<Node>, RegistryError>;
}

/// In-memory node registry, optionally writing every change through to a key/value store
pub struct NodeList {
    zone: String,
    publisher_id: String,
    nodes: RwLock<BTreeMap<String, Node>>,
    store: Option<Mutex<KVDb>>,
}

impl NodeList {
    pub fn in_memory(zone: &str, publisher_id: &str) -> Self {
        NodeList {
            zone: zone.to_string(),
            publisher_id: publisher_id.to_string(),
            nodes: RwLock::new(BTreeMap::new()),
            store: None,
        }
    }

    /// Load previously stored nodes from `kvs` and persist all later changes to it
    pub fn persistent(zone: &str, publisher_id: &str, kvs: KVDb) -> Result<Self, RegistryError> {
        let mut nodes = BTreeMap::new();
        for key in kvs.keys_with_prefix(keys::NODE_PFX)? {
            let Some(mut node) = kvs.get::<Node>(&key)? else {
                continue;
            };
            // Addresses follow the current zone and publisher
            node.discovery_address = make_node_discovery_address(zone, publisher_id, &node.id);
            nodes.insert(node.id.clone(), node);
        }
        log::debug!("Loaded {} node(s) from store", nodes.len());

        Ok(NodeList {
            zone: zone.to_string(),
            publisher_id: publisher_id.to_string(),
            nodes: RwLock::new(nodes),
            store: Some(Mutex::new(kvs)),
        })
    }

    fn persist(&self, node: &Node) -> Result<(), RegistryError> {
        if let Some(store) = &self.store {
            let kvs = store.lock().map_err(|_| RegistryError::Poisoned)?;
            kvs.set(format!("{}{}", keys::NODE_PFX, node.id), node)?;
        }
        Ok(())
    }

    fn modify<F>(&self, address: &str, f: F) -> Result<(), RegistryError>
    where
        F: FnOnce(&mut Node) -> Result<(), RegistryError>,
    {
        let mut nodes = self.nodes.write().map_err(|_| RegistryError::Poisoned)?;
        let node = nodes
            .values_mut()
            .find(|n| n.discovery_address == address)
            .ok_or_else(|| RegistryError::NodeNotFound(address.to_string()))?;

        let mut updated = node.clone();
        f(&mut updated)?;
        updated.timestamp = now_iso();
        self.persist(&updated)?;
        *node = updated;
        Ok(())
    }
}

impl NodeRegistry for NodeList {
    fn make_node_discovery_address(&self, node_id: &str) -> String {
        make_node_discovery_address(&self.zone, &self.publisher_id, node_id)
    }

    fn get_node_by_id(&self, node_id: &str) -> Result<Option<Node>, RegistryError> {
        let nodes = self.nodes.read().map_err(|_| RegistryError::Poisoned)?;
        Ok(nodes.get(node_id).cloned())
    }

    fn get_node_by_address(&self, address: &str) -> Result<Option<Node>, RegistryError> {
        let nodes = self.nodes.read().map_err(|_| RegistryError::Poisoned)?;
        Ok(nodes
            .values()
            .find(|n| n.discovery_address == address)
            .cloned())
    }

    fn new_node(&self, node_id: &str, node_type: NodeType) -> Result<Node, RegistryError> {
        if node_id.is_empty() {
            return Err(RegistryError::EmptyNodeId);
        }
        let mut nodes = self.nodes.write().map_err(|_| RegistryError::Poisoned)?;
        if let Some(existing) = nodes.get(node_id) {
            if existing.node_type != node_type {
                return Err(RegistryError::NodeTypeMismatch {
                    id: node_id.to_string(),
                    existing: existing.node_type,
                    requested: node_type,
                });
            }
            return Ok(existing.clone());
        }

        let node = Node {
            id: node_id.to_string(),
            discovery_address: self.make_node_discovery_address(node_id),
            node_type,
            config: BTreeMap::new(),
            timestamp: now_iso(),
        };
        self.persist(&node)?;
        nodes.insert(node_id.to_string(), node.clone());
        log::info!("Created {} node {}", node_type, node.discovery_address);
        Ok(node)
    }

    fn update_node_config(
        &self,
        address: &str,
        attr: NodeAttr,
        spec: ConfigAttr,
    ) -> Result<(), RegistryError> {
        self.modify(address, |node| {
            let value = node.config.get(&attr).and_then(|a| a.value.clone());
            node.config.insert(attr, ConfigAttr { value, ..spec });
            Ok(())
        })
    }

    fn set_node_config_value(
        &self,
        address: &str,
        attr: NodeAttr,
        value: Option<String>,
    ) -> Result<(), RegistryError> {
        self.modify(address, |node| {
            let entry = node
                .config
                .get_mut(&attr)
                .ok_or_else(|| RegistryError::AttributeNotDeclared {
                    address: address.to_string(),
                    attr,
                })?;
            entry.value = value;
            Ok(())
        })
    }

    fn nodes(&self) -> Result<Vec<Node>, RegistryError> {
        let nodes = self.nodes.read().map_err(|_| RegistryError::Poisoned)?;
        Ok(nodes.values().cloned().collect())
    }
}
