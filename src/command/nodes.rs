use anyhow::Result;

use crate::app::AppConfig;
use crate::node_mgmt::{DiscoverySnapshot, NodeRegistry};

use super::{open_kvs, open_registry};

/// Print the discovery snapshot of every stored node, one JSON document per line
pub fn nodes() -> Result<()> {
    let config = AppConfig::resolve(&open_kvs()?)?;
    let registry = open_registry(&config)?;
    for node in registry.nodes()? {
        println!("{}", DiscoverySnapshot::from(&node).to_json()?);
    }
    Ok(())
}
