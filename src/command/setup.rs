use anyhow::{anyhow, Result};

use crate::node_mgmt::{DiscoverySnapshot, NodeRegistry};

use super::open_app;

pub fn setup() -> Result<()> {
    let (registry, app) = open_app()?;
    let node = registry
        .get_node_by_address(app.gateway_node_address())?
        .ok_or_else(|| anyhow!("Gateway node missing after setup"))?;
    println!("{}", DiscoverySnapshot::from(&node).to_json()?);
    Ok(())
}
