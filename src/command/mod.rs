mod config;
mod configure;
mod nodes;
mod run;
mod setup;

use std::sync::Arc;

use anyhow::Result;
use kvstore::KVDb;

use crate::app::{AppConfig, OnewireApp};
use crate::interfaces::kvpath;
use crate::node_mgmt::{LogConnector, NodeList};

pub use config::{config_get, config_set};
pub use configure::configure;
pub use nodes::nodes;
pub use run::run;
pub use setup::setup;

fn open_kvs() -> Result<KVDb> {
    Ok(KVDb::new(kvpath::SQLITE_STORE.as_path())?)
}

fn open_registry(config: &AppConfig) -> Result<Arc<NodeList>> {
    let registry = NodeList::persistent(&config.zone, &config.publisher_id, open_kvs()?)?;
    Ok(Arc::new(registry))
}

/// Resolve the app config and set up the gateway node in the persistent registry
fn open_app() -> Result<(Arc<NodeList>, OnewireApp)> {
    let config = AppConfig::resolve(&open_kvs()?)?;
    let registry = open_registry(&config)?;
    let app = OnewireApp::setup(config, registry.clone(), Arc::new(LogConnector))?;
    Ok((registry, app))
}
