use anyhow::Result;
use serde_json::Value;

use crate::app::AppConfig;
use crate::argsets::{ConfigGetArgs, ConfigSetArgs};

use super::open_kvs;

pub fn config_get(args: ConfigGetArgs) -> Result<()> {
    let config = AppConfig::load(&open_kvs()?)?.with_defaults();
    match config.get_field(&args.key)? {
        Value::String(s) => print!("{s}"),
        value => print!("{value}"),
    }
    Ok(())
}

pub fn config_set(args: ConfigSetArgs) -> Result<()> {
    let kvs = open_kvs()?;
    let mut config = AppConfig::load(&kvs)?;
    config.set_field(&args.key, &args.value)?;
    config.save(&kvs)?;
    log::info!("Set app config '{}'", args.key);
    Ok(())
}
