use anyhow::{anyhow, Result};

use onewire::{argsets, command, helpers};

const CMD_RUN: &str = "run";
const CMD_SETUP: &str = "setup";
const CMD_NODES: &str = "nodes";
const CMD_CONFIGURE: &str = "configure";
const CMD_CONFIG_GET: &str = "config-get";
const CMD_CONFIG_SET: &str = "config-set";

fn main() -> Result<()> {
    helpers::load_dotenv();
    helpers::init_logging();

    let mut args = pico_args::Arguments::from_env();
    match args.subcommand()?.as_deref() {
        Some(CMD_RUN) => command::run(),
        Some(CMD_SETUP) => command::setup(),
        Some(CMD_NODES) => command::nodes(),
        Some(CMD_CONFIGURE) => command::configure(argsets::ConfigureArgs {
            key: args.free_from_str()?,
            value: args.free_from_str()?,
        }),
        Some(CMD_CONFIG_GET) => command::config_get(argsets::ConfigGetArgs {
            key: args.free_from_str()?,
        }),
        Some(CMD_CONFIG_SET) => command::config_set(argsets::ConfigSetArgs {
            key: args.free_from_str()?,
            value: args.free_from_str()?,
        }),
        _ => Err(anyhow!(
            "Subcommand must be one of 'run', 'setup', 'nodes', 'configure', 'config-get', 'config-set'"
        )),
    }
}
