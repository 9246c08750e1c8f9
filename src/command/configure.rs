use anyhow::Result;

use crate::argsets::ConfigureArgs;

use super::open_app;

/// Apply one configuration command to the gateway node
pub fn configure(args: ConfigureArgs) -> Result<()> {
    let (_, app) = open_app()?;
    app.config_handler()
        .handle_config_command(app.gateway_node_address(), &args.key, &args.value)?;
    log::info!("Gateway node is {}", app.state().current());
    Ok(())
}
