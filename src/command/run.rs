use std::sync::Arc;

use anyhow::Result;

use crate::publisher::{wait_for_signal, MqttDiscoverySink, Publisher};

use super::open_app;

/// Run the publisher until SIGINT or SIGTERM
pub fn run() -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_publisher())
}

async fn run_publisher() -> Result<()> {
    let (registry, app) = open_app()?;

    let mut publisher = Publisher::new(registry, Arc::new(MqttDiscoverySink));
    app.register(&mut publisher);

    publisher.start().await?;
    wait_for_signal().await?;
    log::info!("Shutting down");
    publisher.stop().await;
    Ok(())
}
