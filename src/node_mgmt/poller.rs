use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};

use super::gateway::{ActiveGateway, GatewayConnector};

/// Periodic callback driven by the publisher's poll timer
pub trait Poller: Send + Sync {
    fn poll(&self, now: DateTime<Utc>) -> Result<()>;
}

/// Polls the devices behind the currently active gateway address
pub struct GatewayPoller {
    active: ActiveGateway,
    connector: Arc<dyn GatewayConnector>,
}

impl GatewayPoller {
    pub fn new(active: ActiveGateway, connector: Arc<dyn GatewayConnector>) -> Self {
        GatewayPoller { active, connector }
    }
}

impl Poller for GatewayPoller {
    fn poll(&self, now: DateTime<Utc>) -> Result<()> {
        let settings = self.active.snapshot();
        if settings.address.is_empty() {
            log::debug!("[t: {}] No gateway address configured; skipping poll", now.timestamp());
            return Ok(());
        }

        let count = self.connector.poll(&settings)?;
        log::info!(
            "[t: {}] Polled gateway at {}: {} reading(s)",
            now.timestamp(),
            settings.address,
            count
        );
        Ok(())
    }
}
