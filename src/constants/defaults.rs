use std::time::Duration;

pub const APP_ID: &str = "onewire";
pub const GATEWAY_ID: &str = "gateway";
pub const ZONE: &str = "local";
pub const POLL_INTERVAL_SECS: u64 = 60;

pub const LOG_LEVEL: &str = "info";

pub const MQTT_BRIDGE_HOST: &str = "localhost";
pub const MQTT_BRIDGE_PORT: u16 = 1883;
pub const MQTT_RECONNECT_DELAY: Duration = Duration::from_secs(5);
pub const PUBLISH_MAX_ELAPSED: Duration = Duration::from_secs(30);
