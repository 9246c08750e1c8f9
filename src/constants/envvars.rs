pub const DATA_DIR: &str = "ONEWIRE_DATA_DIR";
pub const ROOT_DIR: &str = "ONEWIRE_ROOT_DIR";

pub const SNAP: &str = "SNAP";
pub const SNAP_COMMON: &str = "SNAP_COMMON";

pub const LOG_LEVEL: &str = "LOG_LEVEL";

pub const MQTT_BRIDGE_HOST: &str = "MQTT_BRIDGE_HOST";
pub const MQTT_BRIDGE_PORT: &str = "MQTT_BRIDGE_PORT";

// AppConfig overrides
pub const PUBLISHER_ID: &str = "ONEWIRE_PUBLISHER_ID";
pub const GATEWAY_ADDRESS: &str = "ONEWIRE_GATEWAY_ADDRESS";
pub const GATEWAY_ID: &str = "ONEWIRE_GATEWAY_ID";
pub const ZONE: &str = "ONEWIRE_ZONE";
pub const POLL_INTERVAL: &str = "ONEWIRE_POLL_INTERVAL";
pub const RECONNECT_FAILURE: &str = "ONEWIRE_RECONNECT_FAILURE";
