pub const APP_CONFIG: &str = "app_config";

// Registry records are stored as `node/{node_id}`
pub const NODE_PFX: &str = "node/";
