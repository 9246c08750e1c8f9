pub const NODE_SUFFIX: &str = "$node";
pub const CONFIGURE_SUFFIX: &str = "$configure";
