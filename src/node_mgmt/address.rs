//! Discovery addresses have the form `{zone}/{publisherId}/{nodeId}/$node`.
//! Configuration commands for a node arrive on the same path ending in `$configure`.

use crate::constants::topics;

pub fn make_node_discovery_address(zone: &str, publisher_id: &str, node_id: &str) -> String {
    format!("{zone}/{publisher_id}/{node_id}/{}", topics::NODE_SUFFIX)
}

/// Topic on which configuration commands for the node at `node_address` are received
pub fn configure_topic(node_address: &str) -> Option<String> {
    node_address
        .strip_suffix(topics::NODE_SUFFIX)
        .map(|base| format!("{base}{}", topics::CONFIGURE_SUFFIX))
}

pub fn node_address_from_configure_topic(topic: &str) -> Option<String> {
    topic
        .strip_suffix(topics::CONFIGURE_SUFFIX)
        .filter(|base| base.ends_with('/'))
        .map(|base| format!("{base}{}", topics::NODE_SUFFIX))
}
