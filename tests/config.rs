use onewire::app::config::from_str;
use onewire::node_mgmt::ReconnectFailurePolicy;

mod stubs;

#[test]
fn test_parse_full_config() {
    let config = from_str(stubs::config::FULL_CONFIG).unwrap();
    assert_eq!(config.publisher_id, "onewire-lab");
    assert_eq!(config.gateway_id, "eds1");
    assert_eq!(config.zone, "lab");
    assert_eq!(config.poll_interval, 30);
    assert_eq!(config.reconnect_failure, ReconnectFailurePolicy::Rollback);
}

#[test]
fn test_partial_config_gets_defaults() {
    let config = from_str(stubs::config::PARTIAL_CONFIG)
        .unwrap()
        .with_defaults();
    assert_eq!(config.publisher_id, "onewire");
    assert_eq!(config.gateway_id, "gateway");
    assert_eq!(config.gateway_address, "10.0.0.5");
    assert_eq!(config.reconnect_failure, ReconnectFailurePolicy::Keep);
}

#[test]
fn test_parse_bad_config() {
    assert!(from_str(stubs::config::BAD_CONFIG).is_err());
    assert!(from_str(stubs::config::BAD_POLICY_CONFIG).is_err());
}
