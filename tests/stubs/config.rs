#![allow(dead_code)]

pub const FULL_CONFIG: &str = r#"
{
    "publisherId": "onewire-lab",
    "gatewayAddress": "10.0.0.5",
    "gatewayId": "eds1",
    "zone": "lab",
    "pollInterval": 30,
    "reconnectFailure": "rollback"
}
"#;

pub const PARTIAL_CONFIG: &str = r#"{"gatewayAddress": "10.0.0.5"}"#;

pub const BAD_POLICY_CONFIG: &str = r#"{"reconnectFailure": "retry"}"#;

pub const BAD_CONFIG: &str = "blah";
