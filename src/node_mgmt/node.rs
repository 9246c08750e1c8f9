use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

const GATEWAY_ATTRS: &[NodeAttr] = &[NodeAttr::Address, NodeAttr::LoginName, NodeAttr::Password];

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum NodeType {
    #[serde(rename = "gateway")]
    Gateway,
    #[serde(rename = "sensor")]
    Sensor,
}

impl NodeType {
    /// Whether nodes of this type recognize the configuration attribute
    pub fn accepts(&self, attr: NodeAttr) -> bool {
        match self {
            NodeType::Gateway => GATEWAY_ATTRS.contains(&attr),
            NodeType::Sensor => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Gateway => "gateway",
            NodeType::Sensor => "sensor",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration attribute keys recognized by the registry
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum NodeAttr {
    #[serde(rename = "address")]
    Address,
    #[serde(rename = "loginName")]
    LoginName,
    #[serde(rename = "password")]
    Password,
}

impl NodeAttr {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeAttr::Address => "address",
            NodeAttr::LoginName => "loginName",
            NodeAttr::Password => "password",
        }
    }
}

impl fmt::Display for NodeAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NodeAttr {
    type Err = &'static str;
    fn from_str(value: &str) -> Result<Self, &'static str> {
        match value {
            "address" => Ok(Self::Address),
            "loginName" => Ok(Self::LoginName),
            "password" => Ok(Self::Password),
            _ => Err("unknown attribute"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum DataType {
    #[default]
    #[serde(rename = "string")]
    String,
    #[serde(rename = "int")]
    Int,
    #[serde(rename = "bool")]
    Bool,
}

impl DataType {
    /// Check that a raw value parses as this type
    pub fn check(&self, value: &str) -> Result<(), String> {
        match self {
            DataType::String => Ok(()),
            DataType::Int => value
                .parse::<i64>()
                .map(|_| ())
                .map_err(|e| format!("'{value}' is not an integer: {e}")),
            DataType::Bool => value
                .parse::<bool>()
                .map(|_| ())
                .map_err(|_| format!("'{value}' is not a boolean")),
        }
    }
}

/// Schema entry for one configurable field, plus its live value
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ConfigAttr {
    pub datatype: DataType,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Secret values are never part of a discovery snapshot
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub secret: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ConfigAttr {
    pub fn new(datatype: DataType, description: impl Into<String>) -> Self {
        ConfigAttr {
            datatype,
            description: description.into(),
            default: None,
            secret: false,
            value: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn secret(mut self) -> Self {
        self.secret = true;
        self
    }

    /// The live value, falling back to the default; empty counts as unset
    pub fn effective_value(&self) -> Option<&str> {
        self.value
            .as_deref()
            .or(self.default.as_deref())
            .filter(|v| !v.is_empty())
    }

    /// Copy of this attribute that is safe to publish
    pub fn redacted(&self) -> ConfigAttr {
        if self.secret {
            ConfigAttr {
                default: None,
                value: None,
                ..self.clone()
            }
        } else {
            self.clone()
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub discovery_address: String,
    pub node_type: NodeType,
    #[serde(default)]
    pub config: BTreeMap<NodeAttr, ConfigAttr>,
    pub timestamp: String,
}

impl Node {
    pub fn config_value(&self, attr: NodeAttr) -> Option<&str> {
        self.config.get(&attr).and_then(ConfigAttr::effective_value)
    }

    /// Network address of the physical device, if configured
    pub fn network_address(&self) -> Option<&str> {
        self.config_value(NodeAttr::Address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attr_names_round_trip_through_str() {
        for attr in GATEWAY_ATTRS {
            assert_eq!(attr.as_str().parse::<NodeAttr>(), Ok(*attr));
        }
        assert!("loginname".parse::<NodeAttr>().is_err());
    }

    #[test]
    fn only_gateways_accept_gateway_attributes() {
        assert!(NodeType::Gateway.accepts(NodeAttr::Password));
        assert!(!NodeType::Sensor.accepts(NodeAttr::Address));
    }

    #[test]
    fn effective_value_prefers_live_value() {
        let attr = ConfigAttr::new(DataType::String, "addr").with_default("10.0.0.5");
        assert_eq!(attr.effective_value(), Some("10.0.0.5"));

        let attr = ConfigAttr {
            value: Some("10.0.0.9".into()),
            ..attr
        };
        assert_eq!(attr.effective_value(), Some("10.0.0.9"));

        let attr = ConfigAttr {
            value: Some(String::new()),
            default: None,
            ..attr
        };
        assert_eq!(attr.effective_value(), None);
    }

    #[test]
    fn redaction_strips_secret_values_only() {
        let secret = ConfigAttr {
            value: Some("hunter2".into()),
            ..ConfigAttr::new(DataType::String, "pwd").secret()
        };
        let redacted = secret.redacted();
        assert!(redacted.secret);
        assert_eq!(redacted.value, None);
        assert_eq!(redacted.description, "pwd");

        let public = ConfigAttr::new(DataType::String, "addr").with_default("10.0.0.5");
        assert_eq!(public.redacted(), public);
    }

    #[test]
    fn datatype_checks() {
        assert!(DataType::String.check("anything at all").is_ok());
        assert!(DataType::Int.check("42").is_ok());
        assert!(DataType::Int.check("4.2").is_err());
        assert!(DataType::Bool.check("true").is_ok());
        assert!(DataType::Bool.check("yes").is_err());
    }

    #[test]
    fn node_json_uses_attribute_names_as_keys() {
        let mut config = BTreeMap::new();
        config.insert(
            NodeAttr::LoginName,
            ConfigAttr::new(DataType::String, "login").secret(),
        );
        let node = Node {
            id: "gateway".into(),
            discovery_address: "local/onewire/gateway/$node".into(),
            node_type: NodeType::Gateway,
            config,
            timestamp: "2024-01-01T00:00:00+00:00".into(),
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["nodeType"], "gateway");
        assert_eq!(json["config"]["loginName"]["secret"], true);

        let parsed: Node = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, node);
    }
}
