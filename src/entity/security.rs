//! Security entities, vulnerabilities, and severity ranking

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Vulnerability severity, ordered lowest to highest.
///
/// Parsed case-insensitively; spellings outside the fixed scale keep their
/// raw text and rank below `Info`, so they never win a severity grouping
/// over a known level.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Other(String),
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn parse(raw: &str) -> Severity {
        match raw.to_lowercase().as_str() {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            "medium" => Severity::Medium,
            "low" => Severity::Low,
            "info" => Severity::Info,
            _ => Severity::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Info => "info",
            Severity::Other(raw) => raw,
        }
    }

    /// Case-insensitive equality against a user-selected severity string
    pub fn matches(&self, selected: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(selected)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Severity::parse(&raw))
    }
}

/// An infrastructure/security entity (role, bucket, security group...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityEntity {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub entity_type: String,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub arn: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub line_number: Option<u32>,
    /// Object or JSON-encoded string; decoded defensively at display time
    #[serde(default)]
    pub configuration: Value,
}

/// A finding attached to a security entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vulnerability {
    #[serde(default)]
    pub id: Option<String>,
    pub entity_id: String,
    pub severity: Severity,
    #[serde(default)]
    pub vulnerability_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub line_number: Option<u32>,
}

/// Render a `configuration` value as display lines.
///
/// Accepts an object, a JSON-encoded string, or anything else the backend
/// ships. A string that fails to parse is shown verbatim — a malformed
/// configuration must never take the panel down with it.
pub fn configuration_lines(value: &Value) -> Vec<String> {
    let decoded = match value {
        Value::Null => return Vec::new(),
        Value::String(encoded) => match serde_json::from_str::<Value>(encoded) {
            Ok(inner) => inner,
            Err(_) => return vec![encoded.clone()],
        },
        other => other.clone(),
    };

    match decoded {
        Value::Object(map) if map.is_empty() => Vec::new(),
        Value::Object(map) => map
            .into_iter()
            .map(|(k, v)| match v {
                Value::String(s) => format!("{}: {}", k, s),
                other => format!("{}: {}", k, other),
            })
            .collect(),
        Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn severity_orders_by_priority() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert!(Severity::Low > Severity::Info);
        assert!(Severity::Info > Severity::Other("weird".to_string()));
    }

    #[test]
    fn severity_parses_case_insensitively() {
        assert_eq!(Severity::parse("CRITICAL"), Severity::Critical);
        assert_eq!(Severity::parse("High"), Severity::High);
        assert_eq!(Severity::parse("info"), Severity::Info);
        assert_eq!(
            Severity::parse("Negligible"),
            Severity::Other("Negligible".to_string())
        );
    }

    #[test]
    fn severity_matches_selected_string() {
        assert!(Severity::Critical.matches("Critical"));
        assert!(Severity::Low.matches("LOW"));
        assert!(!Severity::Low.matches("high"));
    }

    #[test]
    fn configuration_object_becomes_key_value_lines() {
        let lines = configuration_lines(&json!({"acl": "public-read", "versioning": false}));
        assert_eq!(lines, vec!["acl: public-read", "versioning: false"]);
    }

    #[test]
    fn configuration_encoded_string_is_decoded() {
        let lines = configuration_lines(&json!("{\"cidr\": \"0.0.0.0/0\"}"));
        assert_eq!(lines, vec!["cidr: 0.0.0.0/0"]);
    }

    #[test]
    fn malformed_configuration_renders_verbatim() {
        let lines = configuration_lines(&json!("{invalid json"));
        assert_eq!(lines, vec!["{invalid json"]);
    }

    #[test]
    fn vulnerability_severity_from_wire() {
        let vuln: Vulnerability = serde_json::from_str(
            r#"{"entity_id": "e1", "severity": "High",
                "vulnerability_type": "open_security_group",
                "description": "0.0.0.0/0 ingress", "recommendation": "restrict"}"#,
        )
        .unwrap();
        assert_eq!(vuln.severity, Severity::High);
    }
}
