//! Static access-control list (`acl`).
//!
//! # Responsibilities
//! - Describe ACL entries (match conditions → allowed actions)
//! - Check each entry is well formed before it is ever evaluated
//!
//! # Design Decisions
//! - Entries are kept in file order; the first matching entry wins when
//!   the list is evaluated
//! - Patterns wrapped in slashes (`/^repo-.*$/`) are regular expressions;
//!   placeholders such as `${account}` are substituted at evaluation time,
//!   so they are masked out before the expression is test-compiled

use std::collections::BTreeMap;
use std::sync::OnceLock;

use ipnetwork::{IpNetwork, IpNetworkError};
use regex::Regex;
use serde::Deserialize;

/// Ordered list of rules. An empty list denies everything.
pub type Acl = Vec<AclEntry>;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default)]
pub struct AclEntry {
    #[serde(rename = "match")]
    pub match_conditions: Option<MatchConditions>,

    /// Actions granted when the entry matches (`pull`, `push`, `*`, ...).
    pub actions: Option<Vec<String>>,

    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default)]
pub struct MatchConditions {
    pub account: Option<String>,

    /// Resource type, e.g. `repository`.
    #[serde(rename = "type")]
    pub kind: Option<String>,

    /// Resource name.
    pub name: Option<String>,

    /// Client address or CIDR block.
    pub ip: Option<String>,

    pub service: Option<String>,

    /// Label name → pattern matched against the account's labels.
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
#[error("entry {index}: {reason}")]
pub struct AclError {
    pub index: usize,
    pub reason: String,
}

/// Check every entry of `acl`, reporting the first bad one.
pub fn validate_acl(acl: &[AclEntry]) -> Result<(), AclError> {
    for (index, entry) in acl.iter().enumerate() {
        entry
            .validate()
            .map_err(|reason| AclError { index, reason })?;
    }
    Ok(())
}

impl AclEntry {
    fn validate(&self) -> Result<(), String> {
        let conditions = self
            .match_conditions
            .as_ref()
            .ok_or_else(|| "match is required".to_string())?;
        if self.actions.is_none() {
            return Err("actions are required".to_string());
        }
        conditions.validate()
    }
}

impl MatchConditions {
    fn validate(&self) -> Result<(), String> {
        if let Some(ip) = &self.ip {
            parse_ip_match(ip).map_err(|e| format!("ip {ip:?}: {e}"))?;
        }

        let patterns = [
            ("account", self.account.as_deref()),
            ("type", self.kind.as_deref()),
            ("name", self.name.as_deref()),
            ("service", self.service.as_deref()),
        ];
        for (field, pattern) in patterns {
            if let Some(pattern) = pattern {
                check_pattern(pattern).map_err(|e| format!("{field}: {e}"))?;
            }
        }
        for (label, pattern) in &self.labels {
            check_pattern(pattern).map_err(|e| format!("labels.{label}: {e}"))?;
        }
        Ok(())
    }
}

/// Accepts a bare address or an `address/prefix` block.
fn parse_ip_match(value: &str) -> Result<IpNetwork, IpNetworkError> {
    value.parse()
}

fn check_pattern(pattern: &str) -> Result<(), String> {
    let Some(expr) = pattern
        .strip_prefix('/')
        .and_then(|p| p.strip_suffix('/'))
        .filter(|p| !p.is_empty())
    else {
        return Ok(());
    };

    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    let placeholder = PLACEHOLDER
        .get_or_init(|| Regex::new(r"\$\{[^}]*\}").expect("placeholder pattern is valid"));

    let masked = placeholder.replace_all(expr, "placeholder");
    Regex::new(&masked)
        .map(|_| ())
        .map_err(|e| format!("invalid regular expression: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Acl {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_valid_acl() {
        let acl = parse(
            r#"
- match: {account: "admin"}
  actions: ["*"]
  comment: "Admin has full access to everything."
- match: {account: "/.+/", name: "${account}/*"}
  actions: ["*"]
- match: {ip: "10.0.0.0/8", labels: {"group": "/^ci-.*$/"}}
  actions: ["pull"]
- match: {account: "/^${account}-bot$/"}
  actions: []
"#,
        );
        assert!(validate_acl(&acl).is_ok());
    }

    #[test]
    fn test_empty_acl_is_valid() {
        assert!(validate_acl(&[]).is_ok());
    }

    #[test]
    fn test_missing_match() {
        let acl = parse("- actions: [pull]\n");
        let err = validate_acl(&acl).unwrap_err();
        assert_eq!(err.index, 0);
        assert_eq!(err.to_string(), "entry 0: match is required");
    }

    #[test]
    fn test_missing_actions() {
        let acl = parse("- match: {account: admin}\n  actions: [\"*\"]\n- match: {account: bob}\n");
        let err = validate_acl(&acl).unwrap_err();
        assert_eq!(err.index, 1);
        assert_eq!(err.reason, "actions are required");
    }

    #[test]
    fn test_bad_ip() {
        for ip in ["10.0.0.0/33", "not-an-ip", "::1/129", "10.0.0.0/x"] {
            let acl = vec![AclEntry {
                match_conditions: Some(MatchConditions {
                    ip: Some(ip.to_string()),
                    ..Default::default()
                }),
                actions: Some(vec![]),
                comment: None,
            }];
            assert!(validate_acl(&acl).is_err(), "{ip} should be rejected");
        }
    }

    #[test]
    fn test_bare_ip_and_v6_block() {
        assert_eq!(parse_ip_match("192.168.1.5").unwrap().prefix(), 32);
        assert_eq!(parse_ip_match("2001:db8::1").unwrap().prefix(), 128);
        assert_eq!(parse_ip_match("fd00::/8").unwrap().prefix(), 8);
    }

    #[test]
    fn test_bad_ip_error_names_value() {
        let acl = parse("- match: {ip: \"10.0.0.0/33\"}\n  actions: [pull]\n");
        let err = validate_acl(&acl).unwrap_err();
        assert!(err.reason.starts_with("ip \"10.0.0.0/33\": "), "{}", err.reason);
    }

    #[test]
    fn test_bad_regex() {
        let acl = parse("- match: {name: \"/(unclosed/\"}\n  actions: [pull]\n");
        let err = validate_acl(&acl).unwrap_err();
        assert!(err.reason.starts_with("name: invalid regular expression"));
    }

    #[test]
    fn test_globs_are_not_regexes() {
        assert!(check_pattern("library/*").is_ok());
        assert!(check_pattern("/").is_ok());
    }
}
