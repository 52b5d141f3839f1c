use serde::{Deserialize, Serialize};

use crate::error::ProxyError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProxyConfig {
    pub listen: ListenConfig,
    pub tls: TlsMitmConfig,
    pub scope: ScopeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ListenConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TlsMitmConfig {
    pub ca_common_name: String,
    pub ca_organization: String,
    /// Verify upstream certificates. Disabled only for test origins with
    /// self-signed certificates.
    pub verify_upstream: bool,
    pub leaf_cache_entries: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScopeConfig {
    /// Domain-suffix scope entries ("acme.com" covers "*.acme.com" too).
    pub domains: Vec<String>,
    /// Exact-host scope entries.
    pub hosts: Vec<String>,
    /// Interception rules; patterns are regexes compiled at startup.
    pub include: Vec<RuleConfig>,
    pub exclude: Vec<RuleConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RuleConfig {
    pub protocol: Option<String>,
    pub host: Option<String>,
    pub path: Option<String>,
    /// Empty list matches any port.
    pub ports: Vec<u16>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listen: ListenConfig::default(),
            tls: TlsMitmConfig::default(),
            scope: ScopeConfig::default(),
        }
    }
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl Default for TlsMitmConfig {
    fn default() -> Self {
        Self {
            ca_common_name: "Wraith Proxy CA".to_string(),
            ca_organization: "Wraith".to_string(),
            verify_upstream: true,
            leaf_cache_entries: 1024,
        }
    }
}

impl ProxyConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ProxyError> {
        toml::from_str(text).map_err(|err| ProxyError::Config(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::ProxyConfig;

    #[test]
    fn loads_partial_toml() {
        let config = ProxyConfig::from_toml_str(
            r#"
            [listen]
            port = 9090

            [scope]
            domains = ["acme.com"]
            "#,
        )
        .expect("parse config");

        assert_eq!(config.listen.port, 9090);
        assert_eq!(config.listen.host, "127.0.0.1");
        assert_eq!(config.scope.domains, vec!["acme.com".to_string()]);
        assert!(config.tls.verify_upstream);
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(ProxyConfig::from_toml_str("listen = ").is_err());
    }
}
