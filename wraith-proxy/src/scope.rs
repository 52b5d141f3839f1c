use regex::Regex;

use crate::config::{RuleConfig, ScopeConfig};
use crate::error::ProxyError;

/// Host-level scope: which hostnames the proxy may decrypt and record.
/// Immutable after construction and read concurrently by every connection.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    domains: Vec<String>,
    hosts: Vec<String>,
}

impl Scope {
    pub fn new(domains: &[String], hosts: &[String]) -> Self {
        Self {
            domains: domains.iter().map(|d| d.to_lowercase()).collect(),
            hosts: hosts.iter().map(|h| h.to_lowercase()).collect(),
        }
    }

    /// An empty scope matches nothing: "nothing configured" must mean
    /// "decrypt nothing", not "decrypt everything".
    pub fn in_scope(&self, host: &str) -> bool {
        let host = normalize_host(host);
        if host.is_empty() {
            return false;
        }

        if self.hosts.iter().any(|exact| *exact == host) {
            return true;
        }

        self.domains
            .iter()
            .any(|domain| host == *domain || host.ends_with(&format!(".{domain}")))
    }
}

fn normalize_host(host: &str) -> String {
    let host = match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    };
    host.to_lowercase()
}

/// One interception rule. Absent fields are wildcards; a rule matches only
/// when every present field matches.
#[derive(Debug, Clone)]
pub struct Rule {
    pub protocol: Option<String>,
    pub host: Option<Regex>,
    pub path: Option<Regex>,
    pub ports: Vec<u16>,
}

impl Rule {
    pub fn from_config(config: &RuleConfig) -> Result<Self, ProxyError> {
        let compile = |pattern: &Option<String>| -> Result<Option<Regex>, ProxyError> {
            match pattern {
                Some(pattern) => Regex::new(pattern)
                    .map(Some)
                    .map_err(|err| ProxyError::Config(format!("bad scope pattern: {err}"))),
                None => Ok(None),
            }
        };

        Ok(Self {
            protocol: config.protocol.clone(),
            host: compile(&config.host)?,
            path: compile(&config.path)?,
            ports: config.ports.clone(),
        })
    }

    pub fn matches(&self, scheme: &str, host: &str, path: &str, port: u16) -> bool {
        if let Some(protocol) = &self.protocol {
            if protocol != scheme {
                return false;
            }
        }
        if let Some(host_pattern) = &self.host {
            if !host_pattern.is_match(host) {
                return false;
            }
        }
        if let Some(path_pattern) = &self.path {
            if !path_pattern.is_match(path) {
                return false;
            }
        }
        if !self.ports.is_empty() && !self.ports.contains(&port) {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Default)]
pub struct RuleSet(Vec<Rule>);

impl RuleSet {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn matches(&self, scheme: &str, host: &str, path: &str, port: u16) -> bool {
        self.0
            .iter()
            .any(|rule| rule.matches(scheme, host, path, port))
    }
}

/// Include/exclude rule sets gating the interception pause. An empty
/// include set permits everything (the host already passed `Scope`);
/// any exclude match vetoes.
#[derive(Debug, Clone, Default)]
pub struct ScopeRules {
    pub include: RuleSet,
    pub exclude: RuleSet,
}

impl ScopeRules {
    pub fn from_config(config: &ScopeConfig) -> Result<Self, ProxyError> {
        let build = |configs: &[RuleConfig]| -> Result<RuleSet, ProxyError> {
            configs
                .iter()
                .map(Rule::from_config)
                .collect::<Result<Vec<_>, _>>()
                .map(RuleSet)
        };

        Ok(Self {
            include: build(&config.include)?,
            exclude: build(&config.exclude)?,
        })
    }

    pub fn permits(&self, scheme: &str, host: &str, path: &str, port: u16) -> bool {
        (self.include.is_empty() || self.include.matches(scheme, host, path, port))
            && !self.exclude.matches(scheme, host, path, port)
    }
}
