//! Intercepting proxy engine: terminates TLS for in-scope hosts with
//! certificates minted under a session root, forwards traffic with manual
//! HTTP/1.1 framing, and lets an operator pause, edit, and release
//! individual requests.

mod config;
mod error;
mod event;
mod events;
mod intercept;
mod proxy;
mod scope;

pub use config::{ListenConfig, ProxyConfig, RuleConfig, ScopeConfig, TlsMitmConfig};
pub use error::ProxyError;
pub use event::{ProxyEvent, ProxyRequest, SyntheticResponse, TrafficEvent};
pub use events::{ProxyControl, ProxyEvents};
pub use intercept::InterceptDecision;
pub use proxy::Proxy;
pub use scope::{Rule, RuleSet, Scope, ScopeRules};
