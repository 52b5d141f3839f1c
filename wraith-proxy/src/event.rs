use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A request packaged for display, interception, and editing. Routing
/// (scheme/host/port) travels alongside the message so an operator edit
/// cannot silently redirect it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProxyRequest {
    pub id: Uuid,
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ProxyRequest {
    pub fn url(&self) -> String {
        let query = self
            .query
            .as_deref()
            .map(|q| format!("?{q}"))
            .unwrap_or_default();
        format!("{}://{}{}{}", self.scheme, self.host, self.path, query)
    }
}

/// Operator-supplied canned response delivered instead of forwarding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyntheticResponse {
    pub status_code: u16,
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// One event per completed forward, for live activity display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrafficEvent {
    pub method: String,
    pub scheme: String,
    pub host: String,
    pub path: String,
    pub status_code: u16,
    pub duration_ms: i64,
    pub intercepted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProxyEvent {
    Traffic(TrafficEvent),
    /// A request is paused at the interception gate awaiting a decision.
    InterceptStarted { request: ProxyRequest },
    InterceptQueueChanged { pending: usize },
}
