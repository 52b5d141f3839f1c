use serde::{Deserialize, Serialize};

/// One recorded request/response exchange. Immutable once persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entry {
    /// Assigned by the store on save; zero before that.
    pub id: i64,
    pub method: String,
    /// "http" or "https".
    pub scheme: String,
    pub host: String,
    pub path: String,
    pub query: Option<String>,
    pub request_headers: Vec<(String, String)>,
    pub request_body: Vec<u8>,
    pub status_code: u16,
    pub response_headers: Vec<(String, String)>,
    pub response_body: Vec<u8>,
    /// RFC 3339.
    pub timestamp: String,
    pub duration_ms: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchParams {
    /// Exact match.
    pub method: Option<String>,
    /// Glob wildcard, e.g. "*.acme.com".
    pub host: Option<String>,
    /// Domain suffix list; any suffix matching counts.
    pub domains: Vec<String>,
    /// Prefix or glob wildcard.
    pub path: Option<String>,
    /// Exact match.
    pub status: Option<u16>,
    pub limit: usize,
    pub offset: usize,
}
