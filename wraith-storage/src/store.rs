use thiserror::Error;

use crate::entry::{Entry, SearchParams};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("entry {0} not found")]
    NotFound(i64),
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Durable append/query interface the proxy engine records through.
/// Implementations must be callable from many connection tasks at once.
pub trait EntryStore: Send + Sync {
    /// Persists the entry and returns its assigned id.
    fn save(&self, entry: Entry) -> Result<i64, StoreError>;
    fn get(&self, id: i64) -> Result<Entry, StoreError>;
    /// Newest first.
    fn list(&self, limit: usize, offset: usize) -> Result<Vec<Entry>, StoreError>;
    fn search(&self, params: &SearchParams) -> Result<Vec<Entry>, StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
    fn close(&self) -> Result<(), StoreError>;
}
