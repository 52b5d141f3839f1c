use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::entry::{Entry, SearchParams};
use crate::store::{EntryStore, StoreError};

/// In-process store backing short-lived sessions and tests. Entries live in
/// insertion order; reads walk newest first.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<Vec<Entry>>,
    next_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Entry>>, StoreError> {
        self.entries
            .lock()
            .map_err(|err| StoreError::Backend(err.to_string()))
    }
}

impl EntryStore for MemoryStore {
    fn save(&self, mut entry: Entry) -> Result<i64, StoreError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        entry.id = id;
        self.lock()?.push(entry);
        Ok(id)
    }

    fn get(&self, id: i64) -> Result<Entry, StoreError> {
        self.lock()?
            .iter()
            .find(|entry| entry.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    fn list(&self, limit: usize, offset: usize) -> Result<Vec<Entry>, StoreError> {
        let entries = self.lock()?;
        Ok(entries
            .iter()
            .rev()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    fn search(&self, params: &SearchParams) -> Result<Vec<Entry>, StoreError> {
        let entries = self.lock()?;
        let limit = if params.limit == 0 {
            usize::MAX
        } else {
            params.limit
        };
        Ok(entries
            .iter()
            .rev()
            .filter(|entry| matches_params(entry, params))
            .skip(params.offset)
            .take(limit)
            .cloned()
            .collect())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.lock()?.clear();
        Ok(())
    }

    fn close(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

fn matches_params(entry: &Entry, params: &SearchParams) -> bool {
    if let Some(method) = &params.method {
        if !entry.method.eq_ignore_ascii_case(method) {
            return false;
        }
    }

    if let Some(host) = &params.host {
        if !glob_match(host, &entry.host) {
            return false;
        }
    }

    if !params.domains.is_empty() {
        let matched = params.domains.iter().any(|domain| {
            entry.host == *domain || entry.host.ends_with(&format!(".{domain}"))
        });
        if !matched {
            return false;
        }
    }

    if let Some(path) = &params.path {
        let matched = if path.contains('*') {
            glob_match(path, &entry.path)
        } else {
            entry.path.starts_with(path.as_str())
        };
        if !matched {
            return false;
        }
    }

    if let Some(status) = params.status {
        if entry.status_code != status {
            return false;
        }
    }

    true
}

fn glob_match(pattern: &str, value: &str) -> bool {
    let mut pos = 0;
    let mut parts = pattern.split('*');

    if let Some(prefix) = parts.next() {
        if !value.starts_with(prefix) {
            return false;
        }
        pos += prefix.len();
    }

    for part in parts {
        if part.is_empty() {
            continue;
        }
        match value[pos..].find(part) {
            Some(index) => pos += index + part.len(),
            None => return false,
        }
    }

    if !pattern.ends_with('*') {
        if let Some(last) = pattern.split('*').next_back() {
            return value.ends_with(last);
        }
    }

    true
}
