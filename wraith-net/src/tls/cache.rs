use std::collections::{HashMap, VecDeque};

use super::types::LeafCertificate;

/// Bounded LRU of issued leaf certificates, keyed by hostname. Long-running
/// daemons visit an unbounded set of hosts, so the cache caps retention and
/// drops the least recently served entry first.
#[derive(Debug)]
pub struct CertCache {
    max_entries: usize,
    order: VecDeque<String>,
    entries: HashMap<String, LeafCertificate>,
}

impl CertCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries,
            order: VecDeque::new(),
            entries: HashMap::new(),
        }
    }

    pub fn get(&mut self, host: &str) -> Option<LeafCertificate> {
        let cert = self.entries.get(host).cloned()?;
        self.touch(host);
        Some(cert)
    }

    pub fn insert(&mut self, host: String, cert: LeafCertificate) {
        if !self.entries.contains_key(&host) {
            self.order.push_back(host.clone());
        }
        self.entries.insert(host.clone(), cert);
        self.touch(&host);
        self.evict_if_needed();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn touch(&mut self, host: &str) {
        if let Some(pos) = self.order.iter().position(|item| item == host) {
            self.order.remove(pos);
            self.order.push_back(host.to_string());
        }
    }

    fn evict_if_needed(&mut self) {
        while self.order.len() > self.max_entries {
            if let Some(host) = self.order.pop_front() {
                self.entries.remove(&host);
            }
        }
    }
}
