//! Deduplicating, naturally ordered collection of endpoints.

use crate::endpoint::Endpoint;
use crate::natural::NaturalKey;
use std::collections::HashSet;
use tracing::info;

/// Unique `(host, port)` endpoints kept in natural `host:port` order.
///
/// The first endpoint seen for a key wins, so a later candidate with the
/// same host and port but a different scheme is dropped.
#[derive(Debug, Default, Clone)]
pub struct TargetSet {
    endpoints: Vec<Endpoint>,
    keys: HashSet<(String, u16)>,
}

impl TargetSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a batch of candidates, then re-sort. Returns how many were accepted.
    pub fn add<I>(&mut self, candidates: I) -> usize
    where
        I: IntoIterator<Item = Endpoint>,
    {
        let mut accepted = 0;
        for candidate in candidates {
            if self.contains(candidate.host(), candidate.port()) {
                continue;
            }
            info!(target = %candidate, "adding");
            self.keys.insert((candidate.host().to_string(), candidate.port()));
            self.endpoints.push(candidate);
            accepted += 1;
        }
        self.endpoints.sort_by_cached_key(|e| NaturalKey(e.sort_key()));
        accepted
    }

    pub fn contains(&self, host: &str, port: u16) -> bool {
        self.keys.contains(&(host.to_string(), port))
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Endpoint> {
        self.endpoints.iter()
    }

    pub fn as_slice(&self) -> &[Endpoint] {
        &self.endpoints
    }
}

impl Extend<Endpoint> for TargetSet {
    fn extend<I: IntoIterator<Item = Endpoint>>(&mut self, iter: I) {
        self.add(iter);
    }
}

impl FromIterator<Endpoint> for TargetSet {
    fn from_iter<I: IntoIterator<Item = Endpoint>>(iter: I) -> Self {
        let mut set = TargetSet::new();
        set.add(iter);
        set
    }
}

impl<'a> IntoIterator for &'a TargetSet {
    type Item = &'a Endpoint;
    type IntoIter = std::slice::Iter<'a, Endpoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.endpoints.iter()
    }
}

impl IntoIterator for TargetSet {
    type Item = Endpoint;
    type IntoIter = std::vec::IntoIter<Endpoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.endpoints.into_iter()
    }
}
