//! Discovery output: candidate repositories awaiting a parse.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::TEMPLATE_SUFFIX;

// ============================================================================
// Candidate
// ============================================================================

/// A repository identifier (`owner/name`) plus whether it is on the
/// known-verified list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Repository identifier as first seen.
    pub id: String,
    /// Whether the identifier was seeded from the verified list.
    pub verified: bool,
}

impl Candidate {
    /// Creates an unverified candidate.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            verified: false,
        }
    }

    /// Creates a candidate seeded from the verified list.
    pub fn verified(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            verified: true,
        }
    }

    /// Returns the `owner` part of the identifier.
    pub fn owner(&self) -> &str {
        self.id.split_once('/').map_or(self.id.as_str(), |(owner, _)| owner)
    }
}

// ============================================================================
// Candidate Set
// ============================================================================

/// Candidates keyed by lower-cased identifier.
///
/// Two identifiers differing only by case always collapse into one entry,
/// and the first spelling seen is kept. A verified entry is never downgraded
/// by later discovery.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    entries: BTreeMap<String, Candidate>,
}

impl CandidateSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set pre-seeded with verified identifiers.
    pub fn seeded<I, S>(verified: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for id in verified {
            set.insert_verified(id.as_ref());
        }
        set
    }

    fn key(id: &str) -> String {
        id.trim().to_lowercase()
    }

    /// Inserts a verified identifier, upgrading an existing entry.
    pub fn insert_verified(&mut self, id: &str) {
        let id = id.trim();
        if id.is_empty() {
            return;
        }
        self.entries
            .entry(Self::key(id))
            .and_modify(|c| c.verified = true)
            .or_insert_with(|| Candidate::verified(id));
    }

    /// Inserts a discovered identifier.
    ///
    /// Identifiers ending in the template suffix are skipped. Returns true if
    /// a new entry was created.
    pub fn insert_discovered(&mut self, id: &str) -> bool {
        let id = id.trim();
        if id.is_empty() {
            return false;
        }
        let key = Self::key(id);
        if key.ends_with(TEMPLATE_SUFFIX) || self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, Candidate::new(id));
        true
    }

    /// Returns true if the identifier is present, ignoring case.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(&Self::key(id))
    }

    /// Looks up a candidate, ignoring case.
    pub fn get(&self, id: &str) -> Option<&Candidate> {
        self.entries.get(&Self::key(id))
    }

    /// Removes a candidate, ignoring case.
    pub fn remove(&mut self, id: &str) -> Option<Candidate> {
        self.entries.remove(&Self::key(id))
    }

    /// Keeps only candidates for which `keep` returns true. Returns how many
    /// were removed.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&Candidate) -> bool,
    {
        let before = self.entries.len();
        self.entries.retain(|_, c| keep(c));
        before - self.entries.len()
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no candidates.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates candidates in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.entries.values()
    }

    /// Consumes the set, returning candidates in key order.
    pub fn into_vec(self) -> Vec<Candidate> {
        self.entries.into_values().collect()
    }
}

impl Extend<String> for CandidateSet {
    fn extend<T: IntoIterator<Item = String>>(&mut self, iter: T) {
        for id in iter {
            self.insert_discovered(&id);
        }
    }
}
