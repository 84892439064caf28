//! Request headers and policy keys.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Header that carries the active policy keys as a `|`-separated list.
pub const POLICY_KEYS_HEADER: &str = "PolicyKeys";

const POLICY_KEY_SEPARATOR: char = '|';

/// A named flag that can be switched on for a run.
///
/// Comparison ignores ASCII case, so `IgnoreSampleData` and
/// `ignoresampledata` name the same flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyKey(String);

impl PolicyKey {
    /// Creates a new policy key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into().trim().to_string())
    }

    /// Returns the key as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if `other` names the same flag.
    #[must_use]
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other.trim())
    }
}

impl PartialEq for PolicyKey {
    fn eq(&self, other: &Self) -> bool {
        self.matches(&other.0)
    }
}

impl Eq for PolicyKey {}

impl fmt::Display for PolicyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PolicyKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PolicyKey {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Insertion-ordered headers with case-insensitive names.
///
/// Setting an existing header replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderBag {
    entries: Vec<(String, String)>,
}

impl HeaderBag {
    /// Creates an empty header bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(key, _)| key.eq_ignore_ascii_case(name))
    }

    /// Gets a header value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|idx| self.entries[idx].1.as_str())
    }

    /// Checks if a header is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Sets a header, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(idx) => self.entries[idx].1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Removes a header, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name).map(|idx| self.entries.remove(idx).1)
    }

    /// Iterates headers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the number of headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the active policy keys.
    #[must_use]
    pub fn policy_keys(&self) -> Vec<PolicyKey> {
        self.get(POLICY_KEYS_HEADER)
            .map(|raw| {
                raw.split(POLICY_KEY_SEPARATOR)
                    .map(str::trim)
                    .filter(|key| !key.is_empty())
                    .map(PolicyKey::new)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns true if `key` is an active policy key.
    #[must_use]
    pub fn has_policy_key(&self, key: &PolicyKey) -> bool {
        self.policy_keys().iter().any(|active| active == key)
    }

    /// Activates policy keys, ignoring ones already active.
    pub fn add_policy_keys<I, K>(&mut self, keys: I)
    where
        I: IntoIterator<Item = K>,
        K: Into<PolicyKey>,
    {
        let mut active = self.policy_keys();
        for key in keys {
            let key = key.into();
            if !key.as_str().is_empty() && !active.contains(&key) {
                active.push(key);
            }
        }
        self.write_policy_keys(&active);
    }

    /// Deactivates policy keys.
    pub fn remove_policy_keys<I, K>(&mut self, keys: I)
    where
        I: IntoIterator<Item = K>,
        K: Into<PolicyKey>,
    {
        let removed: Vec<PolicyKey> = keys.into_iter().map(Into::into).collect();
        let remaining: Vec<PolicyKey> = self
            .policy_keys()
            .into_iter()
            .filter(|key| !removed.contains(key))
            .collect();
        self.write_policy_keys(&remaining);
    }

    fn write_policy_keys(&mut self, keys: &[PolicyKey]) {
        if keys.is_empty() {
            self.remove(POLICY_KEYS_HEADER);
            return;
        }
        let joined = keys
            .iter()
            .map(PolicyKey::as_str)
            .collect::<Vec<_>>()
            .join(&POLICY_KEY_SEPARATOR.to_string());
        self.set(POLICY_KEYS_HEADER, joined);
    }
}
