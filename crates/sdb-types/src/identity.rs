use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TypeError;

/// Stable document identity (the store's `_id`).
///
/// Assigned once when a document is first built and never changed afterwards.
/// Freshly minted ids are uuid4 values rendered as 32 lowercase hex digits.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Mint a new random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Wrap an existing id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentId({})", self.0)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Returns `key` when it is present and non-empty, otherwise a fresh
/// uuid4-hex key.
pub fn find_or_make_key(key: Option<&str>) -> String {
    match key {
        Some(k) if !k.is_empty() => k.to_string(),
        _ => Uuid::new_v4().simple().to_string(),
    }
}

/// Opaque optimistic-concurrency token (the store's `_rev`).
///
/// Owned by the store: callers only ever copy a revision they read back
/// into a document they are about to write. The store's in-memory backend
/// renders revisions as `{generation}-{32 hex}`.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Revision(String);

impl Revision {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The revision that follows `previous` (generation + 1, fresh suffix).
    pub fn next(previous: Option<&Revision>) -> Result<Self, TypeError> {
        let generation = match previous {
            Some(rev) => rev.generation()? + 1,
            None => 1,
        };
        Ok(Self(format!(
            "{generation}-{}",
            Uuid::new_v4().simple()
        )))
    }

    /// The numeric generation prefix of the token.
    pub fn generation(&self) -> Result<u64, TypeError> {
        self.0
            .split_once('-')
            .and_then(|(n, _)| n.parse().ok())
            .ok_or_else(|| TypeError::InvalidRevision(self.0.clone()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Revision({})", self.0)
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_hex_and_unique() {
        let a = DocumentId::generate();
        let b = DocumentId::generate();
        assert_eq!(a.as_str().len(), 32);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn find_or_make_key_keeps_given_key() {
        assert_eq!(find_or_make_key(Some("abc")), "abc");
        assert_eq!(find_or_make_key(Some("")).len(), 32);
        assert_eq!(find_or_make_key(None).len(), 32);
    }

    #[test]
    fn revision_generations_increase() {
        let first = Revision::next(None).unwrap();
        assert_eq!(first.generation().unwrap(), 1);
        let second = Revision::next(Some(&first)).unwrap();
        assert_eq!(second.generation().unwrap(), 2);
        assert_ne!(first, second);
    }

    #[test]
    fn malformed_revision_is_rejected() {
        let rev = Revision::new("garbage");
        assert_eq!(
            rev.generation(),
            Err(TypeError::InvalidRevision("garbage".into()))
        );
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = DocumentId::new("abc123");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc123\"");
    }
}
