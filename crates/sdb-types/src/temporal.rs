use std::fmt;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// UTC wall-clock stamp as stored in `creation_time` / `modification_time`.
///
/// Kept as the store's string form (`2024-03-01T12:00:00.000000Z`) so that
/// stamps written by other tools round-trip untouched.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    /// Stamp for the current wall-clock time.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self(at.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string())
    }

    /// Wrap a stamp that was read from a document.
    pub fn new(stamp: impl Into<String>) -> Self {
        Self(stamp.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of "now" for components that stamp documents.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// The real wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock that always reports the same instant until moved with [`FixedClock::set`].
#[derive(Debug)]
pub struct FixedClock {
    current: RwLock<Timestamp>,
}

impl FixedClock {
    pub fn new(stamp: impl Into<String>) -> Self {
        Self {
            current: RwLock::new(Timestamp::new(stamp)),
        }
    }

    pub fn set(&self, stamp: impl Into<String>) {
        *self.current.write().expect("lock poisoned") = Timestamp::new(stamp);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.current.read().expect("lock poisoned").clone()
    }
}
