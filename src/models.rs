// src/models.rs
use crate::clock::Clock;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Schema version written by `init`.
pub const STORE_VERSION: i64 = 1;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub version: i64,
    pub created_at: String,
    pub updated_at: String,
    pub count: i64,
}

/// Credentials saved for one site.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub username: String,
    pub password: String,
    pub last_updated: String,
}

/// The whole on-disk document. Entries keep insertion order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PasswordStore {
    pub metadata: Metadata,
    pub entries: IndexMap<String, Record>,
}

impl PasswordStore {
    /// An empty store stamped with the current time.
    pub fn new(clock: &dyn Clock) -> Self {
        let now = clock.now();
        PasswordStore {
            metadata: Metadata {
                version: STORE_VERSION,
                created_at: now.clone(),
                updated_at: now,
                count: 0,
            },
            entries: IndexMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Canonical form of a site key: surrounding whitespace trimmed, lowercased.
pub fn normalize_site(site: &str) -> String {
    site.trim().to_lowercase()
}
