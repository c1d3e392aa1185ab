// src/engine.rs
//! CRUD and query operations over a loaded [`PasswordStore`].
//!
//! Every mutating operation checks all of its inputs before touching the
//! document, so a rejected call leaves the store exactly as it was. A
//! successful mutation reads the clock once and stamps both the record and
//! `metadata.updated_at` with that instant.
use crate::clock::Clock;
use crate::error::{EngineError, EngineResult};
use crate::models::{normalize_site, PasswordStore, Record};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Site,
    LastUpdated,
}

/// One line of `list` output. Passwords are deliberately absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRow {
    pub site: String,
    pub username: String,
    pub last_updated: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    pub count: usize,
    pub oldest: Option<String>,
    pub newest: Option<String>,
    pub avg_password_length: f64,
}

fn site_key(op: &'static str, site: &str) -> EngineResult<String> {
    let key = normalize_site(site);
    if key.is_empty() {
        log::warn!("{}: rejected blank site {:?}", op, site);
        return Err(EngineError::validation(op, "site is required."));
    }
    Ok(key)
}

impl PasswordStore {
    fn touch(&mut self, now: String) {
        self.metadata.count = self.entries.len() as i64;
        self.metadata.updated_at = now;
    }

    /// Inserts a new record. Never overwrites an existing site.
    pub fn add(&mut self, clock: &dyn Clock, site: &str, username: &str, password: &str) -> EngineResult<String> {
        let key = site_key("add", site)?;
        if username.is_empty() || password.is_empty() {
            log::warn!("add: empty credentials for '{}'", key);
            return Err(EngineError::validation("add", "username and password cannot be empty."));
        }
        if self.entries.contains_key(&key) {
            log::warn!("add: duplicate site '{}'", key);
            return Err(EngineError::Duplicate(key));
        }

        let now = clock.now();
        self.entries.insert(
            key.clone(),
            Record {
                username: username.to_string(),
                password: password.to_string(),
                last_updated: now.clone(),
            },
        );
        self.touch(now);
        log::info!("Added entry '{}' ({} entries)", key, self.len());
        Ok(key)
    }

    /// Looks up a site. A missing site is `Ok(None)`, not an error.
    pub fn get(&self, site: &str) -> EngineResult<Option<&Record>> {
        let key = site_key("get", site)?;
        let record = self.entries.get(&key);
        log::debug!("get '{}': found={}", key, record.is_some());
        Ok(record)
    }

    /// Applies whichever of `username`/`password` were supplied.
    pub fn update(
        &mut self,
        clock: &dyn Clock,
        site: &str,
        username: Option<&str>,
        password: Option<&str>,
    ) -> EngineResult<String> {
        let key = site_key("update", site)?;
        if username.is_none() && password.is_none() {
            return Err(EngineError::validation(
                "update",
                "nothing to update (provide --username and/or --password).",
            ));
        }
        if !self.entries.contains_key(&key) {
            log::warn!("update: unknown site '{}'", key);
            return Err(EngineError::NotFound { op: "update", site: key });
        }
        if username == Some("") {
            return Err(EngineError::validation("update", "username cannot be empty."));
        }
        if password == Some("") {
            return Err(EngineError::validation("update", "password cannot be empty."));
        }

        let now = clock.now();
        if let Some(record) = self.entries.get_mut(&key) {
            if let Some(username) = username {
                record.username = username.to_string();
            }
            if let Some(password) = password {
                record.password = password.to_string();
            }
            record.last_updated = now.clone();
        }
        self.touch(now);
        log::info!("Updated entry '{}'", key);
        Ok(key)
    }

    /// Removes a site, keeping the relative order of the remaining entries.
    pub fn delete(&mut self, clock: &dyn Clock, site: &str) -> EngineResult<String> {
        let key = site_key("delete", site)?;
        if self.entries.shift_remove(&key).is_none() {
            log::warn!("delete: unknown site '{}'", key);
            return Err(EngineError::NotFound { op: "delete", site: key });
        }
        self.touch(clock.now());
        log::info!("Deleted entry '{}' ({} entries)", key, self.len());
        Ok(key)
    }

    pub fn list(&self, sort: SortKey) -> Vec<ListRow> {
        let mut rows: Vec<ListRow> = self
            .entries
            .iter()
            .map(|(site, record)| ListRow {
                site: site.clone(),
                username: record.username.clone(),
                last_updated: record.last_updated.clone(),
            })
            .collect();
        // stable: equal timestamps keep insertion order
        match sort {
            SortKey::Site => rows.sort_by(|a, b| a.site.cmp(&b.site)),
            SortKey::LastUpdated => rows.sort_by(|a, b| a.last_updated.cmp(&b.last_updated)),
        }
        rows
    }

    /// Case-insensitive substring match on site and username.
    pub fn search(&self, keyword: &str) -> Vec<String> {
        if keyword.is_empty() {
            return Vec::new();
        }
        let needle = keyword.to_lowercase();
        // keys are unique, so each site is pushed at most once
        let mut hits: Vec<String> = self
            .entries
            .iter()
            .filter(|(site, record)| {
                site.to_lowercase().contains(&needle) || record.username.to_lowercase().contains(&needle)
            })
            .map(|(site, _)| site.clone())
            .collect();
        hits.sort();
        hits
    }

    pub fn stats(&self) -> Stats {
        let count = self.entries.len();
        let oldest = self.entries.values().map(|r| &r.last_updated).min().cloned();
        let newest = self.entries.values().map(|r| &r.last_updated).max().cloned();
        let avg_password_length = if self.is_empty() {
            0.0
        } else {
            let total: usize = self.entries.values().map(|r| r.password.chars().count()).sum();
            total as f64 / count as f64
        };
        Stats { count, oldest, newest, avg_password_length }
    }
}
