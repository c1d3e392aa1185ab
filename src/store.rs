// src/store.rs
use crate::clock::Clock;
use crate::error::{StoreError, StoreResult};
use crate::models::PasswordStore;
use crate::schema;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// How `save_store` replaces the file on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// Write a sibling temp file, sync it, then rename it over the target.
    Atomic,
    /// Truncate and rewrite the target directly.
    InPlace,
}

impl SaveMode {
    pub fn from_atomic_flag(atomic: bool) -> Self {
        if atomic {
            SaveMode::Atomic
        } else {
            SaveMode::InPlace
        }
    }
}

/// Serializes the store as 2-space indented JSON with a trailing newline.
pub fn to_json(store: &PasswordStore) -> StoreResult<String> {
    let mut json = serde_json::to_string_pretty(store).map_err(|e| {
        let msg = format!("JSON serialization failed: {}", e);
        log::error!("to_json: {}", msg);
        StoreError::Serialization(msg)
    })?;
    json.push('\n');
    Ok(json)
}

/// Writes the store to `filepath`.
pub fn save_store(store: &PasswordStore, filepath: &Path, mode: SaveMode) -> StoreResult<()> {
    log::info!("Attempting to save store to {:?} ({:?})", filepath, mode);
    let json = to_json(store)?;

    let written = match mode {
        SaveMode::Atomic => write_atomic(filepath, json.as_bytes()),
        SaveMode::InPlace => write_in_place(filepath, json.as_bytes()),
    };
    written.map_err(|e| {
        log::warn!("Failed to write store {:?}: {}", filepath, e);
        StoreError::Io(e)
    })?;

    log::info!("Password store saved successfully to {:?}", filepath);
    Ok(())
}

fn write_in_place(filepath: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(filepath)?;
    file.write_all(bytes)?;
    file.flush()
}

fn write_atomic(filepath: &Path, bytes: &[u8]) -> io::Result<()> {
    // Replace the file a symlink points at, not the link itself.
    let target = match fs::canonicalize(filepath) {
        Ok(resolved) => resolved,
        Err(e) if e.kind() == io::ErrorKind::NotFound => filepath.to_path_buf(),
        Err(e) => return Err(e),
    };
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    if let Ok(existing) = fs::metadata(&target) {
        temp.as_file().set_permissions(existing.permissions())?;
    }
    temp.as_file().sync_all()?;
    temp.persist(&target).map_err(|e| e.error)?;
    Ok(())
}

/// Reads, parses and validates the store at `filepath`.
pub fn load_store(filepath: &Path) -> StoreResult<PasswordStore> {
    log::info!("Attempting to load store from {:?}", filepath);
    let bytes = fs::read(filepath).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            log::warn!("Store file {:?} does not exist", filepath);
            StoreError::StoreNotFound(filepath.to_path_buf())
        } else {
            log::warn!("Failed to read store file {:?}: {}", filepath, e);
            StoreError::Io(e)
        }
    })?;

    let text = String::from_utf8(bytes).map_err(|e| StoreError::Corrupt {
        path: filepath.to_path_buf(),
        details: format!("not valid UTF-8: {}", e.utf8_error()),
    })?;

    let document: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
        log::warn!("Store file {:?} is not valid JSON: {}", filepath, e);
        StoreError::Corrupt {
            path: filepath.to_path_buf(),
            details: e.to_string(),
        }
    })?;

    let store = schema::parse_document(document).map_err(|e| {
        log::warn!("Store file {:?} failed schema validation: {}", filepath, e);
        StoreError::Schema(e)
    })?;

    log::info!(
        "Password store loaded successfully from {:?} ({} entries)",
        filepath,
        store.entries.len()
    );
    Ok(store)
}

/// Creates a fresh, empty store file. An existing file is only replaced when `force` is set.
pub fn init_store(filepath: &Path, clock: &dyn Clock, force: bool, mode: SaveMode) -> StoreResult<PasswordStore> {
    if filepath.exists() && !force {
        log::warn!("Refusing to overwrite existing store {:?}", filepath);
        return Err(StoreError::AlreadyExists(filepath.to_path_buf()));
    }
    let store = PasswordStore::new(clock);
    save_store(&store, filepath, mode)?;
    Ok(store)
}
