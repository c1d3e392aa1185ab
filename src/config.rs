// src/config.rs
use crate::engine::SortKey;
use anyhow::Context;
use directories::ProjectDirs;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "passman_config.toml";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Store used when `--file` is not given.
    pub default_store_file: PathBuf,
    /// Ordering used by `list` when `--sort` is not given.
    pub default_sort: SortKey,
    /// Replace the store via temp file + rename instead of overwriting in place.
    pub atomic_save: bool,
    pub list_site_width: usize,
    pub list_username_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_store_file: PathBuf::from("store.json"),
            default_sort: SortKey::Site,
            atomic_save: true,
            list_site_width: 12,
            list_username_width: 16,
        }
    }
}

fn get_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "Passman", "passman")
        .map(|proj_dirs| proj_dirs.config_dir().join(CONFIG_FILE_NAME))
}

fn save_default_config(config_path: &Path, config: &Config) -> anyhow::Result<()> {
    info!("Attempting to save default config to {:?}", config_path);
    if let Some(parent_dir) = config_path.parent() {
        if !parent_dir.exists() {
            fs::create_dir_all(parent_dir)
                .with_context(|| format!("Failed to create config directory {:?}", parent_dir))?;
            info!("Created config directory: {:?}", parent_dir);
        }
    }

    let toml_string = toml::to_string_pretty(config).context("Failed to serialize default config to TOML")?;
    fs::write(config_path, toml_string)
        .with_context(|| format!("Failed to write default config to {:?}", config_path))?;

    info!("Saved default configuration to {:?}", config_path);
    Ok(())
}

/// Reads the config at `config_path`, writing the defaults there first if the file is missing.
/// Any failure falls back to `Config::default()`.
pub fn load_config_from(config_path: &Path) -> Config {
    if !config_path.exists() {
        info!(
            "Config file not found at {:?}. Creating and using default configuration.",
            config_path
        );
        let default_config = Config::default();
        if let Err(e) = save_default_config(config_path, &default_config) {
            warn!("Failed to save default configuration: {:#}", e);
        }
        return default_config;
    }

    info!("Loading configuration from {:?}", config_path);
    let parsed = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file at {:?}", config_path))
        .and_then(|content| {
            toml::from_str::<Config>(&content)
                .with_context(|| format!("Failed to parse config file at {:?}", config_path))
        });
    match parsed {
        Ok(config) => {
            info!("Configuration loaded successfully.");
            config
        }
        Err(e) => {
            warn!("{:#}. Using default configuration.", e);
            Config::default()
        }
    }
}

pub fn load_config() -> Config {
    match get_config_path() {
        Some(config_path) => load_config_from(&config_path),
        None => {
            warn!("Could not determine config directory. Using default configuration.");
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.default_store_file, PathBuf::from("store.json"));
        assert_eq!(config.default_sort, SortKey::Site);
        assert!(config.atomic_save);
    }

    #[test]
    fn test_missing_config_is_created_with_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let config = load_config_from(&config_path);
        assert_eq!(config, Config::default());
        assert!(config_path.exists());

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("default_sort = \"site\""), "got:\n{}", content);
        let reloaded: Config = toml::from_str(&content).unwrap();
        assert_eq!(reloaded, Config::default());
    }

    #[test]
    fn test_load_existing_config() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(
            &config_path,
            r#"
default_store_file = "/tmp/vault.json"
default_sort = "last_updated"
atomic_save = false
list_site_width = 20
list_username_width = 10
"#,
        )
        .unwrap();

        let config = load_config_from(&config_path);
        assert_eq!(config.default_store_file, PathBuf::from("/tmp/vault.json"));
        assert_eq!(config.default_sort, SortKey::LastUpdated);
        assert!(!config.atomic_save);
        assert_eq!(config.list_site_width, 20);
    }

    #[test]
    fn test_partial_config_keeps_defaults_for_missing_fields() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "default_sort = \"last_updated\"\n").unwrap();

        let config = load_config_from(&config_path);
        assert_eq!(config.default_sort, SortKey::LastUpdated);
        assert_eq!(config.default_store_file, PathBuf::from("store.json"));
        assert!(config.atomic_save);
    }

    #[test]
    fn test_load_config_invalid_toml_falls_back() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "this is not valid toml content = definitely_broken").unwrap();
        assert_eq!(load_config_from(&config_path), Config::default());

        fs::write(&config_path, "default_sort = \"by_color\"\n").unwrap();
        assert_eq!(load_config_from(&config_path), Config::default());
    }
}
