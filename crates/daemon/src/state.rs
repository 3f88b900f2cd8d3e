use std::{fs, path::PathBuf};

use common::crypto::VaultKey;
use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "ssv";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DB_FILE_NAME: &str = "db.sqlite";
pub const KEY_FILE_NAME: &str = "vault.key";
pub const CONTAINERS_DIR_NAME: &str = "containers";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Port for the API server
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    /// Maximum accepted upload size in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Lifetime of a preview session in seconds
    #[serde(default = "default_preview_ttl_secs")]
    pub preview_ttl_secs: u64,
}

fn default_api_port() -> u16 {
    5100
}

fn default_max_upload_bytes() -> usize {
    100 * 1024 * 1024
}

fn default_preview_ttl_secs() -> u64 {
    300
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
            max_upload_bytes: default_max_upload_bytes(),
            preview_ttl_secs: default_preview_ttl_secs(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the ssv directory (~/.ssv)
    pub ssv_dir: PathBuf,
    /// Path to the SQLite database
    pub db_path: PathBuf,
    /// Path to the hex-encoded vault master key
    pub key_path: PathBuf,
    /// Path to the container blob directory
    pub containers_path: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the ssv directory path (custom or default ~/.ssv)
    pub fn ssv_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new ssv state directory
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let ssv_dir = Self::ssv_dir(custom_path)?;

        if ssv_dir.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&ssv_dir)?;

        let containers_path = ssv_dir.join(CONTAINERS_DIR_NAME);
        fs::create_dir_all(&containers_path)?;

        // Generate and save the vault master key
        let key = VaultKey::generate();
        let key_path = ssv_dir.join(KEY_FILE_NAME);
        fs::write(&key_path, key.to_hex())?;

        let config = config.unwrap_or_default();
        let config_path = ssv_dir.join(CONFIG_FILE_NAME);
        let config_toml = toml::to_string_pretty(&config)?;
        fs::write(&config_path, config_toml)?;

        // Create empty database (just touch the file, it will be migrated by
        // the service)
        let db_path = ssv_dir.join(DB_FILE_NAME);
        fs::write(&db_path, "")?;

        Ok(Self {
            ssv_dir,
            db_path,
            key_path,
            containers_path,
            config_path,
            config,
        })
    }

    /// Load existing state from the ssv directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let ssv_dir = Self::ssv_dir(custom_path)?;

        if !ssv_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let db_path = ssv_dir.join(DB_FILE_NAME);
        let key_path = ssv_dir.join(KEY_FILE_NAME);
        let containers_path = ssv_dir.join(CONTAINERS_DIR_NAME);
        let config_path = ssv_dir.join(CONFIG_FILE_NAME);

        if !db_path.exists() {
            return Err(StateError::MissingFile(DB_FILE_NAME.to_string()));
        }
        if !key_path.exists() {
            return Err(StateError::MissingFile(KEY_FILE_NAME.to_string()));
        }
        if !containers_path.exists() {
            return Err(StateError::MissingFile(format!("{}/", CONTAINERS_DIR_NAME)));
        }
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        Ok(Self {
            ssv_dir,
            db_path,
            key_path,
            containers_path,
            config_path,
            config,
        })
    }

    /// Load the vault master key from the key file
    pub fn load_key(&self) -> Result<VaultKey, StateError> {
        let hex = fs::read_to_string(&self.key_path)?;
        let key = VaultKey::from_hex(&hex).map_err(|e| StateError::InvalidKey(e.to_string()))?;
        Ok(key)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("ssv directory not initialized. Run 'ssv init' first")]
    NotInitialized,

    #[error("ssv directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_then_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("vault-home");

        let state = AppState::init(Some(dir.clone()), None).unwrap();
        assert!(state.key_path.exists());
        assert!(state.containers_path.exists());

        let loaded = AppState::load(Some(dir.clone())).unwrap();
        assert_eq!(loaded.config.api_port, state.config.api_port);

        // the persisted key round-trips
        assert_eq!(state.load_key().unwrap(), loaded.load_key().unwrap());
    }

    #[test]
    fn test_init_refuses_existing_dir() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("vault-home");

        AppState::init(Some(dir.clone()), None).unwrap();
        assert!(matches!(
            AppState::init(Some(dir), None),
            Err(StateError::AlreadyInitialized)
        ));
    }

    #[test]
    fn test_load_requires_init() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            AppState::load(Some(temp.path().join("missing"))),
            Err(StateError::NotInitialized)
        ));
    }
}
