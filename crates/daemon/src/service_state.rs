use crate::database::{Database, DatabaseSetupError};
use crate::keys::ApiKeyRegistry;
use crate::preview::PreviewBroker;
use crate::service_config::Config;
use crate::vault::{VaultStore, VaultStoreError};

/// Main service state - orchestrates all components
#[derive(Clone)]
pub struct State {
    database: Database,
    vault: VaultStore,
    keys: ApiKeyRegistry,
    previews: PreviewBroker,
}

impl State {
    pub async fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        let database = match &config.sqlite_path {
            Some(path) => Database::connect(path).await?,
            None => Database::in_memory().await?,
        };

        let vault = VaultStore::new(
            database.clone(),
            config.containers_dir.clone(),
            config.vault_key.clone(),
        )
        .await?;

        let keys = ApiKeyRegistry::new(database.clone());
        let previews = PreviewBroker::new(vault.clone(), config.preview_ttl);

        Ok(Self {
            database,
            vault,
            keys,
            previews,
        })
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn vault(&self) -> &VaultStore {
        &self.vault
    }

    pub fn keys(&self) -> &ApiKeyRegistry {
        &self.keys
    }

    pub fn previews(&self) -> &PreviewBroker {
        &self.previews
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("database setup failed: {0}")]
    Database(#[from] DatabaseSetupError),

    #[error("vault store setup failed: {0}")]
    Vault(#[from] VaultStoreError),
}
