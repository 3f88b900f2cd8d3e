use clap::Args;

use ssv_daemon::state::{AppConfig, AppState, StateError};
use ssv_daemon::{keys::KeyRegistryError, Database};

/// Bootstrap administrator keys get a one year lifetime; rotate earlier by
/// issuing a replacement and revoking this one.
const BOOTSTRAP_TTL_DAYS: i64 = 365;

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Override API server port (default 5100)
    #[arg(long)]
    pub api_port: Option<u16>,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("state error: {0}")]
    State(#[from] StateError),

    #[error("database error: {0}")]
    Database(#[from] ssv_daemon::database::DatabaseSetupError),

    #[error("key issuance error: {0}")]
    Keys(#[from] KeyRegistryError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut config = AppConfig::default();
        if let Some(port) = self.api_port {
            config.api_port = port;
        }

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        // Migrate the fresh database and issue the bootstrap administrator
        // key. This is the only time its secret is ever shown.
        let database = Database::connect(&state.db_path).await?;
        let registry = ssv_daemon::keys::ApiKeyRegistry::new(database);
        let issued = registry
            .issue_bootstrap("bootstrap-admin", BOOTSTRAP_TTL_DAYS)
            .await?;

        let lines = vec![
            format!("Initialized ssv vault at {}", state.ssv_dir.display()),
            format!("  config:     {}", state.config_path.display()),
            format!("  database:   {}", state.db_path.display()),
            format!("  vault key:  {}", state.key_path.display()),
            format!("  containers: {}", state.containers_path.display()),
            String::new(),
            format!("Administrator API key ({}):", issued.record.id),
            String::new(),
            format!("  {}", issued.secret),
            String::new(),
            "This secret is shown once and cannot be recovered. Store it safely.".to_string(),
        ];

        Ok(lines.join("\n"))
    }
}
