use std::time::Duration;

use clap::Args;

use ssv_daemon::state::AppState;
use ssv_daemon::{spawn_service, ServiceConfig};

#[derive(Args, Debug, Clone)]
pub struct Daemon {
    /// Override API server port (default from config)
    #[arg(long)]
    pub api_port: Option<u16>,

    /// Directory for log files (logs to stdout only if not set)
    #[arg(long)]
    pub log_dir: Option<std::path::PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("state error: {0}")]
    StateError(#[from] ssv_daemon::state::StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Daemon {
    type Error = DaemonError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        // Load state from config path (or default ~/.ssv)
        let state = AppState::load(ctx.config_path.clone())?;

        // Load the vault master key
        let vault_key = state.load_key()?;

        // Use port from flag or config
        let api_port = self.api_port.unwrap_or(state.config.api_port);

        let config = ServiceConfig {
            vault_key,
            containers_dir: state.containers_path.clone(),
            sqlite_path: Some(state.db_path),
            api_port,
            max_upload_bytes: state.config.max_upload_bytes,
            preview_ttl: Duration::from_secs(state.config.preview_ttl_secs),
            log_level: tracing::Level::DEBUG,
            log_dir: self.log_dir.clone(),
        };

        spawn_service(&config).await;
        Ok("daemon ended".to_string())
    }
}
