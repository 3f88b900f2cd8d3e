use std::path::PathBuf;
use std::time::Duration;

use common::crypto::VaultKey;

#[derive(Debug)]
pub struct Config {
    // vault configuration
    /// the vault-wide master secret
    pub vault_key: VaultKey,
    /// directory holding container blobs
    pub containers_dir: PathBuf,

    // data store configuration
    /// a path to a sqlite database, if not set then an
    ///  in-memory database will be used
    pub sqlite_path: Option<PathBuf>,

    // http server configuration
    /// Port for the API HTTP server.
    pub api_port: u16,
    /// Maximum accepted upload body size in bytes.
    pub max_upload_bytes: usize,

    // preview configuration
    /// Lifetime of a view-only preview session.
    pub preview_ttl: Duration,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}
