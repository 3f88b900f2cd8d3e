//! Shared test utilities for vault service integration tests
#![allow(dead_code)]

use std::time::Duration;

use tempfile::TempDir;
use uuid::Uuid;

use ::common::crypto::VaultKey;
use ::common::principal::{Principal, Role};
use ssv_daemon::{ServiceConfig, ServiceState};

/// Set up a service state backed by a temp directory and an in-memory
/// metadata database.
pub async fn setup_test_env() -> (ServiceState, VaultKey, TempDir) {
    setup_with_preview_ttl(Duration::from_secs(60)).await
}

/// Same, with a custom preview session lifetime.
pub async fn setup_with_preview_ttl(ttl: Duration) -> (ServiceState, VaultKey, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let vault_key = VaultKey::generate();

    let config = ServiceConfig {
        vault_key: vault_key.clone(),
        containers_dir: temp_dir.path().join("containers"),
        sqlite_path: None,
        api_port: 0,
        max_upload_bytes: 10 * 1024 * 1024,
        preview_ttl: ttl,
        log_level: tracing::Level::DEBUG,
        log_dir: None,
    };

    let state = ServiceState::from_config(&config).await.unwrap();
    (state, vault_key, temp_dir)
}

pub fn user() -> Principal {
    Principal {
        id: Uuid::new_v4(),
        role: Role::User,
    }
}

pub fn admin() -> Principal {
    Principal {
        id: Uuid::new_v4(),
        role: Role::Admin,
    }
}
