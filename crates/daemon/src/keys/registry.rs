//! Issuance, validation, and revocation of bearer API keys.
//!
//! A secret is a random opaque token, shown in full exactly once at
//! issuance. At rest only its SHA-256 digest exists, so validation is a
//! pure digest lookup and the one-time-display rule is structural rather
//! than procedural.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use common::principal::{Principal, Role};

use crate::database::models::{ApiKeyRecord, KeyStatus};
use crate::database::Database;

/// Number of random bytes behind a secret token
const SECRET_BYTES: usize = 32;
/// Prefix on every issued secret, handy for log scrubbers
const SECRET_PREFIX: &str = "ssv_";

/// Why a presented credential was rejected.
///
/// The variants stay distinguishable for audit logs; the HTTP layer
/// collapses all of them into one uniform "unauthorized" response.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("invalid credential")]
    Invalid,
    #[error("expired credential")]
    Expired,
    #[error("revoked credential")]
    Revoked,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Errors from key management operations (issue, revoke, list).
#[derive(Debug, thiserror::Error)]
pub enum KeyRegistryError {
    #[error("key not found: {0}")]
    NotFound(Uuid),

    #[error("caller {caller} may not manage key {key}")]
    Forbidden { caller: Uuid, key: Uuid },

    #[error("ttl must be a positive number of days, got {0}")]
    InvalidTtl(i64),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A freshly issued key. The only value that ever carries the full secret.
#[derive(Debug)]
pub struct IssuedKey {
    pub record: ApiKeyRecord,
    pub secret: String,
}

/// Registry of time-boxed bearer credentials gating the vault API.
#[derive(Clone)]
pub struct ApiKeyRegistry {
    database: Database,
}

impl ApiKeyRegistry {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Issue a key on behalf of `caller`.
    ///
    /// Issuance is owner-scoped: a key authorizes operations as its owner.
    /// An administrator may issue for another owner via `for_owner`; anyone
    /// else asking for that gets `Forbidden`.
    pub async fn issue(
        &self,
        caller: &Principal,
        app_name: &str,
        ttl_days: i64,
        for_owner: Option<Uuid>,
    ) -> Result<IssuedKey, KeyRegistryError> {
        let owner_id = for_owner.unwrap_or(caller.id);
        if owner_id != caller.id && !caller.is_admin() {
            return Err(KeyRegistryError::Forbidden {
                caller: caller.id,
                key: owner_id,
            });
        }

        self.issue_raw(app_name, owner_id, Role::User, ttl_days).await
    }

    /// Issue the bootstrap administrator key. Only reachable from the local
    /// `init` path, never over the HTTP surface.
    pub async fn issue_bootstrap(
        &self,
        app_name: &str,
        ttl_days: i64,
    ) -> Result<IssuedKey, KeyRegistryError> {
        self.issue_raw(app_name, Uuid::new_v4(), Role::Admin, ttl_days)
            .await
    }

    async fn issue_raw(
        &self,
        app_name: &str,
        owner_id: Uuid,
        role: Role,
        ttl_days: i64,
    ) -> Result<IssuedKey, KeyRegistryError> {
        if ttl_days <= 0 {
            return Err(KeyRegistryError::InvalidTtl(ttl_days));
        }

        let secret = generate_secret();
        let issued_at = OffsetDateTime::now_utc();

        let record = ApiKeyRecord {
            id: Uuid::new_v4(),
            app_name: app_name.to_string(),
            owner_id,
            role,
            secret_digest: digest_secret(&secret),
            issued_at,
            expires_at: issued_at + Duration::days(ttl_days),
            hit_count: 0,
            revoked: false,
        };

        self.database.insert_key(&record).await?;

        tracing::info!(
            id = %record.id,
            app_name,
            owner = %owner_id,
            role = %role,
            ttl_days,
            "issued api key"
        );

        Ok(IssuedKey { record, secret })
    }

    /// Validate a presented secret and return the principal it authorizes.
    ///
    /// Expiry is evaluated against the clock at validation time; a key that
    /// was active when last checked correctly reports `Expired` once its
    /// TTL elapses, with no background sweep. The hit counter is bumped
    /// only on success, so failed guesses leave no trace in the metrics.
    pub async fn validate(&self, secret: &str) -> Result<Principal, CredentialError> {
        self.validate_at(secret, OffsetDateTime::now_utc()).await
    }

    /// Validation against an explicit clock. Public for the TTL tests.
    pub async fn validate_at(
        &self,
        secret: &str,
        now: OffsetDateTime,
    ) -> Result<Principal, CredentialError> {
        let digest = digest_secret(secret);
        let key = self
            .database
            .get_key_by_digest(&digest)
            .await?
            .ok_or(CredentialError::Invalid)?;

        match key.status_at(now) {
            KeyStatus::Revoked => Err(CredentialError::Revoked),
            KeyStatus::Expired => Err(CredentialError::Expired),
            KeyStatus::Active => {
                self.database.record_key_hit(&key.id).await?;
                Ok(Principal {
                    id: key.owner_id,
                    role: key.role,
                })
            }
        }
    }

    /// Revoke a key. Immediate and irreversible; only the key's owner or an
    /// administrator may do it.
    pub async fn revoke(&self, caller: &Principal, id: &Uuid) -> Result<(), KeyRegistryError> {
        let key = self
            .database
            .get_key(id)
            .await?
            .ok_or(KeyRegistryError::NotFound(*id))?;

        if !caller.can_manage(&key.owner_id) {
            return Err(KeyRegistryError::Forbidden {
                caller: caller.id,
                key: *id,
            });
        }

        self.database.revoke_key(id).await?;
        tracing::info!(id = %id, caller = %caller.id, "revoked api key");
        Ok(())
    }

    /// List keys visible to `caller`: their own, or every key for an
    /// administrator. Secrets are long gone; only fingerprints remain.
    pub async fn list(&self, caller: &Principal) -> Result<Vec<ApiKeyRecord>, KeyRegistryError> {
        let owner = if caller.is_admin() {
            None
        } else {
            Some(&caller.id)
        };
        Ok(self.database.list_keys(owner).await?)
    }
}

fn generate_secret() -> String {
    let mut buff = [0u8; SECRET_BYTES];
    getrandom::getrandom(&mut buff).expect("failed to generate random bytes");
    format!("{}{}", SECRET_PREFIX, URL_SAFE_NO_PAD.encode(buff))
}

fn digest_secret(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_shape() {
        let secret = generate_secret();
        assert!(secret.starts_with(SECRET_PREFIX));
        // 32 bytes of entropy, base64url without padding
        assert_eq!(secret.len(), SECRET_PREFIX.len() + 43);
        assert_ne!(secret, generate_secret());
    }

    #[test]
    fn test_digest_is_stable_and_hex() {
        let secret = "ssv_fixed";
        let a = digest_secret(secret);
        let b = digest_secret(secret);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
