use time::OffsetDateTime;
use uuid::Uuid;

use common::principal::Role;

/// Metadata row for one encrypted file. Never carries ciphertext or keys.
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub original_filename: String,
    pub mime_hint: String,
    pub plain_size: i64,
    pub container_size: i64,
    pub created_at: OffsetDateTime,
}

/// Derived lifecycle state of an API key. Never stored; computed from
/// `(now, expires_at, revoked)` on every check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStatus {
    Active,
    Expired,
    Revoked,
}

impl std::fmt::Display for KeyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyStatus::Active => write!(f, "active"),
            KeyStatus::Expired => write!(f, "expired"),
            KeyStatus::Revoked => write!(f, "revoked"),
        }
    }
}

/// One issued API key. `secret_digest` is the SHA-256 of the bearer secret;
/// the secret itself is never persisted.
#[derive(Debug, Clone)]
pub struct ApiKeyRecord {
    pub id: Uuid,
    pub app_name: String,
    pub owner_id: Uuid,
    pub role: Role,
    pub secret_digest: String,
    pub issued_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
    pub hit_count: i64,
    pub revoked: bool,
}

impl ApiKeyRecord {
    /// Lifecycle state at a given instant. Revocation wins over expiry.
    pub fn status_at(&self, now: OffsetDateTime) -> KeyStatus {
        if self.revoked {
            KeyStatus::Revoked
        } else if now >= self.expires_at {
            KeyStatus::Expired
        } else {
            KeyStatus::Active
        }
    }

    /// Short digest prefix, safe to display in listings.
    pub fn fingerprint(&self) -> String {
        self.secret_digest.chars().take(8).collect()
    }
}

pub(crate) fn to_timestamp(dt: OffsetDateTime) -> i64 {
    dt.unix_timestamp()
}

pub(crate) fn from_timestamp(secs: i64) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(secs).expect("valid timestamp in database")
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn key(expires_at: OffsetDateTime, revoked: bool) -> ApiKeyRecord {
        ApiKeyRecord {
            id: Uuid::new_v4(),
            app_name: "test".into(),
            owner_id: Uuid::new_v4(),
            role: Role::User,
            secret_digest: "abcdef0123456789".into(),
            issued_at: expires_at - Duration::days(7),
            expires_at,
            hit_count: 0,
            revoked,
        }
    }

    #[test]
    fn test_status_is_a_pure_function_of_now() {
        let now = OffsetDateTime::now_utc();
        let k = key(now + Duration::seconds(10), false);

        assert_eq!(k.status_at(now), KeyStatus::Active);
        assert_eq!(k.status_at(now + Duration::seconds(11)), KeyStatus::Expired);
    }

    #[test]
    fn test_revocation_wins_over_expiry() {
        let now = OffsetDateTime::now_utc();
        let k = key(now - Duration::seconds(1), true);
        assert_eq!(k.status_at(now), KeyStatus::Revoked);
    }

    #[test]
    fn test_fingerprint_is_a_prefix() {
        let k = key(OffsetDateTime::now_utc(), false);
        assert_eq!(k.fingerprint(), "abcdef01");
    }
}
