use sqlx::Row;
use uuid::Uuid;

use common::principal::Role;

use super::models::{from_timestamp, to_timestamp, ApiKeyRecord};
use super::Database;

fn row_to_key(row: &sqlx::sqlite::SqliteRow) -> ApiKeyRecord {
    ApiKeyRecord {
        id: Uuid::parse_str(&row.get::<String, _>("id"))
            .expect("invalid key id UUID in database"),
        app_name: row.get("app_name"),
        owner_id: Uuid::parse_str(&row.get::<String, _>("owner_id"))
            .expect("invalid owner id UUID in database"),
        role: Role::parse(&row.get::<String, _>("role")),
        secret_digest: row.get("secret_digest"),
        issued_at: from_timestamp(row.get("issued_at")),
        expires_at: from_timestamp(row.get("expires_at")),
        hit_count: row.get("hit_count"),
        revoked: row.get::<i64, _>("revoked") != 0,
    }
}

const KEY_COLUMNS: &str = "id, app_name, owner_id, role, secret_digest, \
                           issued_at, expires_at, hit_count, revoked";

impl Database {
    /// Insert a newly issued key.
    pub async fn insert_key(&self, key: &ApiKeyRecord) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO api_keys
                (id, app_name, owner_id, role, secret_digest,
                 issued_at, expires_at, hit_count, revoked)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(key.id.to_string())
        .bind(&key.app_name)
        .bind(key.owner_id.to_string())
        .bind(key.role.as_str())
        .bind(&key.secret_digest)
        .bind(to_timestamp(key.issued_at))
        .bind(to_timestamp(key.expires_at))
        .bind(key.hit_count)
        .bind(key.revoked as i64)
        .execute(&**self)
        .await?;
        Ok(())
    }

    /// Get a key by id.
    pub async fn get_key(&self, id: &Uuid) -> Result<Option<ApiKeyRecord>, sqlx::Error> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM api_keys WHERE id = ?",
            KEY_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&**self)
        .await?;

        Ok(row.as_ref().map(row_to_key))
    }

    /// Look up a key by the digest of a presented secret.
    pub async fn get_key_by_digest(
        &self,
        digest: &str,
    ) -> Result<Option<ApiKeyRecord>, sqlx::Error> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM api_keys WHERE secret_digest = ?",
            KEY_COLUMNS
        ))
        .bind(digest)
        .fetch_optional(&**self)
        .await?;

        Ok(row.as_ref().map(row_to_key))
    }

    /// List keys, newest first. `owner` of `None` lists all keys
    /// (administrator view).
    pub async fn list_keys(&self, owner: Option<&Uuid>) -> Result<Vec<ApiKeyRecord>, sqlx::Error> {
        let rows = match owner {
            Some(owner_id) => {
                sqlx::query(&format!(
                    "SELECT {} FROM api_keys WHERE owner_id = ? ORDER BY issued_at DESC, id",
                    KEY_COLUMNS
                ))
                .bind(owner_id.to_string())
                .fetch_all(&**self)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {} FROM api_keys ORDER BY issued_at DESC, id",
                    KEY_COLUMNS
                ))
                .fetch_all(&**self)
                .await?
            }
        };

        Ok(rows.iter().map(row_to_key).collect())
    }

    /// Mark a key revoked. Returns whether a row existed. Idempotent;
    /// there is no way back.
    pub async fn revoke_key(&self, id: &Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE api_keys SET revoked = 1 WHERE id = ?")
            .bind(id.to_string())
            .execute(&**self)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Atomically bump a key's hit counter. The increment happens inside
    /// the database, so concurrent validations never lose an update.
    pub async fn record_key_hit(&self, id: &Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE api_keys SET hit_count = hit_count + 1 WHERE id = ?")
            .bind(id.to_string())
            .execute(&**self)
            .await?;
        Ok(())
    }
}
