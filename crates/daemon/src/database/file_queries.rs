use sqlx::Row;
use uuid::Uuid;

use super::models::{from_timestamp, to_timestamp, FileRecord};
use super::Database;

fn row_to_file(row: &sqlx::sqlite::SqliteRow) -> FileRecord {
    FileRecord {
        id: Uuid::parse_str(&row.get::<String, _>("id"))
            .expect("invalid file id UUID in database"),
        owner_id: Uuid::parse_str(&row.get::<String, _>("owner_id"))
            .expect("invalid owner id UUID in database"),
        original_filename: row.get("original_filename"),
        mime_hint: row.get("mime_hint"),
        plain_size: row.get("plain_size"),
        container_size: row.get("container_size"),
        created_at: from_timestamp(row.get("created_at")),
    }
}

impl Database {
    /// Insert the metadata row for a freshly persisted container.
    pub async fn insert_file(&self, file: &FileRecord) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO encrypted_files
                (id, owner_id, original_filename, mime_hint, plain_size, container_size, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(file.id.to_string())
        .bind(file.owner_id.to_string())
        .bind(&file.original_filename)
        .bind(&file.mime_hint)
        .bind(file.plain_size)
        .bind(file.container_size)
        .bind(to_timestamp(file.created_at))
        .execute(&**self)
        .await?;
        Ok(())
    }

    /// Get file metadata by id.
    pub async fn get_file(&self, id: &Uuid) -> Result<Option<FileRecord>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, owner_id, original_filename, mime_hint,
                   plain_size, container_size, created_at
            FROM encrypted_files
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&**self)
        .await?;

        Ok(row.as_ref().map(row_to_file))
    }

    /// List file metadata, newest first. `owner` of `None` lists every
    /// owner's files (administrator view).
    pub async fn list_files(&self, owner: Option<&Uuid>) -> Result<Vec<FileRecord>, sqlx::Error> {
        let rows = match owner {
            Some(owner_id) => {
                sqlx::query(
                    r#"
                    SELECT id, owner_id, original_filename, mime_hint,
                           plain_size, container_size, created_at
                    FROM encrypted_files
                    WHERE owner_id = ?
                    ORDER BY created_at DESC, id
                    "#,
                )
                .bind(owner_id.to_string())
                .fetch_all(&**self)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT id, owner_id, original_filename, mime_hint,
                           plain_size, container_size, created_at
                    FROM encrypted_files
                    ORDER BY created_at DESC, id
                    "#,
                )
                .fetch_all(&**self)
                .await?
            }
        };

        Ok(rows.iter().map(row_to_file).collect())
    }

    /// Delete a file's metadata row. Returns whether a row existed.
    pub async fn delete_file(&self, id: &Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM encrypted_files WHERE id = ?")
            .bind(id.to_string())
            .execute(&**self)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
