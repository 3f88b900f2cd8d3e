//! Durable store for encrypted file containers and their metadata.

use std::path::PathBuf;
use std::sync::Arc;

use time::OffsetDateTime;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use common::container::{Container, ContainerError};
use common::crypto::{CryptoError, VaultKey};
use common::principal::Principal;

use crate::database::models::FileRecord;
use crate::database::Database;

use super::locks::EntityLocks;

/// Errors that can occur when working with the vault store.
///
/// `Integrity`, `Container`, and `Forbidden`/`NotFound` stay distinguishable
/// here for audit logging; the HTTP layer collapses them before anything
/// reaches an untrusted caller.
#[derive(Debug, thiserror::Error)]
pub enum VaultStoreError {
    /// No file with the requested id
    #[error("file not found: {0}")]
    NotFound(Uuid),

    /// The caller is neither the owner nor an administrator
    #[error("caller {caller} may not operate on file {file}")]
    Forbidden { caller: Uuid, file: Uuid },

    /// Tag mismatch on decrypt: corrupted or tampered container
    #[error("integrity failure: {0}")]
    Integrity(#[from] CryptoError),

    /// Structurally invalid or unsupported container bytes
    #[error("container failure: {0}")]
    Container(#[from] ContainerError),

    /// Metadata database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Container blob I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("vault store error: {0}")]
    Default(#[from] anyhow::Error),
}

/// The file vault: encrypted container blobs on disk plus metadata rows.
///
/// Writes on the same file id are serialized through per-entity locks;
/// writes on distinct ids and all reads proceed concurrently.
#[derive(Clone)]
pub struct VaultStore {
    database: Database,
    containers_dir: PathBuf,
    key: VaultKey,
    locks: Arc<EntityLocks>,
}

impl VaultStore {
    /// Create a store rooted at `containers_dir`, creating the directory if
    /// needed.
    pub async fn new(
        database: Database,
        containers_dir: PathBuf,
        key: VaultKey,
    ) -> Result<Self, VaultStoreError> {
        tokio::fs::create_dir_all(&containers_dir).await?;
        Ok(Self {
            database,
            containers_dir,
            key,
            locks: Arc::new(EntityLocks::default()),
        })
    }

    fn container_path(&self, id: &Uuid) -> PathBuf {
        self.containers_dir.join(format!("{}.ssv", id))
    }

    /// Encrypt and persist a plaintext payload.
    ///
    /// A fresh salt and IV are generated inside the encrypt call. The blob
    /// is written to a temp path, fsynced, and renamed before the metadata
    /// row is inserted, so a crash at any point leaves either a complete,
    /// listable file or an invisible orphan blob; never a
    /// listable-but-unreadable entry. If the row insert fails the blob is
    /// removed again.
    pub async fn put(
        &self,
        owner_id: Uuid,
        filename: &str,
        plaintext: Vec<u8>,
    ) -> Result<FileRecord, VaultStoreError> {
        let id = Uuid::new_v4();
        let lock = self.locks.entry(id);
        let _guard = lock.lock().await;

        let plain_size = plaintext.len() as i64;
        let mime_hint = mime_guess::from_path(filename)
            .first_or_octet_stream()
            .to_string();

        // key derivation is deliberately expensive; keep it off the runtime
        let key = self.key.clone();
        let payload = tokio::task::spawn_blocking(move || key.encrypt(&plaintext))
            .await
            .map_err(|e| anyhow::anyhow!("encrypt task failed: {}", e))??;

        let bytes = Container::from(payload).encode();
        let container_size = bytes.len() as i64;

        let final_path = self.container_path(&id);
        let tmp_path = self.containers_dir.join(format!("{}.ssv.tmp", id));

        let mut tmp = tokio::fs::File::create(&tmp_path).await?;
        tmp.write_all(&bytes).await?;
        tmp.sync_all().await?;
        drop(tmp);
        tokio::fs::rename(&tmp_path, &final_path).await?;

        let record = FileRecord {
            id,
            owner_id,
            original_filename: filename.to_string(),
            mime_hint,
            plain_size,
            container_size,
            created_at: OffsetDateTime::now_utc(),
        };

        if let Err(e) = self.database.insert_file(&record).await {
            // keep blob and row in step: a failed insert must not leave an
            // orphan container behind
            if let Err(rm) = tokio::fs::remove_file(&final_path).await {
                tracing::warn!(id = %id, error = %rm, "failed to remove orphan container");
            }
            return Err(e.into());
        }

        tracing::info!(
            id = %id,
            owner = %owner_id,
            plain_size,
            container_size,
            "stored encrypted file"
        );

        Ok(record)
    }

    /// Get a file's metadata.
    pub async fn get(&self, id: &Uuid) -> Result<FileRecord, VaultStoreError> {
        self.database
            .get_file(id)
            .await?
            .ok_or(VaultStoreError::NotFound(*id))
    }

    /// Read a file's raw container bytes (the `.ssv` download path).
    pub async fn read_container(&self, id: &Uuid) -> Result<Vec<u8>, VaultStoreError> {
        // existence check goes through metadata so a stray blob on disk is
        // not servable
        let _record = self.get(id).await?;
        Ok(tokio::fs::read(self.container_path(id)).await?)
    }

    /// Decode and decrypt a stored file, returning its metadata and
    /// plaintext. This is the only path that produces plaintext from the
    /// store; callers are the audited decode endpoint and the preview
    /// broker.
    pub async fn open_plaintext(
        &self,
        id: &Uuid,
    ) -> Result<(FileRecord, Vec<u8>), VaultStoreError> {
        let record = self.get(id).await?;
        let bytes = tokio::fs::read(self.container_path(id)).await?;

        let payload = Container::decode(&bytes)?.into_payload()?;

        let key = self.key.clone();
        let plaintext = tokio::task::spawn_blocking(move || key.decrypt(&payload))
            .await
            .map_err(|e| anyhow::anyhow!("decrypt task failed: {}", e))??;

        Ok((record, plaintext))
    }

    /// Decode and decrypt a caller-supplied container that was never stored
    /// here (the decode-upload path). Format and integrity failures stay
    /// distinguishable to the caller; the HTTP layer collapses them.
    pub async fn open_container_bytes(&self, bytes: Vec<u8>) -> Result<Vec<u8>, VaultStoreError> {
        let payload = Container::decode(&bytes)?.into_payload()?;

        let key = self.key.clone();
        let plaintext = tokio::task::spawn_blocking(move || key.decrypt(&payload))
            .await
            .map_err(|e| anyhow::anyhow!("decrypt task failed: {}", e))??;

        Ok(plaintext)
    }

    /// List file metadata. `owner` of `None` is the administrator view.
    pub async fn list(&self, owner: Option<&Uuid>) -> Result<Vec<FileRecord>, VaultStoreError> {
        Ok(self.database.list_files(owner).await?)
    }

    /// Hard-delete a file. Only the owner or an administrator may delete;
    /// other callers get `Forbidden`, not a silent no-op. The metadata row
    /// goes first so the entry stops being listable before the blob
    /// disappears.
    pub async fn delete(&self, id: &Uuid, caller: &Principal) -> Result<(), VaultStoreError> {
        let lock = self.locks.entry(*id);
        let _guard = lock.lock().await;

        let record = self
            .database
            .get_file(id)
            .await?
            .ok_or(VaultStoreError::NotFound(*id))?;

        if !caller.can_manage(&record.owner_id) {
            tracing::warn!(
                id = %id,
                caller = %caller.id,
                owner = %record.owner_id,
                "refused delete by non-owner"
            );
            return Err(VaultStoreError::Forbidden {
                caller: caller.id,
                file: *id,
            });
        }

        self.database.delete_file(id).await?;
        if let Err(e) = tokio::fs::remove_file(self.container_path(id)).await {
            tracing::warn!(id = %id, error = %e, "container blob already gone");
        }

        drop(_guard);
        self.locks.remove(id);

        tracing::info!(id = %id, caller = %caller.id, "deleted encrypted file");
        Ok(())
    }
}
