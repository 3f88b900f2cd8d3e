//! Transient view-only sessions over decrypted content.
//!
//! A preview session holds one file's plaintext in memory for a short,
//! fixed window so a caller can render it. Nothing is ever written to
//! durable storage; buffers are zeroed when a session is closed, expires,
//! or is swept by the purge task. Expiry is enforced on every access, so
//! an expired handle is unusable even if the sweeper hasn't run yet.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::watch;
use uuid::Uuid;
use zeroize::Zeroizing;

use common::mime_class::MimeClass;
use common::principal::Principal;

use crate::vault::{VaultStore, VaultStoreError};

/// Errors from the preview broker.
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    /// Unknown or already-expired session handle
    #[error("preview session not found")]
    SessionNotFound,

    /// The file's class has no inline rendering; callers fall back to the
    /// container download path, never to a plaintext export.
    #[error("no inline preview available")]
    Unsupported,

    /// The caller may not view this file
    #[error("caller {caller} may not preview file {file}")]
    Forbidden { caller: Uuid, file: Uuid },

    #[error(transparent)]
    Vault(#[from] VaultStoreError),
}

/// Caller-facing description of an open session. Carries no plaintext.
#[derive(Debug, Clone)]
pub struct PreviewSession {
    pub id: Uuid,
    pub file_id: Uuid,
    pub mime_class: MimeClass,
    pub expires_in: Duration,
    pub previewable: bool,
}

/// A session's renderable plaintext plus the content type to serve it as.
#[derive(Debug)]
pub struct PreviewContent {
    pub mime_hint: String,
    pub mime_class: MimeClass,
    pub bytes: Vec<u8>,
}

struct Session {
    file_id: Uuid,
    mime_class: MimeClass,
    mime_hint: String,
    expires_at: Instant,
    /// `None` for unsupported classes; plaintext is dropped (and zeroed)
    /// immediately instead of being parked in a session nobody can render.
    content: Option<Zeroizing<Vec<u8>>>,
}

/// Broker for time-boxed decrypted views.
#[derive(Clone)]
pub struct PreviewBroker {
    vault: VaultStore,
    sessions: Arc<Mutex<HashMap<Uuid, Session>>>,
    ttl: Duration,
}

impl PreviewBroker {
    pub fn new(vault: VaultStore, ttl: Duration) -> Self {
        Self {
            vault,
            sessions: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Decode + decrypt a stored file and open a view session over it.
    ///
    /// The preview class comes from the original filename's extension
    /// only; caller-supplied MIME headers are never consulted. An
    /// unsupported class still yields a valid session, just one with no
    /// inline content.
    pub async fn open(
        &self,
        file_id: &Uuid,
        caller: &Principal,
    ) -> Result<PreviewSession, PreviewError> {
        let record = self.vault.get(file_id).await?;
        if !caller.can_manage(&record.owner_id) {
            return Err(PreviewError::Forbidden {
                caller: caller.id,
                file: *file_id,
            });
        }

        let (record, plaintext) = self.vault.open_plaintext(file_id).await?;
        let mime_class = MimeClass::classify(&record.original_filename);

        let id = Uuid::new_v4();
        let content = if mime_class.previewable() {
            Some(Zeroizing::new(plaintext))
        } else {
            drop(Zeroizing::new(plaintext));
            None
        };

        let session = Session {
            file_id: *file_id,
            mime_class,
            mime_hint: record.mime_hint.clone(),
            expires_at: Instant::now() + self.ttl,
            content,
        };
        self.sessions.lock().insert(id, session);

        tracing::info!(
            session = %id,
            file = %file_id,
            caller = %caller.id,
            class = %mime_class,
            "opened preview session"
        );

        Ok(PreviewSession {
            id,
            file_id: *file_id,
            mime_class,
            expires_in: self.ttl,
            previewable: mime_class.previewable(),
        })
    }

    /// Read a session's plaintext for rendering. Expired sessions are
    /// purged on contact and indistinguishable from unknown ones.
    pub fn read(&self, session_id: &Uuid) -> Result<PreviewContent, PreviewError> {
        let now = Instant::now();
        let mut sessions = self.sessions.lock();

        let expired = match sessions.get(session_id) {
            None => return Err(PreviewError::SessionNotFound),
            Some(session) => session.expires_at <= now,
        };
        if expired {
            sessions.remove(session_id);
            return Err(PreviewError::SessionNotFound);
        }

        let session = sessions
            .get(session_id)
            .ok_or(PreviewError::SessionNotFound)?;
        match &session.content {
            Some(content) => Ok(PreviewContent {
                mime_hint: session.mime_hint.clone(),
                mime_class: session.mime_class,
                bytes: content.to_vec(),
            }),
            None => Err(PreviewError::Unsupported),
        }
    }

    /// Close a session, zeroing its buffer. Idempotent.
    pub fn close(&self, session_id: &Uuid) {
        if self.sessions.lock().remove(session_id).is_some() {
            tracing::info!(session = %session_id, "closed preview session");
        }
    }

    /// Drop every expired session. Returns how many were purged.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.lock();
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at > now);
        before - sessions.len()
    }

    /// Spawn the background sweeper. Runs until the shutdown signal fires.
    pub fn spawn_purge_task(
        &self,
        mut shutdown_rx: watch::Receiver<()>,
    ) -> tokio::task::JoinHandle<()> {
        let broker = self.clone();
        let period = broker.ttl.min(Duration::from_secs(30)).max(Duration::from_millis(250));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let purged = broker.purge_expired();
                        if purged > 0 {
                            tracing::debug!(purged, "purged expired preview sessions");
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        break;
                    }
                }
            }
        })
    }
}
