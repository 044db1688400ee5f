//! Application state shared by every HTTP handler.
//!
//! Holds the active verification sessions, the verification pipeline and
//! its capabilities, the blob store, the admin authenticator and the
//! archive database connection.
//!
//! Lock order: sessions first, then the database. Never hold either
//! across an `.await`.

use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use rusqlite::Connection;
use uuid::Uuid;

use crate::auth::{AdminAuthenticator, DenyAll, TokenAuthenticator};
use crate::config::{self, AppConfig};
use crate::db;
use crate::models::InvestorRecord;
use crate::sessions::SessionStore;
use crate::storage::{BlobStore, FsBlobStore};
use crate::verification::VerificationPipeline;

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    /// In-progress verifications keyed by session id.
    sessions: RwLock<SessionStore>,
    /// Archive of completed verifications and the scheme registry.
    db: Mutex<Connection>,
    pipeline: VerificationPipeline,
    blobs: Arc<dyn BlobStore>,
    admin: Arc<dyn AdminAuthenticator>,
    /// Sessions untouched for this long are evicted by the sweeper.
    session_idle_timeout: Duration,
}

impl CoreState {
    pub fn new(
        db: Connection,
        pipeline: VerificationPipeline,
        blobs: Arc<dyn BlobStore>,
        admin: Arc<dyn AdminAuthenticator>,
    ) -> Self {
        Self {
            sessions: RwLock::new(SessionStore::new()),
            db: Mutex::new(db),
            pipeline,
            blobs,
            admin,
            session_idle_timeout: Duration::from_secs(config::DEFAULT_SESSION_IDLE_SECS),
        }
    }

    pub fn with_session_idle_timeout(mut self, timeout: Duration) -> Self {
        self.session_idle_timeout = timeout;
        self
    }

    /// Production wiring: on-disk archive, filesystem uploads, simulated
    /// screening, token auth when an admin token is configured.
    pub fn from_config(config: &AppConfig) -> Result<Self, CoreError> {
        std::fs::create_dir_all(&config.data_dir)?;
        let conn = db::open_database(&config::database_path(&config.data_dir))?;

        let uploads = config::uploads_dir(&config.data_dir);
        std::fs::create_dir_all(&uploads)?;

        let admin: Arc<dyn AdminAuthenticator> = match &config.admin_token {
            Some(token) => Arc::new(TokenAuthenticator::new(token.clone())),
            None => {
                tracing::warn!(
                    "{} not set; admin endpoints are disabled",
                    config::ADMIN_TOKEN_ENV
                );
                Arc::new(DenyAll)
            }
        };

        tracing::info!(data_dir = %config.data_dir.display(), "Core state initialized");

        Ok(Self::new(
            conn,
            VerificationPipeline::simulated(),
            Arc::new(FsBlobStore::new(uploads)),
            admin,
        )
        .with_session_idle_timeout(config.session_idle_timeout))
    }

    /// In-memory archive, for tests and ephemeral runs.
    pub fn in_memory(
        pipeline: VerificationPipeline,
        blobs: Arc<dyn BlobStore>,
        admin: Arc<dyn AdminAuthenticator>,
    ) -> Result<Self, CoreError> {
        let conn = db::open_memory_database()?;
        Ok(Self::new(conn, pipeline, blobs, admin))
    }

    pub fn pipeline(&self) -> &VerificationPipeline {
        &self.pipeline
    }

    pub fn blobs(&self) -> &dyn BlobStore {
        self.blobs.as_ref()
    }

    pub fn admin(&self) -> &dyn AdminAuthenticator {
        self.admin.as_ref()
    }

    // ── Sessions ────────────────────────────────────────────

    pub fn read_sessions(&self) -> Result<RwLockReadGuard<'_, SessionStore>, CoreError> {
        self.sessions.read().map_err(|_| CoreError::LockPoisoned)
    }

    pub fn write_sessions(&self) -> Result<RwLockWriteGuard<'_, SessionStore>, CoreError> {
        self.sessions.write().map_err(|_| CoreError::LockPoisoned)
    }

    /// Open a new verification session. Returns its id and a copy of the
    /// blank record.
    pub fn start_session(&self) -> Result<(Uuid, InvestorRecord), CoreError> {
        let mut sessions = self.write_sessions()?;
        let (session_id, record) = sessions.start();
        tracing::info!(%session_id, record_id = %record.id, "Verification session started");
        Ok((session_id, record.clone()))
    }

    /// Owned copy of the session's current record. Counts as activity.
    pub fn session_snapshot(&self, session_id: &Uuid) -> Result<InvestorRecord, CoreError> {
        let mut sessions = self.write_sessions()?;
        sessions
            .get_mut(session_id)
            .cloned()
            .ok_or(CoreError::SessionNotFound(*session_id))
    }

    /// Drop sessions idle for longer than the configured timeout.
    pub fn evict_idle_sessions(&self) -> Result<usize, CoreError> {
        let evicted = self.write_sessions()?.evict_idle(self.session_idle_timeout);
        if !evicted.is_empty() {
            tracing::info!(
                count = evicted.len(),
                timeout_secs = self.session_idle_timeout.as_secs(),
                "Evicted idle verification sessions"
            );
        }
        Ok(evicted.len())
    }

    /// Run `f` against the session's record under the write lock.
    pub fn with_session<T, E>(
        &self,
        session_id: &Uuid,
        f: impl FnOnce(&mut InvestorRecord) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<CoreError>,
    {
        let mut sessions = self.write_sessions()?;
        let record = sessions
            .get_mut(session_id)
            .ok_or(CoreError::SessionNotFound(*session_id))?;
        f(record)
    }

    /// Like `with_session`, with the archive connection also held.
    pub fn with_session_and_db<T, E>(
        &self,
        session_id: &Uuid,
        f: impl FnOnce(&mut InvestorRecord, &Connection) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<CoreError>,
    {
        let mut sessions = self.write_sessions()?;
        let record = sessions
            .get_mut(session_id)
            .ok_or(CoreError::SessionNotFound(*session_id))?;
        let conn = self.lock_db()?;
        f(record, &conn)
    }

    // ── Archive database ────────────────────────────────────

    pub fn lock_db(&self) -> Result<MutexGuard<'_, Connection>, CoreError> {
        self.db.lock().map_err(|_| CoreError::LockPoisoned)
    }

    /// Run `f` with the archive connection held.
    pub fn with_db<T, E>(&self, f: impl FnOnce(&Connection) -> Result<T, E>) -> Result<T, E>
    where
        E: From<CoreError>,
    {
        let conn = self.lock_db()?;
        f(&conn)
    }
}

/// Errors from CoreState operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Verification session not found: {0}")]
    SessionNotFound(Uuid),
    #[error("Internal lock error")]
    LockPoisoned,
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
