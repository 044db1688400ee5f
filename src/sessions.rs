//! In-memory store of active verification sessions.
//!
//! Each session id maps to exactly one in-progress `InvestorRecord`.
//! Records live only in memory until finalized into the archive; a
//! process restart discards unfinished verifications. Sessions left idle
//! longer than the configured timeout are evicted by `evict_idle`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::models::InvestorRecord;

// ═══════════════════════════════════════════════════════════
// SessionStore
// ═══════════════════════════════════════════════════════════

struct SessionEntry {
    record: InvestorRecord,
    last_activity: Instant,
}

impl SessionEntry {
    fn new(record: InvestorRecord) -> Self {
        Self {
            record,
            last_activity: Instant::now(),
        }
    }
}

/// Active verification sessions keyed by session id.
///
/// Not synchronized on its own; `CoreState` wraps it in an `RwLock`.
pub struct SessionStore {
    sessions: HashMap<Uuid, SessionEntry>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    /// Open a new session with a blank record. Returns the session id.
    pub fn start(&mut self) -> (Uuid, &InvestorRecord) {
        let session_id = Uuid::new_v4();
        let entry = self
            .sessions
            .entry(session_id)
            .or_insert_with(|| SessionEntry::new(InvestorRecord::new()));
        (session_id, &entry.record)
    }

    /// Read without counting as activity.
    pub fn get(&self, session_id: &Uuid) -> Option<&InvestorRecord> {
        self.sessions.get(session_id).map(|entry| &entry.record)
    }

    /// Mutable access. Refreshes the session's last-activity time.
    pub fn get_mut(&mut self, session_id: &Uuid) -> Option<&mut InvestorRecord> {
        self.sessions.get_mut(session_id).map(|entry| {
            entry.last_activity = Instant::now();
            &mut entry.record
        })
    }

    /// Drop a session and its record.
    pub fn remove(&mut self, session_id: &Uuid) -> Option<InvestorRecord> {
        self.sessions.remove(session_id).map(|entry| entry.record)
    }

    /// Drop every session idle for at least `timeout`. Returns the evicted ids.
    pub fn evict_idle(&mut self, timeout: Duration) -> Vec<Uuid> {
        self.evict_idle_at(Instant::now(), timeout)
    }

    fn evict_idle_at(&mut self, now: Instant, timeout: Duration) -> Vec<Uuid> {
        let expired: Vec<Uuid> = self
            .sessions
            .iter()
            .filter(|(_, entry)| now.saturating_duration_since(entry.last_activity) >= timeout)
            .map(|(id, _)| *id)
            .collect();
        for id in &expired {
            self.sessions.remove(id);
        }
        expired
    }

    pub fn contains(&self, session_id: &Uuid) -> bool {
        self.sessions.contains_key(session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
