//! Server-side session state.
//!
//! Each browser carries an opaque session id cookie; the data it points at
//! (the in-progress report draft and pending flash messages) lives here.
//! Sessions expire after an idle TTL. An expired session is dropped when it
//! is presented again, and a full sweep of stale entries runs at most once
//! per purge interval.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::features::reports::models::ReportDraft;
use crate::shared::types::{FlashLevel, FlashMessage};

/// Name of the cookie carrying the session id
pub const SESSION_COOKIE: &str = "apt_session";

/// Data stored per browser session
#[derive(Debug, Clone, Default)]
pub struct SessionData {
    pub draft: Option<ReportDraft>,
    pub flashes: Vec<FlashMessage>,
}

struct SessionEntry {
    data: SessionData,
    last_seen: Instant,
}

impl SessionEntry {
    fn fresh() -> Self {
        Self {
            data: SessionData::default(),
            last_seen: Instant::now(),
        }
    }
}

struct SessionMap {
    entries: HashMap<Uuid, SessionEntry>,
    last_purge: Instant,
}

/// Upper bound on the time between two sweeps of expired sessions
const MAX_PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// In-memory session store with idle expiry
pub struct SessionStore {
    sessions: RwLock<SessionMap>,
    ttl: Duration,
    purge_interval: Duration,
    cookie_secure: bool,
}

impl SessionStore {
    pub fn new(ttl: Duration, cookie_secure: bool) -> Self {
        Self {
            sessions: RwLock::new(SessionMap {
                entries: HashMap::new(),
                last_purge: Instant::now(),
            }),
            ttl,
            purge_interval: ttl.min(MAX_PURGE_INTERVAL),
            cookie_secure,
        }
    }

    fn purge_expired(&self, sessions: &mut SessionMap) {
        if sessions.last_purge.elapsed() < self.purge_interval {
            return;
        }
        sessions.last_purge = Instant::now();

        let ttl = self.ttl;
        let before = sessions.entries.len();
        sessions.entries.retain(|_, entry| entry.last_seen.elapsed() < ttl);
        let purged = before - sessions.entries.len();
        if purged > 0 {
            tracing::debug!("Purged {} expired sessions", purged);
        }
    }

    /// Resolve the session for a request, creating a fresh one when the
    /// presented id is missing, unknown or expired.
    ///
    /// Returns the session id and whether it was newly created.
    pub async fn load_or_create(&self, presented: Option<Uuid>) -> (Uuid, bool) {
        let mut sessions = self.sessions.write().await;
        self.purge_expired(&mut sessions);

        if let Some(id) = presented {
            match sessions.entries.get_mut(&id) {
                Some(entry) if entry.last_seen.elapsed() < self.ttl => {
                    entry.last_seen = Instant::now();
                    return (id, false);
                }
                Some(_) => {
                    sessions.entries.remove(&id);
                }
                None => {}
            }
        }

        let id = Uuid::new_v4();
        sessions.entries.insert(id, SessionEntry::fresh());
        (id, true)
    }

    /// Run `f` against the session's data, recreating the entry if it was
    /// purged while the request was in flight.
    pub async fn with_data<R>(&self, id: Uuid, f: impl FnOnce(&mut SessionData) -> R) -> R {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.entries.entry(id).or_insert_with(SessionEntry::fresh);
        entry.last_seen = Instant::now();
        f(&mut entry.data)
    }

    /// `Set-Cookie` value binding the browser to `id`
    pub fn cookie_for(&self, id: Uuid) -> String {
        let secure = if self.cookie_secure { "; Secure" } else { "" };
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax{}",
            SESSION_COOKIE, id, secure
        )
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.sessions.read().await.entries.len()
    }
}

/// Request-scoped handle to the caller's session.
///
/// Inserted into request extensions by the session middleware and pulled out
/// by handlers as an extractor.
#[derive(Clone)]
pub struct Session {
    id: Uuid,
    store: Arc<SessionStore>,
}

impl Session {
    pub fn new(id: Uuid, store: Arc<SessionStore>) -> Self {
        Self { id, store }
    }

    pub async fn draft(&self) -> Option<ReportDraft> {
        self.store.with_data(self.id, |data| data.draft.clone()).await
    }

    pub async fn set_draft(&self, draft: ReportDraft) {
        self.store
            .with_data(self.id, |data| data.draft = Some(draft))
            .await
    }

    pub async fn clear_draft(&self) {
        self.store.with_data(self.id, |data| data.draft = None).await
    }

    /// Queue a message for the next rendered page
    pub async fn flash(&self, level: FlashLevel, message: impl Into<String>) {
        let message = FlashMessage::new(level, message);
        self.store
            .with_data(self.id, |data| data.flashes.push(message))
            .await
    }

    pub async fn take_flashes(&self) -> Vec<FlashMessage> {
        self.store
            .with_data(self.id, |data| std::mem::take(&mut data.flashes))
            .await
    }
}
