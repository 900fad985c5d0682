use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::RwLock;
use tracing::debug;

use crate::session::SessionId;

/// Key-value store scoped to one browser session, the server-side stand-in for
/// `localStorage`. Values are plain strings; typed access goes through
/// [`crate::handoff`].
#[derive(Clone, Default)]
pub struct PageStorage {
    sessions: Arc<RwLock<HashMap<SessionId, SessionEntries>>>,
}

struct SessionEntries {
    values: HashMap<String, String>,
    touched_at: Instant,
}

impl SessionEntries {
    fn new() -> Self {
        Self {
            values: HashMap::new(),
            touched_at: Instant::now(),
        }
    }
}

impl PageStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads count as activity, so a session being browsed is never purged.
    pub async fn get(&self, session: SessionId, key: &str) -> Option<String> {
        let mut sessions = self.sessions.write().await;
        let entries = sessions.get_mut(&session)?;
        entries.touched_at = Instant::now();
        entries.values.get(key).cloned()
    }

    pub async fn set(&self, session: SessionId, key: &str, value: impl Into<String>) {
        self.set_many(session, [(key, value.into())]).await;
    }

    /// Writes all entries under one lock so readers never see half a hand-off.
    pub async fn set_many<'k, I>(&self, session: SessionId, entries: I)
    where
        I: IntoIterator<Item = (&'k str, String)>,
    {
        let mut sessions = self.sessions.write().await;
        let slot = sessions.entry(session).or_insert_with(SessionEntries::new);
        for (key, value) in entries {
            slot.values.insert(key.to_string(), value);
        }
        slot.touched_at = Instant::now();
    }

    /// Snapshot of every key for one session.
    pub async fn entries(&self, session: SessionId) -> HashMap<String, String> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&session) {
            Some(entries) => {
                entries.touched_at = Instant::now();
                entries.values.clone()
            }
            None => HashMap::new(),
        }
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops sessions nobody has read or written for longer than `max_idle`.
    pub async fn purge_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entries| entries.touched_at.elapsed() < max_idle);
        let purged = before - sessions.len();
        if purged > 0 {
            debug!(purged, remaining = sessions.len(), "purged idle page storage");
        }
        purged
    }
}
