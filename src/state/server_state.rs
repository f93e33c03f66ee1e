use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::{RwLock, mpsc};
use tokio::task::JoinHandle;
use crate::state::commands::SessionCommand;
use crate::state::session::{Session, SessionCode};

/// Handle to a session with its command queue and tick task
pub struct SessionHandle {
    pub session: Arc<RwLock<Session>>,
    pub command_tx: mpsc::Sender<SessionCommand>,
    pub task_handle: JoinHandle<()>,
}

/// Server state partitioned by session
/// Uses DashMap for concurrent access without global locks
pub struct ServerState {
    sessions: DashMap<SessionCode, SessionHandle>,
    next_character_id: AtomicU32,
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerState {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
            next_character_id: AtomicU32::new(1),
        }
    }

    /// Command sender for a session (UDP and HTTP handlers)
    pub fn get_session_tx(&self, code: &str) -> Option<mpsc::Sender<SessionCommand>> {
        self.sessions.get(code)
            .map(|entry| entry.command_tx.clone())
    }

    pub fn get_session(&self, code: &str) -> Option<Arc<RwLock<Session>>> {
        self.sessions.get(code)
            .map(|entry| entry.session.clone())
    }

    /// Generate next character ID (lock-free)
    pub fn next_character_id(&self) -> u32 {
        self.next_character_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Insert a session unless the code is taken. `make` only runs for a
    /// free code, under the map's shard lock, so the check and the insert
    /// cannot interleave with another creator.
    pub fn try_insert_session<F>(&self, code: SessionCode, make: F) -> bool
    where
        F: FnOnce() -> SessionHandle,
    {
        match self.sessions.entry(code) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(make());
                true
            }
        }
    }

    /// Remove a session and stop its tick task
    pub fn remove_session(&self, code: &str) -> Option<Arc<RwLock<Session>>> {
        self.sessions.remove(code).map(|(_, handle)| {
            handle.task_handle.abort();
            handle.session
        })
    }

    pub fn session_codes(&self) -> Vec<SessionCode> {
        self.sessions.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}
