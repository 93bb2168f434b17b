//! Connected-session bookkeeping: id allocation, per-session outbound
//! mailboxes, and point-in-time snapshots for broadcasting.

use log::info;
use shared::SessionId;
use std::collections::HashMap;
use std::time::Instant;
use tokio::sync::mpsc;

/// One message queued for delivery to a session.
///
/// `terminal` marks the last message a session will ever receive: the writer
/// task flushes it and then closes the connection.
#[derive(Debug, Clone)]
pub struct Outbound {
    pub text: String,
    pub terminal: bool,
}

impl Outbound {
    pub fn line(text: impl Into<String>) -> Self {
        Outbound {
            text: text.into(),
            terminal: false,
        }
    }

    pub fn terminal(text: impl Into<String>) -> Self {
        Outbound {
            text: text.into(),
            terminal: true,
        }
    }
}

/// A lightweight handle to one connected client: its id and the sending end
/// of its outbound mailbox. Cloning is cheap; the registry keeps one clone,
/// the session's own tasks keep another.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub outbound: mpsc::UnboundedSender<Outbound>,
    pub connected_at: Instant,
}

/// The set of currently connected sessions.
///
/// Shared as `Arc<RwLock<SessionRegistry>>`: the accept loop and session
/// teardown paths take the write lock, broadcasts take the read lock and
/// iterate a snapshot, so registration can never race in-flight delivery.
pub struct SessionRegistry {
    sessions: HashMap<SessionId, Session>,
    next_session_id: SessionId,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            next_session_id: 1,
        }
    }

    /// Allocates the next session id and stores a handle built around the
    /// given mailbox sender. Ids start at 1, increase monotonically and are
    /// never reused, even after the session disconnects.
    pub fn register(&mut self, outbound: mpsc::UnboundedSender<Outbound>) -> Session {
        let id = self.next_session_id;
        self.next_session_id += 1;

        let session = Session {
            id,
            outbound,
            connected_at: Instant::now(),
        };
        self.sessions.insert(id, session.clone());
        info!("Client {} registered", id);
        session
    }

    /// Removes a session. Idempotent: both the read-error path and the
    /// shutdown path may call this for the same id.
    pub fn unregister(&mut self, session_id: SessionId) -> bool {
        if self.sessions.remove(&session_id).is_some() {
            info!("Client {} unregistered", session_id);
            true
        } else {
            false
        }
    }

    /// A point-in-time snapshot of all connected sessions. Callers iterate
    /// the returned clones, so concurrent register/unregister can never tear
    /// the iteration.
    pub fn sessions(&self) -> Vec<Session> {
        self.sessions.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
