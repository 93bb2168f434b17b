//! Fan-out of one message to every registered session.
//!
//! Delivery is decoupled from socket I/O: the hub only enqueues into each
//! session's mailbox, and the per-session writer task does the actual write.
//! A slow or broken connection therefore never blocks the hub, and a failed
//! enqueue (the session's writer is already gone) is skipped while delivery
//! to everyone else proceeds.

use crate::registry::{Outbound, SessionRegistry};
use log::debug;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Delivers messages to every session registered at call time.
///
/// Every broadcast is issued from inside the coordinator's serialized
/// region, which makes the global broadcast order total; each session's
/// single mailbox/writer pair makes per-recipient delivery FIFO.
#[derive(Clone)]
pub struct BroadcastHub {
    registry: Arc<RwLock<SessionRegistry>>,
}

impl BroadcastHub {
    pub fn new(registry: Arc<RwLock<SessionRegistry>>) -> Self {
        BroadcastHub { registry }
    }

    /// Enqueues `text` for every currently registered session.
    pub async fn broadcast(&self, text: &str) {
        self.deliver(text, false).await;
    }

    /// Like [`BroadcastHub::broadcast`], but marks the message terminal:
    /// each writer task flushes it and then closes its connection.
    pub async fn broadcast_final(&self, text: &str) {
        self.deliver(text, true).await;
    }

    async fn deliver(&self, text: &str, terminal: bool) {
        let recipients = {
            let registry = self.registry.read().await;
            registry.sessions()
        };

        for session in recipients {
            let outbound = Outbound {
                text: text.to_string(),
                terminal,
            };
            if session.outbound.send(outbound).is_err() {
                // The session is tearing itself down; its own cleanup path
                // removes it from the registry.
                debug!("Client {} mailbox closed, skipping delivery", session.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    async fn hub_with_sessions(
        count: usize,
    ) -> (
        BroadcastHub,
        Arc<RwLock<SessionRegistry>>,
        Vec<mpsc::UnboundedReceiver<Outbound>>,
    ) {
        let registry = Arc::new(RwLock::new(SessionRegistry::new()));
        let mut receivers = Vec::new();
        {
            let mut guard = registry.write().await;
            for _ in 0..count {
                let (tx, rx) = mpsc::unbounded_channel();
                guard.register(tx);
                receivers.push(rx);
            }
        }
        (BroadcastHub::new(Arc::clone(&registry)), registry, receivers)
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_session() {
        let (hub, _registry, mut receivers) = hub_with_sessions(3).await;

        hub.broadcast("board changed").await;

        for rx in &mut receivers {
            let message = rx.try_recv().unwrap();
            assert_eq!(message.text, "board changed");
            assert!(!message.terminal);
        }
    }

    #[tokio::test]
    async fn test_closed_mailbox_does_not_stop_the_others() {
        let (hub, _registry, mut receivers) = hub_with_sessions(3).await;

        // Simulate a session whose writer task died without unregistering yet.
        drop(receivers.remove(1));

        hub.broadcast("still going").await;

        for rx in &mut receivers {
            assert_eq!(rx.try_recv().unwrap().text, "still going");
        }
    }

    #[tokio::test]
    async fn test_per_recipient_order_matches_issue_order() {
        let (hub, _registry, mut receivers) = hub_with_sessions(2).await;

        hub.broadcast("first").await;
        hub.broadcast("second").await;
        hub.broadcast("third").await;

        for rx in &mut receivers {
            assert_eq!(rx.try_recv().unwrap().text, "first");
            assert_eq!(rx.try_recv().unwrap().text, "second");
            assert_eq!(rx.try_recv().unwrap().text, "third");
        }
    }

    #[tokio::test]
    async fn test_final_broadcast_is_marked_terminal() {
        let (hub, _registry, mut receivers) = hub_with_sessions(1).await;

        hub.broadcast_final("game over").await;

        let message = receivers[0].try_recv().unwrap();
        assert_eq!(message.text, "game over");
        assert!(message.terminal);
    }

    #[tokio::test]
    async fn test_sessions_registered_after_broadcast_miss_it() {
        let (hub, registry, mut receivers) = hub_with_sessions(1).await;

        hub.broadcast("early").await;

        let (tx, mut late_rx) = mpsc::unbounded_channel();
        registry.write().await.register(tx);

        hub.broadcast("late").await;

        assert_eq!(receivers[0].try_recv().unwrap().text, "early");
        assert_eq!(receivers[0].try_recv().unwrap().text, "late");
        assert_eq!(late_rx.try_recv().unwrap().text, "late");
        assert!(late_rx.try_recv().is_err());
    }
}
