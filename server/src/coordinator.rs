//! The single serialization point for all shared-state mutation.
//!
//! Every move from every session funnels through [`Coordinator::attempt_move`],
//! which holds the write lock across the legality check, the board placement,
//! the ledger update and the broadcast enqueue. That ordering is what gives
//! every observer the same total order of board states: the broadcast for
//! mutation *k* is issued after *k*'s ledger commit and before mutation *k+1*
//! can begin. Snapshots take the read lock and may run concurrently with each
//! other, never with a mutation.

use crate::board::Board;
use crate::hub::BroadcastHub;
use crate::ledger::UpdateLedger;
use crate::registry::SessionRegistry;
use log::{debug, info};
use shared::{
    board_updated_message, game_complete_message, SessionId, GRID_SIZE, MAX_VALUE, MIN_VALUE,
};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};

/// Result of a move attempt, as reported to the acting session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Accepted,
    Rejected,
}

/// The board and ledger move together under one lock; nothing outside this
/// module can reach either of them.
struct GameState {
    board: Board,
    ledger: UpdateLedger,
}

/// Point-in-time view of the ledger, taken under a single lock acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TallyReport {
    pub tallies: Vec<(SessionId, u32)>,
    pub owned_cells: usize,
}

pub struct Coordinator {
    state: RwLock<GameState>,
    hub: BroadcastHub,
    shutdown_tx: watch::Sender<bool>,
}

impl Coordinator {
    pub fn new(board: Board, registry: Arc<RwLock<SessionRegistry>>) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Coordinator {
            state: RwLock::new(GameState {
                board,
                ledger: UpdateLedger::new(),
            }),
            hub: BroadcastHub::new(registry),
            shutdown_tx,
        }
    }

    /// A receiver that flips to `true` once the game completes. The accept
    /// loop and every session reader select on this.
    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    /// Attempts to place `value` at `(row, col)` on behalf of `session_id`.
    ///
    /// Out-of-range arguments are rejected before any lock is taken. A legal
    /// placement is applied to the board, recorded in the ledger, and
    /// broadcast to all sessions; if it completes the board, the winner is
    /// computed and the terminal broadcast plus the shutdown signal follow,
    /// all before the lock is released.
    pub async fn attempt_move(
        &self,
        session_id: SessionId,
        row: i64,
        col: i64,
        value: i64,
    ) -> MoveOutcome {
        let (row, col, value) = match validate_ranges(row, col, value) {
            Some(validated) => validated,
            None => return MoveOutcome::Rejected,
        };

        let mut state = self.state.write().await;
        if !state.board.is_legal_placement(row, col, value) {
            return MoveOutcome::Rejected;
        }

        state.board.place(row, col, value);
        let previous = state.ledger.record_owner((row, col), session_id);
        if previous == Some(session_id) {
            debug!("Client {} re-claimed cell ({}, {})", session_id, row, col);
        }

        let rendering = state.board.render();
        self.hub.broadcast(&board_updated_message(&rendering)).await;

        if state.board.is_complete() {
            let tallies = state.ledger.snapshot_tallies();
            let winner = winner(&tallies);
            info!("Board complete, final tallies: {:?}", tallies);
            self.hub
                .broadcast_final(&game_complete_message(winner))
                .await;
            // Receiver side may already be gone during shutdown races.
            let _ = self.shutdown_tx.send(true);
        }

        MoveOutcome::Accepted
    }

    /// Current board rendering. Read-only; concurrent snapshots share the
    /// lock.
    pub async fn snapshot(&self) -> String {
        let state = self.state.read().await;
        state.board.render()
    }

    /// Ledger view for diagnostics; tallies and owned-cell count are taken
    /// under the same lock acquisition.
    pub async fn tally_report(&self) -> TallyReport {
        let state = self.state.read().await;
        TallyReport {
            tallies: state.ledger.snapshot_tallies(),
            owned_cells: state.ledger.owned_cells(),
        }
    }
}

fn validate_ranges(row: i64, col: i64, value: i64) -> Option<(usize, usize, u8)> {
    let grid = GRID_SIZE as i64;
    if !(0..grid).contains(&row) || !(0..grid).contains(&col) {
        return None;
    }
    if !(MIN_VALUE as i64..=MAX_VALUE as i64).contains(&value) {
        return None;
    }
    Some((row as usize, col as usize, value as u8))
}

/// Winner rule: strictly greatest tally wins; ties go to the lowest session
/// id, which falls out of scanning the ascending-id snapshot with a strict
/// comparison. No owned cells means no winner.
fn winner(tallies: &[(SessionId, u32)]) -> Option<(SessionId, u32)> {
    let mut best: Option<(SessionId, u32)> = None;
    for &(id, count) in tallies {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((id, count)),
        }
    }
    best
}
