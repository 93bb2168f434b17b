//! Per-cell ownership and per-session contribution tallies.
//!
//! The ledger records, for every cell that was successfully written by a
//! session, which session wrote it last, and how many cells each session
//! currently owns. The winner of a finished game is read straight off the
//! tallies. The ledger holds no lock of its own; it lives inside the
//! coordinator's write lock and is never reachable from anywhere else.

use shared::SessionId;
use std::collections::{BTreeMap, HashMap};

/// A cell coordinate, `(row, col)`, both in `0..GRID_SIZE`.
pub type Cell = (usize, usize);

/// Tracks which session owns each written cell and how many cells each
/// session owns in total.
///
/// Invariant: the tally values always sum to the number of cells with a
/// recorded owner. Every mutation goes through [`UpdateLedger::record_owner`],
/// which adjusts both maps in one call, so no other component can ever
/// observe them out of step.
#[derive(Debug, Default)]
pub struct UpdateLedger {
    owner_of: HashMap<Cell, SessionId>,
    // BTreeMap gives the stable ascending-id iteration order that makes
    // winner tie-breaking deterministic.
    tally: BTreeMap<SessionId, u32>,
}

impl UpdateLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transfers ownership of `cell` to `session_id` and adjusts both
    /// tallies in one step. Returns the previous owner, if any.
    ///
    /// Re-claiming a cell you already own is a no-op: the tally must not
    /// increase.
    pub fn record_owner(&mut self, cell: Cell, session_id: SessionId) -> Option<SessionId> {
        let previous = self.owner_of.insert(cell, session_id);
        match previous {
            Some(owner) if owner == session_id => {}
            Some(owner) => {
                self.decrement(owner);
                *self.tally.entry(session_id).or_insert(0) += 1;
            }
            None => {
                *self.tally.entry(session_id).or_insert(0) += 1;
            }
        }
        debug_assert_eq!(
            self.tally.values().map(|&n| n as usize).sum::<usize>(),
            self.owner_of.len(),
            "tally sum diverged from owned-cell count"
        );
        previous
    }

    fn decrement(&mut self, session_id: SessionId) {
        match self.tally.get_mut(&session_id) {
            Some(count) if *count > 1 => *count -= 1,
            Some(_) => {
                self.tally.remove(&session_id);
            }
            None => debug_assert!(false, "owner {} missing from tally", session_id),
        }
    }

    pub fn owner_of(&self, cell: Cell) -> Option<SessionId> {
        self.owner_of.get(&cell).copied()
    }

    pub fn tally_for(&self, session_id: SessionId) -> u32 {
        self.tally.get(&session_id).copied().unwrap_or(0)
    }

    /// All tallies in ascending session-id order. Winner computation relies
    /// on this order to break ties deterministically.
    pub fn snapshot_tallies(&self) -> Vec<(SessionId, u32)> {
        self.tally.iter().map(|(&id, &count)| (id, count)).collect()
    }

    /// Number of cells with a recorded owner.
    pub fn owned_cells(&self) -> usize {
        self.owner_of.len()
    }
}
