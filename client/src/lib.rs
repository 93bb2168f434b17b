//! # Sudoku Client Library
//!
//! Terminal client for the Sudoku server. It keeps one persistent TCP
//! connection open, prints every line the server sends as it arrives
//! (responses and broadcasts alike), and forwards commands typed on stdin.
//!
//! Input is validated locally before anything is sent: the [`console`]
//! module accepts exactly the commands the server understands (`show` and
//! `update <row> <col> <value>`), so obvious typos get an immediate
//! `Invalid input. Try again.` without a round trip. The server stays
//! authoritative; local validation is only a convenience filter.
//!
//! The [`network`] module owns the connection and the interleaving of the
//! two input sources (server lines and stdin lines) in a single select
//! loop.

pub mod console;
pub mod network;
