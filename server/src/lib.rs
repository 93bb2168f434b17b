//! # Sudoku Server Library
//!
//! Authoritative server for a multiplayer Sudoku game played over a
//! line-based TCP protocol. Any number of clients connect, view the shared
//! board, and race to fill cells; every successful move is broadcast to all
//! of them, and when the board is complete the client who owns the most
//! cells wins.
//!
//! ## Architecture
//!
//! All shared mutable state funnels through one serialization point, the
//! [`coordinator::Coordinator`]. It owns the board and the ownership ledger
//! behind a single write lock, so moves from any number of concurrent
//! sessions are applied one at a time, and the broadcast for each move is
//! issued before the next move can begin. Every observer therefore sees the
//! same total order of board states.
//!
//! Each connection runs as a reader task plus a writer task. The writer
//! drains a per-session mailbox; broadcasts from the
//! [`hub::BroadcastHub`] and direct responses share that mailbox, which
//! keeps per-recipient delivery FIFO and isolates slow or broken
//! connections from everyone else.
//!
//! ## Module Organization
//!
//! - [`board`]: the Sudoku grid, its generation, legality, completeness
//!   and rendering.
//! - [`ledger`]: per-cell ownership and per-session tallies; the winner is
//!   read off these.
//! - [`registry`]: the connected-session set and id allocation.
//! - [`hub`]: fan-out of one message to every registered session.
//! - [`coordinator`]: the serialization point for all mutation.
//! - [`session`]: the per-connection command loop.
//! - [`network`]: TCP bind/accept and graceful drain on completion.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::board::Board;
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let board = Board::generate(&mut rand::thread_rng());
//!     let server = Server::bind(("0.0.0.0", 4000), board).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod board;
pub mod coordinator;
pub mod hub;
pub mod ledger;
pub mod network;
pub mod registry;
pub mod session;
