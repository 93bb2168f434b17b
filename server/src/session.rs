//! Per-connection protocol loop.
//!
//! Each accepted socket gets two tasks over a split stream: a reader that
//! parses one command per line and dispatches it to the coordinator, and a
//! writer that drains the session's mailbox. Responses and broadcasts share
//! the one mailbox, so a session receives everything in a single FIFO order.

use crate::coordinator::{Coordinator, MoveOutcome};
use crate::registry::{Outbound, Session, SessionRegistry};
use log::{debug, info, warn};
use shared::{board_message, parse_command, welcome_message, Command, UPDATE_FAILED, UPDATE_SUCCESSFUL};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch, RwLock};

/// Runs one client connection to completion: registers the session, serves
/// its command loop, and tears everything down on disconnect, read error or
/// server shutdown. All per-client errors stay inside this function.
pub async fn handle_connection(
    stream: TcpStream,
    coordinator: Arc<Coordinator>,
    registry: Arc<RwLock<SessionRegistry>>,
    mut shutdown: watch::Receiver<bool>,
) {
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    let (reader, writer) = stream.into_split();

    let (tx, rx) = mpsc::unbounded_channel();
    let session = {
        let mut guard = registry.write().await;
        guard.register(tx)
    };
    let session_id = session.id;
    info!("Client {} connected from {}", session_id, peer);

    let writer_task = tokio::spawn(drain_mailbox(writer, rx));

    // The welcome and initial board go through the mailbox like everything
    // else, so they are ordered with any broadcast already in flight.
    enqueue(&session, welcome_message(session_id));
    enqueue(&session, board_message(&coordinator.snapshot().await));

    let mut lines = BufReader::new(reader).lines();
    loop {
        tokio::select! {
            result = lines.next_line() => match result {
                Ok(Some(line)) => dispatch(&line, &session, &coordinator).await,
                Ok(None) => {
                    info!("Client {} disconnected", session_id);
                    break;
                }
                Err(error) => {
                    warn!("Read error on client {}: {}", session_id, error);
                    break;
                }
            },
            _ = shutdown.changed() => {
                debug!("Client {} closing on server shutdown", session_id);
                break;
            }
        }
    }

    {
        let mut guard = registry.write().await;
        guard.unregister(session_id);
    }
    // Dropping the last sender closes the mailbox once it is drained, which
    // ends the writer task.
    drop(session);
    let _ = writer_task.await;
}

/// One line, one command, one response.
async fn dispatch(line: &str, session: &Session, coordinator: &Coordinator) {
    match parse_command(line) {
        Ok(Command::Show) => {
            enqueue(session, board_message(&coordinator.snapshot().await));
        }
        Ok(Command::Update { row, col, value }) => {
            match coordinator.attempt_move(session.id, row, col, value).await {
                MoveOutcome::Accepted => enqueue(session, UPDATE_SUCCESSFUL),
                MoveOutcome::Rejected => enqueue(session, UPDATE_FAILED),
            }
        }
        Err(error) => enqueue(session, error.response()),
    }
}

fn enqueue(session: &Session, text: impl Into<String>) {
    // Failure means the writer already exited; the read loop will notice the
    // dead connection on its own.
    let _ = session.outbound.send(Outbound::line(text));
}

/// Writer side of a session: drains the mailbox onto the socket, one
/// newline-terminated line per message. A terminal message is flushed and
/// then the write half is dropped, closing the connection.
async fn drain_mailbox(mut writer: OwnedWriteHalf, mut rx: mpsc::UnboundedReceiver<Outbound>) {
    while let Some(outbound) = rx.recv().await {
        let mut data = outbound.text.into_bytes();
        data.push(b'\n');
        if writer.write_all(&data).await.is_err() {
            break;
        }
        if writer.flush().await.is_err() {
            break;
        }
        if outbound.terminal {
            break;
        }
    }
}
