//! TCP accept loop and server lifecycle.

use crate::board::Board;
use crate::coordinator::Coordinator;
use crate::registry::SessionRegistry;
use crate::session;
use log::{debug, info, warn};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::sync::{watch, RwLock};
use tokio::task::JoinSet;

/// How long to wait for live sessions to flush after the game completes.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// The listening server: owns the coordinator, the session registry and the
/// accept loop. One task pair is spawned per accepted connection.
pub struct Server {
    listener: TcpListener,
    coordinator: Arc<Coordinator>,
    registry: Arc<RwLock<SessionRegistry>>,
    shutdown: watch::Receiver<bool>,
}

impl Server {
    /// Binds the listener and wires up the shared state. Binding to port 0
    /// works; use [`Server::local_addr`] to discover the assigned port.
    pub async fn bind(addr: impl ToSocketAddrs, board: Board) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!("Server listening on {}", listener.local_addr()?);

        let registry = Arc::new(RwLock::new(SessionRegistry::new()));
        let coordinator = Arc::new(Coordinator::new(board, Arc::clone(&registry)));
        let shutdown = coordinator.shutdown_signal();

        Ok(Server {
            listener,
            coordinator,
            registry,
            shutdown,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until the game completes or Ctrl+C arrives, then
    /// drains live sessions so the terminal broadcast reaches everyone.
    pub async fn run(mut self) -> io::Result<()> {
        let mut sessions = JoinSet::new();

        loop {
            tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        debug!("New connection from {}", addr);
                        sessions.spawn(session::handle_connection(
                            stream,
                            Arc::clone(&self.coordinator),
                            Arc::clone(&self.registry),
                            self.shutdown.clone(),
                        ));
                    }
                    Err(error) => warn!("Failed to accept connection: {}", error),
                },
                _ = self.shutdown.changed() => {
                    info!("Game complete, draining sessions");
                    break;
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received Ctrl+C, shutting down");
                    break;
                }
            }
        }

        let drain = async {
            while sessions.join_next().await.is_some() {}
        };
        if tokio::time::timeout(DRAIN_TIMEOUT, drain).await.is_err() {
            warn!("Session drain timed out, aborting remaining sessions");
            sessions.abort_all();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::GRID_SIZE;

    #[tokio::test]
    async fn test_bind_to_ephemeral_port() {
        let board = Board::with_givens([[0u8; GRID_SIZE]; GRID_SIZE]);
        let server = Server::bind(("127.0.0.1", 0), board).await.unwrap();
        let addr = server.local_addr().unwrap();
        assert_ne!(addr.port(), 0);
    }
}
