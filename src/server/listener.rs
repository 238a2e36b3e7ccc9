use std::io;
use std::net::{AddrParseError, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tracing::info;

use crate::config::Config;
use crate::http::connection::{Connection, ConnectionError, ConnectionSettings};
use crate::routes::Router;

/// Pause before accepting again after a failed accept. Errors such as
/// EMFILE persist until some connection closes, and retrying at once
/// would spin.
pub const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("invalid listen address {addr:?}: {source}")]
    InvalidAddress {
        addr: String,
        #[source]
        source: AddrParseError,
    },
    #[error("failed to create socket: {0}")]
    SocketCreate(#[source] io::Error),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("failed to listen on {addr}: {source}")]
    Listen {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("failed to accept connection: {0}")]
    Accept(#[source] io::Error),
}

/// The bound, listening server socket.
pub struct Listener {
    inner: TcpListener,
    local_addr: SocketAddr,
}

impl Listener {
    /// Creates a socket with `SO_REUSEADDR`, binds it to the configured
    /// address and starts listening with the configured backlog.
    pub fn bind(cfg: &Config) -> Result<Self, ListenerError> {
        let addr: SocketAddr =
            cfg.listen_addr
                .parse()
                .map_err(|source| ListenerError::InvalidAddress {
                    addr: cfg.listen_addr.clone(),
                    source,
                })?;

        let socket = match addr {
            SocketAddr::V4(_) => TcpSocket::new_v4(),
            SocketAddr::V6(_) => TcpSocket::new_v6(),
        }
        .map_err(ListenerError::SocketCreate)?;

        socket
            .set_reuseaddr(true)
            .map_err(ListenerError::SocketCreate)?;
        socket
            .bind(addr)
            .map_err(|source| ListenerError::Bind { addr, source })?;

        let inner = socket
            .listen(cfg.backlog)
            .map_err(|source| ListenerError::Listen { addr, source })?;
        let local_addr = inner
            .local_addr()
            .map_err(|source| ListenerError::Listen { addr, source })?;

        info!(address = %local_addr, backlog = cfg.backlog, "Listening");

        Ok(Self { inner, local_addr })
    }

    /// The address actually bound; differs from the configured one when
    /// port 0 was requested.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub async fn accept(&self) -> Result<(TcpStream, SocketAddr), ListenerError> {
        self.inner.accept().await.map_err(ListenerError::Accept)
    }

    /// Accept loop. Each connection runs on its own task; the loop never
    /// waits on one and never stops on an accept failure, though it backs
    /// off for [`ACCEPT_RETRY_DELAY`] after one.
    pub async fn run(self, router: Arc<Router>, settings: ConnectionSettings) {
        loop {
            let (socket, peer) = match self.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    back_off(&e).await;
                    continue;
                }
            };
            tracing::debug!("Accepted connection from {}", peer);

            let router = Arc::clone(&router);
            tokio::spawn(async move {
                let conn = Connection::new(socket, router, settings).with_peer(peer);
                if let Err(e) = conn.run().await {
                    log_connection_error(peer, &e);
                }
            });
        }
    }
}

async fn back_off(e: &ListenerError) {
    tracing::warn!(error = %e, retry_in = ?ACCEPT_RETRY_DELAY, "Accept failed");
    tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
}

fn log_connection_error(peer: SocketAddr, e: &ConnectionError) {
    match e {
        ConnectionError::Closed => tracing::debug!(%peer, "{}", e),
        _ => tracing::warn!(%peer, "Connection error: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn accept_failure_waits_before_retrying() {
        let e = ListenerError::Accept(io::Error::from_raw_os_error(24));

        let started = Instant::now();
        back_off(&e).await;
        assert!(started.elapsed() >= ACCEPT_RETRY_DELAY);
    }
}
