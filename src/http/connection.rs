use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::config::Config;
use crate::http::parser::{ParseError, parse_request};
use crate::http::request::Request;
use crate::http::writer::ResponseWriter;
use crate::routes::Router;

const READ_CHUNK: usize = 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("peer closed the connection before sending a request")]
    Closed,
    #[error("read failed: {0}")]
    Read(#[source] io::Error),
    #[error("no request received within {0:?}")]
    TimedOut(Duration),
    #[error("malformed request: {0}")]
    Malformed(#[from] ParseError),
    #[error("write failed after {written} of {total} bytes: {source}")]
    Write {
        written: usize,
        total: usize,
        #[source]
        source: io::Error,
    },
}

/// Per-connection limits, taken from [`Config`].
#[derive(Debug, Clone, Copy)]
pub struct ConnectionSettings {
    pub max_request_size: usize,
    pub read_timeout: Option<Duration>,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ConnectionSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            max_request_size: cfg.max_request_size,
            read_timeout: cfg.read_timeout(),
        }
    }
}

pub enum ConnectionState {
    Reading,
    Parsing(Bytes),
    Routing(Request),
    Responding(ResponseWriter),
    Errored(ConnectionError),
    Closed,
}

/// Handles exactly one request on one connection.
///
/// The stream is owned here and released when `run` returns, whichever
/// state the machine ended in.
pub struct Connection<S> {
    stream: S,
    peer: Option<SocketAddr>,
    router: Arc<Router>,
    settings: ConnectionSettings,
    state: ConnectionState,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, router: Arc<Router>, settings: ConnectionSettings) -> Self {
        Self {
            stream,
            peer: None,
            router,
            settings,
            state: ConnectionState::Reading,
        }
    }

    pub fn with_peer(mut self, peer: SocketAddr) -> Self {
        self.peer = Some(peer);
        self
    }

    pub async fn run(mut self) -> Result<(), ConnectionError> {
        let mut outcome = Ok(());

        loop {
            self.state = match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => match self.read_request().await {
                    Ok(raw) => ConnectionState::Parsing(raw),
                    Err(e) => ConnectionState::Errored(e),
                },

                ConnectionState::Parsing(raw) => match parse_request(raw) {
                    Ok(request) => ConnectionState::Routing(request),
                    Err(e) => ConnectionState::Errored(e.into()),
                },

                ConnectionState::Routing(request) => {
                    let response = self.router.dispatch(&request).await;

                    tracing::info!(
                        peer = ?self.peer,
                        method = %request.method,
                        path = %request.path,
                        status = response.status.as_u16(),
                        "Handled request"
                    );

                    ConnectionState::Responding(ResponseWriter::new(&response))
                }

                ConnectionState::Responding(mut writer) => {
                    match writer.write_to_stream(&mut self.stream).await {
                        Ok(()) => ConnectionState::Closed,
                        Err(source) => ConnectionState::Errored(ConnectionError::Write {
                            written: writer.written(),
                            total: writer.len(),
                            source,
                        }),
                    }
                }

                ConnectionState::Errored(e) => {
                    outcome = Err(e);
                    ConnectionState::Closed
                }

                ConnectionState::Closed => break,
            };
        }

        // Dropping the stream closes it; shutdown first so the FIN follows
        // the response.
        if let Err(e) = self.stream.shutdown().await {
            tracing::debug!(peer = ?self.peer, error = %e, "Shutdown failed");
        }
        outcome
    }

    /// Reads the request head.
    ///
    /// Returns after the first read that completes the request line, so a
    /// head missing its blank line is still answered. Also stops at
    /// `max_request_size`, at EOF, or when the read timeout fires with some
    /// bytes already buffered.
    async fn read_request(&mut self) -> Result<Bytes, ConnectionError> {
        let limit = self.settings.max_request_size;
        let mut buffer = BytesMut::with_capacity(limit);
        let mut chunk = [0u8; READ_CHUNK];

        while buffer.len() < limit {
            let want = READ_CHUNK.min(limit - buffer.len());
            let read = self.stream.read(&mut chunk[..want]);

            let result = match self.settings.read_timeout {
                Some(timeout) => match tokio::time::timeout(timeout, read).await {
                    Ok(result) => result,
                    Err(_) if buffer.is_empty() => return Err(ConnectionError::TimedOut(timeout)),
                    Err(_) => break,
                },
                None => read.await,
            };

            let n = result.map_err(ConnectionError::Read)?;
            if n == 0 {
                if buffer.is_empty() {
                    return Err(ConnectionError::Closed);
                }
                break;
            }

            buffer.extend_from_slice(&chunk[..n]);

            // Headers are whatever came along with the request line.
            if buffer.contains(&b'\n') {
                break;
            }
        }

        Ok(buffer.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    fn router() -> Arc<Router> {
        Arc::new(Router::new("."))
    }

    async fn exchange(request: &[u8]) -> (Result<(), ConnectionError>, Vec<u8>) {
        let (mut client, server) = duplex(8192);
        let conn = Connection::new(server, router(), ConnectionSettings::default());
        let task = tokio::spawn(conn.run());

        client.write_all(request).await.unwrap();
        let mut response = Vec::new();
        client.read_to_end(&mut response).await.unwrap();

        (task.await.unwrap(), response)
    }

    #[tokio::test]
    async fn responds_and_closes() {
        let (result, response) = exchange(b"GET /hello HTTP/1.1\r\n\r\n").await;

        assert!(result.is_ok());
        let text = String::from_utf8(response).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.ends_with("<html>Hello!</html>"));
    }

    #[tokio::test]
    async fn malformed_request_gets_no_response() {
        let (result, response) = exchange(b"GARBAGE\r\n\r\n").await;

        assert!(matches!(
            result,
            Err(ConnectionError::Malformed(ParseError::MissingPath))
        ));
        assert!(response.is_empty());
    }

    #[tokio::test]
    async fn peer_closing_early_is_a_read_error() {
        let (client, server) = duplex(64);
        drop(client);

        let conn = Connection::new(server, router(), ConnectionSettings::default());
        assert!(matches!(conn.run().await, Err(ConnectionError::Closed)));
    }

    #[tokio::test]
    async fn request_without_terminator_is_parsed_at_eof() {
        let (mut client, server) = duplex(8192);
        let conn = Connection::new(server, router(), ConnectionSettings::default());
        let task = tokio::spawn(conn.run());

        client.write_all(b"GET /echo/abc HTTP/1.1\r\n").await.unwrap();
        client.shutdown().await.unwrap();

        let mut response = Vec::new();
        client.read_to_end(&mut response).await.unwrap();

        assert!(task.await.unwrap().is_ok());
        assert!(response.ends_with(b"\r\n\r\nabc"));
    }

    #[tokio::test]
    async fn open_peer_without_blank_line_is_answered() {
        let (mut client, server) = duplex(8192);
        let conn = Connection::new(server, router(), ConnectionSettings::default());
        let task = tokio::spawn(conn.run());

        // The write half stays open; only the request line and one header.
        client
            .write_all(b"GET /hello HTTP/1.1\r\nUser-Agent: x\r\n")
            .await
            .unwrap();

        let mut response = Vec::new();
        tokio::time::timeout(Duration::from_secs(2), client.read_to_end(&mut response))
            .await
            .expect("response arrives without a blank line")
            .unwrap();

        assert!(task.await.unwrap().is_ok());
        assert!(response.starts_with(b"HTTP/1.1 200 OK\r\n"));
        assert!(response.ends_with(b"<html>Hello!</html>"));
    }

    #[tokio::test]
    async fn request_line_split_across_reads() {
        let (mut client, server) = duplex(8192);
        let conn = Connection::new(server, router(), ConnectionSettings::default());
        let task = tokio::spawn(conn.run());

        client.write_all(b"GET /echo/sp").await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        client.write_all(b"lit HTTP/1.1\r\n").await.unwrap();

        let mut response = Vec::new();
        client.read_to_end(&mut response).await.unwrap();

        assert!(task.await.unwrap().is_ok());
        assert!(response.ends_with(b"\r\n\r\nsplit"));
    }

    /// Duplex stream whose shutdown always fails.
    struct BrokenShutdown(tokio::io::DuplexStream);

    impl AsyncRead for BrokenShutdown {
        fn poll_read(
            mut self: std::pin::Pin<&mut Self>,
            cx: &mut std::task::Context<'_>,
            buf: &mut tokio::io::ReadBuf<'_>,
        ) -> std::task::Poll<io::Result<()>> {
            std::pin::Pin::new(&mut self.0).poll_read(cx, buf)
        }
    }

    impl AsyncWrite for BrokenShutdown {
        fn poll_write(
            mut self: std::pin::Pin<&mut Self>,
            cx: &mut std::task::Context<'_>,
            buf: &[u8],
        ) -> std::task::Poll<io::Result<usize>> {
            std::pin::Pin::new(&mut self.0).poll_write(cx, buf)
        }

        fn poll_flush(
            mut self: std::pin::Pin<&mut Self>,
            cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<io::Result<()>> {
            std::pin::Pin::new(&mut self.0).poll_flush(cx)
        }

        fn poll_shutdown(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<io::Result<()>> {
            std::task::Poll::Ready(Err(io::Error::from(io::ErrorKind::NotConnected)))
        }
    }

    #[tokio::test]
    async fn failed_shutdown_keeps_the_outcome() {
        let (mut client, server) = duplex(8192);
        let conn = Connection::new(BrokenShutdown(server), router(), ConnectionSettings::default());
        let task = tokio::spawn(conn.run());

        client.write_all(b"GET /hello HTTP/1.1\r\n\r\n").await.unwrap();

        let mut response = vec![0u8; 256];
        let mut filled = 0;
        while !response[..filled].ends_with(b"<html>Hello!</html>") {
            let n = client.read(&mut response[filled..]).await.unwrap();
            assert!(n > 0, "stream ended before the body");
            filled += n;
        }

        assert!(task.await.unwrap().is_ok());
        assert!(response.starts_with(b"HTTP/1.1 200 OK\r\n"));
    }

    #[tokio::test]
    async fn read_timeout_parses_partial_head() {
        let (mut client, server) = duplex(8192);
        let settings = ConnectionSettings {
            read_timeout: Some(Duration::from_millis(50)),
            ..ConnectionSettings::default()
        };
        let task = tokio::spawn(Connection::new(server, router(), settings).run());

        client.write_all(b"GET / HTTP/1.1\r\nHost: x\r\n").await.unwrap();

        let mut response = Vec::new();
        client.read_to_end(&mut response).await.unwrap();

        assert!(task.await.unwrap().is_ok());
        assert!(response.starts_with(b"HTTP/1.1 200 OK\r\n"));
    }

    #[tokio::test]
    async fn read_timeout_with_nothing_read() {
        let (_client, server) = duplex(64);
        let settings = ConnectionSettings {
            read_timeout: Some(Duration::from_millis(20)),
            ..ConnectionSettings::default()
        };

        let result = Connection::new(server, router(), settings).run().await;
        assert!(matches!(result, Err(ConnectionError::TimedOut(_))));
    }

    #[tokio::test]
    async fn head_is_capped_at_max_request_size() {
        let (mut client, server) = duplex(8192);
        let settings = ConnectionSettings {
            max_request_size: 16,
            read_timeout: None,
        };
        let task = tokio::spawn(Connection::new(server, router(), settings).run());

        // Only "GET /hello HTTP/" fits; no terminator ever arrives.
        client
            .write_all(b"GET /hello HTTP/1.1\r\nUser-Agent: x\r\n\r\n")
            .await
            .unwrap();

        let mut response = Vec::new();
        client.read_to_end(&mut response).await.unwrap();

        assert!(task.await.unwrap().is_ok());
        assert!(response.ends_with(b"<html>Hello!</html>"));
    }
}
