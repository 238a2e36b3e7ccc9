//! HTTP protocol implementation.
//!
//! One request per connection, no keep-alive: every response carries
//! `Connection: close` and the socket is closed after it is written.
//!
//! # Architecture
//!
//! - **`connection`**: The per-connection state machine
//! - **`parser`**: Parses the request line and headers from raw bytes
//! - **`request`**: HTTP request representation and header lookup
//! - **`response`**: Status codes, content types and the response builder
//! - **`writer`**: Serializes and writes HTTP responses to the client
//! - **`mime`**: MIME type detection based on file extensions
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Wait for the request head
//!        └──────┬──────┘
//!               │ bytes received          (read failure) ──┐
//!               ▼                                          │
//!        ┌─────────────┐                                   │
//!        │   Parsing   │ ──── (malformed request line) ────┤
//!        └──────┬──────┘                                   ▼
//!               │ Request                           ┌────────────┐
//!               ▼                                   │  Errored   │
//!        ┌─────────────┐                            └─────┬──────┘
//!        │   Routing   │ ← Always yields a Response       │
//!        └──────┬──────┘                                  │
//!               ▼                                         │
//!        ┌─────────────┐                                  │
//!        │ Responding  │ ──── (write failure) ────────────┤
//!        └──────┬──────┘                                  │
//!               ▼                                         │
//!        ┌─────────────┐                                  │
//!        │   Closed    │ ◄────────────────────────────────┘
//!        └─────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use courier::http::connection::{Connection, ConnectionSettings};
//! use courier::routes::Router;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:4221").await?;
//!     let router = Arc::new(Router::new("."));
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let router = router.clone();
//!         tokio::spawn(async move {
//!             let conn = Connection::new(socket, router, ConnectionSettings::default());
//!             if let Err(e) = conn.run().await {
//!                 tracing::warn!("Connection error: {}", e);
//!             }
//!         });
//!     }
//! }
//! ```

pub mod request;
pub mod response;
pub mod parser;
pub mod connection;
pub mod writer;
pub mod mime;
