//! Courier - a small concurrent HTTP/1.1 server
//!
//! Accepts TCP connections, answers exactly one request on each, and closes.

pub mod config;
pub mod http;
pub mod routes;
pub mod server;
