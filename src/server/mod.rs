//! TCP front end: socket setup and the accept loop.

pub mod listener;

pub use listener::{Listener, ListenerError};
