//! staticd - a small concurrent HTTP/1.x static file server.
//!
//! Each accepted connection runs in its own worker task with keep-alive,
//! idle timeouts, and a per-connection request cap.

pub mod config;
pub mod http;
pub mod server;
