//! IPC listener that accepts requests over a Unix socket.
//!
//! Key-binding daemons, scripts and the transport glue connect to the
//! socket and send one request per line: plain command strings, or JSON
//! for client lifecycle events.

pub mod listener;
