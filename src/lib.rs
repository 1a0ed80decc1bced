//! # RX Trace - X11 wire-protocol tracer
//!
//! RX Trace is an intercepting, logging proxy for the X11 core protocol.
//! Clients connect to a local listening display; the proxy opens a paired
//! connection to the real display, forwards every byte in both directions,
//! and prints a human-readable trace of every request, reply, event, and
//! error it relays.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - [`protocol`] - X11 wire decoding (setup handshake, requests, replies,
//!   events, errors, atoms)
//! - [`proxy`] - per-session plumbing (socket buffers, connection state,
//!   the session pump, listen/connect glue)
//! - [`trace`] - formatting of decoded messages and the trace record sink
//! - [`core`] - configuration, CLI arguments, logging setup
//!
//! ## Example
//!
//! ```rust,no_run
//! use rxtrace::{core::config::Settings, proxy::server::TraceProxy};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Settings::default();
//!     let proxy = TraceProxy::bind(":9", ":0", settings).await?;
//!     proxy.run().await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod protocol;
pub mod proxy;
pub mod trace;

/// Common result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the RX Trace library
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("peer closed: {0}")]
    PeerClosed(String),

    #[error("malformed protocol: {0}")]
    Protocol(String),

    #[error("internal invariant violated: {0}")]
    Invariant(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("setup error: {0}")]
    Setup(String),
}

impl Error {
    /// True for the error kinds that end a session without indicating a bug.
    pub fn is_session_end(&self) -> bool {
        matches!(self, Error::Io(_) | Error::PeerClosed(_))
    }
}
