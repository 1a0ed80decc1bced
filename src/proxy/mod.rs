//! Per-session plumbing: socket buffers, connection state, the session
//! pump, and the listen/connect glue.

pub mod connection;
pub mod extensions;
pub mod server;
pub mod session;
pub mod socket_buffer;

pub use connection::Connection;
pub use extensions::Extensions;
pub use socket_buffer::SocketBuffer;
