//! The outbound half of a connection, as seen by the application layer.
//!
//! The outbound pump and the shutdown coordinator never touch a socket
//! directly; they talk to a [`FrameSender`].  The infrastructure
//! implementation is [`crate::infrastructure::connection::Connection`];
//! tests use an in-memory recorder.

use async_trait::async_trait;

use crate::application::error::TransportError;

/// Sends text frames and closes the connection.
///
/// Implementations must allow `close` to be called from another task while a
/// `send_text` or a read on the inbound half is still in flight.  The pending
/// operation then fails; it never corrupts the connection state.  `close` must
/// also be idempotent: only the first call does anything.
#[async_trait]
pub trait FrameSender: Send + Sync {
    /// Sends `text` as exactly one Text frame.
    async fn send_text(&self, text: String) -> Result<(), TransportError>;

    /// Closes the connection, best-effort.  Errors are swallowed.
    async fn close(&self);

    fn is_closed(&self) -> bool;
}
