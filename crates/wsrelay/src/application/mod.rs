//! Application layer: the relay session and its three concurrent activities.
//!
//! Nothing here opens a socket.  Every component talks to the connection
//! through the [`FrameSender`] trait (write side) or a plain
//! `Stream<Item = Result<Message, _>>` (read side), so the whole session can
//! be driven in tests by an in-memory pipe or a recording double.
//!
//! # Sub-modules
//!
//! - **`error`**        – `ConfigError`, `HandshakeError`, `TransportError`,
//!   and the top-level `RelayError` that carries the exit status.
//! - **`frame_sender`** – The write-side abstraction shared by the outbound
//!   pump and the shutdown coordinator.
//! - **`outbound`**     – Local input lines → Text frames, with the `>>` echo.
//! - **`inbound`**      – Received frames → standard output, with the `<<`
//!   prefix.  This is the session's primary loop.
//! - **`shutdown`**     – Exactly-once close on the first interrupt.
//! - **`session`**      – Runs all three and decides how the session ended.

pub mod error;
pub mod frame_sender;
pub mod inbound;
pub mod outbound;
pub mod session;
pub mod shutdown;

#[cfg(test)]
pub(crate) mod recording;

pub use error::{ConfigError, HandshakeError, RelayError, TransportError};
pub use frame_sender::FrameSender;
pub use inbound::InboundPump;
pub use outbound::OutboundPump;
pub use session::{Session, SessionEnd};
pub use shutdown::{interrupt_signals, ShutdownCoordinator, ShutdownGuard};
