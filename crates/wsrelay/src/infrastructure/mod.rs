//! Infrastructure layer: the real WebSocket connection.
//!
//! - **`connector`**  – builds the upgrade request and performs the handshake
//!   with `tokio-tungstenite`.
//! - **`connection`** – the split, close-once connection that implements
//!   [`crate::application::FrameSender`].
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `wsrelay_core`, but MUST NOT be imported by the `application` layer.

pub mod connection;
pub mod connector;

pub use connection::{Connection, FrameStream};
pub use connector::{build_request, connect};
