//! # wsrelay-core
//!
//! Shared library for the `wsrelay` interactive WebSocket client.
//!
//! This crate has zero dependencies on sockets, async runtimes, or terminals.
//! Everything here is a plain value or a pure function, so it can be tested
//! without a network and reused by any front end that drives a connection.
//!
//! # What lives here
//!
//! - **`domain::headers`** – The ordered [`HeaderSet`] sent with the opening
//!   handshake, and parsing of `"Name: Value"` header lines into it.
//! - **`domain::config`** – [`ClientConfig`], the single immutable value built
//!   at startup and handed to every component, plus [`ConfigError`].
//! - **`domain::output`** – [`OutputFormatter`], the verbose/quiet policy that
//!   decides how notices and relayed frames are rendered.

pub mod domain;

// Re-export the most-used types at the crate root so callers can write
// `wsrelay_core::ClientConfig` instead of `wsrelay_core::domain::config::ClientConfig`.
pub use domain::config::{
    ClientConfig, ConfigError, ConnectTarget, FrameLimits, OutputMode, RelayMode,
};
pub use domain::headers::HeaderSet;
pub use domain::output::{OutputFormatter, RenderedFrame};
