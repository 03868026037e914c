//! Domain layer for wsrelay.
//!
//! Pure types with no dependencies on I/O, networking, or the async runtime.
//! The binary crate builds these once at startup and passes them down to the
//! connector and the pumps; nothing in here is global or mutable after
//! construction.

pub mod config;
pub mod headers;
pub mod output;

pub use config::{ClientConfig, ConfigError, ConnectTarget, FrameLimits, OutputMode, RelayMode};
pub use headers::HeaderSet;
pub use output::{OutputFormatter, RenderedFrame};
