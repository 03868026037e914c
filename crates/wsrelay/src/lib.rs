//! wsrelay library crate.
//!
//! An interactive WebSocket client: every line typed on standard input goes
//! out as one Text frame, every frame received is printed on standard output,
//! and Ctrl+C closes the connection once and exits.
//!
//! # Architecture
//!
//! ```text
//! stdin ──▶ [outbound pump] ──▶ ┐
//!                                ├── WebSocket ◀──▶ server
//! stdout ◀── [inbound pump] ◀── ┘
//!              ▲
//! SIGINT ──▶ [shutdown coordinator] ──▶ close()
//!
//! wsrelay
//!   ├── application/     Session, pumps, shutdown, error taxonomy
//!   └── infrastructure/
//!         ├── connector/  Opening handshake (tokio-tungstenite)
//!         └── connection/ Split connection with a close-once guard
//! ```
//!
//! Pure configuration and output formatting live in `wsrelay-core`.
//!
//! # Layer rules
//!
//! - `application` depends on `wsrelay-core` and talks to the connection only
//!   through [`application::FrameSender`] and a frame `Stream`.
//! - `infrastructure` depends on all other layers plus `tokio-tungstenite`.

/// Application layer: session orchestration and error types.
pub mod application;

/// Infrastructure layer: handshake and live connection.
pub mod infrastructure;
