//! Error taxonomy for a relay session.
//!
//! Every failure the client can hit falls in one of four categories, kept
//! apart so a caller embedding the library can choose its own retry policy:
//!
//! | Category               | When                                   | Exit |
//! |------------------------|----------------------------------------|------|
//! | [`ConfigError`]        | bad URL, origin, or header at startup  | 1    |
//! | [`HandshakeError`]     | DNS, TCP refusal, HTTP upgrade failure | 1    |
//! | [`TransportError`]     | read/write failure once connected      | 1    |
//! | `RelayError::Signal`   | interrupt handler could not be armed   | 1    |
//!
//! Display strings describe only their own layer; the underlying cause is
//! exposed through `source()` so `main` can print the chain with `{:#}`.
//! Nothing in this crate retries.

use thiserror::Error;
use tokio_tungstenite::tungstenite::{error::CapacityError, Error as WsError};

pub use wsrelay_core::ConfigError;

/// The opening handshake did not produce an open connection.
#[derive(Debug, Error)]
pub enum HandshakeError {
    /// The server answered the upgrade request with a non-101 HTTP status.
    #[error("server at {address} rejected the WebSocket upgrade with HTTP {status}")]
    Rejected { address: String, status: u16 },

    /// Any other failure: bad URL, DNS, TCP refusal, protocol mismatch.
    #[error("failed to connect to {address}")]
    Failed {
        address: String,
        #[source]
        source: WsError,
    },
}

impl HandshakeError {
    /// Classifies a tungstenite error raised while dialing `address`.
    pub fn from_dial(address: &str, source: WsError) -> Self {
        match source {
            WsError::Http(response) => Self::Rejected {
                address: address.to_string(),
                status: response.status().as_u16(),
            },
            source => Self::Failed {
                address: address.to_string(),
                source,
            },
        }
    }
}

/// A read or write failed on an open connection, or on the local terminal.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The peer sent a Close frame.
    #[error("connection closed by peer{}", describe_close(.code, .reason))]
    PeerClosed { code: Option<u16>, reason: String },

    /// The frame stream ended without a Close frame.
    #[error("connection closed")]
    StreamEnded,

    /// The connection was already closed locally (e.g. by shutdown).
    #[error("connection already closed")]
    AlreadyClosed,

    /// An inbound message exceeded the configured maximum size.
    #[error("inbound message of {size} bytes exceeds the {max} byte limit")]
    FrameTooLarge { size: usize, max: usize },

    /// Any other WebSocket protocol or socket error.
    #[error("websocket error")]
    Socket(#[source] WsError),

    /// Reading standard input or writing standard output failed.
    #[error("terminal I/O error")]
    Terminal(#[source] std::io::Error),
}

fn describe_close(code: &Option<u16>, reason: &str) -> String {
    match (*code, reason.is_empty()) {
        (None, _) => String::new(),
        (Some(code), true) => format!(" (code {code})"),
        (Some(code), false) => format!(" (code {code}: {reason})"),
    }
}

impl From<WsError> for TransportError {
    fn from(err: WsError) -> Self {
        match err {
            WsError::ConnectionClosed => Self::StreamEnded,
            WsError::AlreadyClosed => Self::AlreadyClosed,
            WsError::Capacity(CapacityError::MessageTooLong { size, max_size }) => {
                Self::FrameTooLarge {
                    size,
                    max: max_size,
                }
            }
            other => Self::Socket(other),
        }
    }
}

/// Tagged result of a whole client run.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Handshake(#[from] HandshakeError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("failed to listen for the interrupt signal")]
    Signal(#[source] std::io::Error),
}

impl RelayError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Handshake(_) | Self::Transport(_) | Self::Signal(_) => 1,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_closed_maps_to_stream_ended() {
        let err = TransportError::from(WsError::ConnectionClosed);
        assert!(matches!(err, TransportError::StreamEnded));
    }

    #[test]
    fn test_already_closed_maps_to_already_closed() {
        let err = TransportError::from(WsError::AlreadyClosed);
        assert!(matches!(err, TransportError::AlreadyClosed));
    }

    #[test]
    fn test_message_too_long_maps_to_frame_too_large() {
        // Arrange
        let ws_err = WsError::Capacity(CapacityError::MessageTooLong {
            size: 200,
            max_size: 100,
        });

        // Act
        let err = TransportError::from(ws_err);

        // Assert
        assert!(matches!(
            err,
            TransportError::FrameTooLarge {
                size: 200,
                max: 100
            }
        ));
    }

    #[test]
    fn test_peer_closed_message_includes_code_and_reason() {
        let err = TransportError::PeerClosed {
            code: Some(1001),
            reason: "going away".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "connection closed by peer (code 1001: going away)"
        );
    }

    #[test]
    fn test_peer_closed_message_without_code() {
        let err = TransportError::PeerClosed {
            code: None,
            reason: String::new(),
        };
        assert_eq!(err.to_string(), "connection closed by peer");
    }

    #[test]
    fn test_every_category_exits_with_status_one() {
        let errors = [
            RelayError::from(ConfigError::MissingTarget),
            RelayError::from(HandshakeError::Rejected {
                address: "ws://x".to_string(),
                status: 403,
            }),
            RelayError::from(TransportError::StreamEnded),
            RelayError::Signal(std::io::Error::other("no signal")),
        ];
        for err in errors {
            assert_eq!(err.exit_code(), 1, "{err}");
        }
    }

    #[test]
    fn test_config_error_is_transparent() {
        let err = RelayError::from(ConfigError::MissingTarget);
        assert_eq!(err.to_string(), ConfigError::MissingTarget.to_string());
    }
}
