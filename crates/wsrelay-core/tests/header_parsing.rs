//! Integration tests for building a [`ClientConfig`] from raw command-line
//! strings, the way `main.rs` does it.
//!
//! These exercise the public API only: header lines go through
//! [`HeaderSet::from_lines`], the origin through
//! [`ClientConfig::connect_target`], and nothing touches a socket.

use wsrelay_core::{ClientConfig, ConfigError, HeaderSet, OutputMode, RelayMode};

/// Whitespace of any shape around the colon is stripped from both sides.
#[test]
fn test_header_whitespace_variants_all_normalise() {
    let variants = [
        "X-Key:value",
        "X-Key: value",
        "X-Key :value",
        " X-Key\t:\tvalue ",
        "X-Key   :   value   ",
    ];

    for line in variants {
        let (name, value) = HeaderSet::parse_line(line).unwrap();
        assert_eq!(name, "X-Key", "name from {line:?}");
        assert_eq!(value, "value", "value from {line:?}");
    }
}

/// Repeated `-H` flags with the same name produce separate entries, in order.
#[test]
fn test_repeated_header_names_are_preserved() {
    // Arrange
    let mut cfg = ClientConfig::new("ws://127.0.0.1:9000/");
    cfg.headers = HeaderSet::from_lines([
        "Sec-WebSocket-Protocol: chat",
        "Sec-WebSocket-Protocol: superchat",
    ])
    .unwrap();

    // Act
    let target = cfg.connect_target().unwrap();

    // Assert
    assert_eq!(target.headers.len(), 2);
    assert_eq!(
        target.headers.get_all("sec-websocket-protocol"),
        vec!["chat", "superchat"]
    );
}

/// A header line without a colon is a configuration error, not a panic.
#[test]
fn test_header_without_colon_is_config_error() {
    let err = HeaderSet::from_lines(["Authorization Bearer xyz"]).unwrap_err();
    assert!(matches!(err, ConfigError::MalformedHeader(_)));
    assert!(err.to_string().contains("Authorization Bearer xyz"));
}

/// The missing-target error carries a usage hint for the error stream.
#[test]
fn test_missing_target_message_contains_usage() {
    let err = ClientConfig::default().connect_target().unwrap_err();
    assert_eq!(err, ConfigError::MissingTarget);
    assert!(err.to_string().contains("usage"));
}

/// Quiet output and receive-only relay are independent switches.
#[test]
fn test_quiet_does_not_imply_receive_only() {
    let mut cfg = ClientConfig::new("ws://127.0.0.1:9000/");
    cfg.output_mode = OutputMode::Quiet;

    assert_eq!(cfg.relay_mode, RelayMode::Duplex);
    assert!(cfg.relay_mode.sends_input());
    assert!(cfg.formatter().sent("x").is_none());
}
