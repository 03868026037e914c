//! Client configuration types.
//!
//! [`ClientConfig`] is the single source of truth for runtime settings.  It is
//! built once in `main.rs` from CLI arguments, before the connection is
//! dialed, and then passed by reference to the connector and copied into each
//! pump.  Nothing reads verbosity or relay direction from global state.
//!
//! # Output mode vs. relay mode
//!
//! Two independent switches:
//!
//! - [`OutputMode`] only changes how things are *printed* (prefixes and
//!   lifecycle notices).
//! - [`RelayMode`] decides whether local input is relayed at all.
//!
//! A quiet client still sends what you type unless it is also receive-only.

use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::domain::headers::HeaderSet;

/// Bytes of an inbound frame printed before the rest is cut off.
pub const DEFAULT_DISPLAY_LIMIT: usize = 16 * 1024;

/// Largest inbound message accepted from the peer (16 MiB).
pub const DEFAULT_MAX_FRAME_SIZE: usize = 16 << 20;

/// Upper bound on the best-effort Close handshake during shutdown.
pub const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_millis(1000);

/// Errors raised while validating startup configuration.
///
/// These are always reported before any connection attempt is made, and the
/// process exits with status 1.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// No target address was given, or it was blank.
    #[error("missing url (usage: wsrelay -u <URL> [-o <ORIGIN>] [-H \"Name: Value\"]... [-q] [-r])")]
    MissingTarget,

    /// The origin string is not an absolute URI.
    #[error("failed to parse origin URL '{origin}'")]
    InvalidOrigin {
        origin: String,
        #[source]
        source: url::ParseError,
    },

    /// A header line had no colon or an empty name.
    #[error("malformed header '{0}': expected \"Name: Value\"")]
    MalformedHeader(String),

    /// A header parsed, but its name or value is not legal in an HTTP request.
    #[error("invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },
}

/// Verbosity of everything written to standard output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Lifecycle notices plus `>>` / `<<` prefixes on relayed lines.
    #[default]
    Verbose,
    /// Only raw inbound payloads, one per line.  No notices, no echo.
    Quiet,
}

impl OutputMode {
    pub fn from_quiet_flag(quiet: bool) -> Self {
        if quiet {
            Self::Quiet
        } else {
            Self::Verbose
        }
    }

    pub fn is_quiet(self) -> bool {
        self == Self::Quiet
    }
}

/// Which relay directions are active once connected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RelayMode {
    /// Local input lines are sent; inbound frames are printed.
    #[default]
    Duplex,
    /// Inbound frames are printed; standard input is never read.
    ReceiveOnly,
}

impl RelayMode {
    /// Returns `true` when the outbound pump should run.
    pub fn sends_input(self) -> bool {
        self == Self::Duplex
    }
}

/// Explicit size contract for inbound frames.
///
/// The transport always assembles a complete message up to `max_frame_size`
/// and fails the connection beyond it.  `display_limit` only affects how much
/// of a received payload is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLimits {
    pub display_limit: usize,
    pub max_frame_size: usize,
}

impl Default for FrameLimits {
    fn default() -> Self {
        Self {
            display_limit: DEFAULT_DISPLAY_LIMIT,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

impl FrameLimits {
    /// Cuts `payload` to at most `display_limit` bytes.
    ///
    /// Returns the printable prefix and the number of bytes dropped.
    ///
    /// ```rust
    /// use wsrelay_core::FrameLimits;
    ///
    /// let limits = FrameLimits { display_limit: 4, ..FrameLimits::default() };
    /// assert_eq!(limits.clip(b"abcdef"), (&b"abcd"[..], 2));
    /// assert_eq!(limits.clip(b"ab"), (&b"ab"[..], 0));
    /// ```
    pub fn clip<'a>(&self, payload: &'a [u8]) -> (&'a [u8], usize) {
        if payload.len() <= self.display_limit {
            (payload, 0)
        } else {
            (
                &payload[..self.display_limit],
                payload.len() - self.display_limit,
            )
        }
    }
}

/// All runtime configuration for one client session.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket endpoint to dial (`ws://host:port/path`).  `None` when the
    /// user gave no URL; rejected by [`ClientConfig::connect_target`].
    pub target: Option<String>,

    /// Raw origin string, parsed as a URI during validation.
    pub origin: Option<String>,

    /// Extra handshake headers, in the order given.
    pub headers: HeaderSet,

    pub output_mode: OutputMode,

    pub relay_mode: RelayMode,

    pub limits: FrameLimits,

    /// How long shutdown waits for the Close frame to be written.
    pub close_timeout: Duration,
}

/// Validated, ready-to-dial connection parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectTarget {
    pub address: String,
    pub origin: Option<Url>,
    pub headers: HeaderSet,
}

impl ConnectTarget {
    /// Value for the handshake `Origin` header, if an origin was given.
    ///
    /// A bare `scheme://host` origin is sent without the trailing slash the
    /// URL parser adds, which is the form browsers use.
    pub fn origin_header(&self) -> Option<String> {
        self.origin.as_ref().map(|origin| {
            let text = origin.as_str();
            if origin.path() == "/" && origin.query().is_none() && origin.fragment().is_none() {
                text.trim_end_matches('/').to_string()
            } else {
                text.to_string()
            }
        })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            target: None,
            origin: None,
            headers: HeaderSet::new(),
            output_mode: OutputMode::default(),
            relay_mode: RelayMode::default(),
            limits: FrameLimits::default(),
            close_timeout: DEFAULT_CLOSE_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Creates a config for `target` with every other setting at its default.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: Some(target.into()),
            ..Default::default()
        }
    }

    /// Validates the address and origin and returns the parameters the
    /// connector dials with.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingTarget`] if the target is absent or blank.
    /// - [`ConfigError::InvalidOrigin`] if an origin was given and is not an
    ///   absolute URI.
    pub fn connect_target(&self) -> Result<ConnectTarget, ConfigError> {
        let address = self
            .target
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingTarget)?;

        let origin = match self.origin.as_deref() {
            Some(raw) => Some(Url::parse(raw).map_err(|source| ConfigError::InvalidOrigin {
                origin: raw.to_string(),
                source,
            })?),
            None => None,
        };

        Ok(ConnectTarget {
            address: address.to_string(),
            origin,
            headers: self.headers.clone(),
        })
    }

    /// Builds the output formatter every component shares.
    pub fn formatter(&self) -> crate::domain::output::OutputFormatter {
        crate::domain::output::OutputFormatter::new(self.output_mode, self.limits)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
