//! Output formatting policy shared by the connector, both pumps, and the
//! shutdown coordinator.
//!
//! Every line the client writes to standard output goes through
//! [`OutputFormatter`].  Methods return `None` when the line should not be
//! printed at all in the current [`OutputMode`], so callers never branch on
//! verbosity themselves.
//!
//! | Line             | Verbose                      | Quiet        |
//! |------------------|------------------------------|--------------|
//! | connecting       | `connecting to <url>...`     | (nothing)    |
//! | ready            | `ready, exit with CTRL+C.`   | (nothing)    |
//! | exiting          | `\nexiting`                  | (nothing)    |
//! | sent line        | `>> <line>`                  | (nothing)    |
//! | received frame   | `<< <payload>`               | `<payload>`  |
//!
//! Every returned string already ends in `\n`.

use crate::domain::config::{FrameLimits, OutputMode};

/// One inbound payload rendered for printing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFrame {
    /// Text to write, newline included.
    pub text: String,
    /// Bytes cut off by the display limit (0 when the frame fit).
    pub dropped: usize,
}

/// Verbose/quiet rendering policy.  Cheap to copy into each task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputFormatter {
    mode: OutputMode,
    limits: FrameLimits,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, limits: FrameLimits) -> Self {
        Self { mode, limits }
    }

    pub fn limits(&self) -> FrameLimits {
        self.limits
    }

    /// Notice printed before the handshake starts.
    pub fn connecting(&self, address: &str) -> Option<String> {
        self.notice(format!("connecting to {address}...\n"))
    }

    /// Notice printed once the connection is open.
    pub fn ready(&self) -> Option<String> {
        self.notice("ready, exit with CTRL+C.\n".to_string())
    }

    /// Notice printed when an interrupt ends the session.  The leading
    /// newline moves past the `^C` echoed by the terminal.
    pub fn exiting(&self) -> Option<String> {
        self.notice("\nexiting\n".to_string())
    }

    /// Local echo of a line that was just sent.
    pub fn sent(&self, line: &str) -> Option<String> {
        self.notice(format!(">> {line}\n"))
    }

    /// Renders an inbound payload as text.
    ///
    /// The payload is clipped to the display limit first, then decoded as
    /// UTF-8 with invalid sequences replaced, so binary frames and a cut that
    /// lands inside a multi-byte character both still print.
    pub fn received(&self, payload: &[u8]) -> RenderedFrame {
        let (shown, dropped) = self.limits.clip(payload);
        let body = String::from_utf8_lossy(shown);
        let text = match self.mode {
            OutputMode::Verbose => format!("<< {body}\n"),
            OutputMode::Quiet => format!("{body}\n"),
        };
        RenderedFrame { text, dropped }
    }

    fn notice(&self, line: String) -> Option<String> {
        match self.mode {
            OutputMode::Verbose => Some(line),
            OutputMode::Quiet => None,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
