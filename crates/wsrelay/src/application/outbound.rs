//! Outbound pump: local input lines → WebSocket Text frames.
//!
//! Reads one line at a time (newline and any `\r` stripped), sends it as a
//! single frame with no delimiter added, then echoes `>> <line>` in verbose
//! mode.  Lines go out in the order they were typed.  Input that is not
//! valid UTF-8 is still relayed, with the bad bytes replaced by U+FFFD.
//!
//! End of input is a normal finish for this pump alone: the connection stays
//! open and the inbound pump keeps printing.  A failed send ends the pump with
//! the transport error; nothing is retried.

use std::borrow::Cow;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};
use wsrelay_core::OutputFormatter;

use crate::application::error::TransportError;
use crate::application::frame_sender::FrameSender;

pub struct OutboundPump<C: ?Sized> {
    conn: Arc<C>,
    formatter: OutputFormatter,
}

impl<C: FrameSender + ?Sized> OutboundPump<C> {
    pub fn new(conn: Arc<C>, formatter: OutputFormatter) -> Self {
        Self { conn, formatter }
    }

    /// Relays every line of `input` until end of stream.
    ///
    /// Returns `Ok(())` on end of input.
    ///
    /// # Errors
    ///
    /// - The send's [`TransportError`] if a frame could not be written.
    /// - [`TransportError::Terminal`] if reading `input` or writing the echo to
    ///   `out` fails.
    pub async fn run<R, W>(&self, mut input: R, mut out: W) -> Result<(), TransportError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();
        let mut count: u64 = 0;

        loop {
            buf.clear();
            let read = input
                .read_until(b'\n', &mut buf)
                .await
                .map_err(TransportError::Terminal)?;
            if read == 0 {
                break;
            }
            let line = decode_line(&buf);
            let echo = self.formatter.sent(&line);

            if let Err(e) = self.conn.send_text(line).await {
                warn!("outbound send failed after {count} frames: {e}");
                return Err(e);
            }
            count += 1;

            if let Some(echo) = echo {
                out.write_all(echo.as_bytes())
                    .await
                    .map_err(TransportError::Terminal)?;
                out.flush().await.map_err(TransportError::Terminal)?;
            }
        }

        debug!("local input ended after {count} frames");
        Ok(())
    }
}

/// Strips the line terminator and decodes the rest as text.  Bytes that are
/// not valid UTF-8 become U+FFFD so the line is still relayed.
fn decode_line(raw: &[u8]) -> String {
    let line = raw.strip_suffix(b"\n").unwrap_or(raw);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    match String::from_utf8_lossy(line) {
        Cow::Borrowed(text) => text.to_string(),
        Cow::Owned(text) => {
            debug!("input line is not valid UTF-8; invalid bytes replaced");
            text
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
