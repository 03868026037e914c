//! Inbound pump: WebSocket frames → standard output.
//!
//! This is the session's primary loop.  It reads one message at a time and
//! prints it through the [`OutputFormatter`]: `<< <payload>` in verbose mode,
//! the bare payload in quiet mode, one line per frame, in arrival order.
//!
//! # Frame kinds
//!
//! | Frame   | Action                                            |
//! |---------|---------------------------------------------------|
//! | Text    | printed                                           |
//! | Binary  | printed, decoded lossily as UTF-8                 |
//! | Ping    | logged at debug; tungstenite queues the Pong      |
//! | Pong    | logged at debug                                   |
//! | Close   | ends the pump with [`TransportError::PeerClosed`] |
//!
//! # Termination
//!
//! The pump never finishes cleanly.  Any read error, a Close frame, the end
//! of the stream, or the connection being closed by the shutdown coordinator
//! is terminal, and [`InboundPump::run`] returns the error that stopped it.
//!
//! # Frame size
//!
//! tungstenite always assembles the whole message (bounded by the connection's
//! `max_message_size`).  Only the *printed* text is cut at the display limit;
//! a warning records how many bytes were dropped.

use futures_util::{Stream, StreamExt};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tracing::{debug, warn};
use wsrelay_core::OutputFormatter;

use crate::application::error::TransportError;

pub struct InboundPump {
    formatter: OutputFormatter,
}

impl InboundPump {
    pub fn new(formatter: OutputFormatter) -> Self {
        Self { formatter }
    }

    /// Prints frames from `frames` until something terminal happens, and
    /// returns that terminal condition.
    pub async fn run<S, W>(&self, mut frames: S, mut out: W) -> TransportError
    where
        S: Stream<Item = Result<Message, WsError>> + Unpin,
        W: AsyncWrite + Unpin,
    {
        loop {
            let message = match frames.next().await {
                Some(Ok(message)) => message,
                Some(Err(e)) => {
                    debug!("inbound read failed: {e}");
                    return TransportError::from(e);
                }
                None => {
                    debug!("inbound stream ended");
                    return TransportError::StreamEnded;
                }
            };

            let printed = match message {
                Message::Text(text) => self.print(text.as_bytes(), &mut out).await,
                Message::Binary(data) => self.print(&data, &mut out).await,
                Message::Ping(data) => {
                    debug!("ping from peer ({} bytes)", data.len());
                    Ok(())
                }
                Message::Pong(data) => {
                    debug!("pong from peer ({} bytes)", data.len());
                    Ok(())
                }
                Message::Close(frame) => {
                    let (code, reason) = match frame {
                        Some(frame) => (Some(u16::from(frame.code)), frame.reason.to_string()),
                        None => (None, String::new()),
                    };
                    debug!("close frame from peer: code={code:?} reason={reason:?}");
                    return TransportError::PeerClosed { code, reason };
                }
                Message::Frame(_) => Ok(()),
            };

            if let Err(e) = printed {
                return TransportError::Terminal(e);
            }
        }
    }

    async fn print<W>(&self, payload: &[u8], out: &mut W) -> std::io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let rendered = self.formatter.received(payload);
        if rendered.dropped > 0 {
            warn!(
                "inbound frame of {} bytes truncated to the {} byte display limit",
                payload.len(),
                self.formatter.limits().display_limit
            );
        }
        out.write_all(rendered.text.as_bytes()).await?;
        out.flush().await
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
