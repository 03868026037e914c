//! Session runner: races the inbound pump, the outbound pump, and the
//! shutdown coordinator over one open connection.
//!
//! ```text
//!                 ┌──────────────────────┐
//!   stdin ──────▶ │ OutboundPump (task)  │ ──▶ FrameSender ──┐
//!                 └──────────────────────┘                   │
//!                 ┌──────────────────────┐                   ▼
//!   SIGINT ─────▶ │ ShutdownCoordinator  │ ──▶ close()   connection
//!                 │ (task)               │                   │
//!                 └──────────────────────┘                   │
//!                 ┌──────────────────────┐                   │
//!   stdout ◀───── │ InboundPump (here)   │ ◀── frames ───────┘
//!                 └──────────────────────┘
//! ```
//!
//! The session ends as soon as one of these happens:
//!
//! - the coordinator handles an interrupt → `Ok(SessionEnd::Interrupted)`,
//! - the inbound pump hits a terminal read error → `Err(Transport)`,
//! - the outbound pump fails to send → `Err(Transport)`.
//!
//! A transport error seen after the coordinator has fired is the close
//! racing the pumps, so the session still ends as `Interrupted`.
//!
//! End of local input is *not* one of them: the session carries on
//! receive-only.  The remaining tasks are aborted when the session resolves,
//! and the binary exits the process right after.  A connection the peer
//! already closed is left alone; any other error closes it first, bounded
//! by the close timeout.

use std::io;
use std::sync::Arc;

use futures_util::Stream;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use tokio::task::{JoinError, JoinHandle};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tracing::{debug, info};
use wsrelay_core::{ClientConfig, OutputFormatter, RelayMode};

use crate::application::error::{RelayError, TransportError};
use crate::application::frame_sender::FrameSender;
use crate::application::inbound::InboundPump;
use crate::application::outbound::OutboundPump;
use crate::application::shutdown::ShutdownCoordinator;

/// How a session ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// An interrupt was handled and the connection closed.
    Interrupted,
}

impl SessionEnd {
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Interrupted => 0,
        }
    }
}

/// One relay session over an already-open connection.
pub struct Session<C: ?Sized> {
    conn: Arc<C>,
    formatter: OutputFormatter,
    relay_mode: RelayMode,
}

impl<C> Session<C>
where
    C: FrameSender + ?Sized + 'static,
{
    pub fn new(conn: Arc<C>, config: &ClientConfig) -> Self {
        Self {
            conn,
            formatter: config.formatter(),
            relay_mode: config.relay_mode,
        }
    }

    /// Runs the session to completion.
    ///
    /// - `frames`  – inbound half of the connection.
    /// - `signals` – interrupt source (see
    ///   [`crate::application::shutdown::interrupt_signals`]).
    /// - `input`   – local line source; never read in receive-only mode.
    /// - `output`  – makes one writer per component (e.g. `tokio::io::stdout`).
    ///
    /// # Errors
    ///
    /// Returns the [`RelayError`] that ended the session.
    pub async fn run<F, Sig, In, W, Mk>(
        self,
        frames: F,
        signals: Sig,
        input: In,
        output: Mk,
    ) -> Result<SessionEnd, RelayError>
    where
        F: Stream<Item = Result<Message, WsError>> + Unpin,
        Sig: Stream<Item = io::Result<()>> + Unpin + Send + 'static,
        In: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
        Mk: Fn() -> W,
    {
        let Self {
            conn,
            formatter,
            relay_mode,
        } = self;

        let coordinator = ShutdownCoordinator::new(Arc::clone(&conn), formatter);
        let shutdown = coordinator.guard();
        let mut coordinator_task = tokio::spawn(coordinator.run(signals, output()));

        let outbound_task: Option<JoinHandle<Result<(), TransportError>>> =
            if relay_mode.sends_input() {
                let pump = OutboundPump::new(Arc::clone(&conn), formatter);
                let out = output();
                Some(tokio::spawn(async move {
                    pump.run(BufReader::new(input), out).await
                }))
            } else {
                debug!("receive-only mode; local input is not read");
                None
            };
        let outbound_abort = outbound_task.as_ref().map(JoinHandle::abort_handle);

        let outbound_failure = async move {
            let Some(task) = outbound_task else {
                return std::future::pending::<TransportError>().await;
            };
            match task.await {
                Ok(Ok(())) => {
                    info!("local input closed; continuing receive-only");
                    std::future::pending::<TransportError>().await
                }
                Ok(Err(e)) => e,
                Err(join_err) => TransportError::Terminal(io::Error::other(join_err)),
            }
        };

        let inbound = InboundPump::new(formatter);

        let mut result = tokio::select! {
            joined = &mut coordinator_task => coordinator_outcome(joined),
            err = inbound.run(frames, output()) => Err(RelayError::from(err)),
            err = outbound_failure => Err(RelayError::from(err)),
        };

        // A pump that lost the race to an interrupt only saw the close.
        if matches!(result, Err(RelayError::Transport(_))) && shutdown.has_fired() {
            if let Err(e) = &result {
                debug!("transport ended during shutdown: {e}");
            }
            result = coordinator_outcome((&mut coordinator_task).await);
        }

        coordinator_task.abort();
        if let Some(handle) = outbound_abort {
            handle.abort();
        }
        if let Err(e) = &result {
            if peer_already_gone(e) {
                debug!("peer ended the connection; skipping close handshake");
            } else {
                conn.close().await;
            }
        }

        result
    }
}

/// The peer closed or dropped the socket, so there is nothing to close and
/// waiting out the close timeout would only delay exit.
fn peer_already_gone(err: &RelayError) -> bool {
    matches!(
        err,
        RelayError::Transport(TransportError::PeerClosed { .. } | TransportError::StreamEnded)
    )
}

fn coordinator_outcome(
    joined: Result<Result<(), RelayError>, JoinError>,
) -> Result<SessionEnd, RelayError> {
    match joined {
        Ok(Ok(())) => Ok(SessionEnd::Interrupted),
        Ok(Err(e)) => Err(e),
        Err(join_err) => Err(RelayError::Signal(io::Error::other(join_err))),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::recording::RecordingSender;
    use futures_util::{stream, SinkExt};
    use std::time::Duration;
    use tokio::io::DuplexStream;
    use tokio_tungstenite::tungstenite::protocol::Role;
    use tokio_tungstenite::WebSocketStream;
    use wsrelay_core::OutputMode;

    async fn ws_pair() -> (WebSocketStream<DuplexStream>, WebSocketStream<DuplexStream>) {
        let (a, b) = tokio::io::duplex(64 * 1024);
        let client = WebSocketStream::from_raw_socket(a, Role::Client, None).await;
        let server = WebSocketStream::from_raw_socket(b, Role::Server, None).await;
        (client, server)
    }

    fn no_signals() -> stream::Pending<io::Result<()>> {
        stream::pending()
    }

    #[test]
    fn test_interrupted_exit_code_is_zero() {
        assert_eq!(SessionEnd::Interrupted.exit_code(), 0);
    }

    #[tokio::test]
    async fn test_interrupt_ends_session_successfully() {
        // Arrange
        let (client, _server) = ws_pair().await;
        let conn = Arc::new(RecordingSender::new());
        let cfg = ClientConfig::new("ws://unused");
        let (_keep, idle_input) = tokio::io::duplex(64);

        // Act
        let end = Session::new(Arc::clone(&conn), &cfg)
            .run(
                client,
                stream::iter(vec![Ok(())]),
                idle_input,
                tokio::io::sink,
            )
            .await;

        // Assert
        assert_eq!(end.unwrap(), SessionEnd::Interrupted);
        assert_eq!(conn.close_calls(), 1);
    }

    #[tokio::test]
    async fn test_end_of_input_keeps_receiving() {
        // Arrange: stdin is already at EOF; the peer speaks a little later.
        let (client, mut server) = ws_pair().await;
        let conn = Arc::new(RecordingSender::new());
        let cfg = ClientConfig::new("ws://unused");
        let peer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            server.send(Message::Text("late".into())).await.unwrap();
            server.close(None).await.unwrap();
        });

        // Act
        let end = Session::new(Arc::clone(&conn), &cfg)
            .run(client, no_signals(), tokio::io::empty(), tokio::io::sink)
            .await;
        peer.await.unwrap();

        // Assert: the session ended on the peer's close, not on stdin EOF.
        assert!(matches!(
            end,
            Err(RelayError::Transport(TransportError::PeerClosed { .. }))
        ));
    }

    #[tokio::test]
    async fn test_outbound_send_failure_ends_session() {
        // Arrange
        let (client, _server) = ws_pair().await;
        let conn = Arc::new(RecordingSender::failing());
        let cfg = ClientConfig::new("ws://unused");

        // Act
        let end = tokio::time::timeout(
            Duration::from_secs(5),
            Session::new(Arc::clone(&conn), &cfg).run(
                client,
                no_signals(),
                &b"hello\n"[..],
                tokio::io::sink,
            ),
        )
        .await
        .expect("session must end on a failed send");

        // Assert
        assert!(matches!(
            end,
            Err(RelayError::Transport(TransportError::AlreadyClosed))
        ));
    }

    #[tokio::test]
    async fn test_receive_only_never_sends() {
        // Arrange
        let (client, mut server) = ws_pair().await;
        let conn = Arc::new(RecordingSender::new());
        let mut cfg = ClientConfig::new("ws://unused");
        cfg.relay_mode = RelayMode::ReceiveOnly;
        cfg.output_mode = OutputMode::Quiet;
        let peer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            server.close(None).await.unwrap();
        });

        // Act
        let _ = Session::new(Arc::clone(&conn), &cfg)
            .run(client, no_signals(), &b"ignored\n"[..], tokio::io::sink)
            .await;
        peer.await.unwrap();

        // Assert
        assert!(conn.sent().is_empty());
    }

    #[tokio::test]
    async fn test_peer_close_skips_local_close() {
        // Arrange
        let (client, mut server) = ws_pair().await;
        let conn = Arc::new(RecordingSender::new());
        let cfg = ClientConfig::new("ws://unused");
        let (_keep, idle_input) = tokio::io::duplex(64);
        server.close(None).await.unwrap();

        // Act
        let end = Session::new(Arc::clone(&conn), &cfg)
            .run(client, no_signals(), idle_input, tokio::io::sink)
            .await;

        // Assert: ended on the peer's close without a second close handshake.
        assert!(matches!(
            end,
            Err(RelayError::Transport(TransportError::PeerClosed { .. }))
        ));
        assert_eq!(conn.close_calls(), 0);
    }

    #[tokio::test]
    async fn test_send_failure_still_closes_connection() {
        let (client, _server) = ws_pair().await;
        let conn = Arc::new(RecordingSender::failing());
        let cfg = ClientConfig::new("ws://unused");

        let end = Session::new(Arc::clone(&conn), &cfg)
            .run(client, no_signals(), &b"x\n"[..], tokio::io::sink)
            .await;

        assert!(end.is_err());
        assert_eq!(conn.close_calls(), 1);
    }
}
