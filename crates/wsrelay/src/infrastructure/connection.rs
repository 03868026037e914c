//! The single open WebSocket connection.
//!
//! After the handshake the stream is split in two:
//!
//! - the **write half** lives inside [`Connection`], behind an async mutex, and
//!   is shared by the outbound pump (sends) and the shutdown coordinator
//!   (close);
//! - the **read half** ([`FrameStream`]) is handed to the inbound pump, which
//!   owns it exclusively.
//!
//! # Close safety
//!
//! `close` may run while a send is waiting on the mutex or a read is pending
//! on the other half.  An atomic `closed` flag makes the first close the only
//! one that touches the socket; later sends fail with
//! [`TransportError::AlreadyClosed`] without locking; a pending read sees the
//! peer's Close reply or the socket ending, which the inbound pump treats as
//! terminal.  The Close handshake itself is bounded by a timeout so a stalled
//! peer cannot hold up shutdown.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

use crate::application::error::TransportError;
use crate::application::frame_sender::FrameSender;

/// Read half of a connection, consumed by the inbound pump.
pub type FrameStream<S = MaybeTlsStream<TcpStream>> = SplitStream<WebSocketStream<S>>;

/// Write half of the connection plus its close-once guard.
pub struct Connection<S = MaybeTlsStream<TcpStream>> {
    sink: Mutex<SplitSink<WebSocketStream<S>, Message>>,
    closed: AtomicBool,
    close_timeout: Duration,
    remote: String,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    /// Splits an open WebSocket into the shared write side and the read side.
    pub fn split(
        ws: WebSocketStream<S>,
        remote: impl Into<String>,
        close_timeout: Duration,
    ) -> (Arc<Self>, FrameStream<S>) {
        let (sink, stream) = ws.split();
        let conn = Arc::new(Self {
            sink: Mutex::new(sink),
            closed: AtomicBool::new(false),
            close_timeout,
            remote: remote.into(),
        });
        (conn, stream)
    }
}

#[async_trait]
impl<S> FrameSender for Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    async fn send_text(&self, text: String) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::AlreadyClosed);
        }
        let mut sink = self.sink.lock().await;
        sink.send(Message::Text(text)).await.map_err(TransportError::from)
    }

    async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            debug!("connection to {} already closed", self.remote);
            return;
        }

        let closing = async {
            let mut sink = self.sink.lock().await;
            sink.close().await
        };
        match timeout(self.close_timeout, closing).await {
            Ok(Ok(())) => debug!("sent close frame to {}", self.remote),
            Ok(Err(e)) => debug!("close frame to {} not delivered: {e}", self.remote),
            Err(_) => warn!(
                "close to {} timed out after {:?}",
                self.remote, self.close_timeout
            ),
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::DuplexStream;
    use tokio_tungstenite::tungstenite::protocol::Role;

    async fn connected() -> (
        Arc<Connection<DuplexStream>>,
        FrameStream<DuplexStream>,
        WebSocketStream<DuplexStream>,
    ) {
        let (a, b) = tokio::io::duplex(64 * 1024);
        let client = WebSocketStream::from_raw_socket(a, Role::Client, None).await;
        let server = WebSocketStream::from_raw_socket(b, Role::Server, None).await;
        let (conn, frames) = Connection::split(client, "test-peer", Duration::from_secs(1));
        (conn, frames, server)
    }

    #[tokio::test]
    async fn test_send_text_arrives_as_one_text_frame() {
        // Arrange
        let (conn, _frames, mut server) = connected().await;

        // Act
        conn.send_text("hello".to_string()).await.unwrap();

        // Assert: exactly the bytes typed, no trailing newline.
        let msg = server.next().await.unwrap().unwrap();
        assert_eq!(msg, Message::Text("hello".into()));
    }

    #[tokio::test]
    async fn test_close_sends_one_close_frame() {
        // Arrange
        let (conn, _frames, mut server) = connected().await;

        // Act: close three times.
        conn.close().await;
        conn.close().await;
        conn.close().await;

        // Assert
        assert!(conn.is_closed());
        let msg = server.next().await.unwrap().unwrap();
        assert!(matches!(msg, Message::Close(_)));
    }

    #[tokio::test]
    async fn test_send_after_close_fails_without_touching_socket() {
        let (conn, _frames, _server) = connected().await;
        conn.close().await;

        let result = conn.send_text("late".to_string()).await;

        assert!(matches!(result, Err(TransportError::AlreadyClosed)));
    }

    #[tokio::test]
    async fn test_close_during_pending_read_ends_the_read() {
        // Arrange: a reader blocked on the inbound half.
        let (conn, mut frames, mut server) = connected().await;
        let reader = tokio::spawn(async move { frames.next().await });

        // Act: close locally, then the peer goes away.
        conn.close().await;
        let from_client = server.next().await.unwrap().unwrap();
        assert!(matches!(from_client, Message::Close(_)));
        drop(server);

        // Assert: the pending read resolves with a terminal item instead of hanging.
        let item = timeout(Duration::from_secs(5), reader)
            .await
            .expect("read must not hang")
            .unwrap();
        assert!(!matches!(item, Some(Ok(Message::Text(_)))));
    }
}
