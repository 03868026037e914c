//! In-memory [`FrameSender`] for unit tests.
//!
//! Records every sent frame and counts `close` calls instead of touching a
//! socket.  Set `fail_sends` to simulate a broken connection.

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Mutex,
};

use async_trait::async_trait;

use crate::application::error::TransportError;
use crate::application::frame_sender::FrameSender;

#[derive(Default)]
pub struct RecordingSender {
    /// Text of every frame accepted by `send_text`, in order.
    pub sent: Mutex<Vec<String>>,
    /// Number of times `close` was called, including no-op repeats.
    pub close_calls: AtomicUsize,
    /// When `true`, `send_text` fails as if the connection had dropped.
    pub fail_sends: bool,
    closed: AtomicBool,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_sends: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FrameSender for RecordingSender {
    async fn send_text(&self, text: String) -> Result<(), TransportError> {
        if self.fail_sends || self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::AlreadyClosed);
        }
        self.sent.lock().unwrap().push(text);
        Ok(())
    }

    async fn close(&self) {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.closed.store(true, Ordering::SeqCst);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
