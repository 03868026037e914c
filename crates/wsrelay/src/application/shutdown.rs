//! Shutdown coordinator: turns an interrupt (Ctrl+C / SIGINT) into exactly one
//! orderly close of the connection.
//!
//! The coordinator runs beside both pumps and races them to the close.  On the
//! first interrupt it:
//!
//! 1. prints the `exiting` notice (verbose mode only),
//! 2. closes the connection, ignoring any error,
//! 3. returns, which ends the session with a success status.
//!
//! A [`ShutdownGuard`] makes this exactly-once even if interrupts arrive
//! faster than the first one is handled.  Pumps that later observe the closed
//! connection simply see a terminal transport error.

use std::io;
use std::pin::Pin;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use futures_util::{Stream, StreamExt};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};
use wsrelay_core::OutputFormatter;

use crate::application::error::RelayError;
use crate::application::frame_sender::FrameSender;

/// One-shot flag.  [`ShutdownGuard::fire`] returns `true` for exactly one caller.
#[derive(Debug, Default)]
pub struct ShutdownGuard {
    fired: AtomicBool,
}

impl ShutdownGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks shutdown as started.  Only the first call returns `true`.
    pub fn fire(&self) -> bool {
        !self.fired.swap(true, Ordering::AcqRel)
    }

    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}

/// Stream of process interrupts backed by [`tokio::signal::ctrl_c`].
///
/// Each item is one delivered interrupt, or the error raised while installing
/// the handler.
pub fn interrupt_signals() -> Pin<Box<dyn Stream<Item = io::Result<()>> + Send>> {
    Box::pin(futures_util::stream::unfold((), |()| async {
        Some((tokio::signal::ctrl_c().await, ()))
    }))
}

/// Waits for an interrupt and closes the shared connection once.
pub struct ShutdownCoordinator<C: ?Sized> {
    conn: Arc<C>,
    formatter: OutputFormatter,
    guard: Arc<ShutdownGuard>,
}

impl<C: FrameSender + ?Sized> ShutdownCoordinator<C> {
    pub fn new(conn: Arc<C>, formatter: OutputFormatter) -> Self {
        Self {
            conn,
            formatter,
            guard: Arc::new(ShutdownGuard::new()),
        }
    }

    pub fn guard(&self) -> Arc<ShutdownGuard> {
        Arc::clone(&self.guard)
    }

    /// Consumes interrupts from `signals` until the first one is acted on.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Signal`] if the signal source reports an error
    /// (the handler could not be installed).  If the source ends without ever
    /// delivering an interrupt, this future never resolves.
    pub async fn run<S, W>(self, mut signals: S, mut out: W) -> Result<(), RelayError>
    where
        S: Stream<Item = io::Result<()>> + Unpin,
        W: AsyncWrite + Unpin,
    {
        while let Some(signal) = signals.next().await {
            signal.map_err(RelayError::Signal)?;
            if self.on_interrupt(&mut out).await {
                return Ok(());
            }
        }
        debug!("interrupt source ended; shutdown coordinator idle");
        std::future::pending::<()>().await;
        Ok(())
    }

    /// Handles one interrupt.  Returns `true` if this call performed the
    /// shutdown, `false` if another call already had.
    pub async fn on_interrupt<W>(&self, out: &mut W) -> bool
    where
        W: AsyncWrite + Unpin,
    {
        if !self.guard.fire() {
            debug!("interrupt received while already shutting down");
            return false;
        }

        info!("interrupt received; closing connection");
        if let Some(notice) = self.formatter.exiting() {
            // Best-effort: the process is exiting either way.
            let _ = write_line(out, &notice).await;
        }
        self.conn.close().await;
        true
    }
}

async fn write_line<W>(out: &mut W, line: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    out.write_all(line.as_bytes()).await?;
    out.flush().await
}

// ── Tests ─────────────────────────────────────────────────────────────────────
