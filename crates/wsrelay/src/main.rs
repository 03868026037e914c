//! wsrelay: interactive WebSocket client, entry point.
//!
//! Connects to one WebSocket endpoint, sends every line typed on standard
//! input as a Text frame, prints every frame received, and closes the
//! connection on Ctrl+C.
//!
//! # Usage
//!
//! ```text
//! wsrelay -u <URL> [OPTIONS]
//!
//! Options:
//!   -u, --url <URL>               WebSocket URL to connect to
//!   -o, --origin <ORIGIN>         Origin header for the handshake
//!   -H, --header <NAME: VALUE>    Extra handshake header (repeatable)
//!   -q, --quiet                   Print only received payloads
//!   -r, --receive-only            Do not read standard input
//!       --display-limit <BYTES>   Max bytes printed per frame [default: 16384]
//!       --max-frame-size <BYTES>  Max inbound message size [default: 16777216]
//!       --close-timeout-ms <MS>   Close handshake timeout [default: 1000]
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable         | Description           |
//! |------------------|-----------------------|
//! | `WSRELAY_URL`    | Same as `--url`       |
//! | `WSRELAY_ORIGIN` | Same as `--origin`    |
//! | `RUST_LOG`       | Log filter for stderr |
//!
//! # Exit status
//!
//! `0` after Ctrl+C, `1` for every error: bad configuration, failed
//! handshake, or the connection ending underneath the session.

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use wsrelay::application::{interrupt_signals, RelayError, Session, SessionEnd};
use wsrelay::infrastructure::connect;
use wsrelay_core::{
    domain::config::{DEFAULT_DISPLAY_LIMIT, DEFAULT_MAX_FRAME_SIZE},
    ClientConfig, ConfigError, FrameLimits, HeaderSet, OutputMode, RelayMode,
};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Interactive command-line WebSocket client.
#[derive(Debug, Parser)]
#[command(
    name = "wsrelay",
    about = "Send stdin lines to a WebSocket server and print what it sends back",
    version
)]
struct Cli {
    /// WebSocket URL to connect to, e.g. `ws://localhost:8080/feed`.
    ///
    /// Optional at the parser level so a missing URL is reported with exit
    /// status 1 like every other configuration error.
    #[arg(short = 'u', long, env = "WSRELAY_URL")]
    url: Option<String>,

    /// Value for the handshake `Origin` header.
    #[arg(short = 'o', long, env = "WSRELAY_ORIGIN")]
    origin: Option<String>,

    /// Extra handshake header as `"Name: Value"`.  May be repeated.
    #[arg(short = 'H', long = "header", value_name = "NAME: VALUE")]
    headers: Vec<String>,

    /// Print received payloads only: no prefixes, echoes, or notices.
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Receive only; standard input is never read.
    #[arg(short = 'r', long)]
    receive_only: bool,

    /// Bytes of each received frame printed before truncation.
    #[arg(long, default_value_t = DEFAULT_DISPLAY_LIMIT)]
    display_limit: usize,

    /// Largest inbound message accepted, in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_FRAME_SIZE)]
    max_frame_size: usize,

    /// How long to wait for the close handshake on Ctrl+C.
    #[arg(long, default_value_t = 1000)]
    close_timeout_ms: u64,
}

impl Cli {
    /// Converts the parsed arguments into a [`ClientConfig`].
    ///
    /// The URL and origin are validated later by the connector; only the
    /// header lines are parsed here.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MalformedHeader`] for a header line without a
    /// colon or with an empty name.
    fn into_client_config(self) -> Result<ClientConfig, ConfigError> {
        let headers = HeaderSet::from_lines(&self.headers)?;
        let relay_mode = if self.receive_only {
            RelayMode::ReceiveOnly
        } else {
            RelayMode::Duplex
        };

        Ok(ClientConfig {
            target: self.url,
            origin: self.origin,
            headers,
            output_mode: OutputMode::from_quiet_flag(self.quiet),
            relay_mode,
            limits: FrameLimits {
                display_limit: self.display_limit,
                max_frame_size: self.max_frame_size,
            },
            close_timeout: Duration::from_millis(self.close_timeout_ms),
        })
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// 1. Logging goes to stderr so it never mixes with relayed frames; the
///    default level is `warn`, overridable with `RUST_LOG`.
/// 2. The session runs until Ctrl+C or a terminal error.
/// 3. The process exits explicitly, because the blocking stdin reader
///    would otherwise keep the runtime alive.
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(end) => {
            debug!("session ended: {end:?}");
            end.exit_code()
        }
        Err(err) => {
            eprintln!("wsrelay: {err:#}");
            err.downcast_ref::<RelayError>()
                .map_or(1, RelayError::exit_code)
        }
    };

    std::process::exit(code);
}

async fn run(cli: Cli) -> anyhow::Result<SessionEnd> {
    let config = cli.into_client_config().map_err(RelayError::from)?;

    let mut stdout = tokio::io::stdout();
    let (conn, frames) = connect(&config, &mut stdout).await?;

    let end = Session::new(conn, &config)
        .run(
            frames,
            interrupt_signals(),
            tokio::io::stdin(),
            tokio::io::stdout,
        )
        .await
        .context("session ended")?;
    Ok(end)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
