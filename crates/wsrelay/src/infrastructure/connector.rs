//! Opening handshake: target URL + origin + extra headers → open connection.
//!
//! [`connect`] validates the configuration first, so a bad origin or header
//! fails before any network activity and before the `connecting` notice is
//! printed.  After that it makes exactly one attempt; there is no retry.
//!
//! # Request construction
//!
//! - Every user header is appended in the order given.  Repeated names are
//!   sent as repeated header lines.
//! - `Origin` is set from the configured origin and replaces any `Origin`
//!   passed as an extra header.  With no origin configured, none is sent.
//! - The negotiated frame and message size cap comes from
//!   [`FrameLimits::max_frame_size`](wsrelay_core::FrameLimits).

use std::sync::Arc;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_tungstenite::connect_async_with_config;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::header::ORIGIN;
use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue};
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tracing::{debug, info};
use wsrelay_core::{ClientConfig, ConfigError, ConnectTarget, FrameLimits};

use crate::application::error::{HandshakeError, RelayError, TransportError};
use crate::infrastructure::connection::{Connection, FrameStream};

/// Performs the opening handshake and returns the split connection.
///
/// The `connecting` and `ready` notices are written to `out` in verbose mode.
///
/// # Errors
///
/// - [`RelayError::Config`] if the target is missing or the origin or a
///   header is invalid.  Nothing is printed and no connection is attempted.
/// - [`RelayError::Handshake`] if the URL cannot be dialed or the server
///   refuses the upgrade.
/// - [`RelayError::Transport`] if a notice cannot be written.
pub async fn connect<W>(
    config: &ClientConfig,
    out: &mut W,
) -> Result<(Arc<Connection>, FrameStream), RelayError>
where
    W: AsyncWrite + Unpin,
{
    let target = config.connect_target()?;
    let request = build_request(&target)?;
    let formatter = config.formatter();

    if let Some(notice) = formatter.connecting(&target.address) {
        write_notice(out, &notice).await?;
    }

    let (ws, response) =
        connect_async_with_config(request, Some(ws_config(config.limits)), false)
            .await
            .map_err(|e| HandshakeError::from_dial(&target.address, e))?;

    info!("connected to {}", target.address);
    debug!("upgrade response: HTTP {}", response.status());

    if let Some(notice) = formatter.ready() {
        write_notice(out, &notice).await?;
    }

    Ok(Connection::split(ws, target.address, config.close_timeout))
}

/// Builds the upgrade request for `target`.
///
/// # Errors
///
/// - [`HandshakeError::Failed`] if the address is not a usable `ws://` URL.
/// - [`ConfigError::InvalidHeader`] if a header name or value is not legal
///   HTTP.
pub fn build_request(target: &ConnectTarget) -> Result<Request, RelayError> {
    let mut request = target
        .address
        .as_str()
        .into_client_request()
        .map_err(|e| HandshakeError::from_dial(&target.address, e))?;

    let headers = request.headers_mut();
    for (name, value) in target.headers.iter() {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| ConfigError::InvalidHeader {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| ConfigError::InvalidHeader {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        headers.append(header_name, header_value);
    }

    if let Some(origin) = target.origin_header() {
        let value = HeaderValue::from_str(&origin).map_err(|e| ConfigError::InvalidHeader {
            name: ORIGIN.to_string(),
            reason: e.to_string(),
        })?;
        headers.insert(ORIGIN, value);
    }

    Ok(request)
}

fn ws_config(limits: FrameLimits) -> WebSocketConfig {
    let mut cfg = WebSocketConfig::default();
    cfg.max_message_size = Some(limits.max_frame_size);
    cfg.max_frame_size = Some(limits.max_frame_size);
    cfg
}

async fn write_notice<W>(out: &mut W, notice: &str) -> Result<(), TransportError>
where
    W: AsyncWrite + Unpin,
{
    out.write_all(notice.as_bytes())
        .await
        .map_err(TransportError::Terminal)?;
    out.flush().await.map_err(TransportError::Terminal)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
