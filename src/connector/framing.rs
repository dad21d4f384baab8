// SPDX-License-Identifier: MIT
//! Length-prefixed JSON framing for the companion channel.
//!
//! The browser's native messaging wire format: a u32 length in native byte
//! order, followed by that many bytes of JSON. Messages from the extension
//! side are capped at 1 MiB by the WebExtensions runtime, so anything larger
//! is refused before it hits the wire.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Outbound message cap enforced by the WebExtensions runtime.
pub const MAX_OUTBOUND_BYTES: usize = 1024 * 1024;

/// Inbound cap — the runtime allows larger companion replies, but anything
/// past this is a corrupt length prefix in practice.
pub const MAX_INBOUND_BYTES: usize = 64 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum FramingError {
    #[error("channel i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("message of {0} bytes exceeds the framing limit")]
    TooLarge(usize),

    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read one framed JSON message from the stream.
pub async fn read_message<S, T>(stream: &mut S) -> Result<T, FramingError>
where
    S: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let mut prefix = [0u8; 4];
    stream.read_exact(&mut prefix).await?;
    let len = u32::from_ne_bytes(prefix) as usize;

    if len > MAX_INBOUND_BYTES {
        return Err(FramingError::TooLarge(len));
    }

    let mut buffer = vec![0u8; len];
    stream.read_exact(&mut buffer).await?;
    Ok(serde_json::from_slice(&buffer)?)
}

/// Write one framed JSON message to the stream.
pub async fn write_message<S, T>(stream: &mut S, message: &T) -> Result<(), FramingError>
where
    S: AsyncWrite + Unpin,
    T: Serialize,
{
    let payload = serde_json::to_vec(message)?;
    if payload.len() > MAX_OUTBOUND_BYTES {
        return Err(FramingError::TooLarge(payload.len()));
    }

    stream.write_all(&(payload.len() as u32).to_ne_bytes()).await?;
    stream.write_all(&payload).await?;
    stream.flush().await?;
    Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────────────
