//! WebSocket frame codec for the query channel.
//!
//! Requests go out as JSON text frames. Replies are expected as JSON text
//! frames too; control frames (ping, pong, raw frames) carry nothing for the
//! launcher and decode to `None`.

use aether_types::{QueryReply, QueryRequest};
use tokio_tungstenite::tungstenite::Message;

/// Maximum reply size (1 MB). Launcher result sets are small.
const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Encode a query into a text frame.
///
/// # Errors
///
/// Returns `CodecError::Json` if serialization fails.
pub fn encode_request(request: &QueryRequest) -> Result<Message, CodecError> {
    let json = serde_json::to_string(request)?;
    Ok(Message::Text(json.into()))
}

/// Decode one incoming frame.
///
/// Returns `Ok(None)` for frames that carry no reply.
///
/// # Errors
///
/// Returns an error for oversized, non-UTF-8, or malformed reply frames, and
/// `CodecError::Closed` when the peer sent a close frame.
pub fn decode_reply(frame: Message) -> Result<Option<QueryReply>, CodecError> {
    match frame {
        Message::Text(text) => {
            if text.len() > MAX_MESSAGE_SIZE {
                return Err(CodecError::MessageTooLarge(text.len()));
            }
            Ok(Some(serde_json::from_str(&text)?))
        }
        Message::Binary(bytes) => {
            if bytes.len() > MAX_MESSAGE_SIZE {
                return Err(CodecError::MessageTooLarge(bytes.len()));
            }
            let text = std::str::from_utf8(&bytes)?;
            Ok(Some(serde_json::from_str(text)?))
        }
        Message::Close(_) => Err(CodecError::Closed),
        Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => Ok(None),
    }
}

/// Errors that can occur during codec operations
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Message too large: {0} bytes (max: {MAX_MESSAGE_SIZE})")]
    MessageTooLarge(usize),

    #[error("Peer closed the channel")]
    Closed,
}
