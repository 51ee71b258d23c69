//! Error types for the aether-rpc crate.

use crate::transport::CodecError;

/// Errors raised by the query channel or the launch client
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Launch rejected with status {0}")]
    Status(u16),

    #[error("Connection closed")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(ClientError::ConnectionClosed.to_string(), "Connection closed");
        assert_eq!(
            ClientError::Status(502).to_string(),
            "Launch rejected with status 502"
        );
    }

    #[test]
    fn test_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err: ClientError = io_err.into();

        assert!(matches!(err, ClientError::Io(_)));
        assert!(err.to_string().contains("refused"));
    }

    #[test]
    fn test_error_from_codec_error() {
        let err: ClientError = CodecError::MessageTooLarge(999_999_999).into();

        assert!(matches!(err, ClientError::Codec(_)));
        assert!(err.to_string().contains("999999999"));
    }

    #[test]
    fn test_error_from_websocket_error() {
        let err: ClientError = tokio_tungstenite::tungstenite::Error::ConnectionClosed.into();
        assert!(matches!(err, ClientError::WebSocket(_)));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_error() -> Result<u64> {
            Err(ClientError::ConnectionClosed)
        }

        assert!(matches!(returns_error(), Err(ClientError::ConnectionClosed)));
    }
}
