//! Error types for tagforge.

use thiserror::Error;

/// Result type alias using tagforge's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for tagforge operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Broker operation failed (wraps lapin::Error)
    #[error("Broker error: {0}")]
    Broker(#[from] lapin::Error),

    /// Identity negotiation or registration with the meta-manager failed
    #[error("Registration error: {0}")]
    Registration(String),

    /// Message payload could not be decoded (base64, missing fields)
    #[error("Decode error: {0}")]
    Decode(String),

    /// Content extraction failed
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Audio transcription failed
    #[error("Transcription error: {0}")]
    Transcription(String),

    /// Inference/generation failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

impl From<base64::DecodeError> for Error {
    fn from(e: base64::DecodeError) -> Self {
        Error::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_registration() {
        let err = Error::Registration("no response from meta-manager".to_string());
        assert_eq!(
            err.to_string(),
            "Registration error: no response from meta-manager"
        );
    }

    #[test]
    fn test_error_display_decode() {
        let err = Error::Decode("missing field: status_id".to_string());
        assert_eq!(err.to_string(), "Decode error: missing field: status_id");
    }

    #[test]
    fn test_error_display_extraction() {
        let err = Error::Extraction("caption backend unreachable".to_string());
        assert_eq!(
            err.to_string(),
            "Extraction error: caption backend unreachable"
        );
    }

    #[test]
    fn test_error_display_transcription() {
        let err = Error::Transcription("window 3 failed".to_string());
        assert_eq!(err.to_string(), "Transcription error: window 3 failed");
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("bad RABBIT_PORT".to_string());
        assert_eq!(err.to_string(), "Configuration error: bad RABBIT_PORT");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_base64_error() {
        use base64::Engine;
        let b64_err = base64::engine::general_purpose::STANDARD
            .decode("!!not base64!!")
            .unwrap_err();
        let err: Error = b64_err.into();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
