//! Error types for the knowledge base core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KbError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("server error: {0}")]
    Server(String),

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("unknown method: {0}")]
    Unknown(String),

    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl KbError {
    /// The wire-protocol error kind name (spec.md §7), used by adapters
    /// that serialize `("error", kind, message)` envelopes.
    pub fn kind(&self) -> &'static str {
        match self {
            KbError::Parse(_) => "ParseError",
            KbError::Server(_) => "ServerError",
            KbError::Unsupported(_) => "Unsupported",
            KbError::Unknown(_) => "Unknown",
            KbError::TypeMismatch(_) => "TypeMismatch",
            KbError::Io(_) => "ServerError",
            KbError::Json(_) => "ParseError",
        }
    }
}

pub type Result<T> = std::result::Result<T, KbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = KbError::Parse("bad statement".to_string());
        let display = format!("{}", err);
        assert!(display.contains("parse error"));
        assert!(display.contains("bad statement"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: KbError = io_err.into();
        match err {
            KbError::Io(_) => {}
            _ => panic!("expected Io variant"),
        }
    }

    #[test]
    fn test_json_error_conversion() {
        let result: std::result::Result<serde_json::Value, serde_json::Error> =
            serde_json::from_str("{not json}");
        let json_err = result.unwrap_err();
        let err: KbError = json_err.into();
        match err {
            KbError::Json(_) => {}
            _ => panic!("expected Json variant"),
        }
    }

    #[test]
    fn test_error_kind_names() {
        assert_eq!(KbError::Parse("x".into()).kind(), "ParseError");
        assert_eq!(KbError::Server("x".into()).kind(), "ServerError");
        assert_eq!(KbError::Unsupported("x".into()).kind(), "Unsupported");
        assert_eq!(KbError::Unknown("x".into()).kind(), "Unknown");
        assert_eq!(KbError::TypeMismatch("x".into()).kind(), "TypeMismatch");
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<KbError>();
    }

    #[test]
    fn test_result_type_alias() {
        let ok_result: Result<String> = Ok("success".to_string());
        assert!(ok_result.is_ok());

        let err_result: Result<String> = Err(KbError::Unknown("nope".to_string()));
        assert!(err_result.is_err());
    }
}
