//! MVG client error types.

use crate::domain::GlobalId;

/// Errors from talking to the transit service.
#[derive(Debug, thiserror::Error)]
pub enum MvgError {
    /// Request could not be sent or the connection failed
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Service answered with a non-2xx status
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Body was not the JSON shape we expected
    #[error("JSON parse error: {message}")]
    Parse {
        message: String,
        body: Option<String>,
    },

    /// Station identifier could not be resolved
    #[error("station not found: {0}")]
    NotFound(GlobalId),

    /// Client could not be constructed
    #[error("invalid client configuration: {0}")]
    Config(String),
}

/// Cloneable classification of an [`MvgError`], kept in published state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ErrorKind {
    Network,
    Http { status: u16 },
    Parse,
    NotFound,
}

impl MvgError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MvgError::Network(_) | MvgError::Config(_) => ErrorKind::Network,
            MvgError::Http { status, .. } => ErrorKind::Http { status: *status },
            MvgError::Parse { .. } => ErrorKind::Parse,
            MvgError::NotFound(_) => ErrorKind::NotFound,
        }
    }

    /// Build an HTTP error using the status' reason phrase.
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        MvgError::Http {
            status: status.as_u16(),
            message: status.canonical_reason().unwrap_or("Unknown").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = MvgError::from_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "HTTP 500: Internal Server Error");
        assert_eq!(err.kind(), ErrorKind::Http { status: 500 });

        let err = MvgError::Parse {
            message: "expected value".into(),
            body: Some("<html>".into()),
        };
        assert!(err.to_string().contains("JSON parse error"));
        assert_eq!(err.kind(), ErrorKind::Parse);

        let err = MvgError::NotFound(GlobalId::parse("de:1").unwrap());
        assert_eq!(err.to_string(), "station not found: de:1");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn kind_serializes_with_tag() {
        let json = serde_json::to_value(ErrorKind::Http { status: 503 }).unwrap();
        assert_eq!(json["kind"], "http");
        assert_eq!(json["status"], 503);
    }
}
