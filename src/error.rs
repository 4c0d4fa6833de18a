use std::fmt;

use crate::{api, http::HttpResponse};

pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy of the protocol engine.
///
/// Protocol-level failures are never retried outside the explicit bounded
/// polling loops; the only swallowed failure is the defensive parse of an
/// unparseable problem document, which falls back to a generic message.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing required directory resource or configuration value.
    ///
    /// Raised before any mutating network call.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Non-success status on a mutating or polling call.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Challenge token failed charset validation.
    #[error("challenge token contains characters outside [A-Za-z0-9_-]: {0:?}")]
    InvalidToken(String),

    /// No challenge combination is satisfiable by the registered
    /// authenticators.
    #[error("no usable challenge combination for registered authenticators")]
    NoUsableChallenge,

    /// Polling budget exhausted while the resource was still pending.
    #[error("still pending after {attempts} poll attempts")]
    Timeout { attempts: usize },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PEM error: {0}")]
    Pem(#[from] pem::Error),

    #[error("key error: {0}")]
    Key(String),
}

/// A rejected protocol exchange, with the provider's problem document when
/// one could be parsed out of the response body.
#[derive(Debug)]
pub struct ProtocolError {
    pub message: String,
    pub problem: Option<api::Problem>,
}

impl ProtocolError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        ProtocolError {
            message: message.into(),
            problem: None,
        }
    }

    /// Builds a protocol error from a rejected response, keeping the
    /// provider's structured `{type, detail, status}` object when the body
    /// parses as one. A body that fails to parse is reported by HTTP status
    /// alone.
    pub(crate) fn from_response(message: impl Into<String>, res: &HttpResponse) -> Self {
        ProtocolError {
            message: format!("{} (HTTP {})", message.into(), res.status),
            problem: api::Problem::from_body(&res.body),
        }
    }

    /// Provider-supplied detail text, when present.
    pub fn detail(&self) -> Option<&str> {
        self.problem.as_ref().and_then(|p| p.detail.as_deref())
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.problem {
            Some(problem) => write!(f, "{}: {problem}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ProtocolError {}
