//! Typed errors for the request pipeline and collection import.
//!
//! Only [`CompileError`] ever interrupts a send. Transport failures are
//! folded into a synthetic response record by the interpreter, so
//! [`TransportError`] never reaches callers of the pipeline.

use thiserror::Error;

use crate::constants::INVALID_JSON_BODY;

/// Raised while turning a request definition into a wire request
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// Body declared as JSON but its content does not parse
    #[error("{}", INVALID_JSON_BODY)]
    BodyEncoding { reason: String },
}

/// Kind of transport failure, for callers that want to branch on it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Timeout,
    Connect,
    Request,
    Body,
}

/// The transport could not produce a response
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        TransportError {
            kind,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::new(TransportErrorKind::Timeout, "Request timed out")
        } else if e.is_connect() {
            TransportError::new(TransportErrorKind::Connect, format!("Connection failed: {}", e))
        } else if e.is_body() || e.is_decode() {
            TransportError::new(TransportErrorKind::Body, format!("Error reading body: {}", e))
        } else {
            TransportError::new(TransportErrorKind::Request, format!("Request failed: {}", e))
        }
    }
}

/// Raised when an import document is not a collection export
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Invalid import data format")]
    InvalidFormat(#[source] Option<serde_json::Error>),
    #[error("failed to read import file: {0}")]
    Io(#[from] std::io::Error),
}
