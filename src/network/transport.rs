//! The boundary between the interpreter and whatever performs the I/O

use std::future::Future;

use crate::compiler::CompiledRequest;
use crate::error::TransportError;

/// Raw response as produced by a transport, body fully read
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub status_text: String,
    /// Header pairs as received; names may repeat
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        RawResponse {
            status,
            status_text: String::new(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Executes a compiled request and reads the whole response body.
///
/// Implementations are cheap to clone and shared across concurrent sends.
/// Any failure before the body is fully read is a `TransportError`.
pub trait Transport: Clone + Send + Sync + 'static {
    fn execute(
        &self,
        request: CompiledRequest,
    ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send;
}
