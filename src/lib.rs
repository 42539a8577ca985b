//! # apiforge
//!
//! The core of an API testing client, similar to Postman/Insomnia.
//!
//! ## Features
//! - HTTP methods: GET, POST, PUT, PATCH, DELETE, HEAD, OPTIONS
//! - Raw, JSON, url-encoded and multipart bodies
//! - Auth: Bearer, Basic, API key (header or query), OAuth2 token, Digest
//! - Response classification (JSON, text, binary) with timing and size
//! - Request history, collection import/export
//! - cURL import/export
//!
//! ## Architecture
//! Actor-based with channels:
//! - Compiler - pure request definition to dispatch-ready request
//! - App Layer (State machine) - editor state, publishes view snapshots
//! - Network Layer (Tokio runtime) - sends and interprets responses

pub mod app;
pub mod compiler;
pub mod config;
pub mod constants;
pub mod curl;
pub mod error;
pub mod messages;
pub mod models;
pub mod network;
pub mod storage;
pub mod ui;

// Re-export commonly used types
pub use app::{AppActor, AppState};
pub use compiler::{compile, encode_body, merge_headers, resolve_auth, CompiledRequest, Payload};
pub use config::ClientConfig;
pub use curl::{parse_curl, to_curl};
pub use error::{CompileError, ImportError, TransportError};
pub use messages::{EditorEvent, NetworkCommand, NetworkResponse, ViewState};
pub use models::{AuthConfig, CollectionExport, Header, HttpMethod, RequestBody, RequestDefinition};
pub use network::{
    execute_request, format_size, Interpreter, NetworkActor, ReqwestTransport, ResponseRecord,
    Transport,
};
