//! Network layer - request dispatch and response interpretation
//!
//! The Network actor receives compiled requests, sends each in its own task,
//! and reports one response record per send.

pub mod actor;
pub mod client;
pub mod interpreter;
pub mod response;
pub mod transport;

pub use actor::NetworkActor;
pub use client::{create_client, execute_request, ReqwestTransport};
pub use interpreter::{classify, format_size, interpret, BodyKind, Interpreter};
pub use response::{BinaryDescriptor, Blob, ErrorDescriptor, ResponseData, ResponseRecord};
pub use transport::{RawResponse, Transport};
