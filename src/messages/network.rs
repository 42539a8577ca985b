//! Network messages - communication between App and Network layers

use crate::compiler::CompiledRequest;
use crate::network::ResponseRecord;

/// Commands sent from App layer to Network layer
#[derive(Debug, Clone)]
pub enum NetworkCommand {
    /// Send a compiled request; `id` is the send's generation
    Execute {
        id: u64,
        request: CompiledRequest,
    },
    /// Cancel a pending request
    CancelRequest(u64),
    /// Shutdown the network actor
    Shutdown,
}

/// Responses sent from Network layer to App layer
#[derive(Debug, Clone)]
pub enum NetworkResponse {
    /// The send resolved, successfully or as a network-error record
    Completed {
        id: u64,
        record: ResponseRecord,
    },
    /// Request was cancelled before it resolved
    Cancelled {
        id: u64,
    },
}

impl NetworkResponse {
    /// Get the request ID from the response
    pub fn id(&self) -> u64 {
        match self {
            NetworkResponse::Completed { id, .. } => *id,
            NetworkResponse::Cancelled { id } => *id,
        }
    }
}
