//! App state - pure data structure with no I/O logic

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::messages::ViewState;
use crate::models::RequestDefinition;
use crate::network::ResponseRecord;
use crate::storage::Storage;

/// Main application state - pure data, no I/O
pub struct AppState {
    // Request being edited
    pub request: RequestDefinition,
    /// Last loaded or sent snapshot, used for the edited flag
    pub saved_request: RequestDefinition,

    pub config: Arc<ClientConfig>,

    // Response
    pub response: Option<ResponseRecord>,
    pub is_loading: bool,
    pub next_request_id: u64,
    pub pending_request_id: Option<u64>,
    /// Definition as it was when the pending send started
    pub pending_request: Option<RequestDefinition>,

    // Feedback
    pub last_error: Option<String>,
    pub curl_export: Option<String>,

    pub storage: Storage,
}

impl AppState {
    pub fn new(config: Arc<ClientConfig>) -> Self {
        let storage = Storage::new(config.collections_dir());
        AppState {
            request: RequestDefinition::default(),
            saved_request: RequestDefinition::default(),
            config,
            response: None,
            is_loading: false,
            next_request_id: 1,
            pending_request_id: None,
            pending_request: None,
            last_error: None,
            curl_export: None,
            storage,
        }
    }

    /// Generate a unique request ID
    pub fn next_id(&mut self) -> u64 {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    pub fn is_edited(&self) -> bool {
        self.request != self.saved_request
    }

    /// Snapshot for subscribers
    pub fn to_view_state(&self) -> ViewState {
        ViewState {
            request: self.request.clone(),
            response: self.response.clone(),
            is_loading: self.is_loading,
            pending_request_id: self.pending_request_id,
            edited: self.is_edited(),
            error: self.last_error.clone(),
            curl_export: self.curl_export.clone(),
            history_len: self.storage.history_len(),
        }
    }
}
