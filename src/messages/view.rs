//! View state - snapshot published by the App layer after every change

use crate::models::RequestDefinition;
use crate::network::ResponseRecord;

/// Everything a response viewer or request editor needs to render
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub request: RequestDefinition,
    /// Latest response for the most recent send, if it has resolved
    pub response: Option<ResponseRecord>,
    pub is_loading: bool,
    /// Generation of the send still in flight
    pub pending_request_id: Option<u64>,
    /// The definition differs from what was last loaded
    pub edited: bool,
    /// Pre-dispatch failure of the last send, such as a malformed JSON body
    pub error: Option<String>,
    pub curl_export: Option<String>,
    pub history_len: usize,
}
