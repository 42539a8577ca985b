//! Editor events - messages from the request editor to the App layer

use crate::models::{AuthConfig, HttpMethod, RequestBody, RequestDefinition};

/// Which half of a key/value row an edit targets
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowField {
    Key,
    Value,
}

/// Edits and actions coming from whatever front end drives the editor
#[derive(Debug, Clone)]
pub enum EditorEvent {
    // Request line
    SetMethod(HttpMethod),
    CycleMethod,
    SetUrl(String),

    // Headers
    AddHeader,
    UpdateHeader { index: usize, field: RowField, value: String },
    ToggleHeader(usize),
    RemoveHeader(usize),

    // Query params, kept in sync with the URL
    AddParam,
    UpdateParam { index: usize, field: RowField, value: String },
    ToggleParam(usize),
    RemoveParam(usize),

    // Body and auth
    SetBody(RequestBody),
    SetAuth(AuthConfig),

    /// Replace the whole definition, e.g. after loading a saved request
    LoadRequest(RequestDefinition),
    /// Load the request and response of a history entry (0 = most recent)
    RestoreHistory(usize),

    // cURL
    ImportCurl(String),
    ExportCurl,

    // Sending
    SendRequest,
    CancelRequest,

    // System
    Quit,
}
