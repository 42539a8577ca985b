//! Command handlers - business logic for processing editor events

use crate::app::AppState;
use crate::compiler::{compile, CompiledRequest};
use crate::curl;
use crate::messages::{NetworkCommand, NetworkResponse, RowField};
use crate::models::{AuthConfig, HttpMethod, KeyValue, RequestBody, RequestDefinition};
use crate::storage::HistoryEntry;

impl AppState {
    // ========================
    // Request line
    // ========================

    pub fn set_method(&mut self, method: HttpMethod) {
        self.request.method = method;
    }

    pub fn cycle_method(&mut self) {
        self.request.method = self.request.method.next();
    }

    /// Replace the URL; params follow its query string
    pub fn set_url(&mut self, url: String) {
        self.request.url = url;
        self.request.sync_params_from_url();
    }

    // ========================
    // Headers
    // ========================

    pub fn add_header(&mut self) {
        self.request.headers.push(KeyValue::new("", ""));
    }

    pub fn update_header(&mut self, index: usize, field: RowField, value: String) {
        update_row(&mut self.request.headers, index, field, value);
    }

    pub fn toggle_header(&mut self, index: usize) {
        if let Some(header) = self.request.headers.get_mut(index) {
            header.enabled = !header.enabled;
        }
    }

    pub fn remove_header(&mut self, index: usize) {
        if index < self.request.headers.len() {
            self.request.headers.remove(index);
        }
    }

    // ========================
    // Params - every change rewrites the URL
    // ========================

    pub fn add_param(&mut self) {
        self.request.params.push(KeyValue::new("", ""));
    }

    pub fn update_param(&mut self, index: usize, field: RowField, value: String) {
        if update_row(&mut self.request.params, index, field, value) {
            self.request.rebuild_url_from_params();
        }
    }

    pub fn toggle_param(&mut self, index: usize) {
        if let Some(param) = self.request.params.get_mut(index) {
            param.enabled = !param.enabled;
            self.request.rebuild_url_from_params();
        }
    }

    pub fn remove_param(&mut self, index: usize) {
        if index < self.request.params.len() {
            self.request.params.remove(index);
            self.request.rebuild_url_from_params();
        }
    }

    // ========================
    // Body / auth
    // ========================

    pub fn set_body(&mut self, body: RequestBody) {
        self.request.body = body;
    }

    pub fn set_auth(&mut self, auth: AuthConfig) {
        self.request.auth = auth;
    }

    pub fn load_request(&mut self, request: RequestDefinition) {
        self.saved_request = request.clone();
        self.request = request;
        self.last_error = None;
        self.curl_export = None;
    }

    // ========================
    // History
    // ========================

    pub fn restore_history(&mut self, index: usize) {
        let Some(entry) = self.storage.get_history(index) else {
            return;
        };
        let (request, response) = (entry.request.clone(), entry.response.clone());
        self.load_request(request);
        self.response = Some(response);
    }

    // ========================
    // cURL import/export
    // ========================

    pub fn import_curl(&mut self, command: &str) {
        match curl::parse_curl(command) {
            Ok(request) => {
                self.request = request;
                self.last_error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "cURL import failed");
                self.last_error = Some(e.to_string());
            }
        }
    }

    pub fn export_curl(&mut self) {
        match self.compile_current() {
            Some(compiled) => self.curl_export = Some(curl::to_curl(&compiled)),
            None => self.curl_export = None,
        }
    }

    // ========================
    // Request sending
    // ========================

    /// Compile the current definition, recording a compile failure as the last error
    fn compile_current(&mut self) -> Option<CompiledRequest> {
        match compile(&self.request, &self.config) {
            Ok(compiled) => {
                self.last_error = None;
                Some(compiled)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Request not sent");
                self.last_error = Some(e.to_string());
                None
            }
        }
    }

    /// Start a new send. A send already in flight is superseded, not blocked.
    pub fn prepare_request(&mut self) -> Option<NetworkCommand> {
        let request = self.compile_current()?;

        let id = self.next_id();
        if let Some(previous) = self.pending_request_id {
            tracing::debug!(previous, id, "Superseding pending request");
        }
        self.is_loading = true;
        self.pending_request_id = Some(id);
        self.pending_request = Some(self.request.clone());
        self.saved_request = self.request.clone();

        Some(NetworkCommand::Execute { id, request })
    }

    /// Cancel the current pending request
    pub fn cancel_request(&mut self) -> Option<NetworkCommand> {
        self.pending_request_id.map(NetworkCommand::CancelRequest)
    }

    // ========================
    // Response handling
    // ========================

    pub fn handle_response(&mut self, response: NetworkResponse) {
        let response_id = response.id();
        if self.pending_request_id != Some(response_id) {
            tracing::debug!(
                id = response_id,
                pending = ?self.pending_request_id,
                "Discarding stale response"
            );
            return;
        }

        match response {
            NetworkResponse::Completed { record, .. } => {
                if let Some(request) = self.pending_request.take() {
                    self.storage.add_to_history(HistoryEntry {
                        request,
                        response: record.clone(),
                        timestamp: chrono::Utc::now(),
                    });
                }
                self.response = Some(record);
            }
            NetworkResponse::Cancelled { .. } => {
                self.pending_request = None;
            }
        }

        self.is_loading = false;
        self.pending_request_id = None;
    }
}

/// Edit one half of a row; false when the index is out of range
fn update_row(rows: &mut [KeyValue], index: usize, field: RowField, value: String) -> bool {
    match rows.get_mut(index) {
        Some(row) => {
            match field {
                RowField::Key => row.key = value,
                RowField::Value => row.value = value,
            }
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::models::Param;
    use crate::network::ResponseRecord;
    use std::sync::Arc;

    fn state() -> AppState {
        AppState::new(Arc::new(ClientConfig::default()))
    }

    fn record(status: u16) -> ResponseRecord {
        ResponseRecord {
            status,
            ..ResponseRecord::network_error("unused", 1)
        }
    }

    #[test]
    fn test_url_and_params_stay_in_sync() {
        let mut state = state();
        state.set_url("https://api.example.com/search?q=rust&page=2".into());
        assert_eq!(
            state.request.params,
            vec![Param::new("q", "rust"), Param::new("page", "2")]
        );

        state.update_param(1, RowField::Value, "3".into());
        assert_eq!(state.request.url, "https://api.example.com/search?q=rust&page=3");

        state.toggle_param(0);
        assert_eq!(state.request.url, "https://api.example.com/search?page=3");

        state.remove_param(1);
        assert_eq!(state.request.url, "https://api.example.com/search");
        assert_eq!(state.request.params.len(), 1);
    }

    #[test]
    fn test_header_rows() {
        let mut state = state();
        state.add_header();
        state.update_header(0, RowField::Key, "X-Trace".into());
        state.update_header(0, RowField::Value, "1".into());
        state.update_header(5, RowField::Value, "ignored".into());
        assert_eq!(state.request.headers, vec![KeyValue::new("X-Trace", "1")]);

        state.toggle_header(0);
        assert!(!state.request.headers[0].enabled);
        state.remove_header(0);
        assert!(state.request.headers.is_empty());
    }

    #[test]
    fn test_invalid_json_is_not_sent() {
        let mut state = state();
        state.load_request(RequestDefinition {
            method: HttpMethod::POST,
            url: "https://api.example.com/x".into(),
            body: RequestBody::Json("{broken".into()),
            ..Default::default()
        });

        assert!(state.prepare_request().is_none());
        assert!(!state.is_loading);
        assert_eq!(state.last_error.as_deref(), Some("Invalid JSON format in request body"));
    }

    #[test]
    fn test_last_started_send_wins() {
        let mut state = state();
        state.set_url("https://api.example.com/a".into());
        let Some(NetworkCommand::Execute { id: first, .. }) = state.prepare_request() else {
            panic!("expected execute");
        };
        let Some(NetworkCommand::Execute { id: second, .. }) = state.prepare_request() else {
            panic!("expected execute");
        };
        assert!(second > first);

        state.handle_response(NetworkResponse::Completed { id: second, record: record(201) });
        state.handle_response(NetworkResponse::Completed { id: first, record: record(500) });

        assert_eq!(state.response.as_ref().map(|r| r.status), Some(201));
        assert!(!state.is_loading);
        assert_eq!(state.storage.history_len(), 1);
    }

    #[test]
    fn test_restore_history_loads_request_and_response() {
        let mut state = state();
        state.set_url("https://api.example.com/first".into());
        let Some(NetworkCommand::Execute { id, .. }) = state.prepare_request() else {
            panic!("expected execute");
        };
        state.handle_response(NetworkResponse::Completed { id, record: record(200) });

        state.set_url("https://api.example.com/second".into());
        state.response = None;
        state.restore_history(3);
        assert_eq!(state.request.url, "https://api.example.com/second");

        state.restore_history(0);
        assert_eq!(state.request.url, "https://api.example.com/first");
        assert_eq!(state.response.as_ref().map(|r| r.status), Some(200));
        assert!(!state.is_edited());
    }

    #[test]
    fn test_cancel_clears_loading() {
        let mut state = state();
        state.set_url("https://api.example.com/a".into());
        assert!(state.cancel_request().is_none());

        state.prepare_request().unwrap();
        let Some(NetworkCommand::CancelRequest(id)) = state.cancel_request() else {
            panic!("expected cancel");
        };
        state.handle_response(NetworkResponse::Cancelled { id });
        assert!(!state.is_loading);
        assert!(state.response.is_none());
        assert_eq!(state.storage.history_len(), 0);
    }

    #[test]
    fn test_edited_flag_and_curl() {
        let mut state = state();
        assert!(!state.to_view_state().edited);

        state.import_curl("curl -u bob:pw https://api.example.com/me");
        assert!(state.to_view_state().edited);
        assert_eq!(
            state.request.auth,
            AuthConfig::Basic { username: "bob".into(), password: "pw".into() }
        );

        state.export_curl();
        let exported = state.curl_export.clone().unwrap();
        assert!(exported.contains("-H 'Authorization: Basic Ym9iOnB3'"));

        state.import_curl("curl -X");
        assert!(state.last_error.is_some());
        assert_eq!(state.request.url, "https://api.example.com/me");
    }
}
