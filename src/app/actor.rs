//! App actor - message loop processing editor events and network responses

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::app::state::AppState;
use crate::config::ClientConfig;
use crate::messages::{EditorEvent, NetworkCommand, NetworkResponse, ViewState};

/// App actor that owns the editor state and publishes a snapshot after every change
pub struct AppActor {
    state: AppState,
    network_tx: mpsc::UnboundedSender<NetworkCommand>,
    view_tx: mpsc::UnboundedSender<ViewState>,
}

impl AppActor {
    pub fn new(
        config: Arc<ClientConfig>,
        network_tx: mpsc::UnboundedSender<NetworkCommand>,
        view_tx: mpsc::UnboundedSender<ViewState>,
    ) -> Self {
        AppActor {
            state: AppState::new(config),
            network_tx,
            view_tx,
        }
    }

    /// Run the actor message loop
    pub async fn run(
        mut self,
        mut editor_rx: mpsc::UnboundedReceiver<EditorEvent>,
        mut net_rx: mpsc::UnboundedReceiver<NetworkResponse>,
    ) {
        // Send initial view state
        let _ = self.view_tx.send(self.state.to_view_state());

        loop {
            tokio::select! {
                Some(event) = editor_rx.recv() => {
                    if self.handle_editor_event(event) {
                        // Quit signal received
                        let _ = self.network_tx.send(NetworkCommand::Shutdown);
                        break;
                    }
                    let _ = self.view_tx.send(self.state.to_view_state());
                }
                Some(response) = net_rx.recv() => {
                    self.state.handle_response(response);
                    let _ = self.view_tx.send(self.state.to_view_state());
                }
                else => break,
            }
        }
    }

    /// Handle an editor event, returns true if quit was requested
    fn handle_editor_event(&mut self, event: EditorEvent) -> bool {
        match event {
            // Request line
            EditorEvent::SetMethod(method) => self.state.set_method(method),
            EditorEvent::CycleMethod => self.state.cycle_method(),
            EditorEvent::SetUrl(url) => self.state.set_url(url),

            // Headers
            EditorEvent::AddHeader => self.state.add_header(),
            EditorEvent::UpdateHeader { index, field, value } => {
                self.state.update_header(index, field, value)
            }
            EditorEvent::ToggleHeader(index) => self.state.toggle_header(index),
            EditorEvent::RemoveHeader(index) => self.state.remove_header(index),

            // Params
            EditorEvent::AddParam => self.state.add_param(),
            EditorEvent::UpdateParam { index, field, value } => {
                self.state.update_param(index, field, value)
            }
            EditorEvent::ToggleParam(index) => self.state.toggle_param(index),
            EditorEvent::RemoveParam(index) => self.state.remove_param(index),

            // Body and auth
            EditorEvent::SetBody(body) => self.state.set_body(body),
            EditorEvent::SetAuth(auth) => self.state.set_auth(auth),
            EditorEvent::LoadRequest(request) => self.state.load_request(request),
            EditorEvent::RestoreHistory(index) => self.state.restore_history(index),

            // cURL
            EditorEvent::ImportCurl(command) => self.state.import_curl(&command),
            EditorEvent::ExportCurl => self.state.export_curl(),

            // Sending
            EditorEvent::SendRequest => {
                if let Some(cmd) = self.state.prepare_request() {
                    let _ = self.network_tx.send(cmd);
                }
            }
            EditorEvent::CancelRequest => {
                if let Some(cmd) = self.state.cancel_request() {
                    let _ = self.network_tx.send(cmd);
                }
            }

            // System
            EditorEvent::Quit => return true,
        }

        false
    }
}
