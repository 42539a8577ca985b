//! Network actor - runs HTTP requests in the Tokio async runtime

use std::collections::HashMap;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;

use crate::messages::{NetworkCommand, NetworkResponse};
use crate::network::interpreter::Interpreter;
use crate::network::transport::Transport;

/// Tracks an active request for cancellation
struct ActiveRequest {
    cancel_tx: oneshot::Sender<()>,
}

/// Network actor that runs every send as an independent task
pub struct NetworkActor<T: Transport> {
    interpreter: Interpreter<T>,
    response_tx: mpsc::UnboundedSender<NetworkResponse>,
    active_requests: JoinSet<u64>,
    cancel_handles: HashMap<u64, ActiveRequest>,
}

impl<T: Transport> NetworkActor<T> {
    pub fn new(transport: T, response_tx: mpsc::UnboundedSender<NetworkResponse>) -> Self {
        NetworkActor {
            interpreter: Interpreter::new(transport),
            response_tx,
            active_requests: JoinSet::new(),
            cancel_handles: HashMap::new(),
        }
    }

    /// Run the network actor message loop
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<NetworkCommand>) {
        loop {
            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(NetworkCommand::Execute { id, request }) => {
                            let (cancel_tx, mut cancel_rx) = oneshot::channel();
                            self.cancel_handles.insert(id, ActiveRequest { cancel_tx });

                            let response_tx = self.response_tx.clone();
                            let interpreter = self.interpreter.clone();

                            self.active_requests.spawn(async move {
                                tracing::info!(
                                    id,
                                    url = %request.url,
                                    method = %request.method,
                                    "Executing request"
                                );
                                tokio::select! {
                                    biased;

                                    _ = &mut cancel_rx => {}
                                    record = interpreter.send(request) => {
                                        tracing::info!(
                                            id,
                                            status = record.status,
                                            time_ms = record.response_time,
                                            "Request completed"
                                        );
                                        let completed = NetworkResponse::Completed { id, record };
                                        let _ = response_tx.send(completed);
                                    }
                                }
                                id
                            });
                        }

                        Some(NetworkCommand::CancelRequest(id)) => {
                            if let Some(active) = self.cancel_handles.remove(&id) {
                                tracing::info!(id, "Cancelling request");
                                let _ = active.cancel_tx.send(());
                                let _ = self.response_tx.send(NetworkResponse::Cancelled { id });
                            }
                        }

                        Some(NetworkCommand::Shutdown) => {
                            for (_, active) in self.cancel_handles.drain() {
                                let _ = active.cancel_tx.send(());
                            }
                            break;
                        }

                        None => break,
                    }
                }

                Some(result) = self.active_requests.join_next() => {
                    match result {
                        Ok(id) => {
                            self.cancel_handles.remove(&id);
                        }
                        Err(e) => tracing::error!(error = %e, "Request task failed"),
                    }
                }
            }
        }

        self.active_requests.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{CompiledRequest, HeaderList};
    use crate::error::TransportError;
    use crate::models::HttpMethod;
    use crate::network::transport::RawResponse;
    use std::future::Future;
    use std::time::Duration;

    /// Answers with the request path as plain text after a per-path delay
    #[derive(Clone)]
    struct EchoTransport;

    impl Transport for EchoTransport {
        fn execute(
            &self,
            request: CompiledRequest,
        ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send {
            async move {
                let delay = if request.url.ends_with("slow") { 200 } else { 5 };
                tokio::time::sleep(Duration::from_millis(delay)).await;
                let raw = RawResponse::new(200, request.url.clone());
                Ok(raw.with_header("content-type", "text/plain"))
            }
        }
    }

    fn compiled(url: &str) -> CompiledRequest {
        CompiledRequest {
            method: HttpMethod::GET,
            url: url.into(),
            headers: HeaderList::new(),
            body: None,
        }
    }

    #[tokio::test]
    async fn test_overlapping_sends_resolve_independently() {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (resp_tx, mut resp_rx) = mpsc::unbounded_channel();
        tokio::spawn(NetworkActor::new(EchoTransport, resp_tx).run(cmd_rx));

        cmd_tx.send(NetworkCommand::Execute { id: 1, request: compiled("http://t/slow") }).unwrap();
        cmd_tx.send(NetworkCommand::Execute { id: 2, request: compiled("http://t/fast") }).unwrap();

        let first = resp_rx.recv().await.unwrap();
        let second = resp_rx.recv().await.unwrap();
        assert_eq!(first.id(), 2);
        assert_eq!(second.id(), 1);

        cmd_tx.send(NetworkCommand::Shutdown).unwrap();
    }

    #[tokio::test]
    async fn test_cancel_reports_cancelled_and_drops_result() {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (resp_tx, mut resp_rx) = mpsc::unbounded_channel();
        tokio::spawn(NetworkActor::new(EchoTransport, resp_tx).run(cmd_rx));

        cmd_tx.send(NetworkCommand::Execute { id: 7, request: compiled("http://t/slow") }).unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        cmd_tx.send(NetworkCommand::CancelRequest(7)).unwrap();

        assert!(matches!(resp_rx.recv().await, Some(NetworkResponse::Cancelled { id: 7 })));
        let late = tokio::time::timeout(Duration::from_millis(400), resp_rx.recv()).await;
        assert!(!matches!(late, Ok(Some(NetworkResponse::Completed { .. }))));

        cmd_tx.send(NetworkCommand::Shutdown).unwrap();
    }
}
