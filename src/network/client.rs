//! HTTP client wrapper - reqwest transport and the compile-then-send pipeline

use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use std::future::Future;

use crate::compiler::body::encode_pairs;
use crate::compiler::{compile, CompiledRequest, Payload};
use crate::config::ClientConfig;
use crate::error::{CompileError, TransportError};
use crate::models::{FormPart, HttpMethod, RequestDefinition};
use crate::network::interpreter::Interpreter;
use crate::network::response::ResponseRecord;
use crate::network::transport::{RawResponse, Transport};

/// Transport backed by a shared reqwest client
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Self {
        ReqwestTransport {
            client: create_client(config),
        }
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        ReqwestTransport { client }
    }
}

impl Transport for ReqwestTransport {
    fn execute(
        &self,
        request: CompiledRequest,
    ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send {
        fetch(self.client.clone(), request)
    }
}

/// Send the request and drain the body stream into one buffer
async fn fetch(
    client: reqwest::Client,
    request: CompiledRequest,
) -> Result<RawResponse, TransportError> {
    let response = build_request(&client, request).send().await?;

    let status = response.status();
    let headers = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();

    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        body.extend_from_slice(&chunk?);
    }

    Ok(RawResponse {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or_default().to_string(),
        headers,
        body,
    })
}

fn reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::GET => reqwest::Method::GET,
        HttpMethod::POST => reqwest::Method::POST,
        HttpMethod::PUT => reqwest::Method::PUT,
        HttpMethod::DELETE => reqwest::Method::DELETE,
        HttpMethod::PATCH => reqwest::Method::PATCH,
        HttpMethod::HEAD => reqwest::Method::HEAD,
        HttpMethod::OPTIONS => reqwest::Method::OPTIONS,
    }
}

/// Build a reqwest request; invalid header names surface as a send error
fn build_request(client: &reqwest::Client, request: CompiledRequest) -> reqwest::RequestBuilder {
    let mut req_builder = client.request(reqwest_method(request.method), &request.url);

    for (name, value) in request.headers.iter() {
        req_builder = req_builder.header(name, value);
    }

    match request.body {
        Some(Payload::Text(text)) => req_builder = req_builder.body(text),
        Some(Payload::UrlEncoded(pairs)) => req_builder = req_builder.body(encode_pairs(&pairs)),
        Some(Payload::Multipart(parts)) => {
            req_builder = req_builder.multipart(multipart_form(parts))
        }
        None => {}
    }

    req_builder
}

fn multipart_form(parts: Vec<FormPart>) -> Form {
    parts.into_iter().fold(Form::new(), |form, part| match part {
        FormPart::Text { name, value } => form.text(name, value),
        FormPart::File { name, file_name, content_type, data } => {
            let typed = content_type.map(|mime| {
                let part = Part::bytes(data.clone()).file_name(file_name.clone());
                (part.mime_str(&mime), mime)
            });
            let part = match typed {
                Some((Ok(part), _)) => part,
                Some((Err(e), mime)) => {
                    tracing::warn!(
                        mime = %mime,
                        error = %e,
                        "Invalid part content type, sending untyped"
                    );
                    Part::bytes(data).file_name(file_name)
                }
                None => Part::bytes(data).file_name(file_name),
            };
            form.part(name, part)
        }
    })
}

/// Compile a definition and send it. Only a body encoding error stops the send.
pub async fn execute_request<T: Transport>(
    interpreter: &Interpreter<T>,
    request: &RequestDefinition,
    config: &ClientConfig,
) -> Result<ResponseRecord, CompileError> {
    let compiled = compile(request, config)?;
    tracing::info!(method = %compiled.method, url = %compiled.url, "Executing request");
    let record = interpreter.send(compiled).await;
    tracing::info!(status = record.status, time_ms = record.response_time, "Request completed");
    Ok(record)
}

/// Create an HTTP client from the configuration
pub fn create_client(config: &ClientConfig) -> reqwest::Client {
    let mut builder = reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .danger_accept_invalid_certs(config.accept_invalid_certs);
    if let Some(timeout) = config.timeout() {
        builder = builder.timeout(timeout);
    }

    builder.build().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Falling back to default HTTP client");
        reqwest::Client::new()
    })
}
