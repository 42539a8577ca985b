//! Response interpreter - dispatch, timing, and content-type classification

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::compiler::CompiledRequest;
use crate::network::response::{BinaryDescriptor, ResponseData, ResponseRecord};
use crate::network::transport::{RawResponse, Transport};

const SIZE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// How a response body is decoded, picked from its declared content-type
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyKind {
    Json,
    Text,
    Binary,
    Unknown,
}

/// Case-insensitive substring match; the first rule that matches wins
pub fn classify(content_type: &str) -> BodyKind {
    let ct = content_type.to_ascii_lowercase();
    if ct.contains("application/json") {
        BodyKind::Json
    } else if ct.contains("text/") {
        BodyKind::Text
    } else if ["image/", "video/", "audio/", "application/pdf"]
        .iter()
        .any(|media| ct.contains(media))
    {
        BodyKind::Binary
    } else {
        BodyKind::Unknown
    }
}

/// Human-readable byte count in base 1024, two decimals at most
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return String::from("0 B");
    }

    let mut unit = 0;
    let mut scaled = bytes as f64;
    while scaled >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        scaled /= 1024.0;
        unit += 1;
    }
    let rounded = (scaled * 100.0).round() / 100.0;
    format!("{} {}", rounded, SIZE_UNITS[unit])
}

/// Decode a body following JSON → text → binary, never failing
pub fn decode_body(kind: BodyKind, content_type: &str, body: Vec<u8>) -> ResponseData {
    match kind {
        BodyKind::Json => {
            let text = String::from_utf8_lossy(&body).into_owned();
            match serde_json::from_str(&text) {
                Ok(value) => ResponseData::Json(value),
                Err(e) => {
                    tracing::debug!(error = %e, "JSON response did not parse, keeping text");
                    ResponseData::Text(text)
                }
            }
        }
        BodyKind::Text => ResponseData::Text(String::from_utf8_lossy(&body).into_owned()),
        BodyKind::Binary => ResponseData::Binary(BinaryDescriptor::new(content_type, body)),
        BodyKind::Unknown => match String::from_utf8(body) {
            Ok(text) => ResponseData::Text(text),
            Err(e) => {
                tracing::debug!(content_type, "Undeclared body is not UTF-8, keeping bytes");
                ResponseData::Binary(BinaryDescriptor::new(content_type, e.into_bytes()))
            }
        },
    }
}

/// Turn a raw response into a record; `elapsed` covers dispatch and body read
pub fn interpret(raw: RawResponse, elapsed: Duration) -> ResponseRecord {
    let content_type = raw.header("content-type").unwrap_or_default().to_string();
    let mut headers: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in &raw.headers {
        headers
            .entry(name.to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.clone());
    }

    let size = format_size(raw.body.len() as u64);
    let kind = classify(&content_type);
    tracing::debug!(status = raw.status, ?kind, %size, "Classified response");
    let data = decode_body(kind, &content_type, raw.body);

    ResponseRecord {
        status: raw.status,
        status_text: raw.status_text,
        headers,
        data,
        response_time: elapsed_millis(elapsed),
        size,
        content_type,
    }
}

pub fn network_error(message: &str, elapsed: Duration) -> ResponseRecord {
    ResponseRecord::network_error(message, elapsed_millis(elapsed))
}

fn elapsed_millis(elapsed: Duration) -> u64 {
    ((elapsed.as_micros() + 500) / 1000) as u64
}

/// Sends compiled requests and always yields a record
#[derive(Clone, Debug)]
pub struct Interpreter<T> {
    transport: T,
}

impl<T: Transport> Interpreter<T> {
    pub fn new(transport: T) -> Self {
        Interpreter { transport }
    }

    pub async fn send(&self, request: CompiledRequest) -> ResponseRecord {
        let start = Instant::now();
        let result = self.transport.execute(request).await;
        let elapsed = start.elapsed();

        match result {
            Ok(raw) => interpret(raw, elapsed),
            Err(e) => {
                tracing::warn!(kind = ?e.kind, error = %e, "Transport failed");
                network_error(&e.message, elapsed)
            }
        }
    }
}
