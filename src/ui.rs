//! Plain-text rendering of response records for the terminal

use crate::network::{ResponseData, ResponseRecord};

/// Coarse status grouping, used for the status label
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    Redirect,
    ClientError,
    ServerError,
    /// Includes the synthetic status 0 of a network error
    Other,
}

impl StatusClass {
    /// Client errors, server errors and network failures
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            StatusClass::ClientError | StatusClass::ServerError | StatusClass::Other
        )
    }
}

pub fn status_class(code: u16) -> StatusClass {
    match code {
        200..=299 => StatusClass::Success,
        300..=399 => StatusClass::Redirect,
        400..=499 => StatusClass::ClientError,
        500..=599 => StatusClass::ServerError,
        _ => StatusClass::Other,
    }
}

/// `200 OK (12 ms, 1.5 KB)`
pub fn status_line(record: &ResponseRecord) -> String {
    let label = if record.status_text.is_empty() {
        record.status.to_string()
    } else {
        format!("{} {}", record.status, record.status_text)
    };
    format!("{} ({} ms, {})", label, record.response_time, record.size)
}

/// Body text: pretty JSON, raw text, a binary summary or the error message
pub fn render_data(data: &ResponseData) -> String {
    match data {
        ResponseData::Json(value) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        ResponseData::Text(text) => text.clone(),
        ResponseData::Binary(binary) => format!(
            "<binary {} body, {} bytes>",
            binary.content_type, binary.size
        ),
        ResponseData::Error(error) => format!("Error: {}", error.message),
    }
}

pub fn render_response(record: &ResponseRecord, include_headers: bool) -> String {
    let mut out = status_line(record);
    out.push('\n');

    if include_headers && !record.headers.is_empty() {
        for (name, value) in &record.headers {
            out.push_str(&format!("{}: {}\n", name, value));
        }
    }

    out.push('\n');
    out.push_str(&render_data(&record.data));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{interpret, RawResponse};
    use std::time::Duration;

    #[test]
    fn test_status_class() {
        assert_eq!(status_class(204), StatusClass::Success);
        assert_eq!(status_class(301), StatusClass::Redirect);
        assert_eq!(status_class(404), StatusClass::ClientError);
        assert_eq!(status_class(503), StatusClass::ServerError);
        assert_eq!(status_class(0), StatusClass::Other);
        assert!(!status_class(302).is_failure());
        assert!(status_class(0).is_failure());
        assert!(status_class(422).is_failure());
    }

    #[test]
    fn test_render_json_response() {
        let mut raw =
            RawResponse::new(200, r#"{"id":1}"#).with_header("Content-Type", "application/json");
        raw.status_text = "OK".into();
        let record = interpret(raw, Duration::from_millis(7));

        let rendered = render_response(&record, true);
        assert_eq!(
            rendered,
            "200 OK (7 ms, 8 B)\ncontent-type: application/json\n\n{\n  \"id\": 1\n}"
        );
    }

    #[test]
    fn test_render_network_error_and_binary() {
        let record = ResponseRecord::network_error("Connection failed: refused", 3);
        assert_eq!(
            render_response(&record, false),
            "0 Network Error (3 ms, 0 B)\n\nError: Connection failed: refused"
        );

        let raw = RawResponse::new(200, vec![0x89, b'P', b'N', b'G'])
            .with_header("content-type", "image/png");
        let record = interpret(raw, Duration::ZERO);
        assert_eq!(render_data(&record.data), "<binary image/png body, 4 bytes>");
        assert_eq!(status_line(&record), "200 (0 ms, 4 B)");
    }
}
