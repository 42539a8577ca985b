//! Response records handed to the response viewer

use base64::Engine;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::Path;
use std::sync::Arc;

use crate::constants::{
    CONTENT_TYPE_JSON, NETWORK_ERROR_STATUS, NETWORK_ERROR_TEXT, NETWORK_ERROR_TYPE,
};

/// The uniform result of attempting a send
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRecord {
    pub status: u16,
    pub status_text: String,
    pub headers: BTreeMap<String, String>,
    pub data: ResponseData,
    /// Milliseconds from dispatch until the body was fully read
    pub response_time: u64,
    pub size: String,
    pub content_type: String,
}

impl ResponseRecord {
    /// Synthetic record for a send that never got a response
    pub fn network_error(message: impl Into<String>, response_time: u64) -> Self {
        ResponseRecord {
            status: NETWORK_ERROR_STATUS,
            status_text: NETWORK_ERROR_TEXT.to_string(),
            headers: BTreeMap::new(),
            data: ResponseData::Error(ErrorDescriptor::network(message)),
            response_time,
            size: String::from("0 B"),
            content_type: CONTENT_TYPE_JSON.to_string(),
        }
    }

    pub fn is_network_error(&self) -> bool {
        self.status == NETWORK_ERROR_STATUS && matches!(self.data, ResponseData::Error(_))
    }
}

/// Decoded payload, from most to least specific
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseData {
    Json(serde_json::Value),
    Text(String),
    Binary(BinaryDescriptor),
    Error(ErrorDescriptor),
}

impl ResponseData {
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ResponseData::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseData::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_binary(&self) -> Option<&BinaryDescriptor> {
        match self {
            ResponseData::Binary(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&ErrorDescriptor> {
        match self {
            ResponseData::Error(e) => Some(e),
            _ => None,
        }
    }
}

/// Shared handle to an undecoded response body
#[derive(Clone, PartialEq, Eq)]
pub struct Blob(Arc<[u8]>);

impl Blob {
    pub fn new(bytes: Vec<u8>) -> Self {
        Blob(Arc::from(bytes))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `data:` URL carrying the bytes, usable for preview or download
    pub fn data_url(&self, content_type: &str) -> String {
        let mime = if content_type.is_empty() {
            "application/octet-stream"
        } else {
            content_type
        };
        format!(
            "data:{};base64,{}",
            mime,
            base64::engine::general_purpose::STANDARD.encode(&self.0)
        )
    }

    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        std::fs::write(path, &self.0)
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Blob({} bytes)", self.0.len())
    }
}

/// Body kept as bytes because it is media or could not be read as text
#[derive(Clone, Debug, PartialEq)]
pub struct BinaryDescriptor {
    pub content_type: String,
    pub size: u64,
    pub blob: Blob,
}

impl BinaryDescriptor {
    pub fn new(content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        let blob = Blob::new(bytes);
        BinaryDescriptor {
            content_type: content_type.into(),
            size: blob.len() as u64,
            blob,
        }
    }

    pub fn blob_url(&self) -> String {
        self.blob.data_url(&self.content_type)
    }
}

impl Serialize for BinaryDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("BinaryDescriptor", 4)?;
        state.serialize_field("type", "binary")?;
        state.serialize_field("contentType", &self.content_type)?;
        state.serialize_field("size", &self.size)?;
        state.serialize_field("blobUrl", &self.blob_url())?;
        state.end()
    }
}

/// Payload of a synthetic error record
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorDescriptor {
    pub error: bool,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ErrorDescriptor {
    pub fn network(message: impl Into<String>) -> Self {
        ErrorDescriptor {
            error: true,
            message: message.into(),
            kind: NETWORK_ERROR_TYPE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_network_error_record_shape() {
        let record = ResponseRecord::network_error("Connection failed: refused", 12);
        assert!(record.is_network_error());
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "status": 0,
                "statusText": "Network Error",
                "headers": {},
                "data": {
                    "error": true,
                    "message": "Connection failed: refused",
                    "type": "network_error"
                },
                "responseTime": 12,
                "size": "0 B",
                "contentType": "application/json"
            })
        );
    }

    #[test]
    fn test_binary_descriptor_serializes_with_blob_url() {
        let descriptor = BinaryDescriptor::new("image/png", vec![0x89, b'P', b'N', b'G']);
        let value = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(value["type"], "binary");
        assert_eq!(value["contentType"], "image/png");
        assert_eq!(value["size"], 4);
        assert_eq!(value["blobUrl"], "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn test_blob_saves_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");
        let blob = Blob::new(vec![1, 2, 3]);
        blob.save_to(&path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3]);
        assert_eq!(format!("{:?}", blob), "Blob(3 bytes)");
    }
}
