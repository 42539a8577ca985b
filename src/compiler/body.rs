//! Body encoding by declared body type

use url::form_urlencoded;

use crate::constants::{CONTENT_TYPE_FORM, CONTENT_TYPE_JSON, CONTENT_TYPE_TEXT, INVALID_JSON_BODY};
use crate::error::CompileError;
use crate::models::{FormContent, FormPart, RequestBody};

/// Wire-ready body
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    Text(String),
    UrlEncoded(Vec<(String, String)>),
    /// The transport picks the boundary and sets the content-type itself
    Multipart(Vec<FormPart>),
}

impl Payload {
    /// Textual rendering, used for cURL export and logging
    pub fn as_text(&self) -> Option<String> {
        match self {
            Payload::Text(s) => Some(s.clone()),
            Payload::UrlEncoded(pairs) => Some(encode_pairs(pairs)),
            Payload::Multipart(_) => None,
        }
    }
}

/// Result of [`encode_body`]
#[derive(Clone, Debug, PartialEq, Default)]
pub struct EncodedBody {
    pub payload: Option<Payload>,
    pub content_type: Option<&'static str>,
}

pub fn encode_body(body: &RequestBody) -> Result<EncodedBody, CompileError> {
    if body.is_empty() {
        return Ok(EncodedBody::default());
    }

    match body {
        RequestBody::Json(content) => {
            let value: serde_json::Value = serde_json::from_str(content).map_err(|e| {
                tracing::debug!(error = %e, "{}", INVALID_JSON_BODY);
                CompileError::BodyEncoding { reason: e.to_string() }
            })?;
            Ok(EncodedBody {
                payload: Some(Payload::Text(value.to_string())),
                content_type: Some(CONTENT_TYPE_JSON),
            })
        }
        RequestBody::Form(FormContent::Encoded(content)) => Ok(EncodedBody {
            payload: Some(Payload::UrlEncoded(decode_pairs(content))),
            content_type: Some(CONTENT_TYPE_FORM),
        }),
        RequestBody::Form(FormContent::Multipart(form)) => Ok(EncodedBody {
            payload: Some(Payload::Multipart(form.parts.clone())),
            content_type: None,
        }),
        RequestBody::Form(FormContent::Fields(fields)) => {
            let parts = fields
                .iter()
                .filter(|f| f.is_active())
                .map(|f| FormPart::Text {
                    name: f.key.clone(),
                    value: f.value.clone(),
                })
                .collect();
            Ok(EncodedBody {
                payload: Some(Payload::Multipart(parts)),
                content_type: None,
            })
        }
        RequestBody::Form(FormContent::Map(map)) => {
            let parts = map
                .iter()
                .filter(|(name, _)| !name.is_empty())
                .map(|(name, value)| FormPart::Text {
                    name: name.clone(),
                    value: match value {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    },
                })
                .collect();
            Ok(EncodedBody {
                payload: Some(Payload::Multipart(parts)),
                content_type: None,
            })
        }
        RequestBody::Raw(content) => Ok(EncodedBody {
            payload: Some(Payload::Text(content.clone())),
            content_type: Some(CONTENT_TYPE_TEXT),
        }),
    }
}

/// Decode `a=1&b=2`, dropping pairs with an empty key or value
fn decode_pairs(content: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(content.as_bytes())
        .filter(|(k, v)| !k.is_empty() && !v.is_empty())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

pub(crate) fn encode_pairs(pairs: &[(String, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .finish()
}
