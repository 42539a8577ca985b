use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// HTTP Method enum
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    #[default]
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    HEAD,
    OPTIONS,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::GET,
        HttpMethod::POST,
        HttpMethod::PUT,
        HttpMethod::DELETE,
        HttpMethod::PATCH,
        HttpMethod::HEAD,
        HttpMethod::OPTIONS,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::OPTIONS => "OPTIONS",
        }
    }

    pub fn next(&self) -> HttpMethod {
        match self {
            HttpMethod::GET => HttpMethod::POST,
            HttpMethod::POST => HttpMethod::PUT,
            HttpMethod::PUT => HttpMethod::DELETE,
            HttpMethod::DELETE => HttpMethod::PATCH,
            HttpMethod::PATCH => HttpMethod::HEAD,
            HttpMethod::HEAD => HttpMethod::OPTIONS,
            HttpMethod::OPTIONS => HttpMethod::GET,
        }
    }

    /// GET and HEAD never carry a body on the wire
    pub fn allows_body(&self) -> bool {
        !matches!(self, HttpMethod::GET | HttpMethod::HEAD)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown HTTP method: {}", s))
    }
}

/// A key/value row, used for both headers and query params
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

pub type Header = KeyValue;
pub type Param = KeyValue;

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        KeyValue {
            key: key.into(),
            value: value.into(),
            enabled: true,
        }
    }

    /// Blank rows and disabled rows never reach the wire
    pub fn is_active(&self) -> bool {
        self.enabled && !self.key.is_empty()
    }
}

/// One part of a multipart form body
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    #[serde(rename_all = "camelCase")]
    File {
        name: String,
        file_name: String,
        #[serde(default)]
        content_type: Option<String>,
        #[serde(with = "base64_bytes")]
        data: Vec<u8>,
    },
}

/// A prebuilt multipart payload
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MultipartForm {
    pub parts: Vec<FormPart>,
}

/// Content of a form body
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormContent {
    /// `key=value&key2=value2`
    Encoded(String),
    Multipart(MultipartForm),
    Fields(Vec<KeyValue>),
    /// `{"name": "value"}`; non-string values are sent as their JSON text
    Map(BTreeMap<String, serde_json::Value>),
}

impl Default for FormContent {
    fn default() -> Self {
        FormContent::Encoded(String::new())
    }
}

/// Request body, tagged by its declared type
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum RequestBody {
    Raw(String),
    Json(#[serde(deserialize_with = "string_or_json")] String),
    Form(FormContent),
}

impl Default for RequestBody {
    fn default() -> Self {
        RequestBody::Raw(String::new())
    }
}

impl RequestBody {
    pub fn type_name(&self) -> &'static str {
        match self {
            RequestBody::Raw(_) => "raw",
            RequestBody::Json(_) => "json",
            RequestBody::Form(_) => "form",
        }
    }

    /// Only empty text counts as "no body"; an empty field list is still a form
    pub fn is_empty(&self) -> bool {
        match self {
            RequestBody::Raw(s) | RequestBody::Json(s) => s.is_empty(),
            RequestBody::Form(FormContent::Encoded(s)) => s.is_empty(),
            RequestBody::Form(_) => false,
        }
    }
}

/// Where an API key credential is attached
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    #[default]
    Header,
    Query,
}

/// Authentication scheme with the fields that scheme needs
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AuthConfig {
    #[default]
    None,
    Bearer {
        #[serde(default)]
        token: String,
    },
    Basic {
        #[serde(default)]
        username: String,
        #[serde(default)]
        password: String,
    },
    #[serde(rename = "apikey", rename_all = "camelCase")]
    ApiKey {
        #[serde(default)]
        key: String,
        #[serde(default)]
        value: String,
        #[serde(default)]
        add_to: ApiKeyLocation,
    },
    /// Token acquisition happens elsewhere; only a ready `access_token` is used
    #[serde(rename = "oauth2", rename_all = "camelCase")]
    OAuth2 {
        #[serde(default)]
        client_id: String,
        #[serde(default)]
        client_secret: String,
        #[serde(default)]
        access_token_url: String,
        #[serde(default)]
        scope: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        access_token: Option<String>,
    },
    Digest {
        #[serde(default)]
        username: String,
        #[serde(default)]
        password: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        realm: Option<String>,
    },
}

impl AuthConfig {
    pub fn type_name(&self) -> &'static str {
        match self {
            AuthConfig::None => "none",
            AuthConfig::Bearer { .. } => "bearer",
            AuthConfig::Basic { .. } => "basic",
            AuthConfig::ApiKey { .. } => "apikey",
            AuthConfig::OAuth2 { .. } => "oauth2",
            AuthConfig::Digest { .. } => "digest",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, AuthConfig::None)
    }
}

/// A single user-editable HTTP request
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RequestDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default, deserialize_with = "lenient")]
    pub body: RequestBody,
    #[serde(default, deserialize_with = "lenient")]
    pub auth: AuthConfig,
}

impl Default for RequestDefinition {
    fn default() -> Self {
        RequestDefinition {
            name: String::from("New Request"),
            method: HttpMethod::GET,
            url: String::new(),
            headers: Vec::new(),
            params: Vec::new(),
            body: RequestBody::default(),
            auth: AuthConfig::None,
        }
    }
}

impl RequestDefinition {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        let mut request = RequestDefinition {
            method,
            url: url.into(),
            ..Default::default()
        };
        request.sync_params_from_url();
        request
    }

    /// Replace the enabled params with the URL's query pairs.
    /// Disabled params survive; an unparseable URL changes nothing.
    pub fn sync_params_from_url(&mut self) {
        let Ok(parsed) = Url::parse(&self.url) else {
            return;
        };
        let mut params: Vec<Param> = parsed
            .query_pairs()
            .map(|(k, v)| KeyValue::new(k, v))
            .collect();
        params.extend(self.params.iter().filter(|p| !p.enabled).cloned());
        self.params = params;
    }

    /// Rewrite the URL's query string from the active params
    pub fn rebuild_url_from_params(&mut self) {
        let Ok(mut parsed) = Url::parse(&self.url) else {
            return;
        };
        parsed.set_query(None);
        let active: Vec<&Param> = self.params.iter().filter(|p| p.is_active()).collect();
        if !active.is_empty() {
            let mut query = parsed.query_pairs_mut();
            for param in active {
                query.append_pair(&param.key, &param.value);
            }
        }
        self.url = parsed.to_string();
    }
}

/// A folder inside an exported collection
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FolderExport {
    pub name: String,
    #[serde(default)]
    pub requests: Vec<RequestDefinition>,
}

/// A whole collection in its JSON export form
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionExport {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub exported_at: Option<chrono::DateTime<chrono::Utc>>,
    pub folders: Vec<FolderExport>,
    /// Requests that live directly in the collection
    #[serde(default)]
    pub requests: Vec<RequestDefinition>,
}

impl CollectionExport {
    pub fn new(name: impl Into<String>) -> Self {
        CollectionExport {
            name: name.into(),
            description: None,
            version: None,
            exported_at: None,
            folders: Vec::new(),
            requests: Vec::new(),
        }
    }

    /// Every request in the collection, folder by folder, loose ones last
    pub fn all_requests(&self) -> impl Iterator<Item = &RequestDefinition> {
        self.folders
            .iter()
            .flat_map(|f| f.requests.iter())
            .chain(self.requests.iter())
    }

    pub fn find_request(&self, name: &str) -> Option<&RequestDefinition> {
        self.all_requests().find(|r| r.name == name)
    }
}

/// Accepts JSON body content either as text or as an inline JSON value
fn string_or_json<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Null => Ok(String::new()),
        other => serde_json::to_string(&other).map_err(D::Error::custom),
    }
}

/// Stored documents use `{}` or null for "unset"; map those to the default
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match &value {
        serde_json::Value::Null => Ok(T::default()),
        serde_json::Value::Object(map) if map.is_empty() => Ok(T::default()),
        _ => serde_json::from_value(value).map_err(D::Error::custom),
    }
}

mod base64_bytes {
    use base64::Engine;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_definition() {
        let req = RequestDefinition::default();
        assert_eq!(req.method, HttpMethod::GET);
        assert!(req.url.is_empty());
        assert!(req.headers.is_empty());
        assert!(req.params.is_empty());
        assert_eq!(req.body, RequestBody::Raw(String::new()));
        assert_eq!(req.auth, AuthConfig::None);
    }

    #[test]
    fn test_method_from_str() {
        assert_eq!("patch".parse::<HttpMethod>().unwrap(), HttpMethod::PATCH);
        assert_eq!("OPTIONS".parse::<HttpMethod>().unwrap(), HttpMethod::OPTIONS);
        assert!("TRACE".parse::<HttpMethod>().is_err());
        assert!(!HttpMethod::HEAD.allows_body());
        assert!(HttpMethod::DELETE.allows_body());
    }

    #[test]
    fn test_body_serde_shape() {
        let body: RequestBody =
            serde_json::from_value(json!({"type": "json", "content": "{\"a\":1}"})).unwrap();
        assert_eq!(body, RequestBody::Json("{\"a\":1}".into()));

        let inline: RequestBody =
            serde_json::from_value(json!({"type": "json", "content": {"a": 1}})).unwrap();
        assert_eq!(inline, RequestBody::Json("{\"a\":1}".into()));

        let form: RequestBody =
            serde_json::from_value(json!({"type": "form", "content": [{"key": "a", "value": "1"}]}))
                .unwrap();
        assert_eq!(form, RequestBody::Form(FormContent::Fields(vec![KeyValue::new("a", "1")])));

        let encoded: RequestBody =
            serde_json::from_value(json!({"type": "form", "content": "a=1&b=2"})).unwrap();
        assert_eq!(encoded, RequestBody::Form(FormContent::Encoded("a=1&b=2".into())));

        let mapping: RequestBody =
            serde_json::from_value(json!({"type": "form", "content": {"a": "1", "n": 2}})).unwrap();
        let RequestBody::Form(FormContent::Map(map)) = mapping else {
            panic!("expected mapping form");
        };
        assert_eq!(map["a"], "1");
        assert_eq!(map["n"], 2);
    }

    #[test]
    fn test_auth_serde_ignores_unused_fields() {
        let auth: AuthConfig = serde_json::from_value(json!({
            "type": "apikey",
            "token": "",
            "username": "",
            "key": "X-Api-Key",
            "value": "secret",
            "addTo": "query"
        }))
        .unwrap();
        assert_eq!(
            auth,
            AuthConfig::ApiKey {
                key: "X-Api-Key".into(),
                value: "secret".into(),
                add_to: ApiKeyLocation::Query,
            }
        );
    }

    #[test]
    fn test_stored_request_with_mapping_form_loads() {
        let req: RequestDefinition = serde_json::from_value(json!({
            "name": "login",
            "method": "POST",
            "url": "https://example.com/login",
            "body": {"type": "form", "content": {"user": "ada", "remember": true}}
        }))
        .unwrap();
        assert_eq!(req.body.type_name(), "form");
        assert!(matches!(req.body, RequestBody::Form(FormContent::Map(_))));
    }

    #[test]
    fn test_stored_empty_documents_fall_back_to_defaults() {
        let req: RequestDefinition = serde_json::from_value(json!({
            "name": "ping",
            "method": "HEAD",
            "url": "https://example.com",
            "body": {},
            "auth": {}
        }))
        .unwrap();
        assert_eq!(req.body, RequestBody::default());
        assert_eq!(req.auth, AuthConfig::None);
        assert_eq!(req.method, HttpMethod::HEAD);
    }

    #[test]
    fn test_params_follow_url() {
        let mut req =
            RequestDefinition::new(HttpMethod::GET, "https://api.example.com/x?a=1&b=two%20words");
        assert_eq!(req.params, vec![KeyValue::new("a", "1"), KeyValue::new("b", "two words")]);

        req.url = "not a url".into();
        req.sync_params_from_url();
        assert_eq!(req.params.len(), 2);
    }

    #[test]
    fn test_url_follows_params() {
        let mut req = RequestDefinition::new(HttpMethod::GET, "https://api.example.com/x?old=1");
        req.params = vec![
            KeyValue::new("q", "rust lang"),
            KeyValue::new("", "ignored"),
            KeyValue { enabled: false, ..KeyValue::new("off", "1") },
        ];
        req.rebuild_url_from_params();
        assert_eq!(req.url, "https://api.example.com/x?q=rust+lang");

        req.params.clear();
        req.rebuild_url_from_params();
        assert_eq!(req.url, "https://api.example.com/x");
    }

    #[test]
    fn test_file_part_round_trips_base64() {
        let part = FormPart::File {
            name: "upload".into(),
            file_name: "a.bin".into(),
            content_type: None,
            data: vec![0, 159, 146, 150],
        };
        let value = serde_json::to_value(&part).unwrap();
        assert_eq!(value["data"], "AJ+Slg==");
        let back: FormPart = serde_json::from_value(value).unwrap();
        assert_eq!(back, part);
    }
}
