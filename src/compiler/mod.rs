//! Request compiler - turns a request definition into a dispatch-ready request
//!
//! Auth is resolved into headers or query additions, the body is encoded by
//! its declared type, and user headers are merged with the body's
//! content-type hint. GET and HEAD never carry a body.

pub mod auth;
pub mod body;
pub mod headers;

pub use auth::resolve_auth;
pub use body::{encode_body, EncodedBody, Payload};
pub use headers::{merge_headers, HeaderList};

use crate::config::ClientConfig;
use crate::error::CompileError;
use crate::models::{HttpMethod, RequestDefinition};

/// The resolved, dispatch-ready form of a request definition
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HeaderList,
    pub body: Option<Payload>,
}

/// Compile a request definition against the client configuration.
///
/// Fails only when a JSON body does not parse; nothing is sent in that case.
pub fn compile(
    request: &RequestDefinition,
    config: &ClientConfig,
) -> Result<CompiledRequest, CompileError> {
    let encoded = encode_body(&request.body)?;

    let mut url = resolve_url(config.base_url.as_deref(), &request.url);
    let mut headers = HeaderList::new();
    headers.extend_rows(&config.default_headers);
    headers.extend_rows(&request.headers);

    let auth = if request.auth.is_none() {
        &config.default_auth
    } else {
        &request.auth
    };
    resolve_auth(auth, &mut headers, &mut url);

    let body = if request.method.allows_body() {
        encoded.payload
    } else {
        None
    };
    if body.is_some() {
        merge_headers(&mut headers, encoded.content_type);
    }

    tracing::debug!(
        method = %request.method,
        url = %url,
        headers = headers.len(),
        has_body = body.is_some(),
        auth = auth.type_name(),
        "Compiled request"
    );

    Ok(CompiledRequest {
        method: request.method,
        url,
        headers,
        body,
    })
}

/// Join scheme-less URLs onto the configured base URL
fn resolve_url(base_url: Option<&str>, url: &str) -> String {
    match base_url {
        Some(base) if !base.is_empty() && !url.contains("://") => {
            format!(
                "{}/{}",
                base.trim_end_matches('/'),
                url.trim_start_matches('/')
            )
        }
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AuthConfig, Header, RequestBody};

    fn definition(method: HttpMethod, body: RequestBody) -> RequestDefinition {
        RequestDefinition {
            method,
            url: "https://api.example.com/items".into(),
            body,
            ..Default::default()
        }
    }

    #[test]
    fn test_get_and_head_never_carry_a_body() {
        let config = ClientConfig::default();
        for method in [HttpMethod::GET, HttpMethod::HEAD] {
            let request = definition(method, RequestBody::Raw("payload".into()));
            let compiled = compile(&request, &config).unwrap();
            assert_eq!(compiled.body, None);
            assert!(!compiled.headers.contains("content-type"));
        }
    }

    #[test]
    fn test_post_json_gets_content_type_hint() {
        let compiled = compile(
            &definition(HttpMethod::POST, RequestBody::Json("{ \"a\": 1 }".into())),
            &ClientConfig::default(),
        )
        .unwrap();
        assert_eq!(compiled.body, Some(Payload::Text("{\"a\":1}".into())));
        assert_eq!(compiled.headers.get("content-type"), Some("application/json"));
    }

    #[test]
    fn test_user_content_type_wins_over_hint() {
        let mut request = definition(HttpMethod::PUT, RequestBody::Raw("<a/>".into()));
        request.headers.push(Header::new("Content-Type", "application/xml"));
        let compiled = compile(&request, &ClientConfig::default()).unwrap();
        assert_eq!(compiled.headers.get("content-type"), Some("application/xml"));
    }

    #[test]
    fn test_invalid_json_fails_before_dispatch() {
        let result = compile(
            &definition(HttpMethod::POST, RequestBody::Json("{oops".into())),
            &ClientConfig::default(),
        );
        assert!(matches!(result, Err(CompileError::BodyEncoding { .. })));
    }

    #[test]
    fn test_auth_overrides_user_authorization_header() {
        let mut request = definition(HttpMethod::GET, RequestBody::default());
        request.headers.push(Header::new("Authorization", "stale"));
        request.auth = AuthConfig::Bearer { token: "fresh".into() };
        let compiled = compile(&request, &ClientConfig::default()).unwrap();
        assert_eq!(compiled.headers.get("authorization"), Some("Bearer fresh"));
    }

    #[test]
    fn test_config_defaults_apply() {
        let config = ClientConfig {
            base_url: Some("https://api.example.com/v1/".into()),
            default_headers: vec![
                Header::new("Accept", "application/json"),
                Header::new("X-Env", "dev"),
            ],
            default_auth: AuthConfig::Bearer { token: "default".into() },
            ..Default::default()
        };
        let request = RequestDefinition {
            url: "/users".into(),
            headers: vec![Header::new("x-env", "prod")],
            ..Default::default()
        };
        let compiled = compile(&request, &config).unwrap();
        assert_eq!(compiled.url, "https://api.example.com/v1/users");
        assert_eq!(compiled.headers.get("X-Env"), Some("prod"));
        assert_eq!(compiled.headers.get("Accept"), Some("application/json"));
        assert_eq!(compiled.headers.get("Authorization"), Some("Bearer default"));
    }

    #[test]
    fn test_absolute_url_ignores_base() {
        assert_eq!(
            resolve_url(Some("https://base.test"), "http://other.test/x"),
            "http://other.test/x"
        );
        assert_eq!(resolve_url(None, "/x"), "/x");
    }
}
