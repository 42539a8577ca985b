//! Credential attachment for each auth scheme

use base64::Engine;
use url::Url;

use crate::compiler::headers::HeaderList;
use crate::models::{ApiKeyLocation, AuthConfig};

/// Attach the credential `auth` describes to the outgoing headers or URL.
///
/// Schemes with missing fields attach nothing. Digest sends the credentials
/// in a single `Digest` header without the challenge round trip, and OAuth2
/// only forwards an access token obtained elsewhere.
pub fn resolve_auth(auth: &AuthConfig, headers: &mut HeaderList, url: &mut String) {
    match auth {
        AuthConfig::None => {}
        AuthConfig::Bearer { token } => {
            if !token.is_empty() {
                headers.set("Authorization", format!("Bearer {}", token));
            }
        }
        AuthConfig::Basic { username, password } => {
            if !username.is_empty() && !password.is_empty() {
                let credentials = format!("{}:{}", username, password);
                let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
                headers.set("Authorization", format!("Basic {}", encoded));
            }
        }
        AuthConfig::ApiKey { key, value, add_to } => {
            if key.is_empty() || value.is_empty() {
                return;
            }
            match add_to {
                ApiKeyLocation::Header => headers.set(key.clone(), value.clone()),
                ApiKeyLocation::Query => {
                    if let Some(rewritten) = set_query_param(url, key, value) {
                        *url = rewritten;
                    }
                }
            }
        }
        AuthConfig::OAuth2 { access_token, .. } => {
            if let Some(token) = access_token.as_deref().filter(|t| !t.is_empty()) {
                headers.set("Authorization", format!("Bearer {}", token));
            }
        }
        AuthConfig::Digest { username, password, .. } => {
            if !username.is_empty() && !password.is_empty() {
                headers.set(
                    "Authorization",
                    format!("Digest username=\"{}\", password=\"{}\"", username, password),
                );
            }
        }
    }
}

/// Set `key=value` in the query: the first pair with that key is overwritten in
/// place, later duplicates are dropped, and the pair is appended when absent.
/// Returns None when the URL does not parse.
fn set_query_param(url: &str, key: &str, value: &str) -> Option<String> {
    let mut parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(url, error = %e, "Malformed URL, api key not added to query");
            return None;
        }
    };

    let mut found = false;
    let mut pairs: Vec<(String, String)> = Vec::new();
    for (k, v) in parsed.query_pairs() {
        if k != key {
            pairs.push((k.into_owned(), v.into_owned()));
        } else if !found {
            found = true;
            pairs.push((key.to_string(), value.to_string()));
        }
    }
    if !found {
        pairs.push((key.to_string(), value.to_string()));
    }

    parsed.set_query(None);
    parsed.query_pairs_mut().extend_pairs(&pairs);
    Some(parsed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(auth: AuthConfig, url: &str) -> (HeaderList, String) {
        let mut headers = HeaderList::new();
        let mut url = url.to_string();
        resolve_auth(&auth, &mut headers, &mut url);
        (headers, url)
    }

    #[test]
    fn test_bearer() {
        let (headers, _) = apply(AuthConfig::Bearer { token: "T".into() }, "https://x.test");
        assert_eq!(headers.get("Authorization"), Some("Bearer T"));

        let (empty, _) = apply(AuthConfig::Bearer { token: String::new() }, "https://x.test");
        assert!(empty.is_empty());
    }

    #[test]
    fn test_basic() {
        let (headers, _) = apply(
            AuthConfig::Basic { username: "u".into(), password: "p".into() },
            "https://x.test",
        );
        assert_eq!(headers.get("authorization"), Some("Basic dTpw"));

        let (missing, _) = apply(
            AuthConfig::Basic { username: "u".into(), password: String::new() },
            "https://x.test",
        );
        assert!(missing.is_empty());
    }

    #[test]
    fn test_api_key_in_query() {
        let (headers, url) = apply(
            AuthConfig::ApiKey {
                key: "token".into(),
                value: "abc".into(),
                add_to: ApiKeyLocation::Query,
            },
            "https://api.example.com/x",
        );
        assert!(headers.is_empty());
        assert_eq!(url, "https://api.example.com/x?token=abc");
    }

    #[test]
    fn test_api_key_overwrites_existing_query_pair_in_place() {
        let api_key = AuthConfig::ApiKey {
            key: "token".into(),
            value: "new".into(),
            add_to: ApiKeyLocation::Query,
        };

        let (_, url) = apply(api_key.clone(), "https://api.example.com/x?page=2&token=old");
        assert_eq!(url, "https://api.example.com/x?page=2&token=new");

        let (_, url) = apply(api_key.clone(), "https://api.example.com/x?token=old&page=2");
        assert_eq!(url, "https://api.example.com/x?token=new&page=2");

        let (_, url) = apply(api_key, "https://api.example.com/x?token=a&page=2&token=b");
        assert_eq!(url, "https://api.example.com/x?token=new&page=2");
    }

    #[test]
    fn test_api_key_malformed_url_left_alone() {
        let (headers, url) = apply(
            AuthConfig::ApiKey {
                key: "token".into(),
                value: "abc".into(),
                add_to: ApiKeyLocation::Query,
            },
            "not a url",
        );
        assert!(headers.is_empty());
        assert_eq!(url, "not a url");
    }

    #[test]
    fn test_api_key_in_header() {
        let (headers, url) = apply(
            AuthConfig::ApiKey {
                key: "X-Api-Key".into(),
                value: "abc".into(),
                add_to: ApiKeyLocation::Header,
            },
            "https://api.example.com/x",
        );
        assert_eq!(headers.get("x-api-key"), Some("abc"));
        assert_eq!(url, "https://api.example.com/x");
    }

    #[test]
    fn test_oauth2_uses_ready_token_only() {
        let pending = AuthConfig::OAuth2 {
            client_id: "id".into(),
            client_secret: "secret".into(),
            access_token_url: "https://auth.test/token".into(),
            scope: "read".into(),
            access_token: None,
        };
        let (headers, _) = apply(pending.clone(), "https://x.test");
        assert!(headers.is_empty());

        let ready = match pending {
            AuthConfig::OAuth2 { client_id, client_secret, access_token_url, scope, .. } => {
                AuthConfig::OAuth2 {
                    client_id,
                    client_secret,
                    access_token_url,
                    scope,
                    access_token: Some("tok".into()),
                }
            }
            _ => unreachable!(),
        };
        let (headers, _) = apply(ready, "https://x.test");
        assert_eq!(headers.get("Authorization"), Some("Bearer tok"));
    }

    #[test]
    fn test_digest_header() {
        let (headers, _) = apply(
            AuthConfig::Digest { username: "u".into(), password: "p".into(), realm: None },
            "https://x.test",
        );
        assert_eq!(
            headers.get("Authorization"),
            Some("Digest username=\"u\", password=\"p\"")
        );
    }
}
