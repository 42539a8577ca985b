use crate::compiler::{CompiledRequest, Payload};
use crate::models::{AuthConfig, FormPart, Header, HttpMethod, RequestBody, RequestDefinition};
use anyhow::{anyhow, Result};
use regex::Regex;
use std::sync::OnceLock;

fn bearer_header() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^authorization:\s*bearer\s+(.+)$").expect("valid regex"))
}

/// Parse a cURL command into a RequestDefinition
pub fn parse_curl(input: &str) -> Result<RequestDefinition> {
    let mut request = RequestDefinition::default();
    let mut explicit_method = false;

    // Remove line continuations and normalize
    let normalized = input
        .replace("\\\r\n", " ")
        .replace("\\\n", " ");

    let mut tokens = tokenize(&normalized)?;

    // Skip 'curl' command if present
    if tokens.first().map(|s| s.as_str()) == Some("curl") {
        tokens.remove(0);
    }

    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        let next = tokens.get(i + 1);

        match token.as_str() {
            "-X" | "--request" => {
                if let Some(method) = next {
                    request.method = method.parse().map_err(|e: String| anyhow!(e))?;
                    explicit_method = true;
                    i += 1;
                }
            }
            "-H" | "--header" => {
                if let Some(raw) = next {
                    if let Some(caps) = bearer_header().captures(raw) {
                        request.auth = AuthConfig::Bearer {
                            token: caps[1].trim().to_string(),
                        };
                    } else {
                        let header = parse_header(raw)?;
                        request.headers.retain(|h| !h.key.eq_ignore_ascii_case(&header.key));
                        request.headers.push(header);
                    }
                    i += 1;
                }
            }
            "-d" | "--data" | "--data-raw" | "--data-binary" => {
                if let Some(data) = next {
                    request.body = body_from_data(data);
                    // Infer POST if not set
                    if !explicit_method && request.method == HttpMethod::GET {
                        request.method = HttpMethod::POST;
                    }
                    i += 1;
                }
            }
            "-u" | "--user" => {
                if let Some(credentials) = next {
                    let (username, password) = match credentials.split_once(':') {
                        Some((u, p)) => (u.to_string(), p.to_string()),
                        None => (credentials.clone(), String::new()),
                    };
                    request.auth = AuthConfig::Basic { username, password };
                    i += 1;
                }
            }
            "-I" | "--head" => {
                request.method = HttpMethod::HEAD;
                explicit_method = true;
            }
            "--compressed" | "-k" | "--insecure" | "-L" | "--location" | "-s" | "--silent" | "-v"
            | "--verbose" => {
                // Ignored flags
            }
            _ => {
                if token.starts_with("http://") || token.starts_with("https://") {
                    request.url = token.clone();
                }
            }
        }
        i += 1;
    }

    if request.url.is_empty() {
        return Err(anyhow!("No URL found in cURL command"));
    }
    request.sync_params_from_url();

    Ok(request)
}

fn body_from_data(data: &str) -> RequestBody {
    let trimmed = data.trim_start();
    if (trimmed.starts_with('{') || trimmed.starts_with('['))
        && serde_json::from_str::<serde_json::Value>(data).is_ok()
    {
        RequestBody::Json(data.to_string())
    } else {
        RequestBody::Raw(data.to_string())
    }
}

fn parse_header(s: &str) -> Result<Header> {
    match s.split_once(':') {
        Some((key, value)) => Ok(Header::new(key.trim(), value.trim())),
        None => Err(anyhow!("Invalid header format: {}", s)),
    }
}

/// Tokenize a curl command, respecting quotes
fn tokenize(input: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_single_quote = false;
    let mut in_double_quote = false;
    let mut escape_next = false;

    for c in input.chars() {
        if escape_next {
            current.push(c);
            escape_next = false;
            continue;
        }

        match c {
            '\\' if !in_single_quote => {
                escape_next = true;
            }
            '\'' if !in_double_quote => {
                in_single_quote = !in_single_quote;
            }
            '"' if !in_single_quote => {
                in_double_quote = !in_double_quote;
            }
            ' ' | '\t' | '\n' | '\r' if !in_single_quote && !in_double_quote => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            _ => {
                current.push(c);
            }
        }
    }

    if in_single_quote || in_double_quote {
        return Err(anyhow!("Unterminated quote in cURL command"));
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    Ok(tokens)
}

fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

/// Format a compiled request as a cURL command. Auth is already in the headers or URL.
pub fn to_curl(request: &CompiledRequest) -> String {
    let mut parts = vec!["curl".to_string()];

    match request.method {
        HttpMethod::GET => {}
        HttpMethod::HEAD => parts.push("-I".to_string()),
        method => parts.push(format!("-X {}", method.as_str())),
    }

    parts.push(shell_quote(&request.url));

    for (name, value) in request.headers.iter() {
        parts.push(format!("-H {}", shell_quote(&format!("{}: {}", name, value))));
    }

    match &request.body {
        Some(Payload::Multipart(form)) => {
            for part in form {
                let field = match part {
                    FormPart::Text { name, value } => format!("{}={}", name, value),
                    FormPart::File { name, file_name, .. } => format!("{}=@{}", name, file_name),
                };
                parts.push(format!("-F {}", shell_quote(&field)));
            }
        }
        Some(payload) => {
            if let Some(text) = payload.as_text() {
                parts.push(format!("--data-raw {}", shell_quote(&text)));
            }
        }
        None => {}
    }

    parts.join(" \\\n  ")
}
