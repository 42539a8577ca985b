//! Application constants
//!
//! Centralized location for magic strings and configuration defaults.

/// Application name, also used for the config and data directories
pub const APP_NAME: &str = "apiforge";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Config file name inside the per-user config directory
pub const CONFIG_FILE: &str = "config.yaml";

/// Version stamped into exported collections
pub const EXPORT_VERSION: &str = "1.0.0";

/// Suffix of exported collection files
pub const EXPORT_SUFFIX: &str = "_export.json";

/// Maximum number of sends kept in history
pub const MAX_HISTORY: usize = 50;

/// Status code used for synthetic network-failure records
pub const NETWORK_ERROR_STATUS: u16 = 0;

/// Status text used for synthetic network-failure records
pub const NETWORK_ERROR_TEXT: &str = "Network Error";

/// Error descriptor type tag for network failures
pub const NETWORK_ERROR_TYPE: &str = "network_error";

/// Message of the body encoding error raised for malformed JSON bodies
pub const INVALID_JSON_BODY: &str = "Invalid JSON format in request body";

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_TEXT: &str = "text/plain";
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";

/// Default user agent for outbound requests
pub fn default_user_agent() -> String {
    format!("{}/{}", APP_NAME, APP_VERSION)
}
