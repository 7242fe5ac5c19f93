//! Error types for the Shopware node
//!
//! Two error classes reach the workflow host: operation errors (the caller
//! supplied something invalid, raised before or after a request) and API errors
//! (anything the remote side or the transport produced). Everything else in this
//! enum is plumbing that gets folded into one of those two at the item boundary.

use thiserror::Error;

/// The main error type for the Shopware node
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Node Errors
    // ============================================================================
    #[error("{message}")]
    Operation {
        message: String,
        description: Option<String>,
        item_index: Option<usize>,
    },

    #[error("{message}")]
    Api {
        message: String,
        status: Option<u16>,
        description: Option<String>,
        item_index: Option<usize>,
    },

    #[error("The operation '{operation}' is not supported for resource '{resource}'")]
    UnknownCommand { resource: String, operation: String },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    #[error("OAuth2 error: {message}")]
    OAuth2 { message: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an operation (caller input) error
    pub fn operation(message: impl Into<String>) -> Self {
        Self::Operation {
            message: message.into(),
            description: None,
            item_index: None,
        }
    }

    /// Create an operation error with a longer description
    pub fn operation_with_description(
        message: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::Operation {
            message: message.into(),
            description: Some(description.into()),
            item_index: None,
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Whether this error was caused by invalid caller input
    pub fn is_operation(&self) -> bool {
        matches!(self, Error::Operation { .. } | Error::UnknownCommand { .. })
    }

    /// HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::HttpStatus { status, .. } => Some(*status),
            Error::Api { status, .. } => *status,
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Attach the index of the input item that failed.
    ///
    /// Only node errors carry an index; other variants are returned unchanged.
    pub fn at_item(self, index: usize) -> Self {
        match self {
            Error::Operation {
                message,
                description,
                ..
            } => Error::Operation {
                message,
                description,
                item_index: Some(index),
            },
            Error::Api {
                message,
                status,
                description,
                ..
            } => Error::Api {
                message,
                status,
                description,
                item_index: Some(index),
            },
            other => other,
        }
    }

    /// Wrap a failure as an API error for the given item.
    ///
    /// Operation errors pass through with the item index attached, so a caller
    /// mistake is never reported as a remote failure.
    pub fn into_api(self, index: usize) -> Self {
        if self.is_operation() {
            return match self {
                Error::UnknownCommand { .. } => Error::Operation {
                    message: self.to_string(),
                    description: None,
                    item_index: Some(index),
                },
                other => other.at_item(index),
            };
        }
        if let Error::Api { .. } = self {
            return self.at_item(index);
        }

        let status = self.status();
        let (message, description) = match &self {
            Error::HttpStatus { status, body } => {
                (remote_message(*status, body), Some(body.clone()))
            }
            other => (other.to_string(), None),
        };
        Error::Api {
            message,
            status,
            description,
            item_index: Some(index),
        }
    }
}

/// Extract a readable message from a Shopware error document.
///
/// Shopware answers with `{"errors":[{"status":"400","title":"..","detail":".."}]}`;
/// the first error's detail wins, then its title, then the raw body.
fn remote_message(status: u16, body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let first = parsed
        .as_ref()
        .and_then(|v| v.get("errors"))
        .and_then(|e| e.get(0))
        .and_then(|e| e.get("detail").or_else(|| e.get("title")))
        .and_then(|m| m.as_str());

    match first {
        Some(detail) => format!("HTTP {status}: {detail}"),
        None if body.is_empty() => format!("HTTP {status}"),
        None => format!("HTTP {status}: {body}"),
    }
}

/// Result type alias for the Shopware node
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
