//! Configuration types for the Shopware node
//!
//! A node config holds the Shopware integration credentials plus a few
//! HTTP and execution settings. It is read from a JSON or YAML file, or
//! from an inline JSON string, and can be overridden from the environment.

use crate::auth::AuthConfig;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable overriding [`Credentials::domain`]
pub const ENV_DOMAIN: &str = "SHOPWARE_DOMAIN";
/// Environment variable overriding [`Credentials::client_id`]
pub const ENV_CLIENT_ID: &str = "SHOPWARE_CLIENT_ID";
/// Environment variable overriding [`Credentials::client_secret`]
pub const ENV_CLIENT_SECRET: &str = "SHOPWARE_CLIENT_SECRET";
/// Environment variable overriding [`NodeConfig::access_token`]
pub const ENV_ACCESS_TOKEN: &str = "SHOPWARE_ACCESS_TOKEN";

// ============================================================================
// Credentials
// ============================================================================

/// Shopware Admin API integration credentials
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// Shop domain, e.g. `myshop.com` (no scheme, no trailing slash)
    #[serde(default)]
    pub domain: String,

    /// Integration access key id
    #[serde(default)]
    pub client_id: String,

    /// Integration secret access key
    #[serde(default)]
    pub client_secret: String,
}

impl Credentials {
    /// Base URL of the shop.
    ///
    /// `https://` is assumed; a domain that already names a scheme is kept
    /// so local and test installations on plain HTTP work.
    pub fn base_url(&self) -> String {
        let domain = self.domain.trim().trim_end_matches('/');
        if domain.starts_with("http://") || domain.starts_with("https://") {
            domain.to_string()
        } else {
            format!("https://{domain}")
        }
    }

    /// OAuth2 token endpoint of the shop
    pub fn token_url(&self) -> String {
        format!("{}/api/oauth/token", self.base_url())
    }

    /// Check that every field is present and the domain forms a valid URL
    pub fn validate(&self) -> Result<()> {
        self.validate_domain()?;
        if self.client_id.is_empty() {
            return Err(Error::missing_field("clientId"));
        }
        if self.client_secret.is_empty() {
            return Err(Error::missing_field("clientSecret"));
        }
        Ok(())
    }

    fn validate_domain(&self) -> Result<()> {
        if self.domain.trim().is_empty() {
            return Err(Error::missing_field("domain"));
        }

        let url = url::Url::parse(&self.base_url())?;
        if url.host_str().is_none() {
            return Err(Error::InvalidConfigValue {
                field: "domain".to_string(),
                message: format!("'{}' has no host", self.domain),
            });
        }
        Ok(())
    }

    fn apply_overrides(&mut self, lookup: &dyn Fn(&str) -> Option<String>) {
        let set = |field: &mut String, key: &str| {
            if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
                *field = value;
            }
        };
        set(&mut self.domain, ENV_DOMAIN);
        set(&mut self.client_id, ENV_CLIENT_ID);
        set(&mut self.client_secret, ENV_CLIENT_SECRET);
    }
}

// ============================================================================
// HTTP Settings
// ============================================================================

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpSettings {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// User agent
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            user_agent: None,
        }
    }
}

fn default_timeout() -> u64 {
    30
}

// ============================================================================
// Node Config
// ============================================================================

/// Complete node configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeConfig {
    /// Integration credentials
    #[serde(default)]
    pub credentials: Credentials,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpSettings,

    /// Emit error rows instead of failing the run
    #[serde(default)]
    pub continue_on_fail: bool,

    /// Pre-issued Admin API token; skips the client-credentials grant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

impl NodeConfig {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            ..Self::default()
        }
    }

    /// Use a pre-issued access token instead of the client-credentials grant
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Apply the `SHOPWARE_*` environment overrides
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        self.credentials.apply_overrides(&lookup);
        if let Some(token) = lookup(ENV_ACCESS_TOKEN).filter(|v| !v.is_empty()) {
            self.access_token = Some(token);
        }
    }

    /// Validated auth settings.
    ///
    /// With an access token only the domain is required.
    pub fn auth(&self) -> Result<AuthConfig> {
        match self.access_token.as_deref().filter(|t| !t.is_empty()) {
            Some(token) => {
                self.credentials.validate_domain()?;
                Ok(AuthConfig::Bearer {
                    token: token.to_string(),
                })
            }
            None => {
                self.credentials.validate()?;
                Ok(AuthConfig::from_credentials(&self.credentials))
            }
        }
    }
}

/// Load a node config from a JSON or YAML file.
///
/// The format is chosen by extension; anything other than `.json` is read as
/// YAML (which also accepts JSON documents).
pub fn load_config(path: impl AsRef<Path>) -> Result<NodeConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        }
    })?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        load_config_from_json(&content)
    } else {
        load_config_from_yaml(&content)
    }
}

/// Parse a node config from a JSON string
pub fn load_config_from_json(json: &str) -> Result<NodeConfig> {
    Ok(serde_json::from_str(json)?)
}

/// Parse a node config from a YAML string
pub fn load_config_from_yaml(yaml: &str) -> Result<NodeConfig> {
    Ok(serde_yaml::from_str(yaml)?)
}
