//! Auth configuration types

use crate::config::Credentials;
use chrono::{DateTime, Utc};

/// Authentication configuration
#[derive(Debug, Clone)]
pub enum AuthConfig {
    /// Pre-issued Admin API access token
    Bearer {
        /// The bearer token
        token: String,
    },

    /// OAuth2 Client Credentials flow
    Oauth2ClientCredentials {
        /// Token endpoint URL
        token_url: String,
        /// Client ID (Shopware integration access key)
        client_id: String,
        /// Client secret (Shopware integration secret key)
        client_secret: String,
    },
}

impl AuthConfig {
    /// Client-credentials config for a Shopware integration
    pub fn from_credentials(credentials: &Credentials) -> Self {
        Self::Oauth2ClientCredentials {
            token_url: credentials.token_url(),
            client_id: credentials.client_id.clone(),
            client_secret: credentials.client_secret.clone(),
        }
    }
}

/// Cached token with expiration
#[derive(Debug, Clone)]
pub struct CachedToken {
    /// The access token
    pub token: String,
    /// When the token expires
    pub expires_at: Option<DateTime<Utc>>,
}

impl CachedToken {
    /// Create a new cached token
    pub fn new(token: String, expires_at: Option<DateTime<Utc>>) -> Self {
        Self { token, expires_at }
    }

    /// Create a token that expires in N seconds from now
    pub fn expires_in(token: String, seconds: i64) -> Self {
        let expires_at = Utc::now() + chrono::Duration::seconds(seconds);
        Self {
            token,
            expires_at: Some(expires_at),
        }
    }

    /// Check if the token is expired (with 30 second buffer)
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                let buffer = chrono::Duration::seconds(30);
                Utc::now() + buffer >= expires_at
            }
            None => false, // No expiration = never expires
        }
    }
}
