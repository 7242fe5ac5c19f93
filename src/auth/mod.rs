//! Authentication module
//!
//! Shopware's Admin API uses the OAuth2 client-credentials grant: the
//! integration's client id and secret are exchanged for a short-lived bearer
//! token at `/api/oauth/token`. A static bearer token is accepted for tests and
//! for setups that mint tokens elsewhere.
//!
//! The `Authenticator` caches the access token until shortly before it expires.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::{AuthConfig, CachedToken};
