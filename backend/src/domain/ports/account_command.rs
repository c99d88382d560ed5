//! Driving port for registration and login.
//!
//! Inbound adapters call it to obtain a bearer token without knowing which
//! hasher, token format or store backs the accounts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Error, LoginCredentials, Registration, User};

/// Token and identity returned after a successful registration or login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    /// Signed bearer token.
    pub token: String,
    /// Token expiry.
    pub expires_at: DateTime<Utc>,
    /// The authenticated user.
    pub user: User,
}

/// Domain use-case port for account creation and authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create an account; a taken email yields `conflict`.
    async fn register(&self, registration: Registration) -> Result<AuthSession, Error>;

    /// Exchange credentials for a token; any mismatch yields `unauthorized`.
    async fn login(&self, credentials: LoginCredentials) -> Result<AuthSession, Error>;
}
