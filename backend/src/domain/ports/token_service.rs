//! Port for issuing and verifying bearer tokens.

use chrono::{DateTime, Utc};

use crate::domain::{User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by token adapters.
    pub enum TokenError {
        /// Token could not be signed.
        Issue { message: String } => "token could not be issued: {message}",
        /// Token was malformed, forged or expired.
        Rejected { message: String } => "token rejected: {message}",
    }
}

/// Signed bearer token handed to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Encoded token.
    pub token: String,
    /// Instant after which the token is no longer accepted.
    pub expires_at: DateTime<Utc>,
}

/// Issues tokens for authenticated users and resolves them back to ids.
#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// Sign a token for `user`, valid from `issued_at`.
    fn issue(&self, user: &User, issued_at: DateTime<Utc>) -> Result<IssuedToken, TokenError>;

    /// Verify `token` and return the subject it was issued to.
    fn verify(&self, token: &str) -> Result<UserId, TokenError>;
}
