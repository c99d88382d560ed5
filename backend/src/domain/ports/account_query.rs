//! Driving port for resolving the caller behind a request.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

/// Resolves bearer tokens and loads the current user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountQuery: Send + Sync {
    /// Verify a bearer token and return its subject.
    async fn authenticate_token(&self, token: &str) -> Result<UserId, Error>;

    /// Load the user behind an authenticated request.
    async fn current_user(&self, user_id: &UserId) -> Result<User, Error>;
}
