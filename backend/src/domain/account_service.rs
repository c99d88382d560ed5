//! Account domain service.
//!
//! Registration, login and bearer-token resolution. Password hashing runs on
//! the blocking pool so argon2 never stalls the async workers.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::domain::ports::{
    AccountCommand, AccountQuery, AuthSession, PasswordHashError, PasswordHasher, TokenError,
    TokenService, UserPersistenceError, UserRepository,
};
use crate::domain::{
    Error, LoginCredentials, PasswordDigest, Registration, User, UserAccount, UserId,
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { email } => email_taken(&email),
    }
}

fn email_taken(email: &str) -> Error {
    Error::conflict("User already exists").with_details(json!({
        "field": "email",
        "value": email,
        "code": "email_taken",
    }))
}

fn map_token_error(error: TokenError) -> Error {
    match error {
        TokenError::Issue { message } => Error::internal(format!("token issue failed: {message}")),
        TokenError::Rejected { .. } => Error::unauthorized("Token is not valid"),
    }
}

fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

/// Account service implementing [`AccountCommand`] and [`AccountQuery`].
#[derive(Clone)]
pub struct AccountService<U> {
    users: Arc<U>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
    clock: Arc<dyn Clock>,
}

impl<U> AccountService<U> {
    /// Create a new account service.
    pub fn new(
        users: Arc<U>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            clock,
        }
    }

    fn session_for(&self, user: User) -> Result<AuthSession, Error> {
        let issued = self
            .tokens
            .issue(&user, self.clock.utc())
            .map_err(map_token_error)?;
        Ok(AuthSession {
            token: issued.token,
            expires_at: issued.expires_at,
            user,
        })
    }

    async fn hash_password(&self, password: &str) -> Result<PasswordDigest, Error> {
        let hasher = Arc::clone(&self.hasher);
        let password = Zeroizing::new(password.to_owned());
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))?
            .map_err(map_hash_error)
    }

    async fn verify_password(&self, password: &str, digest: PasswordDigest) -> Result<bool, Error> {
        let hasher = Arc::clone(&self.hasher);
        let password = Zeroizing::new(password.to_owned());
        tokio::task::spawn_blocking(move || hasher.verify(&password, &digest))
            .await
            .map_err(|err| Error::internal(format!("password check task failed: {err}")))?
            .map_err(map_hash_error)
    }

    /// Unknown emails cost one verification, the same as a wrong password.
    async fn verify_decoy(&self, password: &str) {
        let decoy = self.hasher.decoy_digest();
        if let Err(err) = self.verify_password(password, decoy).await {
            warn!(error = err.message(), "decoy password check failed");
        }
    }
}

#[async_trait]
impl<U> AccountCommand for AccountService<U>
where
    U: UserRepository,
{
    async fn register(&self, registration: Registration) -> Result<AuthSession, Error> {
        let existing = self
            .users
            .find_by_email(registration.email())
            .await
            .map_err(map_user_error)?;
        if existing.is_some() {
            return Err(email_taken(registration.email().as_ref()));
        }

        let password = self.hash_password(registration.password()).await?;
        let user = User::new(
            UserId::random(),
            registration.name().clone(),
            registration.email().clone(),
            registration.role(),
            self.clock.utc(),
        );
        let account = UserAccount { user, password };
        self.users
            .insert(&account)
            .await
            .map_err(map_user_error)?;
        info!(user_id = %account.user.id(), role = %account.user.role(), "user registered");

        self.session_for(account.user)
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<AuthSession, Error> {
        let Some(account) = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_user_error)?
        else {
            self.verify_decoy(credentials.password()).await;
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let UserAccount { user, password } = account;
        if !self.verify_password(credentials.password(), password).await? {
            warn!(user_id = %user.id(), "login rejected");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        info!(user_id = %user.id(), "user logged in");
        self.session_for(user)
    }
}

#[async_trait]
impl<U> AccountQuery for AccountService<U>
where
    U: UserRepository,
{
    async fn authenticate_token(&self, token: &str) -> Result<UserId, Error> {
        self.tokens.verify(token).map_err(map_token_error)
    }

    async fn current_user(&self, user_id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("User not found"))
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
