//! Credential adapters: argon2id password hashing and HS256 bearer tokens.

mod argon2_hasher;
mod jwt;
pub mod signing_secret;

pub use argon2_hasher::Argon2PasswordHasher;
pub use jwt::{DEFAULT_TOKEN_TTL_SECONDS, JwtTokenService};
pub use signing_secret::{BuildMode, SigningSecret, SigningSecretError, signing_secret_from_env};
