//! Token signing secret loading.
//!
//! The secret is read from the file named by `HELPDESK_TOKEN_SECRET_FILE`.
//! Release builds refuse to start without a secret of at least
//! [`SIGNING_SECRET_MIN_LEN`] bytes; debug builds fall back to a random
//! per-process secret, which invalidates every token on restart.

use std::fmt;
use std::path::PathBuf;

use mockable::Env;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use tracing::warn;
use zeroize::Zeroizing;

/// Environment variable naming the secret file.
pub const SECRET_FILE_ENV: &str = "HELPDESK_TOKEN_SECRET_FILE";
const SECRET_DEFAULT_PATH: &str = "/var/run/secrets/helpdesk_token_secret";
/// Minimum secret length accepted by release builds.
pub const SIGNING_SECRET_MIN_LEN: usize = 32;
const FINGERPRINT_BYTES: usize = 8;

/// Build mode used to decide how strict secret loading is.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Missing or short secrets are tolerated with a warning.
    Debug,
    /// A readable secret of sufficient length is mandatory.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use helpdesk::outbound::security::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// assert_eq!(mode == BuildMode::Debug, cfg!(debug_assertions));
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Errors raised while loading the signing secret.
#[derive(thiserror::Error, Debug)]
pub enum SigningSecretError {
    /// Reading the secret file failed.
    #[error("failed to read token secret at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The secret file is shorter than release builds allow.
    #[error("token secret at {path} too short: need >= {min_len} bytes, got {length}")]
    TooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
}

/// HMAC key material; wiped from memory on drop.
#[derive(Clone)]
pub struct SigningSecret(Zeroizing<Vec<u8>>);

impl SigningSecret {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Generate a random secret of [`SIGNING_SECRET_MIN_LEN`] bytes.
    pub fn ephemeral() -> Self {
        let mut bytes = vec![0_u8; SIGNING_SECRET_MIN_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self::from_bytes(bytes)
    }

    /// Raw key bytes for the token codec.
    pub fn expose(&self) -> &[u8] {
        self.0.as_slice()
    }

    /// First eight bytes of the SHA-256 digest, hex encoded.
    ///
    /// Logged at start-up so operators can tell which secret is active
    /// without revealing it.
    ///
    /// ```rust
    /// use helpdesk::outbound::security::SigningSecret;
    ///
    /// let fp = SigningSecret::from_bytes(vec![b'a'; 32]).fingerprint();
    /// assert_eq!(fp.len(), 16);
    /// assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    /// ```
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.expose());
        hex::encode(digest.get(..FINGERPRINT_BYTES).unwrap_or_default())
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningSecret(fingerprint={})", self.fingerprint())
    }
}

/// Load the token signing secret according to `mode`.
///
/// # Errors
///
/// In release builds returns [`SigningSecretError::Read`] when the file is
/// unreadable and [`SigningSecretError::TooShort`] when it holds fewer than
/// [`SIGNING_SECRET_MIN_LEN`] bytes.
pub fn signing_secret_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<SigningSecret, SigningSecretError> {
    let path = PathBuf::from(
        env.string(SECRET_FILE_ENV)
            .unwrap_or_else(|| SECRET_DEFAULT_PATH.to_owned()),
    );

    match std::fs::read(&path) {
        Ok(bytes) => {
            let bytes = Zeroizing::new(bytes);
            let length = bytes.len();
            if length >= SIGNING_SECRET_MIN_LEN {
                return Ok(SigningSecret(bytes));
            }
            if !mode.is_debug() {
                return Err(SigningSecretError::TooShort {
                    path,
                    length,
                    min_len: SIGNING_SECRET_MIN_LEN,
                });
            }
            if length == 0 {
                warn!(path = %path.display(), "token secret file is empty; using temporary secret (dev only)");
                return Ok(SigningSecret::ephemeral());
            }
            warn!(
                path = %path.display(),
                length,
                min_len = SIGNING_SECRET_MIN_LEN,
                "token secret shorter than release minimum"
            );
            Ok(SigningSecret(bytes))
        }
        Err(error) => {
            if mode.is_debug() {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "using temporary token secret (dev only)"
                );
                Ok(SigningSecret::ephemeral())
            } else {
                Err(SigningSecretError::Read {
                    path,
                    source: error,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockable::MockEnv;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn secret_file(len: usize) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(&vec![b'k'; len]).expect("write secret");
        file
    }

    fn env_pointing_at(path: Option<String>) -> MockEnv {
        let mut env = MockEnv::new();
        env.expect_string()
            .times(0..)
            .returning(move |name| (name == SECRET_FILE_ENV).then(|| path.clone()).flatten());
        env
    }

    fn path_of(file: &NamedTempFile) -> Option<String> {
        file.path().to_str().map(str::to_owned)
    }

    #[rstest]
    #[case(BuildMode::Release)]
    #[case(BuildMode::Debug)]
    fn reads_secret_from_file(#[case] mode: BuildMode) {
        let file = secret_file(SIGNING_SECRET_MIN_LEN);
        let env = env_pointing_at(path_of(&file));

        let secret = signing_secret_from_env(&env, mode).expect("secret loads");

        assert_eq!(secret.expose(), vec![b'k'; SIGNING_SECRET_MIN_LEN].as_slice());
    }

    #[rstest]
    fn release_rejects_short_secret() {
        let file = secret_file(SIGNING_SECRET_MIN_LEN - 1);
        let env = env_pointing_at(path_of(&file));

        let error = signing_secret_from_env(&env, BuildMode::Release).expect_err("too short");

        assert!(matches!(
            error,
            SigningSecretError::TooShort { length, .. } if length == SIGNING_SECRET_MIN_LEN - 1
        ));
    }

    #[rstest]
    fn debug_accepts_short_secret() {
        let file = secret_file(8);
        let env = env_pointing_at(path_of(&file));

        let secret = signing_secret_from_env(&env, BuildMode::Debug).expect("debug tolerates");

        assert_eq!(secret.expose().len(), 8);
    }

    #[rstest]
    fn release_requires_readable_file() {
        let env = env_pointing_at(Some("/nonexistent/helpdesk/secret".to_owned()));

        let error = signing_secret_from_env(&env, BuildMode::Release).expect_err("missing file");

        assert!(matches!(error, SigningSecretError::Read { .. }));
    }

    #[rstest]
    fn debug_falls_back_to_ephemeral_secret() {
        let env = env_pointing_at(Some("/nonexistent/helpdesk/secret".to_owned()));

        let first = signing_secret_from_env(&env, BuildMode::Debug).expect("ephemeral");
        let second = signing_secret_from_env(&env, BuildMode::Debug).expect("ephemeral");

        assert_eq!(first.expose().len(), SIGNING_SECRET_MIN_LEN);
        assert_ne!(first.fingerprint(), second.fingerprint());
    }

    #[rstest]
    fn fingerprint_is_stable_and_redacts_debug_output() {
        let secret = SigningSecret::from_bytes(vec![b'a'; 32]);

        assert_eq!(secret.fingerprint(), secret.clone().fingerprint());
        let rendered = format!("{secret:?}");
        assert!(rendered.contains(&secret.fingerprint()));
        assert!(!rendered.contains(&"a".repeat(32)));
    }
}
