//! `PasswordHasher` port implemented with argon2id.

use argon2::Argon2;
use argon2::password_hash::{
    Error as HashError, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
};
use rand::rngs::OsRng;

use crate::domain::PasswordDigest;
use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Salt and all-zero output of the decoy digest, in PHC base64.
const DECOY_SALT_AND_HASH: &str =
    "c2FsdHNhbHRzYWx0c2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Argon2id (v19) hasher with the crate's default cost parameters.
///
/// Digests are PHC strings, so parameters travel with each hash and can be
/// raised later without invalidating stored passwords.
#[derive(Clone)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
    decoy: PasswordDigest,
}

impl Argon2PasswordHasher {
    /// Hasher using argon2id defaults.
    pub fn new() -> Self {
        let argon2 = Argon2::default();
        let params = argon2.params();
        let decoy = PasswordDigest::new(format!(
            "$argon2id$v=19$m={},t={},p={}${DECOY_SALT_AND_HASH}",
            params.m_cost(),
            params.t_cost(),
            params.p_cost(),
        ));
        Self { argon2, decoy }
    }
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<PasswordDigest, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| PasswordHashError::hash(err.to_string()))?;
        Ok(PasswordDigest::new(hash.to_string()))
    }

    fn verify(&self, password: &str, digest: &PasswordDigest) -> Result<bool, PasswordHashError> {
        let parsed = PasswordHash::new(digest.as_str())
            .map_err(|err| PasswordHashError::malformed_digest(err.to_string()))?;
        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(HashError::Password) => Ok(false),
            Err(err) => Err(PasswordHashError::malformed_digest(err.to_string())),
        }
    }

    fn decoy_digest(&self) -> PasswordDigest {
        self.decoy.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn hasher() -> Argon2PasswordHasher {
        Argon2PasswordHasher::new()
    }

    #[rstest]
    fn digests_are_salted_argon2id(hasher: Argon2PasswordHasher) {
        let first = hasher.hash("correct horse").expect("hash");
        let second = hasher.hash("correct horse").expect("hash");

        assert!(first.as_str().starts_with("$argon2id$"));
        assert_ne!(first, second);
    }

    #[rstest]
    #[case("correct horse", true)]
    #[case("wrong horse", false)]
    fn verify_compares_against_digest(
        hasher: Argon2PasswordHasher,
        #[case] attempt: &str,
        #[case] expected: bool,
    ) {
        let digest = hasher.hash("correct horse").expect("hash");
        assert_eq!(hasher.verify(attempt, &digest).expect("verify"), expected);
    }

    #[rstest]
    #[case("")]
    #[case("correct horse")]
    fn decoy_digest_parses_and_matches_nothing(
        hasher: Argon2PasswordHasher,
        #[case] attempt: &str,
    ) {
        let decoy = hasher.decoy_digest();
        assert!(decoy.as_str().starts_with("$argon2id$v=19$m=19456,t=2,p=1$"));
        assert!(!hasher.verify(attempt, &decoy).expect("decoy verifies"));
    }

    #[rstest]
    fn malformed_digest_is_an_error(hasher: Argon2PasswordHasher) {
        let error = hasher
            .verify("anything", &PasswordDigest::new("not-a-phc-string"))
            .expect_err("malformed");
        assert!(matches!(error, PasswordHashError::MalformedDigest { .. }));
    }
}
