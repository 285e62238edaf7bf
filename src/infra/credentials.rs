//! Argon2 password hashing.

use argon2::{
    Argon2,
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
};
use rand_core::OsRng;

use crate::application::credentials::{CredentialError, CredentialStore};

/// Produces and checks PHC-format argon2id hashes with the library defaults.
#[derive(Debug, Default, Clone)]
pub struct Argon2CredentialStore;

impl Argon2CredentialStore {
    pub fn new() -> Self {
        Self
    }
}

impl CredentialStore for Argon2CredentialStore {
    fn hash(&self, password: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| CredentialError::Hash(err.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, CredentialError> {
        let parsed =
            PasswordHash::new(hash).map_err(|err| CredentialError::MalformedHash(err.to_string()))?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(PasswordHashError::Password) => Ok(false),
            Err(err) => Err(CredentialError::Hash(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let store = Argon2CredentialStore::new();
        let hash = store.hash("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(store.verify("correct horse", &hash).unwrap());
        assert!(!store.verify("battery staple", &hash).unwrap());
    }

    #[test]
    fn salts_differ_between_hashes() {
        let store = Argon2CredentialStore::new();
        assert_ne!(store.hash("same").unwrap(), store.hash("same").unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        let store = Argon2CredentialStore::new();
        assert!(matches!(
            store.verify("pw", "not-a-phc-string"),
            Err(CredentialError::MalformedHash(_))
        ));
    }
}
