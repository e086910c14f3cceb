use anyhow::anyhow;
use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use argon2::Argon2;

/// Hashing seam between handlers and the user repository. Swappable so
/// tests can run without argon2's work factor.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> anyhow::Result<String>;
    fn verify(&self, password: &str, hash: &str) -> anyhow::Result<bool>;
}

/// Argon2id with default parameters and a fresh random salt per hash.
pub struct Argon2Hasher;

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow!("hashing password: {e}"))?;
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, hash: &str) -> anyhow::Result<bool> {
        let parsed = PasswordHash::new(hash).map_err(|e| anyhow!("parsing stored hash: {e}"))?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(anyhow!("verifying password: {e}")),
        }
    }
}
