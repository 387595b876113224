use argon2::{Config, Variant};
use rand::RngCore;
use thiserror::Error;

/// Argon2id password hashing. Every hash is keyed with the server secret and salted with fresh random bytes.
#[derive(Clone, Debug)]
pub struct PasswordHasher {
  secret_key: Vec<u8>,
}

/// A password hash together with the salt it was made with. Both are stored on the user row.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct HashedPassword {
  pub hash: Vec<u8>,
  pub salt: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum HashError {
  #[error("Failed to hash password")]
  HashFail(#[from] argon2::Error),
}

pub const SALT_LENGTH: usize = 32;

impl PasswordHasher {
  pub fn new<S: Into<Vec<u8>>>(secret_key: S) -> Self {
    Self { secret_key: secret_key.into() }
  }

  /// Hashes `password` with a newly generated salt.
  pub fn hash_new_password(&self, password: impl AsRef<[u8]>) -> Result<HashedPassword, HashError> {
    let mut salt = vec![0; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    let hash = argon2::hash_raw(password.as_ref(), &salt, &self.argon2_config())?;
    Ok(HashedPassword { hash, salt })
  }

  /// Whether `password` hashes to `hash` with `salt`.
  pub fn verify(&self, password: impl AsRef<[u8]>, salt: &[u8], hash: &[u8]) -> Result<bool, HashError> {
    Ok(argon2::verify_raw(password.as_ref(), salt, hash, &self.argon2_config())?)
  }

  fn argon2_config(&self) -> Config {
    Config {
      variant: Variant::Argon2id,
      secret: &self.secret_key,
      ..Config::default()
    }
  }
}
