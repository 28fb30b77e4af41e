//! Password and session token helpers

use argon2::{
  password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use sha2::{Digest, Sha256};

/// Hash a password using Argon2id
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
  let salt = SaltString::generate(&mut OsRng);
  let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
  Ok(hash.to_string())
}

/// Verify a password against an Argon2 hash
pub fn verify_password(password: &str, hash: &str) -> bool {
  let parsed_hash = match PasswordHash::new(hash) {
    Ok(h) => h,
    Err(_) => return false,
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .is_ok()
}

/// Generate a random session token
pub fn generate_session_token() -> String {
  use rand::Rng;
  let mut rng = rand::thread_rng();
  let bytes: [u8; 32] = rng.gen();
  hex::encode(bytes)
}

/// Hash a session token for storage
pub fn hash_session_token(token: &str) -> String {
  let mut hasher = Sha256::new();
  hasher.update(token.as_bytes());
  hex::encode(hasher.finalize())
}

/// Post-login redirect target. Only same-site absolute paths are honored.
pub fn safe_next(next: Option<&str>) -> &str {
  match next {
    Some(n) if n.starts_with('/') && !n.starts_with("//") && !n.contains('\\') => n,
    _ => "/",
  }
}
