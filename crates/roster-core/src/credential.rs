//! Password credentials.
//!
//! Only the argon2 PHC string is ever stored; the clear-text password lives
//! no longer than the request that carried it.

use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use rand_core::OsRng;

use crate::{Error, Result};

/// An argon2id PHC string, e.g. `$argon2id$v=19$…`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
  /// Hash `password` with a freshly generated salt.
  pub fn hash(password: &str) -> Result<Self> {
    if password.is_empty() {
      return Err(Error::EmptyField("password"));
    }
    let salt = SaltString::generate(&mut OsRng);
    let phc = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| Error::Credential(e.to_string()))?
      .to_string();
    Ok(Self(phc))
  }

  pub fn as_phc(&self) -> &str { &self.0 }
}

// Never print the hash, not even in debug output.
impl std::fmt::Debug for Credential {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str("Credential(..)")
  }
}
