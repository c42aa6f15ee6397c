use bcrypt::{hash, verify, DEFAULT_COST};
use std::fmt;

/// bcrypt only reads this many bytes of a password; longer input is refused
/// rather than silently truncated.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Failure modes of the credential hasher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordError {
    /// bcrypt itself failed (bad cost, malformed stored hash, RNG failure).
    Hashing(String),
    /// The password does not match the stored hash.
    Mismatch,
}

impl fmt::Display for PasswordError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PasswordError::Hashing(msg) => write!(f, "failed to hash password: {}", msg),
            PasswordError::Mismatch => write!(f, "password does not match"),
        }
    }
}

impl std::error::Error for PasswordError {}

/// Salted bcrypt hashing with a fixed cost factor.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(PasswordError::Hashing(format!(
                "password is longer than {} bytes",
                MAX_PASSWORD_BYTES
            )));
        }
        hash(password, self.cost).map_err(|e| PasswordError::Hashing(e.to_string()))
    }

    /// Checks `password` against `hashed_password` using bcrypt's own comparison.
    ///
    /// A wrong password is reported as [`PasswordError::Mismatch`], never as a
    /// hashing failure, so callers can tell the two apart. A password over
    /// [`MAX_PASSWORD_BYTES`] can never have been hashed, so it is a mismatch.
    pub fn verify(&self, password: &str, hashed_password: &str) -> Result<(), PasswordError> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(PasswordError::Mismatch);
        }
        match verify(password, hashed_password) {
            Ok(true) => Ok(()),
            Ok(false) => Err(PasswordError::Mismatch),
            Err(e) => Err(PasswordError::Hashing(e.to_string())),
        }
    }
}
