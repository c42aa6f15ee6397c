//! Errors produced by the auth service.
//!
//! Credential failures are kept deliberately vague in their messages: a
//! missing account and a wrong password both read as invalid credentials once
//! they reach HTTP (see `error::AppError`).

use std::fmt;

use super::password::PasswordError;
use super::token::TokenError;
use crate::storage::StoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Field-level validation messages, produced before any store or crypto call.
    Validation(Vec<String>),
    /// Another account already uses this email.
    EmailTaken,
    /// No account matches the given email or id.
    NoSuchUser,
    /// The password does not match the account.
    WrongPassword,
    /// An access token failed verification.
    InvalidToken,
    /// A refresh token failed verification.
    InvalidRefresh,
    /// Hashing or signing failed inside a library.
    Internal(String),
    /// The user store failed.
    Store(StoreError),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AuthError::Validation(errors) => write!(f, "validation failed: {}", errors.join("; ")),
            AuthError::EmailTaken => write!(f, "email is taken"),
            AuthError::NoSuchUser => write!(f, "no such user"),
            AuthError::WrongPassword => write!(f, "wrong password"),
            AuthError::InvalidToken => write!(f, "invalid access key"),
            AuthError::InvalidRefresh => write!(f, "invalid refresh key"),
            AuthError::Internal(msg) => write!(f, "internal error: {}", msg),
            AuthError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<PasswordError> for AuthError {
    fn from(error: PasswordError) -> AuthError {
        match error {
            PasswordError::Mismatch => AuthError::WrongPassword,
            PasswordError::Hashing(msg) => AuthError::Internal(msg),
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(error: TokenError) -> AuthError {
        match error {
            TokenError::InvalidToken(_) => AuthError::InvalidToken,
            TokenError::InvalidRefresh(_) => AuthError::InvalidRefresh,
            TokenError::Signing(msg) => AuthError::Internal(msg),
        }
    }
}

/// Lookups by id or email report a missing row as [`AuthError::NoSuchUser`].
impl From<StoreError> for AuthError {
    fn from(error: StoreError) -> AuthError {
        match error {
            StoreError::NotFound => AuthError::NoSuchUser,
            StoreError::UniqueViolation => AuthError::EmailTaken,
            other => AuthError::Store(other),
        }
    }
}
