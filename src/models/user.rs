use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use crate::auth::password::MAX_PASSWORD_BYTES;

lazy_static! {
    // Letters, digits, spaces, dots, underscores and hyphens.
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9 ._-]+$").unwrap();
}

/// bcrypt reads at most `MAX_PASSWORD_BYTES`, so the cap is on bytes, not characters.
fn validate_password_bytes(password: &str) -> Result<(), ValidationError> {
    if password.len() > MAX_PASSWORD_BYTES {
        let mut error = ValidationError::new("password_too_long");
        error.message = Some(format!("password may be at most {} bytes", MAX_PASSWORD_BYTES).into());
        return Err(error);
    }
    Ok(())
}

/// Role of a user account.
/// Corresponds to the `user_role` SQL enum.
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// May mutate any todo.
    Admin,
    /// May only mutate todos they authored.
    #[default]
    User,
}

/// A registered account as stored in the database.
///
/// The password hash is never serialized into responses.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data needed to persist a new account. The email is expected to be lower-cased already.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
}

/// Profile changes applied by `UserStore::update`. `None` leaves a column untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub password_hash: Option<String>,
}

/// Payload for signing up.
#[derive(Debug, Deserialize, Validate)]
pub struct SignUpInput {
    #[validate(email(message = "invalid email"))]
    pub email: String,
    #[validate(
        length(min = 6, max = 20, message = "username has to be between 6 and 20 characters"),
        regex(
            path = "USERNAME_REGEX",
            message = "username may only contain letters, digits, spaces, dots, underscores or hyphens"
        )
    )]
    pub username: String,
    #[validate(
        length(min = 6, message = "password has to be at least 6 characters"),
        custom = "validate_password_bytes"
    )]
    pub password: String,
}

/// Payload for signing in. Only presence is checked here; a bad pair fails as invalid credentials.
#[derive(Debug, Deserialize, Validate)]
pub struct SignInInput {
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Payload for updating the caller's own profile.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserInput {
    #[validate(
        length(min = 6, max = 20, message = "username has to be between 6 and 20 characters"),
        regex(
            path = "USERNAME_REGEX",
            message = "username may only contain letters, digits, spaces, dots, underscores or hyphens"
        )
    )]
    pub username: String,
    #[validate(
        length(min = 6, message = "password has to be at least 6 characters"),
        custom = "validate_password_bytes"
    )]
    pub password: String,
}
