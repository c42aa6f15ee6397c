use std::fmt;

use crate::storage::StoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoError {
    /// Field-level validation messages.
    Validation(Vec<String>),
    /// The todo does not exist (or is not visible to the caller).
    NotFound,
    /// The caller's account no longer exists.
    NoSuchUser,
    /// Only admins may change todos that don't belong to them.
    NotAllowed,
    /// A store failed.
    Store(StoreError),
}

impl fmt::Display for TodoError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TodoError::Validation(errors) => write!(f, "validation failed: {}", errors.join("; ")),
            TodoError::NotFound => write!(f, "todo not found"),
            TodoError::NoSuchUser => write!(f, "no such user"),
            TodoError::NotAllowed => write!(
                f,
                "only admins are allowed to update todos that don't belong to them"
            ),
            TodoError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for TodoError {}

/// Todo lookups and mutations report a missing row as [`TodoError::NotFound`].
impl From<StoreError> for TodoError {
    fn from(error: StoreError) -> TodoError {
        match error {
            StoreError::NotFound => TodoError::NotFound,
            other => TodoError::Store(other),
        }
    }
}
