//! Storage abstractions for users and todos.
//!
//! The auth and todos services only see these traits. `UserLookup` and
//! `TodoLookup` are the narrow read interfaces the ownership authorizer needs;
//! `UserStore` and `TodoStore` extend them with the writes the services perform.
//!
//! Two backends implement them: [`postgres`] for the running service and
//! [`memory`] for tests and local experiments.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use std::fmt;

use crate::models::{ListTodos, NewUser, Todo, TodoInput, User, UserChanges};

pub use memory::{MemoryTodoStore, MemoryUserStore};
pub use postgres::{PgTodoStore, PgUserStore};

/// Errors reported by a storage backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The requested row does not exist.
    NotFound,
    /// A uniqueness constraint was violated (e.g. a taken email).
    UniqueViolation,
    /// Any other backend failure.
    Database(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "record not found"),
            StoreError::UniqueViolation => write!(f, "unique constraint violated"),
            StoreError::Database(msg) => write!(f, "database error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Postgres SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> StoreError {
        match error {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(ref db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                StoreError::UniqueViolation
            }
            _ => StoreError::Database(error.to_string()),
        }
    }
}

/// Read access to user records by id.
#[async_trait]
pub trait UserLookup: Send + Sync {
    async fn get(&self, id: &str) -> Result<User, StoreError>;
}

/// Full user persistence used by the auth service.
#[async_trait]
pub trait UserStore: UserLookup {
    /// Inserts a new user with the default role and returns its id.
    async fn create(&self, user: NewUser) -> Result<String, StoreError>;
    async fn get_by_email(&self, email: &str) -> Result<User, StoreError>;
    async fn update(&self, id: &str, changes: UserChanges) -> Result<(), StoreError>;
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

/// Read access to todo records by id.
#[async_trait]
pub trait TodoLookup: Send + Sync {
    async fn get(&self, id: &str) -> Result<Todo, StoreError>;
}

/// Full todo persistence used by the todos service.
#[async_trait]
pub trait TodoStore: TodoLookup {
    async fn create(&self, author_id: &str, input: TodoInput) -> Result<String, StoreError>;
    async fn list(&self, options: &ListTodos) -> Result<Vec<Todo>, StoreError>;
    async fn update(&self, id: &str, input: TodoInput) -> Result<(), StoreError>;
    async fn set_completed(&self, id: &str, completed: bool) -> Result<(), StoreError>;
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}
