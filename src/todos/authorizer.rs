//! Who may change a todo.
//!
//! An admin may change any todo; everybody else only the todos they authored.

use std::sync::Arc;

use super::errors::TodoError;
use crate::models::{Role, Todo, User};
use crate::storage::{StoreError, TodoLookup, UserLookup};

/// The ownership rule on its own: admins always pass, others must be the author.
pub fn decide(caller_role: Role, caller_id: &str, author_id: &str) -> bool {
    caller_role == Role::Admin || caller_id == author_id
}

#[derive(Clone)]
pub struct OwnershipAuthorizer {
    users: Arc<dyn UserLookup>,
    todos: Arc<dyn TodoLookup>,
}

impl OwnershipAuthorizer {
    pub fn new(users: Arc<dyn UserLookup>, todos: Arc<dyn TodoLookup>) -> Self {
        Self { users, todos }
    }

    /// Decides whether `caller_id` may mutate `todo_id`.
    ///
    /// The caller is looked up first; a vanished account fails with
    /// [`TodoError::NoSuchUser`]. Admins are allowed without the todo being
    /// fetched at all. For everybody else a missing todo fails with
    /// [`TodoError::NotFound`], and a todo written by someone else yields
    /// `Ok(false)`.
    pub async fn is_allowed(&self, caller_id: &str, todo_id: &str) -> Result<bool, TodoError> {
        let caller = self.caller(caller_id).await?;
        if caller.role == Role::Admin {
            return Ok(true);
        }

        let todo = self.todos.get(todo_id).await?;
        Ok(decide(caller.role, &caller.id, &todo.author_id))
    }

    /// Same rule as [`is_allowed`](Self::is_allowed) for a todo the caller already holds.
    pub async fn can_view(&self, caller_id: &str, todo: &Todo) -> Result<bool, TodoError> {
        let caller = self.caller(caller_id).await?;
        Ok(decide(caller.role, &caller.id, &todo.author_id))
    }

    async fn caller(&self, caller_id: &str) -> Result<User, TodoError> {
        self.users.get(caller_id).await.map_err(|e| match e {
            StoreError::NotFound => TodoError::NoSuchUser,
            other => TodoError::Store(other),
        })
    }
}
