//! In-memory stores backed by `tokio::sync::RwLock` maps.
//!
//! They mirror the Postgres semantics the services rely on: unique emails and
//! `NotFound` for missing rows. A user store built with
//! [`MemoryUserStore::cascading_to`] also drops the user's todos on delete, like
//! the `ON DELETE CASCADE` foreign key does.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, TodoLookup, TodoStore, UserLookup, UserStore};
use crate::models::{ListTodos, NewUser, Role, SortBy, Todo, TodoInput, User, UserChanges};

#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, User>>,
    todos: Option<Arc<MemoryTodoStore>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A user store whose deletes also remove the user's todos from `todos`.
    pub fn cascading_to(todos: Arc<MemoryTodoStore>) -> Self {
        Self {
            users: RwLock::default(),
            todos: Some(todos),
        }
    }

    /// Changes a user's role. There is no API for this; admins are provisioned out of band.
    pub async fn set_role(&self, id: &str, role: Role) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(id).ok_or(StoreError::NotFound)?;
        user.role = role;
        user.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl UserLookup for MemoryUserStore {
    async fn get(&self, id: &str) -> Result<User, StoreError> {
        self.users
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: NewUser) -> Result<String, StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::UniqueViolation);
        }

        let now = Utc::now();
        let id = Uuid::new_v4().to_string();
        users.insert(
            id.clone(),
            User {
                id: id.clone(),
                username: user.username,
                email: user.email,
                password_hash: user.password_hash,
                role: Role::default(),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn get_by_email(&self, email: &str) -> Result<User, StoreError> {
        self.users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update(&self, id: &str, changes: UserChanges) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(id).ok_or(StoreError::NotFound)?;
        if let Some(username) = changes.username {
            user.username = username;
        }
        if let Some(password_hash) = changes.password_hash {
            user.password_hash = password_hash;
        }
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.users
            .write()
            .await
            .remove(id)
            .ok_or(StoreError::NotFound)?;
        if let Some(todos) = &self.todos {
            todos.remove_by_author(id).await;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryTodoStore {
    todos: RwLock<HashMap<String, Todo>>,
}

impl MemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every todo written by `author_id`, the counterpart of `ON DELETE CASCADE`.
    pub async fn remove_by_author(&self, author_id: &str) {
        self.todos
            .write()
            .await
            .retain(|_, todo| todo.author_id != author_id);
    }
}

#[async_trait]
impl TodoLookup for MemoryTodoStore {
    async fn get(&self, id: &str) -> Result<Todo, StoreError> {
        self.todos
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl TodoStore for MemoryTodoStore {
    async fn create(&self, author_id: &str, input: TodoInput) -> Result<String, StoreError> {
        let now = Utc::now();
        let id = Uuid::new_v4().to_string();
        self.todos.write().await.insert(
            id.clone(),
            Todo {
                id: id.clone(),
                author_id: author_id.to_string(),
                title: input.title,
                body: input.body,
                completed: false,
                deadline: input.deadline,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn list(&self, options: &ListTodos) -> Result<Vec<Todo>, StoreError> {
        let todos = self.todos.read().await;
        let mut selected: Vec<Todo> = todos
            .values()
            .filter(|t| t.author_id == options.author_id)
            .filter(|t| !options.only_completed || t.completed)
            .cloned()
            .collect();

        match options.sort_by {
            SortBy::CreationAsc => selected.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            SortBy::CreationDesc => selected.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortBy::DeadlineAsc => selected.sort_by(|a, b| a.deadline.cmp(&b.deadline)),
            SortBy::DeadlineDesc => selected.sort_by(|a, b| b.deadline.cmp(&a.deadline)),
        }

        Ok(selected
            .into_iter()
            .skip(options.offset() as usize)
            .take(options.page_size as usize)
            .collect())
    }

    async fn update(&self, id: &str, input: TodoInput) -> Result<(), StoreError> {
        let mut todos = self.todos.write().await;
        let todo = todos.get_mut(id).ok_or(StoreError::NotFound)?;
        todo.title = input.title;
        todo.body = input.body;
        todo.deadline = input.deadline;
        todo.updated_at = Utc::now();
        Ok(())
    }

    async fn set_completed(&self, id: &str, completed: bool) -> Result<(), StoreError> {
        let mut todos = self.todos.write().await;
        let todo = todos.get_mut(id).ok_or(StoreError::NotFound)?;
        todo.completed = completed;
        todo.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.todos
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}
