//! Postgres-backed stores.
//!
//! Queries are built at runtime with `sqlx::query`/`query_as`, so the crate
//! compiles without a live database. The schema lives in `migrations/`.

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use sqlx::PgPool;
use uuid::Uuid;

use super::{StoreError, TodoLookup, TodoStore, UserLookup, UserStore};
use crate::models::{ListTodos, NewUser, Todo, TodoInput, User, UserChanges};

const USER_COLUMNS: &str = "id, username, email, password_hash, role, created_at, updated_at";
const TODO_COLUMNS: &str = "id, author_id, title, body, completed, deadline, created_at, updated_at";

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserLookup for PgUserStore {
    async fn get(&self, id: &str) -> Result<User, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: NewUser) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        debug!("inserting user {}", id);

        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $5)",
        )
        .bind(&id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn get_by_email(&self, email: &str) -> Result<User, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update(&self, id: &str, changes: UserChanges) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE users
             SET username = COALESCE($1, username),
                 password_hash = COALESCE($2, password_hash),
                 updated_at = $3
             WHERE id = $4",
        )
        .bind(changes.username)
        .bind(changes.password_hash)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgTodoStore {
    pool: PgPool,
}

impl PgTodoStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TodoLookup for PgTodoStore {
    async fn get(&self, id: &str) -> Result<Todo, StoreError> {
        let sql = format!("SELECT {} FROM todos WHERE id = $1", TODO_COLUMNS);
        let todo = sqlx::query_as::<_, Todo>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(todo)
    }
}

#[async_trait]
impl TodoStore for PgTodoStore {
    async fn create(&self, author_id: &str, input: TodoInput) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO todos (id, author_id, title, body, completed, deadline, created_at, updated_at)
             VALUES ($1, $2, $3, $4, FALSE, $5, $6, $6)",
        )
        .bind(&id)
        .bind(author_id)
        .bind(&input.title)
        .bind(&input.body)
        .bind(input.deadline)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn list(&self, options: &ListTodos) -> Result<Vec<Todo>, StoreError> {
        // The ORDER BY clause comes from a closed enum, never from user text.
        let mut sql = format!("SELECT {} FROM todos WHERE author_id = $1", TODO_COLUMNS);
        if options.only_completed {
            sql.push_str(" AND completed = TRUE");
        }
        sql.push_str(&format!(
            " ORDER BY {} LIMIT $2 OFFSET $3",
            options.sort_by.order_clause()
        ));

        let todos = sqlx::query_as::<_, Todo>(&sql)
            .bind(&options.author_id)
            .bind(i64::from(options.page_size))
            .bind(options.offset() as i64)
            .fetch_all(&self.pool)
            .await?;
        Ok(todos)
    }

    async fn update(&self, id: &str, input: TodoInput) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE todos SET title = $1, body = $2, deadline = $3, updated_at = $4 WHERE id = $5",
        )
        .bind(&input.title)
        .bind(&input.body)
        .bind(input.deadline)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn set_completed(&self, id: &str, completed: bool) -> Result<(), StoreError> {
        let result =
            sqlx::query("UPDATE todos SET completed = $1, updated_at = $2 WHERE id = $3")
                .bind(completed)
                .bind(Utc::now())
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
