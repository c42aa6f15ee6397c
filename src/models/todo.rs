use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents a todo as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Todo {
    /// Unique identifier (UUID v4 text).
    pub id: String,
    /// Identifier of the user who created the todo.
    pub author_id: String,
    pub title: String,
    pub body: String,
    pub completed: bool,
    pub deadline: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a todo or replacing its editable fields.
///
/// Title must be between 6 and 100 characters, body at most 2000.
/// The deadline is checked against the clock by the todos service.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TodoInput {
    #[validate(length(
        min = 6,
        max = 100,
        message = "title can't be less than 6 characters and more than 100 characters"
    ))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 2000, message = "body can't be more than 2000 characters"))]
    pub body: String,

    pub deadline: DateTime<Utc>,
}

/// Ordering applied when listing todos.
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    CreationAsc,
    CreationDesc,
    DeadlineAsc,
    DeadlineDesc,
}

impl SortBy {
    /// SQL `ORDER BY` clause for this ordering.
    pub fn order_clause(self) -> &'static str {
        match self {
            SortBy::CreationAsc => "created_at ASC",
            SortBy::CreationDesc => "created_at DESC",
            SortBy::DeadlineAsc => "deadline ASC",
            SortBy::DeadlineDesc => "deadline DESC",
        }
    }
}

/// Query parameters accepted when listing todos.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct TodoQuery {
    #[validate(range(min = 1, max = 50, message = "page_size cannot be more than 50 or less than 1"))]
    pub page_size: Option<u32>,
    pub page: Option<u32>,
    pub only_completed: Option<bool>,
    pub sort_by: Option<SortBy>,
}

/// Resolved listing options handed to the todo store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListTodos {
    pub author_id: String,
    pub page_size: u32,
    pub page: u32,
    pub only_completed: bool,
    pub sort_by: SortBy,
}

pub const DEFAULT_PAGE_SIZE: u32 = 10;

impl ListTodos {
    pub fn new(author_id: &str, query: &TodoQuery) -> Self {
        Self {
            author_id: author_id.to_string(),
            page_size: query.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            page: query.page.unwrap_or(0),
            only_completed: query.only_completed.unwrap_or(false),
            sort_by: query.sort_by.unwrap_or_default(),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page_size) * u64::from(self.page)
    }
}
