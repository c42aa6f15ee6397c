use chrono::{DateTime, Utc};
use log::{info, warn};
use std::sync::Arc;
use validator::Validate;

use super::authorizer::OwnershipAuthorizer;
use super::errors::TodoError;
use crate::error::validation_messages;
use crate::models::{ListTodos, Todo, TodoInput, TodoQuery};
use crate::storage::TodoStore;

/// Todo operations for authenticated callers.
///
/// Every mutation of an existing todo is checked by the ownership authorizer
/// before it is handed to the store.
#[derive(Clone)]
pub struct TodosService {
    todos: Arc<dyn TodoStore>,
    authorizer: OwnershipAuthorizer,
}

impl TodosService {
    pub fn new(todos: Arc<dyn TodoStore>, authorizer: OwnershipAuthorizer) -> Self {
        Self { todos, authorizer }
    }

    /// Creates a todo authored by `author_id` and returns its id.
    pub async fn create(&self, author_id: &str, input: TodoInput) -> Result<String, TodoError> {
        check_input(&input, Utc::now())?;
        let id = self.todos.create(author_id, input).await?;
        info!("user {} created todo {}", author_id, id);
        Ok(id)
    }

    /// Returns a todo visible to the caller. Todos of other users read as missing.
    pub async fn get(&self, caller_id: &str, id: &str) -> Result<Todo, TodoError> {
        let todo = self.todos.get(id).await?;
        if !self.authorizer.can_view(caller_id, &todo).await? {
            return Err(TodoError::NotFound);
        }
        Ok(todo)
    }

    /// Lists the caller's own todos.
    pub async fn list(&self, caller_id: &str, query: TodoQuery) -> Result<Vec<Todo>, TodoError> {
        query
            .validate()
            .map_err(|e| TodoError::Validation(validation_messages(&e)))?;
        let options = ListTodos::new(caller_id, &query);
        Ok(self.todos.list(&options).await?)
    }

    pub async fn update(&self, caller_id: &str, id: &str, input: TodoInput) -> Result<(), TodoError> {
        check_input(&input, Utc::now())?;
        self.ensure_allowed(caller_id, id).await?;
        Ok(self.todos.update(id, input).await?)
    }

    pub async fn mark_complete(&self, caller_id: &str, id: &str) -> Result<(), TodoError> {
        self.ensure_allowed(caller_id, id).await?;
        Ok(self.todos.set_completed(id, true).await?)
    }

    pub async fn mark_not_complete(&self, caller_id: &str, id: &str) -> Result<(), TodoError> {
        self.ensure_allowed(caller_id, id).await?;
        Ok(self.todos.set_completed(id, false).await?)
    }

    pub async fn delete(&self, caller_id: &str, id: &str) -> Result<(), TodoError> {
        self.ensure_allowed(caller_id, id).await?;
        self.todos.delete(id).await?;
        info!("user {} deleted todo {}", caller_id, id);
        Ok(())
    }

    async fn ensure_allowed(&self, caller_id: &str, id: &str) -> Result<(), TodoError> {
        if self.authorizer.is_allowed(caller_id, id).await? {
            Ok(())
        } else {
            warn!("user {} may not change todo {}", caller_id, id);
            Err(TodoError::NotAllowed)
        }
    }
}

/// Validates field lengths and that the deadline is not already behind `now`.
fn check_input(input: &TodoInput, now: DateTime<Utc>) -> Result<(), TodoError> {
    let mut messages = match input.validate() {
        Ok(()) => Vec::new(),
        Err(e) => validation_messages(&e),
    };
    if input.deadline < now {
        messages.push("deadline: deadline can't be in the past".to_string());
    }

    if messages.is_empty() {
        Ok(())
    } else {
        Err(TodoError::Validation(messages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewUser, Role, SortBy};
    use crate::storage::{MemoryTodoStore, MemoryUserStore, TodoLookup, UserStore};
    use chrono::Duration;

    struct Fixture {
        service: TodosService,
        users: Arc<MemoryUserStore>,
        todos: Arc<MemoryTodoStore>,
    }

    fn fixture() -> Fixture {
        let users = Arc::new(MemoryUserStore::new());
        let todos = Arc::new(MemoryTodoStore::new());
        let authorizer = OwnershipAuthorizer::new(users.clone(), todos.clone());
        Fixture {
            service: TodosService::new(todos.clone(), authorizer),
            users,
            todos,
        }
    }

    async fn add_user(users: &MemoryUserStore, email: &str, role: Role) -> String {
        let id = users
            .create(NewUser {
                email: email.to_string(),
                username: "johndoe".to_string(),
                password_hash: "$2b$04$hash".to_string(),
            })
            .await
            .unwrap();
        users.set_role(&id, role).await.unwrap();
        id
    }

    fn input(title: &str) -> TodoInput {
        TodoInput {
            title: title.to_string(),
            body: "wash everything".to_string(),
            deadline: Utc::now() + Duration::days(1),
        }
    }

    #[test]
    fn test_check_input_collects_all_messages() {
        let now = Utc::now();
        let bad = TodoInput {
            title: "Dish".to_string(),
            body: "b".repeat(2001),
            deadline: now - Duration::minutes(1),
        };
        match check_input(&bad, now) {
            Err(TodoError::Validation(messages)) => assert_eq!(messages.len(), 3, "{:?}", messages),
            other => panic!("expected validation error, got {:?}", other),
        }

        let good = TodoInput {
            title: "Do dishes tomorrow".to_string(),
            body: String::new(),
            deadline: now,
        };
        assert_eq!(check_input(&good, now), Ok(()));
    }

    #[actix_rt::test]
    async fn test_create_and_get() {
        let f = fixture();
        let author = add_user(&f.users, "author@b.com", Role::User).await;

        let id = f.service.create(&author, input("Do dishes tomorrow")).await.unwrap();
        let todo = f.service.get(&author, &id).await.unwrap();
        assert_eq!(todo.author_id, author);
        assert_eq!(todo.title, "Do dishes tomorrow");
        assert!(!todo.completed);
    }

    #[actix_rt::test]
    async fn test_create_rejects_past_deadline() {
        let f = fixture();
        let author = add_user(&f.users, "author@b.com", Role::User).await;
        let mut late = input("Do dishes yesterday");
        late.deadline = Utc::now() - Duration::hours(1);

        assert!(matches!(
            f.service.create(&author, late).await,
            Err(TodoError::Validation(_))
        ));
    }

    #[actix_rt::test]
    async fn test_get_hides_other_users_todos() {
        let f = fixture();
        let author = add_user(&f.users, "author@b.com", Role::User).await;
        let other = add_user(&f.users, "other@b.com", Role::User).await;
        let admin = add_user(&f.users, "admin@b.com", Role::Admin).await;
        let id = f.service.create(&author, input("Do dishes tomorrow")).await.unwrap();

        assert_eq!(f.service.get(&other, &id).await, Err(TodoError::NotFound));
        assert!(f.service.get(&admin, &id).await.is_ok());
    }

    #[actix_rt::test]
    async fn test_non_author_cannot_mutate() {
        let f = fixture();
        let author = add_user(&f.users, "author@b.com", Role::User).await;
        let other = add_user(&f.users, "other@b.com", Role::User).await;
        let id = f.service.create(&author, input("Do dishes tomorrow")).await.unwrap();

        assert_eq!(
            f.service.update(&other, &id, input("Hijacked title")).await,
            Err(TodoError::NotAllowed)
        );
        assert_eq!(f.service.mark_complete(&other, &id).await, Err(TodoError::NotAllowed));
        assert_eq!(
            f.service.mark_not_complete(&other, &id).await,
            Err(TodoError::NotAllowed)
        );
        assert_eq!(f.service.delete(&other, &id).await, Err(TodoError::NotAllowed));

        let untouched = f.todos.get(&id).await.unwrap();
        assert_eq!(untouched.title, "Do dishes tomorrow");
        assert!(!untouched.completed);
    }

    #[actix_rt::test]
    async fn test_author_and_admin_can_mutate() {
        let f = fixture();
        let author = add_user(&f.users, "author@b.com", Role::User).await;
        let admin = add_user(&f.users, "admin@b.com", Role::Admin).await;
        let id = f.service.create(&author, input("Do dishes tomorrow")).await.unwrap();

        f.service.mark_complete(&author, &id).await.unwrap();
        assert!(f.todos.get(&id).await.unwrap().completed);

        f.service.mark_not_complete(&admin, &id).await.unwrap();
        assert!(!f.todos.get(&id).await.unwrap().completed);

        f.service.update(&admin, &id, input("Renamed by admin")).await.unwrap();
        assert_eq!(f.todos.get(&id).await.unwrap().title, "Renamed by admin");

        f.service.delete(&author, &id).await.unwrap();
        assert_eq!(f.service.get(&author, &id).await, Err(TodoError::NotFound));
    }

    #[actix_rt::test]
    async fn test_mutating_missing_todo_is_not_found() {
        let f = fixture();
        let user = add_user(&f.users, "user@b.com", Role::User).await;

        assert_eq!(f.service.delete(&user, "missing").await, Err(TodoError::NotFound));
        assert_eq!(
            f.service.mark_complete(&user, "missing").await,
            Err(TodoError::NotFound)
        );
    }

    #[actix_rt::test]
    async fn test_list_is_scoped_to_caller() {
        let f = fixture();
        let author = add_user(&f.users, "author@b.com", Role::User).await;
        let other = add_user(&f.users, "other@b.com", Role::User).await;
        f.service.create(&author, input("First of mine")).await.unwrap();
        f.service.create(&author, input("Second of mine")).await.unwrap();
        f.service.create(&other, input("Not one of mine")).await.unwrap();

        let mine = f.service.list(&author, TodoQuery::default()).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|t| t.author_id == author));

        let query = TodoQuery {
            page_size: Some(1),
            sort_by: Some(SortBy::CreationDesc),
            ..Default::default()
        };
        assert_eq!(f.service.list(&author, query).await.unwrap().len(), 1);

        let too_big = TodoQuery {
            page_size: Some(100),
            ..Default::default()
        };
        assert!(matches!(
            f.service.list(&author, too_big).await,
            Err(TodoError::Validation(_))
        ));
    }
}
