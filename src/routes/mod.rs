pub mod health;
pub mod todos;
pub mod users;

use actix_web::web;
use serde::Serialize;
use std::sync::Arc;

use crate::auth::{AuthService, PasswordHasher, TokenIssuer};
use crate::error::AppError;
use crate::storage::{TodoStore, UserStore};
use crate::todos::{OwnershipAuthorizer, TodosService};

/// Envelope wrapped around every JSON response.
///
/// Successful responses carry `data`; failures carry `errors`. Empty members
/// are left out.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl<T> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            data: Some(data),
            errors: Vec::new(),
        }
    }

    pub fn errors(errors: Vec<String>) -> Self {
        Self { data: None, errors }
    }
}

impl ApiResponse<()> {
    /// A success with nothing to return.
    pub fn empty() -> Self {
        Self {
            data: None,
            errors: Vec::new(),
        }
    }
}

/// The services shared by every worker, ready to be registered with `App::app_data`.
#[derive(Clone)]
pub struct AppState {
    pub auth: web::Data<AuthService>,
    pub todos: web::Data<TodosService>,
}

impl AppState {
    /// Wires both services over one user store and one todo store.
    pub fn new<U, T>(users: Arc<U>, todos: Arc<T>, hasher: PasswordHasher, tokens: TokenIssuer) -> Self
    where
        U: UserStore + 'static,
        T: TodoStore + 'static,
    {
        let authorizer = OwnershipAuthorizer::new(users.clone(), todos.clone());
        Self {
            auth: web::Data::new(AuthService::new(users, hasher, tokens)),
            todos: web::Data::new(TodosService::new(todos, authorizer)),
        }
    }
}

/// Malformed JSON bodies answer 400 in the usual envelope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

/// Query strings that do not parse (e.g. `page=abc`) answer 400 in the usual envelope.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

/// Registers the routes that live under `/api`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .service(
                web::scope("/auth")
                    .service(users::sign_up)
                    .service(users::sign_in)
                    .service(users::refresh)
                    .service(users::logout),
            )
            .service(users::me)
            .service(users::update_me)
            .service(users::delete_user),
    )
    .service(
        web::scope("/todos")
            .service(todos::create_todo)
            .service(todos::list_todos)
            .service(todos::get_todo)
            .service(todos::update_todo)
            .service(todos::complete_todo)
            .service(todos::incomplete_todo)
            .service(todos::delete_todo),
    );
}
