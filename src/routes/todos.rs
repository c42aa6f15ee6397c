use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{TodoInput, TodoQuery},
    routes::ApiResponse,
    todos::TodosService,
};
use actix_web::{delete, get, patch, post, put, web, HttpResponse, Responder};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CreatedTodo {
    pub id: String,
}

/// Creates a new todo authored by the authenticated user.
///
/// ## Request Body:
/// - `title`: 6 to 100 characters (required).
/// - `body` (optional): at most 2000 characters.
/// - `deadline`: RFC 3339 timestamp, not in the past.
///
/// ## Responses:
/// - `201 Created`: `{"data": {"id": ...}}`.
/// - `401 Unauthorized`: missing or invalid access key.
/// - `422 Unprocessable Entity`: validation failed; every offending field is listed.
#[post("")]
pub async fn create_todo(
    todos: web::Data<TodosService>,
    user: AuthenticatedUser,
    input: web::Json<TodoInput>,
) -> Result<impl Responder, AppError> {
    let id = todos.create(user.id(), input.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::data(CreatedTodo { id })))
}

/// Lists the authenticated user's todos.
///
/// ## Query Parameters:
/// - `page_size` (optional): 1 to 50, defaults to 10.
/// - `page` (optional): zero-based page number.
/// - `only_completed` (optional): only return completed todos.
/// - `sort_by` (optional): `creation_asc` (default), `creation_desc`, `deadline_asc` or `deadline_desc`.
#[get("")]
pub async fn list_todos(
    todos: web::Data<TodosService>,
    user: AuthenticatedUser,
    query: web::Query<TodoQuery>,
) -> Result<impl Responder, AppError> {
    let list = todos.list(user.id(), query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::data(list)))
}

/// Retrieves a todo by id.
///
/// Authors see their own todos and admins see any. Todos of other users
/// answer `404 Not Found`, exactly like missing ones.
#[get("/{id}")]
pub async fn get_todo(
    todos: web::Data<TodosService>,
    user: AuthenticatedUser,
    todo_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let todo = todos.get(user.id(), &todo_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::data(todo)))
}

/// Replaces the title, body and deadline of a todo.
///
/// ## Responses:
/// - `200 OK`: the todo was updated.
/// - `403 Forbidden`: the caller is neither the author nor an admin.
/// - `404 Not Found`: no such todo.
/// - `422 Unprocessable Entity`: validation failed.
#[patch("/{id}")]
pub async fn update_todo(
    todos: web::Data<TodosService>,
    user: AuthenticatedUser,
    todo_id: web::Path<String>,
    input: web::Json<TodoInput>,
) -> Result<impl Responder, AppError> {
    todos
        .update(user.id(), &todo_id, input.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::empty()))
}

#[put("/{id}/complete")]
pub async fn complete_todo(
    todos: web::Data<TodosService>,
    user: AuthenticatedUser,
    todo_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    todos.mark_complete(user.id(), &todo_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::empty()))
}

#[put("/{id}/incomplete")]
pub async fn incomplete_todo(
    todos: web::Data<TodosService>,
    user: AuthenticatedUser,
    todo_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    todos.mark_not_complete(user.id(), &todo_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::empty()))
}

/// Deletes a todo. Same access rule as updates.
///
/// ## Responses:
/// - `204 No Content`: on successful deletion.
/// - `403 Forbidden`: the caller is neither the author nor an admin.
/// - `404 Not Found`: no such todo.
#[delete("/{id}")]
pub async fn delete_todo(
    todos: web::Data<TodosService>,
    user: AuthenticatedUser,
    todo_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    todos.delete(user.id(), &todo_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
