//!
//! # Custom Error Handling
//!
//! This module defines `AppError`, the error type every HTTP handler returns.
//! Domain errors from the auth service (`AuthError`), the todos service
//! (`TodoError`) and the stores (`StoreError`) are converted into it with `From`,
//! so handlers can use the `?` operator throughout.
//!
//! `AppError` implements `actix_web::error::ResponseError` and renders the same
//! JSON envelope as successful responses, with the messages under `errors`.
//! Internal failures are logged here and reach the client only as an opaque
//! message.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use log::error;
use std::fmt;
use validator::ValidationErrors;

use crate::auth::AuthError;
use crate::routes::ApiResponse;
use crate::storage::StoreError;
use crate::todos::TodoError;

/// Message shown to clients for any sign-in failure, whether or not the email exists.
const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Authentication failed or is missing (HTTP 401).
    Unauthorized(String),
    /// The caller is authenticated but not allowed to do this (HTTP 403).
    Forbidden(String),
    /// A malformed request (HTTP 400).
    BadRequest(String),
    /// The requested resource was not found (HTTP 404).
    NotFound(String),
    /// An unexpected server-side error (HTTP 500).
    InternalServerError(String),
    /// A storage failure (HTTP 500).
    DatabaseError(String),
    /// Input validation failed (HTTP 422 Unprocessable Entity).
    /// Carries one message per offending field rule.
    ValidationError(Vec<String>),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msgs) => write!(f, "Validation Error: {}", msgs.join("; ")),
        }
    }
}

impl AppError {
    /// Messages exposed to the client.
    fn messages(&self) -> Vec<String> {
        match self {
            AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg) => vec![msg.clone()],
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                vec!["internal server error".to_string()]
            }
            AppError::ValidationError(msgs) => msgs.clone(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::InternalServerError(_) | AppError::DatabaseError(_) = self {
            error!("{}", self);
        }
        HttpResponse::build(self.status_code()).json(ApiResponse::<()>::errors(self.messages()))
    }
}

/// Flattens `validator` errors into `"field: message"` strings, sorted by field.
pub fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| *field);

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => format!("{}: {}", field, message),
                None => format!("{}: invalid ({})", field, e.code),
            })
        })
        .collect()
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(validation_messages(&error))
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> AppError {
        match error {
            StoreError::NotFound => AppError::NotFound("Record not found".into()),
            StoreError::UniqueViolation => AppError::BadRequest("Record already exists".into()),
            StoreError::Database(msg) => AppError::DatabaseError(msg),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(error: AuthError) -> AppError {
        match error {
            AuthError::Validation(msgs) => AppError::ValidationError(msgs),
            AuthError::EmailTaken => AppError::BadRequest(error.to_string()),
            AuthError::NoSuchUser | AuthError::WrongPassword => {
                AppError::Unauthorized(INVALID_CREDENTIALS.into())
            }
            AuthError::InvalidToken | AuthError::InvalidRefresh => {
                AppError::Unauthorized(error.to_string())
            }
            AuthError::Internal(msg) => AppError::InternalServerError(msg),
            AuthError::Store(e) => e.into(),
        }
    }
}

impl From<TodoError> for AppError {
    fn from(error: TodoError) -> AppError {
        match error {
            TodoError::Validation(msgs) => AppError::ValidationError(msgs),
            TodoError::NotFound => AppError::NotFound(error.to_string()),
            TodoError::NoSuchUser => AppError::Unauthorized(error.to_string()),
            TodoError::NotAllowed => AppError::Forbidden(error.to_string()),
            TodoError::Store(e) => e.into(),
        }
    }
}
