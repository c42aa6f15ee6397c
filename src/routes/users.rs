use actix_web::cookie::{time::Duration as CookieDuration, Cookie};
use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;

use crate::{
    auth::{token::REFRESH_TOKEN_DAYS, AdminUser, AuthError, AuthService, AuthenticatedUser, TokenPair},
    error::AppError,
    models::{SignInInput, SignUpInput, UpdateUserInput},
    routes::ApiResponse,
};

/// Name of the HTTP-only cookie that carries the refresh key for browser clients.
pub const REFRESH_COOKIE: &str = "refresh_key";

/// Body accepted by the refresh endpoint. Clients that cannot rely on the cookie send the key here.
#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_key: Option<String>,
}

fn refresh_cookie(refresh_key: &str) -> Cookie<'static> {
    Cookie::build(REFRESH_COOKIE, refresh_key.to_string())
        .path("/")
        .http_only(true)
        .max_age(CookieDuration::days(REFRESH_TOKEN_DAYS))
        .finish()
}

/// The caller's own account is gone, so its still-valid key no longer names anyone.
fn vanished_caller(error: AuthError) -> AppError {
    match error {
        AuthError::NoSuchUser => AppError::Unauthorized("user no longer exists".into()),
        other => other.into(),
    }
}

/// The account named in the path does not exist.
fn missing_user(error: AuthError) -> AppError {
    match error {
        AuthError::NoSuchUser => AppError::NotFound("user not found".into()),
        other => other.into(),
    }
}

fn keys_response(mut builder: actix_web::HttpResponseBuilder, keys: TokenPair) -> HttpResponse {
    builder
        .cookie(refresh_cookie(&keys.refresh_key))
        .json(ApiResponse::data(keys))
}

/// Register a new user
///
/// Creates the account and signs it in. The refresh key is returned in the body
/// and set as the `refresh_key` cookie.
///
/// ## Responses:
/// - `201 Created`: the new token pair.
/// - `400 Bad Request`: the email is already registered.
/// - `422 Unprocessable Entity`: email, username or password failed validation.
#[post("/signup")]
pub async fn sign_up(
    auth: web::Data<AuthService>,
    input: web::Json<SignUpInput>,
) -> Result<impl Responder, AppError> {
    let keys = auth.sign_up(input.into_inner()).await?;
    Ok(keys_response(HttpResponse::Created(), keys))
}

/// Sign in with email and password
///
/// ## Responses:
/// - `200 OK`: a fresh token pair.
/// - `401 Unauthorized`: unknown email or wrong password, reported identically.
#[post("/signin")]
pub async fn sign_in(
    auth: web::Data<AuthService>,
    input: web::Json<SignInInput>,
) -> Result<impl Responder, AppError> {
    let keys = auth.sign_in(input.into_inner()).await?;
    Ok(keys_response(HttpResponse::Ok(), keys))
}

/// Trade a refresh key for a new token pair
///
/// The key is taken from the JSON body when present, otherwise from the
/// `refresh_key` cookie.
///
/// ## Responses:
/// - `200 OK`: a fresh token pair.
/// - `400 Bad Request`: neither body nor cookie carries a key.
/// - `401 Unauthorized`: the key is invalid or expired, or the account is gone.
#[post("/refresh")]
pub async fn refresh(
    auth: web::Data<AuthService>,
    body: Option<web::Json<RefreshRequest>>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    let refresh_key = body
        .and_then(|body| body.into_inner().refresh_key)
        .filter(|key| !key.is_empty())
        .or_else(|| req.cookie(REFRESH_COOKIE).map(|c| c.value().to_string()))
        .ok_or_else(|| {
            AppError::BadRequest(
                "refresh key has to be provided via cookie or request body".into(),
            )
        })?;

    let keys = auth.refresh(&refresh_key).await.map_err(|e| match e {
        // A refresh for a deleted account is just a stale key to the client.
        AuthError::NoSuchUser => AppError::Unauthorized("invalid refresh key".into()),
        other => other.into(),
    })?;
    Ok(keys_response(HttpResponse::Ok(), keys))
}

/// Clear the refresh cookie
#[delete("/logout")]
pub async fn logout() -> impl Responder {
    let mut cookie = refresh_cookie("");
    cookie.make_removal();
    HttpResponse::Ok().cookie(cookie).json(ApiResponse::empty())
}

/// Profile of the authenticated user
#[get("/me")]
pub async fn me(
    auth: web::Data<AuthService>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let profile = auth.me(user.id()).await.map_err(vanished_caller)?;
    Ok(HttpResponse::Ok().json(ApiResponse::data(profile)))
}

/// Replace the username and password of the authenticated user
#[put("/me")]
pub async fn update_me(
    auth: web::Data<AuthService>,
    user: AuthenticatedUser,
    input: web::Json<UpdateUserInput>,
) -> Result<impl Responder, AppError> {
    auth.update(user.id(), input.into_inner())
        .await
        .map_err(vanished_caller)?;
    Ok(HttpResponse::Ok().json(ApiResponse::empty()))
}

/// Delete a user account (admins only)
///
/// The user's todos are removed with it.
///
/// ## Responses:
/// - `204 No Content`: the account was deleted.
/// - `403 Forbidden`: the caller is not an admin.
/// - `404 Not Found`: no such account.
#[delete("/{id}")]
pub async fn delete_user(
    auth: web::Data<AuthService>,
    _admin: AdminUser,
    user_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    auth.delete(&user_id.into_inner())
        .await
        .map_err(missing_user)?;
    Ok(HttpResponse::NoContent().finish())
}
