// Not every test binary uses every helper.
#![allow(dead_code)]

use actix_cors::Cors;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use serde_json::{json, Value};
use std::sync::Arc;
use todoforge::auth::{AuthMiddleware, PasswordHasher, TokenIssuer};
use todoforge::models::Role;
use todoforge::routes::{self, health};
use todoforge::storage::{MemoryTodoStore, MemoryUserStore};
use todoforge::AppState;

pub const SECRET: &[u8] = b"integration-test-secret";
pub const PASSWORD: &str = "password123";

/// Services over in-memory stores, with handles on the stores for setup and inspection.
pub struct TestState {
    pub state: AppState,
    pub users: Arc<MemoryUserStore>,
    pub todos: Arc<MemoryTodoStore>,
}

pub fn test_state() -> TestState {
    let todos = Arc::new(MemoryTodoStore::new());
    let users = Arc::new(MemoryUserStore::cascading_to(todos.clone()));
    // Lowest bcrypt cost keeps the tests fast.
    let state = AppState::new(
        users.clone(),
        todos.clone(),
        PasswordHasher::new(4),
        TokenIssuer::new(SECRET),
    );
    TestState {
        state,
        users,
        todos,
    }
}

/// The full application as `main` builds it, minus the database.
pub async fn init_app(
    state: &AppState,
) -> impl Service<
    actix_http::Request,
    Response = ServiceResponse<impl MessageBody>,
    Error = actix_web::Error,
> {
    test::init_service(
        App::new()
            .app_data(state.auth.clone())
            .app_data(state.todos.clone())
            .app_data(routes::json_config())
            .app_data(routes::query_config())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(health::health)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware)
                    .configure(routes::config),
            ),
    )
    .await
}

/// A signed-up account and its current keys.
pub struct TestUser {
    pub id: String,
    pub access_key: String,
    pub refresh_key: String,
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

/// Signs up through the API and resolves the new account's id via `/users/me`.
pub async fn sign_up(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
) -> TestUser {
    let req = test::TestRequest::post()
        .uri("/api/users/auth/signup")
        .set_json(json!({
            "email": email,
            "username": "johndoe",
            "password": PASSWORD,
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 201, "signup of {} failed", email);
    let body: Value = test::read_body_json(resp).await;
    let access_key = body["data"]["access_key"].as_str().unwrap().to_string();
    let refresh_key = body["data"]["refresh_key"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/api/users/me")
        .insert_header(bearer(&access_key))
        .to_request();
    let me: Value = test::call_and_read_body_json(app, req).await;

    TestUser {
        id: me["data"]["id"].as_str().unwrap().to_string(),
        access_key,
        refresh_key,
    }
}

/// Promotes an account to admin and signs it in again so its access key carries the role.
pub async fn promote_to_admin(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    users: &MemoryUserStore,
    email: &str,
    user: TestUser,
) -> TestUser {
    users.set_role(&user.id, Role::Admin).await.unwrap();

    let req = test::TestRequest::post()
        .uri("/api/users/auth/signin")
        .set_json(json!({ "email": email, "password": PASSWORD }))
        .to_request();
    let body: Value = test::call_and_read_body_json(app, req).await;

    TestUser {
        id: user.id,
        access_key: body["data"]["access_key"].as_str().unwrap().to_string(),
        refresh_key: body["data"]["refresh_key"].as_str().unwrap().to_string(),
    }
}
