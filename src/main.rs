use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::{error, info};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

use todoforge::{
    auth::{AuthMiddleware, PasswordHasher, TokenIssuer},
    config::Config,
    routes::{self, health},
    storage::{PgTodoStore, PgUserStore},
    AppState,
};

fn cors(origins: &[String]) -> Cors {
    // The refresh cookie only crosses origins that are listed explicitly.
    let cors = if origins.is_empty() {
        Cors::default().allow_any_origin()
    } else {
        origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .supports_credentials()
    };

    cors.allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE"])
        .allow_any_header()
        .max_age(3600)
}

fn startup_error(context: &str, e: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, e);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, e))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env().map_err(|e| startup_error("invalid configuration", e))?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .map_err(|e| startup_error("failed to connect to database", e))?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| startup_error("failed to run migrations", e))?;

    let state = AppState::new(
        Arc::new(PgUserStore::new(pool.clone())),
        Arc::new(PgTodoStore::new(pool)),
        PasswordHasher::new(config.bcrypt_cost),
        TokenIssuer::new(config.jwt_secret.as_bytes()),
    );

    info!("Starting todoforge server at {}", config.server_url());

    let cors_origins = config.cors_origins.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(state.auth.clone())
            .app_data(state.todos.clone())
            .app_data(routes::json_config())
            .app_data(routes::query_config())
            .wrap(cors(&cors_origins))
            .wrap(Logger::default())
            .service(health::health)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware)
                    .configure(routes::config),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
