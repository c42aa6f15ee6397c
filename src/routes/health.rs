use actix_web::{get, HttpResponse, Responder};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::routes::ApiResponse;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// Liveness probe. Served outside `/api` and never needs a bearer token.
#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::data(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now(),
    }))
}
