pub mod auth;
pub mod comment;
pub mod post;
pub mod profile;

use actix_web::{HttpRequest, HttpResponse, get};
use chrono::Utc;

use crate::domain::error::DomainError;
use crate::presentation::dto::HealthResponse;

#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
    })
}

pub async fn not_found(req: HttpRequest) -> Result<HttpResponse, DomainError> {
    Err(DomainError::RouteNotFound(req.path().to_owned()))
}
