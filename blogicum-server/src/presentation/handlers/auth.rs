use crate::application::auth_service::AuthService;
use crate::domain::error::DomainError;
use crate::presentation::dto::{AuthResponse, LoginRequest};
use crate::presentation::forms::RegisterRequest;
use actix_web::{HttpResponse, Scope, post, web};
use tracing::info;

pub fn scope() -> Scope {
    web::scope("/auth").service(registration).service(login)
}

#[post("/registration/")]
async fn registration(
    service: web::Data<AuthService>,
    payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse, DomainError> {
    let draft = payload.clean().map_err(DomainError::Validation)?;
    let user = service.register(draft).await?;
    let jwt = service.issue_token(&user)?;

    info!(user_id = %user.id, username = %user.username, "user registered");

    Ok(HttpResponse::Created().json(AuthResponse {
        access_token: jwt,
        expires_in: service.keys().expires_in(),
        token_type: "Bearer".to_string(),
    }))
}

#[post("/login/")]
async fn login(
    service: web::Data<AuthService>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, DomainError> {
    let jwt = service.login(&payload.username, &payload.password).await?;

    info!(username = %payload.username, "user logged in");

    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token: jwt,
        expires_in: service.keys().expires_in(),
        token_type: "Bearer".to_string(),
    }))
}
