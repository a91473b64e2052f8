use std::sync::Arc;

use crate::application::auth_service::AuthService;
use crate::application::comment_service::CommentService;
use crate::application::post_service::PostService;
use crate::application::profile_service::ProfileService;
use crate::data::category_repository::{CategoryRepository, PostgresCategoryRepository};
use crate::data::comment_repository::{CommentRepository, PostgresCommentRepository};
use crate::data::location_repository::{LocationRepository, PostgresLocationRepository};
use crate::data::post_repository::{PostRepository, PostgresPostRepository};
use crate::data::user_repository::{PostgresUserRepository, UserRepository};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::security::JwtKeys;
use crate::presentation::handlers;
use crate::presentation::middleware::{JwtAuthMiddleware, RequestIdMiddleware, TimingMiddleware};
use actix_cors::Cors;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{App, HttpServer, web};
use sqlx::PgPool;
use tracing::info;

/// Everything the handlers pull out of `web::Data`.
#[derive(Clone)]
pub struct AppServices {
    pub auth: AuthService,
    pub posts: PostService,
    pub comments: CommentService,
    pub profiles: ProfileService,
}

pub struct Repositories {
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub locations: Arc<dyn LocationRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            posts: Arc::new(PostgresPostRepository::new(pool.clone())),
            comments: Arc::new(PostgresCommentRepository::new(pool.clone())),
            categories: Arc::new(PostgresCategoryRepository::new(pool.clone())),
            locations: Arc::new(PostgresLocationRepository::new(pool.clone())),
            users: Arc::new(PostgresUserRepository::new(pool)),
        }
    }
}

impl AppServices {
    pub fn new(repos: Repositories, keys: JwtKeys) -> Self {
        Self {
            auth: AuthService::new(Arc::clone(&repos.users), keys),
            posts: PostService::new(
                Arc::clone(&repos.posts),
                Arc::clone(&repos.comments),
                repos.categories,
                repos.locations,
                Arc::clone(&repos.users),
            ),
            comments: CommentService::new(repos.comments, repos.posts),
            profiles: ProfileService::new(repos.users),
        }
    }

    pub fn keys(&self) -> JwtKeys {
        self.auth.keys().clone()
    }

    /// Shared state and every route. Middleware and the fallback 404 are
    /// added by [`build_app`].
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.auth.clone()))
            .app_data(web::Data::new(self.posts.clone()))
            .app_data(web::Data::new(self.comments.clone()))
            .app_data(web::Data::new(self.profiles.clone()))
            .service(handlers::health)
            .service(handlers::auth::scope())
            .service(handlers::post::index)
            .service(handlers::post::category_posts)
            // Literal segments must be registered before `/posts/{post_id}/`.
            .service(handlers::post::create_post_form)
            .service(handlers::post::create_post)
            .service(handlers::post::post_detail)
            .service(handlers::post::edit_post_form)
            .service(handlers::post::edit_post)
            .service(handlers::post::delete_post_form)
            .service(handlers::post::delete_post)
            .service(handlers::comment::add_comment)
            .service(handlers::comment::edit_comment_form)
            .service(handlers::comment::edit_comment)
            .service(handlers::comment::delete_comment_form)
            .service(handlers::comment::delete_comment)
            .service(handlers::profile::user_profile)
            .service(handlers::profile::edit_profile_form)
            .service(handlers::profile::edit_profile);
    }
}

/// The full application: middleware stack, routes and the fallback 404.
pub fn build_app(
    services: AppServices,
    cors_origins: &[String],
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody + use<>>,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    let keys = services.keys();

    App::new()
        .wrap(JwtAuthMiddleware::new(keys))
        .wrap(Logger::default())
        .wrap(TimingMiddleware)
        .wrap(RequestIdMiddleware)
        .wrap(
            DefaultHeaders::new()
                .add(("X-Content-Type-Options", "nosniff"))
                .add(("Referrer-Policy", "no-referrer"))
                .add(("Permissions-Policy", "geolocation=()"))
                .add(("Cross-Origin-Opener-Policy", "same-origin")),
        )
        .wrap(build_cors(cors_origins))
        .configure(move |cfg| services.configure(cfg))
        .default_service(web::to(handlers::not_found))
}

pub async fn start_rest_server(config: AppConfig, services: AppServices) -> anyhow::Result<()> {
    let bind_address = (config.host.clone(), config.port);

    info!(
        host = %bind_address.0,
        port = bind_address.1,
        "HTTP server starting"
    );

    let cors_origins = config.cors_origins.clone();
    HttpServer::new(move || build_app(services.clone(), &cors_origins))
        .bind(bind_address)?
        .run()
        .await
        .map_err(anyhow::Error::new)?;

    Ok(())
}

fn build_cors(origins: &[String]) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers(vec![header::LOCATION])
        .supports_credentials()
        .max_age(3600);

    for origin in origins {
        if origin == "*" {
            cors = cors.allow_any_origin();
        } else {
            cors = cors.allowed_origin(origin);
        }
    }

    cors
}
