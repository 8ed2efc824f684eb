pub mod actions;
pub mod config;
pub mod db;
pub mod error;
pub mod factory;
pub mod forms;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod notifications;
pub mod resources;
pub mod schema;
pub mod utils;

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, FromRef};
use axum::response::Redirect;
use axum::routing::get;
use axum::{middleware as axum_middleware, Router};
use sqlx::SqlitePool;
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use config::{AppEnv, Config, ConfigError};
pub use error::{AppError, HtmlError};
pub use handlers::api::ApiDoc;

/// Request bodies may carry an avatar of up to 10 MiB plus the other fields.
const BODY_LIMIT: usize = 11 * 1024 * 1024;

/// Shared application state. Handlers extract the part they need.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: Config) -> Self {
        Self {
            pool,
            config: Arc::new(config),
        }
    }
}

/// Build the complete application: admin pages, sign-up page, JSON API,
/// API docs and the avatar storage.
pub fn router(state: AppState) -> Router {
    let api = handlers::api::routes().layer(axum_middleware::from_fn_with_state(
        state.config.clone(),
        middleware::auth::auth_middleware,
    ));

    Router::new()
        .route("/", get(|| async { Redirect::to("/admin") }))
        .nest("/admin", handlers::web::admin_routes())
        .route(
            "/signup",
            get(handlers::web::signup::show).post(handlers::web::signup::submit),
        )
        .nest("/api", api)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest_service("/storage", ServeDir::new(&state.config.storage_dir))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(state)
}
