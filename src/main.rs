use confadmin::{db, router, AppState, Config};
use dotenvy::dotenv;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("confadmin=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;
    tokio::fs::create_dir_all(&config.storage_dir).await?;
    let pool = db::connect(&config.database_url).await?;
    let bind_addr = config.bind_addr;
    let app_env = config.app_env;

    let app = router(AppState::new(pool, config)).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;

    info!("Server is running on http://{} ({:?})", bind_addr, app_env);
    info!("Admin panel at http://{}/admin", bind_addr);
    info!("Swagger UI at http://{}/swagger-ui", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
