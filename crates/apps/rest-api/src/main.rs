use std::sync::Arc;

use auth_feature::TokenService;
use rest_api::config::Config;
use rest_api::{AppState, build_router};
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "rest_api=debug,auth_feature=debug,todo_feature=debug,sqlx=warn".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    // Database connection
    let pool = PgPoolOptions::new()
        .max_connections(20)
        .connect(&config.database_url)
        .await?;

    info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../migrations").run(&pool).await?;

    info!("Migrations complete");

    let state = AppState {
        pool,
        tokens: Arc::new(TokenService::new(
            config.access_token_secret,
            config.refresh_token_secret,
        )),
    };

    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;

    info!("Listening on http://{}", config.listen_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
