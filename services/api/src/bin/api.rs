//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{Argon2Hasher, DbAdapter},
    config::Config,
    error::ApiError,
    web::{create_router, rest::ApiDoc, AppState},
};
use axum::Router;
use portal_core::ports::{KeyValueStore, PasswordHasher};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Load the Portal ---
    let kv: Arc<dyn KeyValueStore> = db_adapter;
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::new());
    let app_state = Arc::new(AppState::initialize(config.clone(), kv, hasher).await?);

    // --- 4. Create the Web Router ---
    let app = Router::new()
        .merge(create_router(app_state.clone()))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // --- 6. Flush the Portal ---
    match Arc::try_unwrap(app_state) {
        Ok(state) => state.portal.into_inner().shutdown().await?,
        Err(state) => state.portal.lock().await.store.flush().await?,
    }
    info!("Portal state flushed. Goodbye.");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for the shutdown signal: {}", e);
    }
    info!("Shutdown signal received.");
}
