//! Service entrypoint: configuration, database pool, wiring and the Axum
//! server.

use std::sync::Arc;

use http::header::HeaderValue;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use klaviyo_bridge::adapters::http::{app_router, AppState};
use klaviyo_bridge::adapters::{
    spawn_daily_cleanup, KlaviyoClientConfig, KlaviyoHttpClient, PgEventStore, PgProfileStore,
};
use klaviyo_bridge::application::{CleanupService, EventIngestionService};
use klaviyo_bridge::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.server.log_level)
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(
        environment = ?config.server.environment,
        "starting klaviyo-bridge"
    );

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        info!("running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;
    }

    let events = Arc::new(PgEventStore::new(pool.clone()));
    let profiles = Arc::new(PgProfileStore::new(pool));

    if !config.klaviyo.is_configured() {
        info!("no Klaviyo API key configured, running in local-only mode");
    }
    let klaviyo = Arc::new(KlaviyoHttpClient::new(KlaviyoClientConfig::from(
        &config.klaviyo,
    )));

    let ingestion = Arc::new(EventIngestionService::new(
        events.clone(),
        profiles.clone(),
        klaviyo.clone(),
    ));
    let cleanup = Arc::new(CleanupService::new(
        events,
        profiles,
        config.retention.data_retention_days,
    ));

    spawn_daily_cleanup(cleanup.clone(), config.retention.cleanup_hour_utc);

    let cors = match config.server.cors_origins_list().as_slice() {
        [] => CorsLayer::permissive(),
        origins => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|o| o.parse().ok())
                .collect();
            CorsLayer::new().allow_origin(AllowOrigin::list(origins))
        }
    };

    let app = app_router(AppState {
        ingestion,
        cleanup,
        klaviyo,
    })
    .layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(config.server.request_timeout()))
            .layer(cors),
    );

    let addr = config.server.socket_addr();
    info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
