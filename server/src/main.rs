//! Fieldsport booking platform server binary.

use fieldsport_core::SystemClock;
use fieldsport_postgres::PostgresStore;
use fieldsport_server::artifacts::LocalArtifactStore;
use fieldsport_server::notifications::ConsoleNotifier;
use fieldsport_server::payments::MockPaymentGateway;
use fieldsport_server::tagging::TaggingService;
use fieldsport_server::{build_router, AppState, Config};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fieldsport=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Fieldsport booking platform server");

    let config = Config::from_env();
    info!(
        postgres_url = %config.postgres.url,
        artifacts_root = %config.artifacts.root.display(),
        "Configuration loaded"
    );

    let clock = Arc::new(SystemClock);
    let store = PostgresStore::connect_with(
        &config.postgres.url,
        config.postgres.max_connections,
        Duration::from_secs(config.postgres.connect_timeout),
        clock,
    )
    .await?;
    info!("Database connected");

    store.migrate().await?;
    info!("Migrations applied");

    let store: Arc<dyn fieldsport_core::PlatformStore> = Arc::new(store);
    let artifacts = LocalArtifactStore::shared(config.artifacts.root.clone());
    let tagging = Arc::new(TaggingService::new(
        store.clone(),
        artifacts,
        config.artifacts.public_base_url.clone(),
    ));
    let state = AppState::new(
        store,
        MockPaymentGateway::shared(),
        ConsoleNotifier::shared(
            config.notifications.from_email.clone(),
            config.notifications.admin_email.clone(),
        ),
        tagging,
    );

    let app = build_router(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install shutdown handler");
    }
    info!("Shutdown signal received");
}
