use common::telemetry::{init_telemetry, shutdown_telemetry, TelemetryConfig};
use common::AppConfig;
use messaging::EventConsumer;
use std::net::SocketAddr;
use std::sync::Arc;
use storage::{Storage, StorageImpl};

mod error;
mod event_consumer;
mod fulfillment;
mod handlers;
mod routes;
mod service;
mod state;

use event_consumer::OrderEventConsumer;
use fulfillment::OrderFulfillment;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    let config = AppConfig::from_env()?;

    init_telemetry(TelemetryConfig::from_app_config("catalog-service", &config))?;

    tracing::info!("Starting catalog service...");
    tracing::info!(
        "Distributed tracing: {}",
        if config.enable_jaeger { "enabled" } else { "disabled" }
    );

    // Connect to document and basket stores
    let storage: Arc<dyn Storage> = Arc::new(StorageImpl::connect(&config).await?);

    // Start order event consumer
    let consumer = EventConsumer::new(
        &config.kafka.brokers,
        &config.kafka.consumer_group,
        &config.kafka.topic,
    )?;
    let fulfillment = Arc::new(OrderFulfillment::new(storage.clone()));
    let consumer_handle = tokio::spawn(OrderEventConsumer::new(consumer, fulfillment).run());

    // Build router
    let state = state::AppState::new(storage, config.store_timeout());
    let app = routes::create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Catalog service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            tracing::error!("Server error: {}", e);
            e
        })?;

    tracing::info!("Shutting down order event consumer");
    consumer_handle.abort();

    // Shutdown telemetry gracefully
    shutdown_telemetry();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
