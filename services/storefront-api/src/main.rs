//! Storefront API binary

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use skapto_access::StorefrontService;
use skapto_commerce::RevenueCatProvider;
use skapto_store::{PassLedger, SqliteKeyValueStore};
use storefront_api::{build_router, AppState, Config};
use tokio::signal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("storefront_api=debug".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Skapto Storefront API");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        http_port = config.http_port,
        policy = %config.access.missing_transaction_policy,
        "Configuration loaded"
    );

    // Initialize metrics
    let metrics_handle = if config.metrics_enabled {
        Some(setup_metrics()?)
    } else {
        None
    };

    // Open the pass ledger
    let store = Arc::new(SqliteKeyValueStore::open(&config.ledger_database_url).await?);
    let ledger = PassLedger::open(Arc::clone(&store)).await?;
    tracing::info!(consumed = ledger.len(), "Pass ledger ready");

    // Create storefront service
    let provider = RevenueCatProvider::new(config.commerce.clone())?;
    let storefront =
        StorefrontService::new(config.access.clone(), Arc::new(provider), Arc::new(ledger));

    // Initial reconciliation; the service stays up on failure and serves
    // an inactive subscription until a refresh succeeds
    if let Err(e) = storefront.refresh().await {
        tracing::warn!(error = %e, "Initial entitlement refresh failed");
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let state = AppState::new(storefront, store, config);
    let app = build_router(state, metrics_handle);

    run_http_server(app, addr).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn run_http_server(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    tracing::info!("HTTP server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn setup_metrics() -> anyhow::Result<PrometheusHandle> {
    // Local ops are sub-millisecond; provider round trips dominate the tail
    let latency_buckets = &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("storefront_operation_duration_seconds".to_string()),
            latency_buckets,
        )?
        .install_recorder()?;

    metrics::describe_counter!(
        "storefront_bookings_total",
        "Booking attempts by decision and result"
    );
    metrics::describe_counter!(
        "storefront_passes_consumed_total",
        "Single visit passes redeemed"
    );
    metrics::describe_counter!(
        "storefront_purchases_total",
        "Purchases by product and result"
    );
    metrics::describe_histogram!(
        "storefront_operation_duration_seconds",
        "Storefront operation latency in seconds by operation type"
    );

    Ok(handle)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
