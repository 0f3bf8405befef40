//! farm-ledger server binary.
//!
//! Loads configuration from the environment, picks PostgreSQL when a
//! database is configured (the in-memory store otherwise), and serves the
//! REST API with tracing, timeout and CORS layers.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use farm_ledger::adapters::http::{api_router, AppState};
use farm_ledger::adapters::{InMemoryMarketplaceStore, PaystackConfig, PaystackGateway, TracingNotifier};
use farm_ledger::application::handlers::{
    ExpireLapsedSubscriptionsCommand, ExpireLapsedSubscriptionsHandler,
};
use farm_ledger::config::{AppConfig, ServerConfig};
use farm_ledger::domain::foundation::Timestamp;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const EXPIRY_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    let gateway = Arc::new(PaystackGateway::new(PaystackConfig::from(&config.payment))?);
    let notifier = Arc::new(TracingNotifier::new());

    let state = match &config.database {
        Some(database) => {
            let pool = database.pool_options().connect(&database.url).await?;
            if database.run_migrations {
                sqlx::migrate!("./migrations").run(&pool).await?;
                tracing::info!("Database migrations applied");
            }
            AppState::with_postgres(pool, gateway, notifier, &config.payment)
        }
        None => {
            tracing::warn!("No database configured; using the in-memory store");
            AppState::with_store(
                InMemoryMarketplaceStore::with_catalogue(),
                gateway,
                notifier,
                &config.payment,
            )
        }
    };

    if config.payment.is_test_mode() {
        tracing::info!("Payment gateway running with a test key");
    }

    spawn_expiry_sweep(ExpireLapsedSubscriptionsHandler::new(state.subscriptions.clone()));

    let app = api_router(state)
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(cors_layer(&config.server))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.listen_addr();
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "farm-ledger listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_filter));

    if config.is_production() {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .allowed_origins()
        .into_iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Periodically cancels active subscriptions whose period has ended.
fn spawn_expiry_sweep(handler: ExpireLapsedSubscriptionsHandler) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(EXPIRY_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            let cmd = ExpireLapsedSubscriptionsCommand {
                now: Timestamp::now(),
            };
            if let Err(error) = handler.handle(cmd).await {
                tracing::error!(%error, "Subscription expiry sweep failed");
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "Could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
