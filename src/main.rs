use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use tracing::{info, warn};

use agency_booking::{
    app::create_router,
    app_state::AppState,
    booking::{InMemoryReservationStore, ReservationStore, SystemClock},
    config,
    db::{self, PgReservationStore},
    metrics::Metrics,
    telemetry::{self, TelemetryConfig},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = config::init().context("Failed to load configuration")?;
    let telemetry = telemetry::init_telemetry(TelemetryConfig::from_app_config(config))?;

    let store: Arc<dyn ReservationStore> = match &config.database {
        Some(database) => {
            let pool = db::init_pool(database)
                .await
                .context("Failed to initialize database pool")?;
            Arc::new(PgReservationStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set, reservations are kept in memory and lost on restart");
            Arc::new(InMemoryReservationStore::new())
        }
    };

    let metrics = Arc::new(Metrics::new().context("Failed to register metrics")?);
    let state = AppState::new(config.clone(), store, Arc::new(SystemClock), metrics);
    let app = create_router(state);

    let addr = config.server_addr();
    info!("{} listening on {}", config.app.name, addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Failed to serve application")?;

    telemetry.shutdown();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
