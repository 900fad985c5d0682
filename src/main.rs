use std::time::Duration;

use tabi::config::AppConfig;
use tabi::error::AppError;
use tabi::routes::create_router;
use tabi::services::storage::PageStorage;
use tabi::state::AppState;
use tokio::net::TcpListener;
use tracing::info;

const PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_logging();

    let config = AppConfig::from_env()?;
    let storage = PageStorage::new();
    spawn_storage_purge(storage.clone(), config.session_idle);

    let state = AppState::new(config.clone(), storage);
    let app = create_router(state);

    let listener = TcpListener::bind(config.listen_addr).await?;
    info!(
        optimizer = %config.optimizer_url,
        destinations = %config.destinations_url,
        stub = config.stub_optimizer,
        on_denied = ?config.geo.on_denied,
        "listening on {}",
        listener.local_addr()?
    );
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn spawn_storage_purge(storage: PageStorage, max_idle: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(PURGE_INTERVAL);
        loop {
            ticker.tick().await;
            storage.purge_idle(max_idle).await;
        }
    });
}

fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tabi=debug,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
