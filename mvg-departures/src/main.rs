use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use mvg_departures::app::{App, AppSettings};
use mvg_departures::cache::{CacheConfig, CachedMvgClient};
use mvg_departures::config::AppConfig;
use mvg_departures::feed::FeedConfig;
use mvg_departures::mvg::MvgClient;
use mvg_departures::notify::{LogNotifier, RecordingNotifier};
use mvg_departures::pins::JsonPinStore;
use mvg_departures::web::{AppState, create_router};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            std::process::exit(2);
        }
    };

    // Create MVG client
    let client = MvgClient::new(config.mvg.clone()).expect("Failed to create MVG client");
    let cached = CachedMvgClient::new(client, &CacheConfig::default());

    let pins = JsonPinStore::open(&config.pin_file);
    info!(path = %pins.path().display(), "using pin file");

    let notifications = RecordingNotifier::forwarding_to(LogNotifier);

    let settings = AppSettings {
        feed: FeedConfig::default().with_poll_interval(config.poll_interval),
        ..AppSettings::default()
    };
    let app = App::new(
        Arc::new(cached),
        Arc::new(pins),
        Arc::new(notifications.clone()),
        settings,
    );
    app.start();

    let state = AppState::new(app, notifications);
    let router = create_router(state.clone());

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .expect("Failed to bind listen address");
    info!(addr = %config.listen_addr, base_url = %config.mvg.base_url, "MVG departure board listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    state.app.shutdown();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }
    info!("shutting down");
}
