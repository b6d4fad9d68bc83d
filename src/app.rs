use std::{sync::Arc, time::Duration};

use axum::{
    routing::{get, post},
    Router,
};
use tokio::sync::mpsc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    api,
    config::{AppConfig, SiteConfig},
    fetcher::HttpFeedSource,
    repo::settings::SettingsStore,
    service::{
        display::{ConsoleDisplay, Mirrored, SharedScreen},
        input::{self, ButtonPress, BUTTON_CHANNEL_SIZE},
        ticker::Ticker,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub screen: SharedScreen,
    pub sites: Arc<Vec<SiteConfig>>,
    pub store: SettingsStore,
    pub buttons: mpsc::Sender<ButtonPress>,
}

/// Wires the ticker, its inputs and the HTTP state together and starts the background tasks.
pub async fn build(config: &AppConfig) -> anyhow::Result<Router> {
    let store = SettingsStore::new(&config.storage);
    let screen = SharedScreen::default();
    let source = HttpFeedSource::new(config.fetcher.clone())?;

    let (raw_tx, raw_rx) = mpsc::channel(BUTTON_CHANNEL_SIZE);
    let accepted = input::spawn_debouncer(raw_rx, Duration::from_millis(config.input.debounce_ms));
    if config.input.stdin_button {
        input::spawn_stdin_button(raw_tx.clone());
    }

    let ticker = Ticker::new(
        config.sites.clone(),
        source,
        Mirrored::new(ConsoleDisplay, screen.clone()),
        store.clone(),
        accepted,
        config.display.clone(),
    )
    .await;
    tokio::spawn(ticker.run());

    let state = AppState {
        screen,
        sites: Arc::new(config.sites.clone()),
        store,
        buttons: raw_tx,
    };

    Ok(router(state))
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    Router::new()
        .route("/healthz", get(api::health::health_check))
        .route("/screen", get(api::screen::current_screen))
        .route("/sites", get(api::screen::list_sites))
        .route("/button", post(api::button::press))
        .layer(middleware)
        .with_state(state)
}
