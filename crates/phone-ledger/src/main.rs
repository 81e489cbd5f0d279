//! Phone Ledger - Entry point.

use gemini_client::GeminiClient;
use phone_ledger::{
    api::{create_router_with_body_limit, AppState},
    config::Config,
    PhoneExtractor,
};
use phone_store::{RecordStore, Snapshot, StagingStore};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Phone Ledger");

    // Initialize storage
    let (records_snapshot, staging_snapshot) = if config.storage.persist {
        (
            Snapshot::file(&config.storage.phone_numbers_path),
            Snapshot::file(&config.storage.staging_path),
        )
    } else {
        info!("Persistence disabled, using in-memory storage");
        (Snapshot::memory(), Snapshot::memory())
    };

    let records = match RecordStore::open(records_snapshot.clone()).await {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to load phone numbers: {}", e);
            set_aside(&records_snapshot).await;
            info!("Starting with empty phone number store");
            RecordStore::with_records(Default::default(), records_snapshot)
        }
    };

    let staging = match StagingStore::open(staging_snapshot.clone()).await {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to load staged numbers: {}", e);
            set_aside(&staging_snapshot).await;
            info!("Starting with empty staging store");
            StagingStore::with_pending(Default::default(), staging_snapshot)
        }
    };

    // Initialize Gemini client
    if config.gemini.api_key.is_empty() {
        warn!("GEMINI__API_KEY is not set; image extraction will fail");
    }

    let gemini = match GeminiClient::new(
        config.gemini.api_key.clone(),
        config.gemini.base_url.clone(),
        config.gemini.model.clone(),
        config.gemini.timeout,
    ) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to create Gemini client: {}", e);
            std::process::exit(1);
        }
    };
    info!(model = %gemini.model(), "Gemini client ready");

    let extractor = PhoneExtractor::new(gemini, config.extract.scratch_dir.clone());

    // Create application state and router
    let state = AppState::new(records, staging, extractor);
    let app = create_router_with_body_limit(state, config.server.body_limit);

    // Bind to address
    let addr = SocketAddr::new(
        config.server.listen_addr.parse().unwrap_or([0, 0, 0, 0].into()),
        config.server.port,
    );

    info!("Listening on {}", addr);

    let listener = match TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    // Run server; handlers identify clients by peer address
    if let Err(e) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Move an unreadable snapshot out of the way before the first save
/// overwrites it. Exits if it cannot be moved.
async fn set_aside(snapshot: &Snapshot) {
    match snapshot.quarantine().await {
        Ok(Some(path)) => warn!("Unreadable snapshot kept at {}", path.display()),
        Ok(None) => {}
        Err(e) => {
            error!("Failed to move unreadable snapshot aside: {}", e);
            std::process::exit(1);
        }
    }
}
