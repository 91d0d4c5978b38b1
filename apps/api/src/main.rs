mod catalog;
mod config;
mod errors;
mod llm_client;
mod models;
mod notify;
mod quiz;
mod recommend;
mod routes;
mod state;
mod store;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::models::book::BookInput;
use crate::notify::email::EmailClient;
use crate::notify::whatsapp::WhatsAppClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::memory::MemoryStore;
use crate::store::Store;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JustBookify API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the document store
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    if let Some(path) = &config.catalog_path {
        seed_catalog(store.as_ref(), path).await?;
    } else {
        warn!("CATALOG_PATH not set; starting with an empty catalog");
    }
    info!("Catalog holds {} books", store.count_books().await?);

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Initialize notification channels
    let mailer = EmailClient::new(config.sendgrid_api_key.clone(), config.from_email.clone());
    if !mailer.is_configured() {
        warn!("SendGrid credentials missing; email delivery disabled");
    }
    let whatsapp = WhatsAppClient::new(
        config.whatsapp_access_token.clone(),
        config.whatsapp_phone_number_id.clone(),
    );
    if !whatsapp.is_configured() {
        warn!("WhatsApp credentials missing; WhatsApp delivery disabled");
    }

    // Build app state
    let state = AppState {
        store,
        llm,
        mailer,
        whatsapp,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Loads a JSON array of books into the catalog at startup.
async fn seed_catalog(store: &dyn Store, path: &str) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog seed file '{path}'"))?;
    let inputs: Vec<BookInput> = serde_json::from_str(&text)
        .with_context(|| format!("Catalog seed file '{path}' is not a JSON array of books"))?;
    for input in inputs {
        store.upsert_book(input).await?;
    }
    info!("Seeded catalog from {path}");
    Ok(())
}
