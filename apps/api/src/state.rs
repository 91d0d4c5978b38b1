use std::sync::Arc;

use crate::llm_client::LlmClient;
use crate::notify::email::EmailClient;
use crate::notify::whatsapp::WhatsAppClient;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub llm: LlmClient,
    pub mailer: EmailClient,
    pub whatsapp: WhatsAppClient,
}
