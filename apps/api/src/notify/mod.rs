//! Outbound notification channels. Both clients are thin reqwest wrappers;
//! message/HTML composition lives in pure functions so it stays testable
//! without network access.

use thiserror::Error;

pub mod email;
pub mod handlers;
pub mod whatsapp;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("channel not configured: {0}")]
    NotConfigured(&'static str),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}
