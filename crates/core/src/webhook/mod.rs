//! Webhook module - donation notification parsing, verification and ingestion.

mod dedup;
mod webhook_errors;
mod webhook_model;
mod webhook_payload;
mod webhook_service;

pub use dedup::{ClaimGuard, SeenEventIds};
pub use webhook_errors::WebhookError;
pub use webhook_model::{IngestOutcome, WebhookEvent};
pub use webhook_payload::parse_webhook_body;
pub use webhook_service::WebhookIngestor;
