//! Webhook payload models.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::errors::{Result, ValidationError};
use crate::goals::GoalRecord;
use crate::utils::money::major_str_to_minor_units;

/// One donation notification as sent by Ko-fi.
///
/// Only `verification_token` and `amount` drive behavior; the identifiers
/// are used for deduplication and the rest is logged.
#[derive(Deserialize, Clone, Default)]
pub struct WebhookEvent {
    pub verification_token: Option<String>,
    pub message_id: Option<String>,
    pub kofi_transaction_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub from_name: Option<String>,
    pub amount: Option<Value>,
    pub currency: Option<String>,
    pub timestamp: Option<String>,
}

impl fmt::Debug for WebhookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookEvent")
            .field(
                "verification_token",
                &self.verification_token.as_ref().map(|_| "<redacted>"),
            )
            .field("message_id", &self.message_id)
            .field("kofi_transaction_id", &self.kofi_transaction_id)
            .field("kind", &self.kind)
            .field("from_name", &self.from_name)
            .field("amount", &self.amount)
            .field("currency", &self.currency)
            .field("timestamp", &self.timestamp)
            .finish()
    }
}

impl WebhookEvent {
    /// Stable per-event identifier, preferring the transaction id.
    pub fn event_id(&self) -> Option<&str> {
        [
            self.kofi_transaction_id.as_deref(),
            self.message_id.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|id| !id.is_empty())
    }

    /// Donation amount in minor units.
    ///
    /// Ko-fi sends the amount as a decimal string (`"4.50"`); plain JSON
    /// numbers are accepted too.
    pub fn amount_minor_units(&self) -> Result<i64> {
        match &self.amount {
            None | Some(Value::Null) => Err(ValidationError::MissingField("amount".to_string()).into()),
            Some(Value::String(raw)) => major_str_to_minor_units(raw, "amount"),
            Some(Value::Number(number)) => major_str_to_minor_units(&number.to_string(), "amount"),
            Some(_) => Err(
                ValidationError::InvalidInput("'amount' must be a string or number".to_string())
                    .into(),
            ),
        }
    }
}

/// Result of ingesting one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The amount was added; carries the new snapshot.
    Applied(GoalRecord),
    /// The event id was already applied recently; nothing changed.
    Duplicate { event_id: String },
}
