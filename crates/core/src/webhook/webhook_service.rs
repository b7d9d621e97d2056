use std::sync::Arc;
use std::time::Duration;

use subtle::ConstantTimeEq;

use super::dedup::SeenEventIds;
use super::webhook_model::{IngestOutcome, WebhookEvent};
use super::webhook_payload::parse_webhook_body;
use super::WebhookError;
use crate::constants::{DEFAULT_DEDUP_CAPACITY, DEFAULT_DEDUP_TTL_SECS};
use crate::errors::Result;
use crate::goals::GoalServiceTrait;

/// Turns donation notifications into goal increments.
///
/// Order of checks: body shape, verification token, amount. Nothing touches
/// the goal until all three pass.
pub struct WebhookIngestor {
    goal_service: Arc<dyn GoalServiceTrait>,
    verification_token: String,
    seen: SeenEventIds,
}

impl WebhookIngestor {
    pub fn new(goal_service: Arc<dyn GoalServiceTrait>, verification_token: String) -> Self {
        Self::with_dedup(
            goal_service,
            verification_token,
            Duration::from_secs(DEFAULT_DEDUP_TTL_SECS),
            DEFAULT_DEDUP_CAPACITY,
        )
    }

    pub fn with_dedup(
        goal_service: Arc<dyn GoalServiceTrait>,
        verification_token: String,
        dedup_ttl: Duration,
        dedup_capacity: usize,
    ) -> Self {
        Self {
            goal_service,
            verification_token,
            seen: SeenEventIds::new(dedup_ttl, dedup_capacity),
        }
    }

    pub async fn ingest(&self, body: &[u8], content_type: Option<&str>) -> Result<IngestOutcome> {
        let event = parse_webhook_body(body, content_type)?;
        self.verify_token(&event)?;
        let amount_minor_units = event.amount_minor_units()?;

        let event_id = event.event_id();
        // Released on drop, including when this future is cancelled mid-increment.
        let claim = match event_id {
            Some(id) => match self.seen.claim(id) {
                Some(claim) => Some(claim),
                None => {
                    log::info!("Skipping duplicate webhook event {}", id);
                    return Ok(IngestOutcome::Duplicate {
                        event_id: id.to_string(),
                    });
                }
            },
            None => None,
        };

        match self.goal_service.increment_goal(amount_minor_units).await {
            Ok(snapshot) => {
                if let Some(claim) = claim {
                    claim.commit();
                }
                log::info!(
                    "Applied webhook event {} ({}): +{} minor units {}",
                    event_id.unwrap_or("<no id>"),
                    event.kind.as_deref().unwrap_or("unknown"),
                    amount_minor_units,
                    event.currency.as_deref().unwrap_or("")
                );
                Ok(IngestOutcome::Applied(snapshot))
            }
            Err(err) => {
                log::error!("Failed to apply webhook increment: {}", err);
                Err(err)
            }
        }
    }

    fn verify_token(&self, event: &WebhookEvent) -> Result<()> {
        let provided = event
            .verification_token
            .as_deref()
            .ok_or(WebhookError::Unauthorized)?;
        let expected = self.verification_token.as_bytes();
        if expected.is_empty() || !bool::from(provided.as_bytes().ct_eq(expected)) {
            log::warn!("Rejected webhook with invalid verification token");
            return Err(WebhookError::Unauthorized.into());
        }
        Ok(())
    }
}
