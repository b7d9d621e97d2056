use thiserror::Error;

/// Reasons an inbound donation notification is refused before it reaches the goal.
///
/// Messages never include the verification token.
#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("Malformed webhook request: {0}")]
    Malformed(String),

    #[error("Webhook verification token is missing or does not match")]
    Unauthorized,
}
