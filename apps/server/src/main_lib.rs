use std::sync::Arc;

use crate::{
    auth::{AccessGate, SharedCredential},
    config::{Config, LogFormat},
};
use goalpost_core::{
    events::BroadcastGoalNotifier,
    goals::{GoalService, GoalServiceTrait},
    webhook::WebhookIngestor,
};
use goalpost_storage_sqlite::{db, goals::GoalRepository};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub goal_service: Arc<dyn GoalServiceTrait>,
    pub webhook_ingestor: Arc<WebhookIngestor>,
    pub notifier: Arc<BroadcastGoalNotifier>,
    pub access_gate: Arc<AccessGate>,
}

pub fn init_tracing(log_format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match log_format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init(),
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone())?;

    let notifier = Arc::new(BroadcastGoalNotifier::new(config.event_bus_capacity));
    let goal_repository = Arc::new(GoalRepository::new(pool.clone(), writer));
    let goal_service: Arc<dyn GoalServiceTrait> =
        Arc::new(GoalService::new(goal_repository, notifier.clone()));

    // Fail at startup rather than on the first request when the seed row is gone.
    let goal = goal_service.get_goal()?;
    tracing::info!(
        "Loaded goal \"{}\" at {} minor units",
        goal.goal_text,
        goal.primary_amount_minor_units
    );

    let webhook_ingestor = Arc::new(WebhookIngestor::with_dedup(
        goal_service.clone(),
        config.webhook_token.clone(),
        config.webhook_dedup_ttl,
        config.webhook_dedup_capacity,
    ));

    let credential = Arc::new(SharedCredential::new(
        config.auth_user.clone(),
        config.auth_pass.clone(),
    ));
    let access_gate = Arc::new(AccessGate::new(
        config.protected_paths.clone(),
        credential,
        config.auth_realm.clone(),
    ));
    tracing::info!(
        "Access gate protecting {:?} (realm \"{}\")",
        config.protected_paths,
        access_gate.realm()
    );

    Ok(Arc::new(AppState {
        goal_service,
        webhook_ingestor,
        notifier,
        access_gate,
    }))
}
