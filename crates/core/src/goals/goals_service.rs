use std::sync::Arc;

use async_trait::async_trait;
use futures::future;
use futures::stream::{self, BoxStream, StreamExt};

use crate::errors::{Result, ValidationError};
use crate::events::GoalChangeNotifier;
use crate::goals::goals_model::{GoalRecord, GoalUpdate};
use crate::goals::goals_traits::{GoalRepositoryTrait, GoalServiceTrait};

/// Validates goal mutations, applies them through the repository and
/// publishes each resulting snapshot.
pub struct GoalService {
    repository: Arc<dyn GoalRepositoryTrait>,
    notifier: Arc<dyn GoalChangeNotifier>,
}

impl GoalService {
    pub fn new(
        repository: Arc<dyn GoalRepositoryTrait>,
        notifier: Arc<dyn GoalChangeNotifier>,
    ) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    fn publish(&self, snapshot: &GoalRecord) {
        self.notifier.publish(snapshot.clone());
    }
}

#[async_trait]
impl GoalServiceTrait for GoalService {
    fn get_goal(&self) -> Result<GoalRecord> {
        self.repository.load_goal()
    }

    async fn replace_goal(&self, update: GoalUpdate) -> Result<GoalRecord> {
        update.validate()?;
        let snapshot = self.repository.update_goal(update).await?;
        log::info!(
            "Goal updated: {} minor units, secondary {} (shown: {})",
            snapshot.primary_amount_minor_units,
            snapshot.secondary_amount_minor_units,
            snapshot.show_secondary_goal
        );
        self.publish(&snapshot);
        Ok(snapshot)
    }

    async fn set_secondary_visibility(&self, show: bool) -> Result<GoalRecord> {
        self.replace_goal(GoalUpdate::secondary_visibility(show))
            .await
    }

    async fn increment_goal(&self, delta_minor_units: i64) -> Result<GoalRecord> {
        if delta_minor_units < 0 {
            return Err(ValidationError::NegativeAmount("amount".to_string()).into());
        }
        let snapshot = self
            .repository
            .increment_primary_amount(delta_minor_units)
            .await?;
        log::info!(
            "Goal incremented by {} minor units, now {}",
            delta_minor_units,
            snapshot.primary_amount_minor_units
        );
        self.publish(&snapshot);
        Ok(snapshot)
    }

    fn subscribe(&self) -> Result<BoxStream<'static, GoalRecord>> {
        // Subscribe before reading so a change landing in between is not lost.
        let updates = self.notifier.subscribe();
        let current = self.repository.load_goal()?;
        let shown = current.version;
        let newer = updates.filter(move |snapshot| future::ready(snapshot.version > shown));
        Ok(stream::once(async move { current }).chain(newer).boxed())
    }
}
