use crate::errors::Result;
use crate::goals::goals_model::{GoalRecord, GoalUpdate};
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Trait for goal repository operations.
///
/// Implementations must apply `update_goal` and `increment_primary_amount`
/// atomically in the datastore. Callers never read-modify-write the record.
#[async_trait]
pub trait GoalRepositoryTrait: Send + Sync {
    fn load_goal(&self) -> Result<GoalRecord>;
    async fn update_goal(&self, update: GoalUpdate) -> Result<GoalRecord>;
    async fn increment_primary_amount(&self, delta_minor_units: i64) -> Result<GoalRecord>;
}

/// Trait for goal service operations
#[async_trait]
pub trait GoalServiceTrait: Send + Sync {
    fn get_goal(&self) -> Result<GoalRecord>;
    async fn replace_goal(&self, update: GoalUpdate) -> Result<GoalRecord>;
    async fn set_secondary_visibility(&self, show: bool) -> Result<GoalRecord>;
    async fn increment_goal(&self, delta_minor_units: i64) -> Result<GoalRecord>;
    /// Current snapshot followed by every later change.
    fn subscribe(&self) -> Result<BoxStream<'static, GoalRecord>>;
}
