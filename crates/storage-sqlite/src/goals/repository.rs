use goalpost_core::constants::GOAL_ID;
use goalpost_core::errors::{DatabaseError, ValidationError};
use goalpost_core::goals::{GoalRecord, GoalRepositoryTrait, GoalUpdate};
use goalpost_core::Result;

use super::model::{GoalChangesetDB, GoalDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::goal::dsl::*;
use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;

use std::sync::Arc;

pub struct GoalRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl GoalRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        GoalRepository { pool, writer }
    }

    fn goal_missing() -> goalpost_core::Error {
        DatabaseError::NotFound(format!("goal row {} has not been seeded", GOAL_ID)).into()
    }
}

#[async_trait]
impl GoalRepositoryTrait for GoalRepository {
    fn load_goal(&self) -> Result<GoalRecord> {
        let mut conn = get_connection(&self.pool)?;
        goal.find(GOAL_ID)
            .select(GoalDB::as_select())
            .first::<GoalDB>(&mut conn)
            .optional()
            .into_core()?
            .map(GoalRecord::from)
            .ok_or_else(Self::goal_missing)
    }

    async fn update_goal(&self, update: GoalUpdate) -> Result<GoalRecord> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<GoalRecord> {
                let changeset = GoalChangesetDB::from_update(update, Utc::now().naive_utc());
                diesel::update(goal.find(GOAL_ID))
                    .set((&changeset, version.eq(version + 1)))
                    .returning(GoalDB::as_returning())
                    .get_result::<GoalDB>(conn)
                    .optional()
                    .into_core()?
                    .map(GoalRecord::from)
                    .ok_or_else(Self::goal_missing)
            })
            .await
    }

    async fn increment_primary_amount(&self, delta_minor_units: i64) -> Result<GoalRecord> {
        if delta_minor_units < 0 {
            return Err(ValidationError::NegativeAmount("amount".to_string()).into());
        }
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<GoalRecord> {
                let now = Utc::now().naive_utc();
                // Single statement: SQLite evaluates the addition against the stored value,
                // so concurrent increments cannot overwrite each other.
                let updated = diesel::update(
                    goal.find(GOAL_ID)
                        .filter(primary_amount_minor_units.le(i64::MAX - delta_minor_units)),
                )
                .set((
                    primary_amount_minor_units.eq(primary_amount_minor_units + delta_minor_units),
                    version.eq(version + 1),
                    updated_at.eq(now),
                ))
                .returning(GoalDB::as_returning())
                .get_result::<GoalDB>(conn)
                .optional()
                .into_core()?;

                if let Some(row) = updated {
                    return Ok(GoalRecord::from(row));
                }

                let exists = goal
                    .find(GOAL_ID)
                    .count()
                    .get_result::<i64>(conn)
                    .into_core()?
                    > 0;
                if exists {
                    Err(ValidationError::AmountOutOfRange("amount".to_string()).into())
                } else {
                    Err(Self::goal_missing())
                }
            })
            .await
    }
}
