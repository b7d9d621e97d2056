//! Database models for the goal row.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use goalpost_core::goals::{GoalRecord, GoalUpdate};

/// Database model for the singleton goal
#[derive(Queryable, Identifiable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::goal)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GoalDB {
    pub id: i32,
    pub primary_amount_minor_units: i64,
    pub goal_text: String,
    pub show_secondary_goal: bool,
    pub secondary_amount_minor_units: i64,
    pub display_image: bool,
    pub version: i64,
    pub updated_at: NaiveDateTime,
}

/// Changeset for goal updates. `None` fields are left out of the UPDATE.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::goal)]
pub struct GoalChangesetDB {
    pub primary_amount_minor_units: Option<i64>,
    pub goal_text: Option<String>,
    pub show_secondary_goal: Option<bool>,
    pub secondary_amount_minor_units: Option<i64>,
    pub display_image: Option<bool>,
    pub updated_at: NaiveDateTime,
}

impl From<GoalDB> for GoalRecord {
    fn from(db: GoalDB) -> Self {
        Self {
            primary_amount_minor_units: db.primary_amount_minor_units,
            goal_text: db.goal_text,
            show_secondary_goal: db.show_secondary_goal,
            secondary_amount_minor_units: db.secondary_amount_minor_units,
            display_image: db.display_image,
            version: db.version,
            updated_at: db.updated_at,
        }
    }
}

impl GoalChangesetDB {
    pub fn from_update(update: GoalUpdate, updated_at: NaiveDateTime) -> Self {
        Self {
            primary_amount_minor_units: update.primary_amount_minor_units,
            goal_text: update.goal_text,
            show_secondary_goal: update.show_secondary_goal,
            secondary_amount_minor_units: update.secondary_amount_minor_units,
            display_image: update.display_image,
            updated_at,
        }
    }
}
