//! Goal domain models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};

/// Snapshot of the singleton donation goal.
///
/// Amounts are integer minor units (cents). The secondary amount is a display
/// target only; webhooks never touch it. `version` grows by one with every
/// committed change, so a higher version is always the newer snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GoalRecord {
    pub primary_amount_minor_units: i64,
    pub goal_text: String,
    pub show_secondary_goal: bool,
    pub secondary_amount_minor_units: i64,
    pub display_image: bool,
    pub version: i64,
    pub updated_at: NaiveDateTime,
}

/// Field set for replacing goal values. `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GoalUpdate {
    pub primary_amount_minor_units: Option<i64>,
    pub goal_text: Option<String>,
    pub show_secondary_goal: Option<bool>,
    pub secondary_amount_minor_units: Option<i64>,
    pub display_image: Option<bool>,
}

impl GoalUpdate {
    /// An update that supplies every field, as the admin form does.
    pub fn full(
        primary_amount_minor_units: i64,
        goal_text: impl Into<String>,
        show_secondary_goal: bool,
        secondary_amount_minor_units: i64,
        display_image: bool,
    ) -> Self {
        Self {
            primary_amount_minor_units: Some(primary_amount_minor_units),
            goal_text: Some(goal_text.into()),
            show_secondary_goal: Some(show_secondary_goal),
            secondary_amount_minor_units: Some(secondary_amount_minor_units),
            display_image: Some(display_image),
        }
    }

    /// An update that only toggles the secondary goal visibility.
    pub fn secondary_visibility(show: bool) -> Self {
        Self {
            show_secondary_goal: Some(show),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.primary_amount_minor_units.is_none()
            && self.goal_text.is_none()
            && self.show_secondary_goal.is_none()
            && self.secondary_amount_minor_units.is_none()
            && self.display_image.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(ValidationError::InvalidInput("goal update has no fields".to_string()).into());
        }
        if matches!(self.primary_amount_minor_units, Some(v) if v < 0) {
            return Err(ValidationError::NegativeAmount("primaryAmountMinorUnits".to_string()).into());
        }
        if matches!(self.secondary_amount_minor_units, Some(v) if v < 0) {
            return Err(
                ValidationError::NegativeAmount("secondaryAmountMinorUnits".to_string()).into(),
            );
        }
        Ok(())
    }
}
