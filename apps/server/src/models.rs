use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use goalpost_core::errors::Result as CoreResult;
use goalpost_core::goals::{GoalRecord, GoalUpdate};
use goalpost_core::utils::form_values::parse_flag;
use goalpost_core::utils::money::{major_str_to_minor_units, minor_units_to_major};

/// Goal snapshot as served to the admin page and the overlay.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub primary_amount_minor_units: i64,
    #[schema(value_type = String, example = "42.50")]
    pub primary_amount: Decimal,
    pub goal_text: String,
    pub show_secondary_goal: bool,
    pub secondary_amount_minor_units: i64,
    #[schema(value_type = String, example = "100.00")]
    pub secondary_amount: Decimal,
    pub display_image: bool,
    /// Increases with every change; viewers can ignore snapshots older than one already shown.
    pub version: i64,
    pub updated_at: NaiveDateTime,
}

impl From<GoalRecord> for Goal {
    fn from(g: GoalRecord) -> Self {
        Self {
            primary_amount_minor_units: g.primary_amount_minor_units,
            primary_amount: minor_units_to_major(g.primary_amount_minor_units),
            goal_text: g.goal_text,
            show_secondary_goal: g.show_secondary_goal,
            secondary_amount_minor_units: g.secondary_amount_minor_units,
            secondary_amount: minor_units_to_major(g.secondary_amount_minor_units),
            display_image: g.display_image,
            version: g.version,
            updated_at: g.updated_at,
        }
    }
}

/// Fields posted by the admin form. Amounts are in major units; checkboxes
/// are only present when ticked.
#[derive(Deserialize, ToSchema, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct GoalForm {
    #[schema(example = "42.50")]
    pub amount: Option<String>,
    pub goal_text: Option<String>,
    #[schema(example = "on")]
    pub show_second_half: Option<String>,
    #[schema(example = "100")]
    pub second_half_amount: Option<String>,
    #[schema(example = "on")]
    pub display_image: Option<String>,
}

impl GoalForm {
    pub fn into_update(self) -> CoreResult<GoalUpdate> {
        let primary = major_str_to_minor_units(self.amount.as_deref().unwrap_or(""), "amount")?;
        let secondary = match self.second_half_amount.as_deref().map(str::trim) {
            None | Some("") => 0,
            Some(raw) => major_str_to_minor_units(raw, "secondHalfAmount")?,
        };
        Ok(GoalUpdate::full(
            primary,
            self.goal_text.unwrap_or_default(),
            parse_flag(self.show_second_half.as_deref()),
            secondary,
            parse_flag(self.display_image.as_deref()),
        ))
    }
}

/// A flag sent either as a JSON boolean or as a form-style string.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Text(String),
}

impl FlagValue {
    pub fn is_set(&self) -> bool {
        match self {
            FlagValue::Bool(value) => *value,
            FlagValue::Text(value) => parse_flag(Some(value)),
        }
    }
}

#[derive(Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SecondaryVisibilityRequest {
    #[schema(value_type = Option<bool>)]
    pub show_second_half: Option<FlagValue>,
}

impl SecondaryVisibilityRequest {
    pub fn show(&self) -> bool {
        self.show_second_half
            .as_ref()
            .map(FlagValue::is_set)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goalpost_core::errors::{Error, ValidationError};

    fn form(pairs: &str) -> GoalForm {
        serde_urlencoded::from_str(pairs).unwrap()
    }

    #[test]
    fn full_form_becomes_full_update() {
        let update = form(
            "amount=42.505&goalText=New+mic&showSecondHalf=on&secondHalfAmount=100&displayImage=TRUE",
        )
        .into_update()
        .unwrap();

        assert_eq!(update, GoalUpdate::full(4251, "New mic", true, 10_000, true));
    }

    #[test]
    fn unticked_checkboxes_are_false() {
        let update = form("amount=1&goalText=x&secondHalfAmount=2")
            .into_update()
            .unwrap();
        assert_eq!(update.show_secondary_goal, Some(false));
        assert_eq!(update.display_image, Some(false));
    }

    #[test]
    fn missing_amount_is_rejected() {
        let err = form("goalText=x").into_update().unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::MissingField(_))
        ));
    }

    #[test]
    fn negative_amount_is_rejected() {
        let err = form("amount=-3").into_update().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn snapshot_exposes_major_units() {
        let record = GoalRecord {
            primary_amount_minor_units: 4250,
            goal_text: "Mic".into(),
            show_secondary_goal: false,
            secondary_amount_minor_units: 5,
            display_image: true,
            version: 3,
            updated_at: chrono::NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        };
        let json = serde_json::to_value(Goal::from(record)).unwrap();
        assert_eq!(json["primaryAmountMinorUnits"], 4250);
        assert_eq!(json["primaryAmount"], "42.50");
        assert_eq!(json["secondaryAmount"], "0.05");
        assert_eq!(json["goalText"], "Mic");
        assert_eq!(json["version"], 3);
    }

    #[test]
    fn visibility_accepts_json_bool_and_form_text() {
        let from_json: SecondaryVisibilityRequest =
            serde_json::from_str(r#"{"showSecondHalf": true}"#).unwrap();
        assert!(from_json.show());

        let from_form: SecondaryVisibilityRequest =
            serde_urlencoded::from_str("showSecondHalf=on").unwrap();
        assert!(from_form.show());

        let absent: SecondaryVisibilityRequest = serde_urlencoded::from_str("").unwrap();
        assert!(!absent.show());
    }
}
