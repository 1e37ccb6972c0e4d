//! Trip intent shape
//!
//! Accepts the keys the extraction prompt asks for plus the variants models
//! tend to produce instead (`days`, `budget_eur`, `departure_city`, ...).

use chrono::NaiveDate;
use lazy_static::lazy_static;
use log::debug;
use serde_json::{json, Value};
use shared_types_rs::TripIntent;

use crate::errors::{ValidationError, ValidationReason, ValidationResult};
use crate::extract::extract_json;
use crate::normalize::{NormalizeContext, Normalizer};
use crate::schema::{FieldSchema, Schema};

pub const MIN_DURATION_DAYS: u32 = 1;
pub const MAX_DURATION_DAYS: u32 = 30;
pub const MAX_BUDGET: f64 = 20_000.0;
pub const MAX_PARTY_SIZE: u32 = 50;
pub const DEFAULT_CURRENCY: &str = "EUR";

lazy_static! {
    static ref TRIP_SCHEMA: Schema = trip_schema();
}

fn place_field(aliases: &[&str]) -> crate::schema::FieldSchemaBuilder {
    FieldSchema::string()
        .with_aliases(aliases)
        .normalize(Normalizer::Trim)
        .normalize(Normalizer::NullIfBlank)
        .with_min_length(1)
        .with_max_length(100)
}

/// Field declarations for [`TripIntent`]
pub fn trip_schema() -> Schema {
    Schema::builder()
        .optional_field(
            "origin",
            place_field(&["departure_city", "from", "origin_city", "departure"]).build(),
        )
        .required_field(
            "destination",
            place_field(&["destination_city", "city", "to"]).build(),
        )
        .optional_field(
            "start_date",
            FieldSchema::date()
                .with_aliases(&["date", "departure_date", "month", "travel_month", "when"])
                .normalize(Normalizer::Trim)
                .normalize(Normalizer::NullIfBlank)
                .normalize(Normalizer::RelativeDate)
                .build(),
        )
        .required_field(
            "duration_days",
            FieldSchema::integer()
                .with_aliases(&["days", "duration", "length", "trip_length"])
                .normalize(Normalizer::NullIfBlank)
                .normalize(Normalizer::DurationDays)
                .range(f64::from(MIN_DURATION_DAYS), f64::from(MAX_DURATION_DAYS))
                .build(),
        )
        .optional_field(
            "budget",
            FieldSchema::money()
                .with_aliases(&["budget_eur", "budget_amount", "max_budget"])
                .normalize(Normalizer::NullIfBlank)
                .normalize(Normalizer::StripCurrency {
                    default_currency: DEFAULT_CURRENCY.to_string(),
                })
                .range(0.0, MAX_BUDGET)
                .build(),
        )
        .optional_field(
            "interests",
            FieldSchema::string_set()
                .with_aliases(&["interest", "preferences", "categories"])
                .normalize(Normalizer::NullIfBlank)
                .normalize(Normalizer::SplitList)
                .normalize(Normalizer::Trim)
                .normalize(Normalizer::Lowercase)
                .normalize(Normalizer::NullIfBlank)
                .with_default(json!([]))
                .with_max_length(20)
                .build(),
        )
        .optional_field(
            "party_size",
            FieldSchema::integer()
                .with_aliases(&["travelers", "travellers", "people", "group_size", "adults"])
                .normalize(Normalizer::NullIfBlank)
                .normalize(Normalizer::CoerceNumeric)
                .with_default(json!(1))
                .range(1.0, f64::from(MAX_PARTY_SIZE))
                .build(),
        )
        .allow_additional_fields(true)
        .build()
}

/// Validate model output (text or an already-parsed object) as a trip intent.
///
/// Relative dates resolve against `anchor`, the day the request arrived.
pub fn validate_trip_intent(raw: &Value, anchor: NaiveDate) -> ValidationResult<TripIntent> {
    let document = match raw {
        Value::String(text) => extract_json(text)?,
        other => other.clone(),
    };

    let ctx = NormalizeContext::new(anchor);
    let normalized = TRIP_SCHEMA.validate(&document, &ctx)?;
    debug!("Normalized trip intent: {}", Value::Object(normalized.clone()));

    serde_json::from_value(Value::Object(normalized))
        .map_err(|e| ValidationError::invalid_type("$", format!("normalized trip does not fit: {}", e)))
}

/// Check the raw request text before it is sent to the model
pub fn validate_request_text(text: &str, min_chars: usize, max_chars: usize) -> ValidationResult<String> {
    let trimmed = text.trim();
    let len = trimmed.chars().count();

    if len == 0 {
        return Err(ValidationError::missing("request"));
    }
    if len < min_chars {
        return Err(ValidationError::new(
            "request",
            ValidationReason::TooShort(format!("{} characters, minimum is {}", len, min_chars)),
        ));
    }
    if len > max_chars {
        return Err(ValidationError::new(
            "request",
            ValidationReason::TooLong(format!("{} characters, maximum is {}", len, max_chars)),
        ));
    }

    Ok(trimmed.to_string())
}
