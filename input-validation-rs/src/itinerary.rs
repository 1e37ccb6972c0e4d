//! Itinerary shape
//!
//! The generated plan must have exactly one entry per trip day, numbered
//! 1..N in order. Entries are never reordered or padded: a plan that does
//! not meet the shape is rejected.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use serde_json::{json, Value};
use shared_types_rs::ItineraryDay;

use crate::errors::{ValidationError, ValidationReason, ValidationResult};
use crate::extract::extract_json;
use crate::normalize::{NormalizeContext, Normalizer};
use crate::schema::{type_name, FieldSchema, Schema};

/// Wrapper keys a model may put around the day list
const WRAPPER_KEYS: &[&str] = &["days", "itinerary", "plan"];

lazy_static! {
    static ref DAY_SCHEMA: Schema = day_schema();
}

/// Field declarations for one [`ItineraryDay`]
pub fn day_schema() -> Schema {
    Schema::builder()
        .required_field(
            "day_index",
            FieldSchema::integer()
                .with_aliases(&["day", "day_number", "index"])
                .normalize(Normalizer::CoerceNumeric)
                .with_minimum(1.0)
                .build(),
        )
        .required_field(
            "summary",
            FieldSchema::string()
                .with_aliases(&["title", "theme", "description"])
                .normalize(Normalizer::Trim)
                .normalize(Normalizer::NullIfBlank)
                .with_min_length(1)
                .with_max_length(500)
                .build(),
        )
        .optional_field(
            "activities",
            FieldSchema::string_list()
                .with_aliases(&["activity", "schedule"])
                .normalize(Normalizer::TextItems)
                .normalize(Normalizer::Trim)
                .with_default(json!([]))
                .build(),
        )
        .allow_additional_fields(true)
        .build()
}

fn day_list(document: Value) -> ValidationResult<Vec<Value>> {
    match document {
        Value::Array(days) => Ok(days),
        Value::Object(mut obj) => {
            let key = WRAPPER_KEYS
                .iter()
                .find(|key| matches!(obj.get(**key), Some(Value::Array(_))))
                .ok_or_else(|| ValidationError::missing("days"))?;
            match obj.remove(*key) {
                Some(Value::Array(days)) => Ok(days),
                _ => Err(ValidationError::missing("days")),
            }
        }
        other => Err(ValidationError::invalid_type(
            "$",
            format!("expected array of days, got {}", type_name(&other)),
        )),
    }
}

/// Validate model output (text or parsed JSON) as an itinerary of
/// exactly `expected_days` days
pub fn validate_itinerary(raw: &Value, expected_days: u32) -> ValidationResult<Vec<ItineraryDay>> {
    let document = match raw {
        Value::String(text) => extract_json(text)?,
        other => other.clone(),
    };

    let days = day_list(document)?;
    let expected = expected_days as usize;
    if days.len() != expected {
        return Err(ValidationError::new(
            "days",
            ValidationReason::WrongCount {
                expected,
                actual: days.len(),
            },
        ));
    }

    // No field of a day is date-relative
    let ctx = NormalizeContext::new(NaiveDate::MIN);

    days.iter()
        .enumerate()
        .map(|(idx, day)| {
            let path = format!("days[{}]", idx);
            let normalized = DAY_SCHEMA.validate(day, &ctx).map_err(|e| e.within(&path))?;
            let day: ItineraryDay = serde_json::from_value(Value::Object(normalized))
                .map_err(|e| ValidationError::invalid_type(path.as_str(), e.to_string()))?;

            if day.day_index as usize != idx + 1 {
                return Err(ValidationError::new(
                    format!("{}.day_index", path),
                    ValidationReason::OutOfSequence(format!("expected day {}, got {}", idx + 1, day.day_index)),
                ));
            }
            Ok(day)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn plan(n: u32) -> Value {
        Value::Array(
            (1..=n)
                .map(|i| json!({"day_index": i, "summary": format!("Day {}", i), "activities": ["Walk"]}))
                .collect(),
        )
    }

    #[test]
    fn test_accepts_wrapped_and_fenced_output() {
        let text = format!("```json\n{}\n```", json!({ "days": plan(4) }));
        let days = validate_itinerary(&json!(text), 4).unwrap();
        assert_eq!(days.len(), 4);
        assert_eq!(days.iter().map(|d| d.day_index).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_normalizes_day_fields() {
        let raw = json!({"itinerary": [
            {"day": "Day 1", "title": " Gothic Quarter ", "activities": [{"time": "10:00", "activity": "Cathedral"}, "", "Tapas bar"]},
            {"day_index": 2, "summary": "Montjuïc", "activities": "Cable car"}
        ]});
        let days = validate_itinerary(&raw, 2).unwrap();
        assert_eq!(
            days[0],
            ItineraryDay {
                day_index: 1,
                summary: "Gothic Quarter".to_string(),
                activities: vec!["Cathedral".to_string(), "Tapas bar".to_string()],
            }
        );
        assert_eq!(days[1].activities, vec!["Cable car".to_string()]);
    }

    #[test_case(3, 4 ; "too few")]
    #[test_case(5, 4 ; "too many")]
    fn test_wrong_count(actual: u32, expected: u32) {
        let err = validate_itinerary(&plan(actual), expected).unwrap_err();
        assert_eq!(
            err.reason,
            ValidationReason::WrongCount {
                expected: expected as usize,
                actual: actual as usize
            }
        );
    }

    #[test]
    fn test_out_of_sequence_is_not_reordered() {
        let raw = json!([
            {"day_index": 2, "summary": "b"},
            {"day_index": 1, "summary": "a"}
        ]);
        let err = validate_itinerary(&raw, 2).unwrap_err();
        assert_eq!(err.field, "days[0].day_index");
        assert!(matches!(err.reason, ValidationReason::OutOfSequence(_)));

        let duplicate = json!([
            {"day_index": 1, "summary": "a"},
            {"day_index": 1, "summary": "b"}
        ]);
        assert_eq!(validate_itinerary(&duplicate, 2).unwrap_err().field, "days[1].day_index");
    }

    #[test]
    fn test_blank_summary_is_missing() {
        let raw = json!([{"day_index": 1, "summary": "   "}]);
        assert_eq!(
            validate_itinerary(&raw, 1).unwrap_err(),
            ValidationError::missing("days[0].summary")
        );
    }

    #[test]
    fn test_non_string_activity() {
        let raw = json!([{"day_index": 1, "summary": "a", "activities": [3]}]);
        assert_eq!(validate_itinerary(&raw, 1).unwrap_err().field, "days[0].activities[0]");
    }

    #[test]
    fn test_object_without_days() {
        assert_eq!(
            validate_itinerary(&json!({"note": "sorry"}), 2).unwrap_err(),
            ValidationError::missing("days")
        );
    }
}
