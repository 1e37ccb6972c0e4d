//! # Input Validation Library
//!
//! Schema validation and normalization for the semi-structured data the
//! language model produces. The planner validates twice: the trip intent
//! extracted from the user's request, and the generated itinerary.
//!
//! ## Features
//!
//! - Declarative schemas with per-field aliases, normalizers, ranges and defaults
//! - Normalizers for dates relative to the request, currency amounts, durations and tag lists
//! - JSON extraction from fenced or prose-wrapped model output
//! - Field-level errors (`ValidationError { field, reason }`)
//!
//! Nothing here talks to a model or the network, so every rule can be tested
//! against hand-written malformed input.

mod errors;
pub mod extract;
pub mod itinerary;
pub mod normalize;
pub mod schema;
pub mod trip;

use chrono::NaiveDate;
use serde_json::Value;
use shared_types_rs::{ItineraryDay, TripIntent};

pub use errors::{ValidationError, ValidationReason, ValidationResult};
pub use itinerary::validate_itinerary;
pub use normalize::{NormalizeContext, Normalizer};
pub use schema::{FieldSchema, FieldType, Schema};
pub use trip::{validate_request_text, validate_trip_intent};

/// Re-export commonly used items for convenience
pub mod prelude {
    pub use crate::errors::{ValidationError, ValidationReason, ValidationResult};
    pub use crate::schema::{FieldSchema, Schema};
    pub use crate::{validate, Shape, Validated};
}

/// Version of the validation library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The shapes the planner validates against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Trip intent; relative dates resolve against `anchor`
    TripIntent { anchor: NaiveDate },
    /// Itinerary with exactly `expected_days` entries
    Itinerary { expected_days: u32 },
}

/// Successfully validated data
#[derive(Debug, Clone, PartialEq)]
pub enum Validated {
    Trip(TripIntent),
    Itinerary(Vec<ItineraryDay>),
}

/// Validate raw model output against `shape`.
///
/// `raw` may be the unparsed model text (a JSON string value) or an
/// already-parsed JSON document.
pub fn validate(raw: &Value, shape: &Shape) -> ValidationResult<Validated> {
    match shape {
        Shape::TripIntent { anchor } => validate_trip_intent(raw, *anchor).map(Validated::Trip),
        Shape::Itinerary { expected_days } => validate_itinerary(raw, *expected_days).map(Validated::Itinerary),
    }
}
