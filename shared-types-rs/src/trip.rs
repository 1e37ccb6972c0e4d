// shared-types-rs/src/trip.rs
// Ingress request and the validated trip intent extracted from it.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One free-text planning request as it entered the pipeline.
///
/// Immutable once built; `request_id` identifies the whole pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRequest {
    pub request_id: Uuid,
    pub text: String,
    pub received_at: DateTime<Utc>,
}

impl RawRequest {
    /// Build a request, generating an id when the caller did not supply one.
    pub fn new(request_id: Option<Uuid>, text: impl Into<String>) -> Self {
        Self::received_at(request_id, text, Utc::now())
    }

    /// Build a request with an explicit arrival time (the anchor for relative dates).
    pub fn received_at(
        request_id: Option<Uuid>,
        text: impl Into<String>,
        received_at: DateTime<Utc>,
    ) -> Self {
        Self {
            request_id: request_id.unwrap_or_else(Uuid::new_v4),
            text: text.into(),
            received_at,
        }
    }
}

/// Trip budget, normalized to a plain amount plus ISO currency code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub amount: f64,
    pub currency: String,
}

/// Structured, validated representation of what the traveller asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripIntent {
    pub origin: Option<String>,
    pub destination: String,
    pub start_date: Option<NaiveDate>,
    pub duration_days: u32,
    pub budget: Option<Budget>,
    pub interests: BTreeSet<String>,
    pub party_size: u32,
}

impl TripIntent {
    /// Last day of the trip, when a start date is known.
    pub fn end_date(&self) -> Option<NaiveDate> {
        let offset = u64::from(self.duration_days.saturating_sub(1));
        self.start_date
            .and_then(|start| start.checked_add_days(chrono::Days::new(offset)))
    }
}
