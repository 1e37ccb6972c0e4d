// orchestrator-service-rs/src/lib.rs
//
// Vacation planning pipeline: the model extracts a trip intent, a fixed rule
// set decides which lookups to run, the tools fetch grounding data and the
// model writes the itinerary. Audit and metrics are recorded for every run.

pub mod decision;
pub mod error;
pub mod itinerary;
pub mod pipeline;
pub mod prompts;
pub mod timings;

pub use decision::DecisionEngine;
pub use error::{GenerationError, OrchestrationError};
pub use itinerary::ItineraryGenerator;
pub use pipeline::{Orchestrator, PipelineSettings};
pub use tokio_util::sync::CancellationToken;
