pub mod audit;
pub mod config;
pub mod plan;
pub mod tools;
pub mod trip;

pub use audit::{AuditRecord, Stage, StageTiming, ToolUsage};
pub use config::{ConfigError, PlannerConfig};
pub use plan::{ItineraryDay, PlanRequest, PlanResponse, PlanResult, PlanStatus};
pub use tools::{
    Attraction, AttractionsPayload, Coordinates, DailyForecast, GeocodingPayload, ToolDecision,
    ToolErrorKind, ToolName, ToolOutcome, ToolResult, WeatherPayload, WeatherSource,
};
pub use trip::{Budget, RawRequest, TripIntent};
