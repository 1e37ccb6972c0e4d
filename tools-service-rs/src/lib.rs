//! Tools Service
//!
//! External lookups for the vacation planner: geocoding, weather and
//! attractions. Failures are recorded as `ToolResult` error variants so a
//! single broken service never aborts a plan.

pub mod error;
pub mod tool_log;
pub mod tool_manager;
pub mod tools;

pub use error::ToolError;
pub use tool_log::ToolLog;
pub use tool_manager::{SharedTool, ToolManager};
pub use tools::{
    weather_window, AttractionsQuery, AttractionsTool, GeocodingQuery, GeocodingTool, Tool, WeatherQuery,
    WeatherTool, WeatherWindow,
};
