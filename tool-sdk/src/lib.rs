//! # Tool SDK
//!
//! Typed HTTP clients for the external services used by the vacation planner.
//!
//! This crate provides:
//!
//! - `OllamaClient` for the local text-completion runtime
//! - `OpenMeteoClient` for geocoding, forecasts and historical weather
//! - `WikipediaClient` for points-of-interest search
//! - `ServiceError`, a normalized error type, and the `Retryable` seam
//! - `Resilience`, per-attempt timeout plus retry with exponential backoff

pub mod core;
pub use core::ServiceClient;

pub mod services;
pub use services::{ollama, open_meteo, wikipedia};

pub mod error;
pub use error::{ErrorContext, Result, Retryable, ServiceError};

pub mod resilience;
pub use resilience::{Resilience, RetryConfig, RetryExecutor};

pub mod config;
pub use config::{OllamaConfig, OpenMeteoConfig, ServiceConfig, WikipediaConfig};

#[cfg(test)]
mod tests;
