//! Service-specific client implementations

mod common;
pub mod ollama;
pub mod open_meteo;
pub mod wikipedia;

pub use common::{build_http_client, UserAgent};
