// llm-service-rs/src/lib.rs
//
// Model gateway for the vacation planner: `complete(prompt, timeout)`
// against a text-completion runtime.

pub mod error;
pub mod gateway;
pub mod llm_client;


pub use error::ModelError;
pub use gateway::{is_degenerate, ModelGateway};
pub use llm_client::OllamaGateway;
