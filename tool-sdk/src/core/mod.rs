//! Core abstractions for the Tool SDK

use std::fmt::Debug;

/// Base trait for all service clients
pub trait ServiceClient: Send + Sync + Debug {
    /// The client name/identifier, used in logs and error context
    fn name(&self) -> &str;

    /// The base URL for the service
    fn base_url(&self) -> &str;
}

/// Join a base URL and a path without doubling or dropping the slash.
pub fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}
