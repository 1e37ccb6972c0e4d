// llm-service-rs/src/gateway.rs
//
// The seam the pipeline talks to. Every call is a fresh draw: nothing is
// cached between calls.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ModelError;

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Send `prompt` and return the raw completion text.
    ///
    /// `timeout` bounds each attempt.
    async fn complete(&self, prompt: &str, timeout: Duration) -> Result<String, ModelError>;

    /// Backend name for logs and audit detail
    fn name(&self) -> &'static str;
}

/// True when `text` carries nothing a validator could work with
pub fn is_degenerate(text: &str) -> bool {
    !text.chars().any(char::is_alphanumeric)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate_output() {
        assert!(is_degenerate(""));
        assert!(is_degenerate("  \n\t "));
        assert!(is_degenerate("```\n...\n```"));
        assert!(!is_degenerate("{\"days\": 4}"));
    }

    #[tokio::test]
    async fn test_mocked_gateway_is_object_safe() {
        let mut mock = MockModelGateway::new();
        mock.expect_complete()
            .returning(|prompt, _| Ok(format!("echo: {}", prompt)));
        mock.expect_name().return_const("mock");

        let gateway: Box<dyn ModelGateway> = Box::new(mock);
        assert_eq!(
            gateway.complete("hi", Duration::from_secs(1)).await.unwrap(),
            "echo: hi"
        );
        assert_eq!(gateway.name(), "mock");
    }
}
