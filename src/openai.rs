//! OpenAI client configuration.

use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

use crate::error::Result;

/// Uploading and transcribing a ten minute chunk can take a while.
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Create an OpenAI client with the default request timeout.
pub fn create_client() -> Result<Client<OpenAIConfig>> {
    create_client_with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Create an OpenAI client with a custom timeout.
pub fn create_client_with_timeout(timeout: Duration) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder().timeout(timeout).build()?;

    Ok(Client::with_config(OpenAIConfig::default()).with_http_client(http_client))
}

/// Check if the OpenAI API key is configured.
pub fn is_api_key_configured() -> bool {
    std::env::var("OPENAI_API_KEY").is_ok_and(|key| !key.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client() {
        assert!(create_client_with_timeout(Duration::from_secs(5)).is_ok());
    }
}
