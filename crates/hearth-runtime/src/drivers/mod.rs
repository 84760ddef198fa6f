//! Concrete LLM backends.

pub mod anthropic;

use crate::llm_driver::{LlmDriver, LlmError};
use hearth_types::config::LlmConfig;
use std::sync::Arc;
use std::time::Duration;

/// Build the driver named by `config.provider`.
///
/// The API key is read from the environment variable named by `api_key_env`.
pub fn create_driver(config: &LlmConfig) -> Result<Arc<dyn LlmDriver>, LlmError> {
    match config.provider.to_lowercase().as_str() {
        "anthropic" => {
            let api_key = std::env::var(&config.api_key_env)
                .ok()
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| LlmError::MissingApiKey(config.api_key_env.clone()))?;
            let driver = anthropic::AnthropicDriver::new(
                api_key,
                config.base_url.clone(),
                Duration::from_secs(config.timeout_secs),
            )?;
            Ok(Arc::new(driver))
        }
        other => Err(LlmError::Parse(format!("Unknown LLM provider '{other}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider_rejected() {
        let config = LlmConfig {
            provider: "carrier-pigeon".into(),
            ..Default::default()
        };
        assert!(create_driver(&config).is_err());
    }

    #[test]
    fn test_missing_key_reported() {
        let config = LlmConfig {
            api_key_env: "HEARTH_TEST_KEY_THAT_IS_NEVER_SET".into(),
            ..Default::default()
        };
        match create_driver(&config) {
            Err(LlmError::MissingApiKey(var)) => {
                assert_eq!(var, "HEARTH_TEST_KEY_THAT_IS_NEVER_SET")
            }
            other => panic!("expected MissingApiKey, got {:?}", other.err()),
        }
    }
}
