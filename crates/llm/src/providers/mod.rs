pub mod openai;

use std::time::Duration;

use yarsmith_core::config::OracleConfig;

use crate::provider::{LlmError, LlmProvider};

/// Create the oracle backend from config. Fails fast when the credential is
/// missing, before any corpus traversal.
pub fn create_provider(config: &OracleConfig) -> Result<Box<dyn LlmProvider>, LlmError> {
    let api_key = config
        .api_key
        .as_ref()
        .ok_or_else(|| LlmError::NotConfigured("OPENAI_API_KEY not set".into()))?;
    let provider = openai::OpenAiProvider::new(
        api_key.clone(),
        config.model.clone(),
        config.base_url.clone(),
        Duration::from_secs(config.timeout_secs),
    )?;
    Ok(Box::new(provider))
}
