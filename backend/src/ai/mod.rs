pub mod gemini;
pub mod openai;
pub mod provider;
pub mod query;

#[cfg(test)]
pub mod mock;

use log::{info, warn};
use std::sync::Arc;

use crate::config::{AiConfig, ProviderKind};
use gemini::GeminiProvider;
use openai::OpenAiProvider;
use provider::{AiError, CompletionProvider};

/// Builds the configured provider. `Ok(None)` when no credential is set.
pub fn create_provider(config: &AiConfig) -> Result<Option<Arc<dyn CompletionProvider>>, AiError> {
    let Some(api_key) = config.api_key() else {
        warn!(
            "No API key for {:?}; queries will report the AI service as unavailable",
            config.provider
        );
        return Ok(None);
    };

    let provider: Arc<dyn CompletionProvider> = match config.provider {
        ProviderKind::Gemini => Arc::new(GeminiProvider::new(
            api_key.to_string(),
            config.gemini_model.clone(),
            config.timeout,
        )?),
        ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(
            api_key.to_string(),
            config.openai_model.clone(),
            config.openai_base_url.clone(),
            config.timeout,
        )?),
    };

    info!("AI provider: {} ({})", provider.name(), provider.model());
    Ok(Some(provider))
}
