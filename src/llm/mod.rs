pub mod models;
pub mod ollama;
pub mod openai;

use ollama::OllamaProvider;
use openai::OpenAiProvider;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::AppConfig;
use models::{CompletionPolicy, Turn};

/// One error for every way the completion collaborator can fail; callers
/// never see the provider's raw fault.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("network error: {0}")]
    Network(String),
    #[error("api error: {0}")]
    Api(String),
    #[error("rate limited")]
    RateLimited,
    #[error("malformed response")]
    MalformedResponse,
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Single attempt, bounded by the configured timeout. No retry.
    async fn complete(&self, turns: &[Turn]) -> Result<String, CompletionError>;

    fn supported_models(&self) -> Vec<&str>;
}

/// A registry or factory trait to initialize providers from config.
pub struct ProviderFactory;

impl ProviderFactory {
    pub fn create_default(config: &AppConfig) -> Option<Arc<dyn LlmProvider>> {
        let policy = CompletionPolicy::from_config(&config.llm);

        match config.llm.provider.as_str() {
            "openai" => {
                let cfg = config.llm.openai.as_ref()?;
                Some(Arc::new(OpenAiProvider::new(
                    cfg.api_key.clone(),
                    cfg.api_base.clone(),
                    cfg.model.clone(),
                    policy,
                )))
            }
            "ollama" => {
                let cfg = config.llm.ollama.as_ref()?;
                Some(Arc::new(OllamaProvider::new(
                    cfg.base_url.clone(),
                    cfg.model.clone(),
                    policy,
                )))
            }
            _ => None,
        }
    }
}
