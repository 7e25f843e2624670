use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::llm::models::{CompletionPolicy, Turn};
use crate::llm::{CompletionError, LlmProvider};

pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
    policy: CompletionPolicy,
}

impl OllamaProvider {
    pub fn new(base_url: String, model: String, policy: CompletionPolicy) -> Self {
        let client = Client::builder()
            .timeout(policy.timeout)
            .build()
            .expect("failed to build HTTP client");
        Self { client, base_url, model, policy }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, turns: &[Turn]) -> Result<String, CompletionError> {
        let body = json!({
            "model": self.model,
            "messages": turns,
            "stream": false,
            "options": {
                "temperature": self.policy.temperature,
                "num_predict": self.policy.max_tokens
            }
        });

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| CompletionError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(CompletionError::Api(format!("Ollama Error {}: {}", status, text)));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| CompletionError::Network(e.to_string()))?;

        let content = json["message"]["content"]
            .as_str()
            .ok_or(CompletionError::MalformedResponse)?
            .to_string();

        Ok(content)
    }

    fn supported_models(&self) -> Vec<&str> {
        vec!["llama3", "mistral", "qwen2"]
    }
}
