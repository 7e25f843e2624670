use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::llm::models::{CompletionPolicy, Turn};
use crate::llm::{CompletionError, LlmProvider};

pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    policy: CompletionPolicy,
}

impl OpenAiProvider {
    pub fn new(api_key: String, base_url: String, model: String, policy: CompletionPolicy) -> Self {
        let client = Client::builder()
            .timeout(policy.timeout)
            .build()
            .expect("failed to build HTTP client");
        Self { client, api_key, base_url, model, policy }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, turns: &[Turn]) -> Result<String, CompletionError> {
        let body = json!({
            "model": self.model,
            "messages": turns,
            "temperature": self.policy.temperature,
            "max_tokens": self.policy.max_tokens,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| CompletionError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(CompletionError::RateLimited);
            }
            return Err(CompletionError::Api(format!("OpenAI Error {}: {}", status, text)));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| CompletionError::Network(e.to_string()))?;

        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(CompletionError::MalformedResponse)?
            .to_string();

        Ok(content)
    }

    fn supported_models(&self) -> Vec<&str> {
        vec!["gpt-4o", "gpt-4-turbo", "gpt-3.5-turbo"]
    }
}
