use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OpenAiConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    pub provider: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Completion requests running past this are treated as failed.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    pub openai: Option<OpenAiConfig>,
    pub ollama: Option<OllamaConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    /// Persona directive prepended to every completion request.
    pub system_prompt: String,
    /// How many stored messages the context window carries.
    #[serde(default = "default_history_window")]
    pub history_window: usize,
    /// Inbound messages longer than this are rejected up front.
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,
    /// Assistant reply substituted when the completion call fails.
    #[serde(default = "default_fallback_reply")]
    pub fallback_reply: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub llm: LlmConfig,
    pub chat: ChatConfig,
}

impl AppConfig {
    pub fn load(path: &str) -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();

        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("CANDYCHAT").separator("__"))
            .build()?;

        let mut app_config: AppConfig = settings.try_deserialize()?;

        // Expand environment variables if present like ${OPENAI_API_KEY}
        app_config.server.host = expand_env(&app_config.server.host);
        app_config.database.path = expand_env(&app_config.database.path);

        if let Some(ref mut openai) = app_config.llm.openai {
            openai.api_key = expand_env(&openai.api_key);
        }

        Ok(app_config)
    }
}

fn expand_env(val: &str) -> String {
    if val.starts_with("${") && val.ends_with('}') {
        let var_name = &val[2..val.len() - 1];
        std::env::var(var_name).unwrap_or_else(|_| "".to_string())
    } else {
        val.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_env_passes_plain_values_through() {
        assert_eq!(expand_env("localhost"), "localhost");
    }

    #[test]
    fn expand_env_resolves_placeholders() {
        std::env::set_var("CANDYCHAT_TEST_KEY", "sk-test");
        assert_eq!(expand_env("${CANDYCHAT_TEST_KEY}"), "sk-test");
    }

    #[test]
    fn expand_env_empty_for_missing_var() {
        assert_eq!(expand_env("${CANDYCHAT_DEFINITELY_UNSET}"), "");
    }
}

fn default_history_window() -> usize {
    10
}

fn default_max_message_chars() -> usize {
    4000
}

fn default_fallback_reply() -> String {
    "I apologize, but I'm having trouble processing your request right now. Please try again in a moment.".to_string()
}

fn default_max_tokens() -> u32 {
    200
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout_secs() -> u64 {
    30
}
