//! rig-core integration for LLM-backed summarization.
//!
//! Uses rig-core's provider clients and Agent abstraction for multi-provider
//! support. Currently supports: Anthropic, OpenAI, Gemini, DeepSeek, Groq,
//! and any OpenAI-compatible API.

use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers;
use schemars::JsonSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::ProviderConfig;
use crate::models::{PartialAnalysis, ProviderName, RepoSummary};

use super::prompts::{
    EXTRACT_SYSTEM_PROMPT, SUMMARY_SYSTEM_PROMPT, SYNTHESIS_SYSTEM_PROMPT, summary_prompt,
    synthesis_prompt,
};
use super::{ProviderError, SummaryProvider, prompt_with_parse_retry};

/// Build an agent from a rig-core client and prompt it once.
///
/// Always sets `max_tokens`; without it some providers (e.g. Gemini)
/// default to a low limit that truncates responses.
macro_rules! prompt_simple {
    ($client:expr, $model:expr, $system:expr, $user:expr, $label:expr, $schema:ty, $config:expr) => {{
        let agent = $client
            .agent($model)
            .preamble($system)
            .temperature($config.temperature)
            .max_tokens($config.max_tokens)
            .output_schema::<$schema>()
            .build();
        agent
            .prompt($user)
            .await
            .map_err(|e| ProviderError::ApiError(format!("{} API error: {e}", $label)))
    }};
}

/// Create a rig-core client using the `Client::new(api_key)` convention.
macro_rules! new_client {
    ($provider_mod:path, $api_key:expr, $label:expr) => {{
        <$provider_mod>::new($api_key).map_err(|e| {
            ProviderError::ApiError(format!("failed to create {} client: {e}", $label))
        })
    }};
}

/// rig-core based summary provider.
///
/// The provider name in config selects which rig-core provider to use.
/// Extraction calls go to the map model; direct and synthesis calls go
/// to the primary model.
pub struct RigProvider {
    config: ProviderConfig,
}

impl RigProvider {
    /// Create a new RigProvider with the given configuration.
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        if config.api_key.is_none() {
            return Err(ProviderError::NotConfigured(format!(
                "no API key found for provider '{}'. Set {} or {}.",
                config.name,
                crate::constants::ENV_API_KEY,
                config.name.api_key_env_var(),
            )));
        }
        if config.name == ProviderName::OpenAICompatible && config.base_url.is_none() {
            return Err(ProviderError::NotConfigured(
                "openai-compatible provider requires base_url to be set".to_string(),
            ));
        }
        Ok(Self { config })
    }

    /// Build an OpenAI-style client, optionally with a custom base URL.
    fn build_openai_client(
        &self,
        api_key: &str,
    ) -> Result<providers::openai::CompletionsClient, ProviderError> {
        let mut builder = providers::openai::CompletionsClient::builder().api_key(api_key);
        if let Some(ref base_url) = self.config.base_url {
            builder = builder.base_url(base_url);
        }
        let client: providers::openai::CompletionsClient = builder
            .build()
            .map_err(|e| ProviderError::ApiError(format!("failed to create OpenAI client: {e}")))?;
        Ok(client)
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::NotConfigured("missing API key".to_string()))
    }

    /// Make a completion call through rig-core and return the raw response text.
    async fn call_rig<T>(
        &self,
        model: &str,
        system_prompt: &str,
        user_prompt: String,
    ) -> Result<String, ProviderError>
    where
        T: JsonSchema + Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        let api_key = self.api_key()?;
        let config = &self.config;

        match config.name {
            ProviderName::Anthropic => {
                let client: providers::anthropic::Client = providers::anthropic::Client::builder()
                    .api_key(api_key)
                    .build()
                    .map_err(|e| {
                        ProviderError::ApiError(format!("failed to create Anthropic client: {e}"))
                    })?;
                prompt_simple!(client, model, system_prompt, user_prompt, "Anthropic", T, config)
            }
            ProviderName::OpenAI => {
                let client = self.build_openai_client(api_key)?;
                prompt_simple!(client, model, system_prompt, user_prompt, "OpenAI", T, config)
            }
            ProviderName::OpenAICompatible => {
                let client = self.build_openai_client(api_key)?;
                prompt_simple!(
                    client,
                    model,
                    system_prompt,
                    user_prompt,
                    "OpenAI-compatible",
                    T,
                    config
                )
            }
            ProviderName::Gemini => {
                let client = new_client!(providers::gemini::Client, api_key, "Gemini")?;
                prompt_simple!(client, model, system_prompt, user_prompt, "Gemini", T, config)
            }
            ProviderName::DeepSeek => {
                let client = new_client!(providers::deepseek::Client, api_key, "DeepSeek")?;
                prompt_simple!(client, model, system_prompt, user_prompt, "DeepSeek", T, config)
            }
            ProviderName::Groq => {
                let client = new_client!(providers::groq::Client, api_key, "Groq")?;
                prompt_simple!(client, model, system_prompt, user_prompt, "Groq", T, config)
            }
        }
    }
}

#[async_trait]
impl SummaryProvider for RigProvider {
    async fn summarize(&self, context: &str) -> Result<RepoSummary, ProviderError> {
        let model = self.config.model.as_str();
        prompt_with_parse_retry(&summary_prompt(context), |prompt| {
            self.call_rig::<RepoSummary>(model, SUMMARY_SYSTEM_PROMPT, prompt)
        })
        .await
    }

    async fn extract(&self, chunk: &str) -> Result<PartialAnalysis, ProviderError> {
        let model = self.config.map_model();
        prompt_with_parse_retry(chunk, |prompt| {
            self.call_rig::<PartialAnalysis>(model, EXTRACT_SYSTEM_PROMPT, prompt)
        })
        .await
    }

    async fn synthesize(
        &self,
        tree_and_readme: &str,
        partials: &[PartialAnalysis],
    ) -> Result<RepoSummary, ProviderError> {
        let model = self.config.model.as_str();
        prompt_with_parse_retry(&synthesis_prompt(tree_and_readme, partials), |prompt| {
            self.call_rig::<RepoSummary>(model, SYNTHESIS_SYSTEM_PROMPT, prompt)
        })
        .await
    }
}

/// Classifies a provider error into a short, user-friendly message.
///
/// Returns `Some(message)` for recognisable transient failures, `None` otherwise.
pub fn classify_error(err: &ProviderError) -> Option<&'static str> {
    match err {
        ProviderError::ApiError(msg) => {
            let msg_lower = msg.to_lowercase();
            if msg_lower.contains("429")
                || msg_lower.contains("rate limit")
                || msg_lower.contains("too many requests")
            {
                Some("Rate limited by API")
            } else if msg_lower.contains("503")
                || msg_lower.contains("service unavailable")
                || msg_lower.contains("high demand")
            {
                Some("High model load")
            } else if msg_lower.contains("529") || msg_lower.contains("overloaded") {
                Some("API overloaded")
            } else if msg_lower.contains("502") {
                Some("API gateway error")
            } else if msg_lower.contains("timeout") || msg_lower.contains("timed out") {
                Some("Request timed out")
            } else if msg_lower.contains("connection") {
                Some("Connection error")
            } else {
                None
            }
        }
        ProviderError::ParseError(_) => Some("Failed to parse LLM response"),
        ProviderError::NotConfigured(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_provider_missing_api_key() {
        let config = ProviderConfig {
            name: ProviderName::Anthropic,
            api_key: None,
            ..ProviderConfig::default()
        };
        match RigProvider::new(config) {
            Err(e) => {
                let msg = e.to_string();
                assert!(msg.contains("API key"), "got: {msg}");
                assert!(msg.contains("ANTHROPIC_API_KEY"), "got: {msg}");
            }
            Ok(_) => panic!("expected error for missing API key"),
        }
    }

    #[test]
    fn new_provider_with_api_key() {
        let config = ProviderConfig {
            api_key: Some("sk-test-key".to_string()),
            ..ProviderConfig::default()
        };
        assert!(RigProvider::new(config).is_ok());
    }

    #[test]
    fn compatible_provider_requires_base_url() {
        let config = ProviderConfig {
            name: ProviderName::OpenAICompatible,
            api_key: Some("k".to_string()),
            base_url: None,
            ..ProviderConfig::default()
        };
        assert!(matches!(
            RigProvider::new(config),
            Err(ProviderError::NotConfigured(_))
        ));
    }

    #[test]
    fn classify_rate_limit() {
        let err = ProviderError::ApiError(
            "OpenAI API error: HttpError: Invalid status code 429 Too Many Requests".into(),
        );
        assert_eq!(classify_error(&err), Some("Rate limited by API"));
    }

    #[test]
    fn classify_overloaded() {
        let err = ProviderError::ApiError("Anthropic API error: overloaded".into());
        assert_eq!(classify_error(&err), Some("API overloaded"));
    }

    #[test]
    fn classify_unknown_api_error() {
        let err = ProviderError::ApiError("Invalid API key: 401 Unauthorized".into());
        assert_eq!(classify_error(&err), None);
    }

    #[test]
    fn classify_parse_and_config_errors() {
        assert!(classify_error(&ProviderError::ParseError("bad".into())).is_some());
        assert!(classify_error(&ProviderError::NotConfigured("x".into())).is_none());
    }
}
