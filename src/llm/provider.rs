//! Provider selection and the text-generation seam.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use clap::ValueEnum;

use crate::error::LlmError;

/// Transport-level timeout for a single generation request.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Supported text-generation backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Provider {
    Anthropic,
    Gemini,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Anthropic => "Anthropic",
            Provider::Gemini => "Gemini",
        }
    }

    /// Model used when none is configured.
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Anthropic => "claude-3-5-sonnet-20241022",
            Provider::Gemini => "gemini-1.5-flash",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sampling settings for one generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl GenerationParams {
    pub const DEFAULT_MAX_TOKENS: u32 = 1024;
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;

    pub fn for_provider(provider: Provider) -> Self {
        Self {
            model: provider.default_model().to_string(),
            max_tokens: Self::DEFAULT_MAX_TOKENS,
            temperature: Self::DEFAULT_TEMPERATURE,
        }
    }
}

/// A text-generation backend.
///
/// `complete` performs exactly one outbound request and returns the reply's
/// sole text payload, or `None` when the reply carried no text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn provider(&self) -> Provider;

    async fn complete(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<Option<String>, LlmError>;
}

/// Build the HTTP client for a provider with the given credential.
pub fn build_generator(
    provider: Provider,
    api_key: String,
) -> Result<Box<dyn TextGenerator>, LlmError> {
    Ok(match provider {
        Provider::Anthropic => Box::new(super::anthropic::AnthropicClient::new(api_key)?),
        Provider::Gemini => Box::new(super::gemini::GeminiClient::new(api_key)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_use_moderate_temperature() {
        let params = GenerationParams::for_provider(Provider::Anthropic);
        assert_eq!(params.max_tokens, 1024);
        assert!(params.temperature > 0.0 && params.temperature < 1.0);
        assert_eq!(params.model, "claude-3-5-sonnet-20241022");
    }

    #[test]
    fn test_provider_parses_from_cli_value() {
        assert_eq!(Provider::from_str("gemini", true), Ok(Provider::Gemini));
        assert_eq!(Provider::from_str("anthropic", true), Ok(Provider::Anthropic));
        assert!(Provider::from_str("openai", true).is_err());
    }

    #[test]
    fn test_build_generator_reports_provider() {
        let generator = build_generator(Provider::Gemini, "key".into()).unwrap();
        assert_eq!(generator.provider(), Provider::Gemini);
    }
}
