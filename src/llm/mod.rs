//! Text-generation providers and reply handling.

pub mod anthropic;
pub mod gemini;
pub mod json;
pub mod provider;

pub use anthropic::AnthropicClient;
pub use gemini::GeminiClient;
pub use json::extract_json;
pub use provider::{GenerationParams, Provider, TextGenerator, build_generator};
