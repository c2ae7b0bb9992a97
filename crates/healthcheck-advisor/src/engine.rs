use std::sync::Arc;

use async_trait::async_trait;
use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::{ChatMessage, StructuredOutputFormat};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use healthcheck_core::Settings;

use crate::gemini::GeminiBackend;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("build LLM: {0}")]
    Build(String),
    #[error("chat: {0}")]
    Chat(String),
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("prompt blocked by provider: {0}")]
    Blocked(String),
    #[error("LLM returned empty text")]
    EmptyText,
    #[error("LLM returned no text")]
    NoText,
}

/// One schema-constrained completion.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub system: &'a str,
    pub prompt: &'a str,
    /// JSON schema the reply must follow.
    pub schema: &'a Value,
}

/// Something that can answer a prompt with text, one call per request.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, BackendError>;
}

fn map_backend(provider: &str) -> Result<LLMBackend, BackendError> {
    match provider {
        "openai" => Ok(LLMBackend::OpenAI),
        "anthropic" => Ok(LLMBackend::Anthropic),
        "google" => Ok(LLMBackend::Google),
        "ollama" => Ok(LLMBackend::Ollama),
        "groq" => Ok(LLMBackend::Groq),
        "mistral" => Ok(LLMBackend::Mistral),
        "deepseek" => Ok(LLMBackend::DeepSeek),
        other => Err(BackendError::UnknownProvider(other.to_string())),
    }
}

/// Pick the backend for `settings.provider`. Gemini goes through its native
/// REST API so the schema travels as `responseSchema`; every other provider
/// uses the `llm` crate's structured output.
pub fn backend_for(settings: &Settings) -> Result<Arc<dyn CompletionBackend>, BackendError> {
    match settings.provider.as_str() {
        "google" => Ok(Arc::new(GeminiBackend::new(settings)?)),
        other => {
            map_backend(other)?;
            Ok(Arc::new(LlmBackend::new(settings.clone())))
        }
    }
}

/// Multi-provider backend built on the `llm` crate.
pub struct LlmBackend {
    settings: Settings,
}

impl LlmBackend {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl CompletionBackend for LlmBackend {
    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, BackendError> {
        let backend = map_backend(&self.settings.provider)?;

        let format: StructuredOutputFormat = serde_json::from_value(json!({
            "name": "health_check_report",
            "schema": request.schema,
        }))
        .map_err(|e| BackendError::Build(format!("output schema: {e}")))?;

        let mut builder = LLMBuilder::new()
            .backend(backend)
            .model(request.model)
            .system(request.system)
            .schema(format)
            .timeout_seconds(self.settings.timeout_secs);

        if !self.settings.api_key.is_empty() {
            builder = builder.api_key(&self.settings.api_key);
        }
        if let Some(url) = &self.settings.base_url {
            builder = builder.base_url(url);
        }

        let llm = builder.build().map_err(|e| BackendError::Build(e.to_string()))?;

        debug!(provider = %self.settings.provider, model = request.model, "sending completion");

        let messages = vec![ChatMessage::user().content(request.prompt).build()];
        let response = llm
            .chat(&messages)
            .await
            .map_err(|e| BackendError::Chat(e.to_string()))?;

        match response.text() {
            Some(text) if !text.trim().is_empty() => Ok(text),
            Some(_) => Err(BackendError::EmptyText),
            None => Err(BackendError::NoText),
        }
    }
}
