//! Gemini `generateContent` over plain REST.
//!
//! The report schema is sent as `generationConfig.responseSchema` with
//! `responseMimeType: application/json`, so the model can only answer with a
//! conforming document.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use healthcheck_core::Settings;

use crate::engine::{BackendError, CompletionBackend, CompletionRequest};

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Keywords of the OpenAPI subset Gemini accepts in `responseSchema`.
const SUPPORTED_KEYWORDS: &[&str] = &[
    "type",
    "description",
    "nullable",
    "enum",
    "items",
    "properties",
    "required",
    "minItems",
    "maxItems",
    "minimum",
    "maximum",
];

pub struct GeminiBackend {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiBackend {
    pub fn new(settings: &Settings) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: settings.api_key.clone(),
            base_url: settings
                .base_url
                .clone()
                .unwrap_or_else(|| GEMINI_API_BASE.to_string()),
        })
    }

    fn url(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        )
    }
}

#[async_trait]
impl CompletionBackend for GeminiBackend {
    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, BackendError> {
        let body = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: request.system.to_string(),
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part {
                    text: request.prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: provider_schema(request.schema),
            },
        };

        debug!(model = request.model, "sending generateContent request");

        let response = self
            .client
            .post(self.url(request.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Gemini rejected the request");
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let reply: GenerateResponse = response.json().await?;

        if let Some(reason) = reply.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(BackendError::Blocked(reason));
        }

        let candidate = reply.candidates.into_iter().next().ok_or(BackendError::NoText)?;
        if let Some(reason) = candidate.finish_reason.as_deref() {
            debug!(finish_reason = reason, "Gemini finished");
        }
        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(BackendError::EmptyText);
        }
        Ok(text)
    }
}

/// Translate a JSON schema into Gemini's `responseSchema` dialect: drop the
/// keywords it does not know and turn `["T", "null"]` into `T` + `nullable`.
pub fn provider_schema(schema: &Value) -> Value {
    let Some(rules) = schema.as_object() else {
        return schema.clone();
    };

    let mut out = Map::new();
    for (key, value) in rules {
        if !SUPPORTED_KEYWORDS.contains(&key.as_str()) {
            continue;
        }
        let converted = match key.as_str() {
            "type" => match value {
                Value::Array(types) => {
                    if types.iter().any(|t| t == "null") {
                        out.insert("nullable".to_string(), Value::Bool(true));
                    }
                    types
                        .iter()
                        .find(|t| *t != "null")
                        .cloned()
                        .unwrap_or(Value::String("string".to_string()))
                }
                other => other.clone(),
            },
            "items" => provider_schema(value),
            "properties" => match value {
                Value::Object(props) => Value::Object(
                    props
                        .iter()
                        .map(|(name, sub)| (name.clone(), provider_schema(sub)))
                        .collect(),
                ),
                other => other.clone(),
            },
            _ => value.clone(),
        };
        out.insert(key.clone(), converted);
    }
    Value::Object(out)
}

// --- Wire types ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}
