//! Gemini extraction client with multi-model fallback.
//!
//! Candidate models are tried in priority order. Transient failures (quota,
//! overload) retry the same model with linear backoff; any other failure
//! advances to the next candidate after a short pause so a shared rate limit
//! is not re-triggered immediately. The first non-empty, schema-conforming
//! response wins.

use crate::error::{ExtractError, classify_provider_error};
use crate::payload::DocumentPayload;
use crate::schema::{CategorySpec, spec_for};
use async_trait::async_trait;
use dossier_core::DocCategory;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default endpoint for the Gemini REST API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Fallback model priority, highest preference first. Used when the
/// configuration lists no models.
pub const DEFAULT_MODEL_PRIORITY: [&str; 5] = [
    "gemini-3-pro-preview",
    "gemini-3-flash-preview",
    "gemini-2.0-pro-exp-02-05",
    "gemini-2.0-flash",
    "gemini-2.0-flash-lite-preview-02-05",
];

/// Parsed extraction result: wire field name -> string value.
pub type FieldMap = BTreeMap<String, String>;

/// Retry/backoff policy. All knobs are configuration, not code; the
/// defaults mirror the tuning the form shipped with.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts per model before moving on (transient failures only).
    pub attempts_per_model: u32,
    /// Linear backoff: the delay after the n-th failed attempt is n × step.
    pub backoff_step: Duration,
    /// Pause between giving up on one model and trying the next.
    pub model_pause: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts_per_model: 3,
            backoff_step: Duration::from_secs(4),
            model_pause: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff_step * attempt
    }
}

/// One generation request, identical across every model attempt of a call.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub payload: DocumentPayload,
    pub instruction: String,
    pub response_schema: Value,
    pub web_lookup: bool,
}

/// Transport seam: one attempt against one model, returning the raw
/// response text. Implemented by [`GeminiBackend`] in production and by
/// scripted fakes in tests.
#[async_trait]
pub trait GenerateBackend: Send + Sync {
    async fn generate(&self, model: &str, request: &GenerateRequest)
    -> Result<String, ExtractError>;
}

/// HTTP backend for the Gemini `generateContent` endpoint.
pub struct GeminiBackend {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

fn require_api_key(value: Option<String>) -> Result<String, ExtractError> {
    match value {
        Some(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(ExtractError::MissingApiKey),
    }
}

impl GeminiBackend {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Build from `GEMINI_API_KEY`. A missing or blank key is fatal before
    /// any network attempt.
    pub fn from_env(base_url: impl Into<String>) -> Result<Self, ExtractError> {
        let key = require_api_key(std::env::var("GEMINI_API_KEY").ok())?;
        Ok(Self::new(base_url, key))
    }
}

#[derive(Serialize)]
struct GenerateBody<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

#[derive(Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig<'a> {
    response_mime_type: &'a str,
    response_schema: &'a Value,
}

#[derive(Serialize)]
struct Tool {
    google_search: serde_json::Map<String, Value>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}

#[derive(Deserialize)]
struct TextPart {
    text: Option<String>,
}

#[async_trait]
impl GenerateBackend for GeminiBackend {
    async fn generate(
        &self,
        model: &str,
        request: &GenerateRequest,
    ) -> Result<String, ExtractError> {
        let body = GenerateBody {
            contents: vec![Content {
                parts: vec![
                    Part {
                        inline_data: Some(InlineData {
                            mime_type: &request.payload.mime_type,
                            data: request.payload.to_base64(),
                        }),
                        text: None,
                    },
                    Part {
                        inline_data: None,
                        text: Some(&request.instruction),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: &request.response_schema,
            },
            tools: if request.web_lookup {
                vec![Tool {
                    google_search: serde_json::Map::new(),
                }]
            } else {
                Vec::new()
            },
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(classify_provider_error(model, status.as_u16(), &text));
        }

        let parsed: GenerateResponse = resp.json().await.map_err(|e| ExtractError::Parse {
            model: model.to_string(),
            detail: e.to_string(),
        })?;

        let mut out = String::new();
        for candidate in parsed.candidates {
            if let Some(content) = candidate.content {
                for part in content.parts {
                    if let Some(text) = part.text {
                        out.push_str(&text);
                    }
                }
            }
        }
        Ok(out)
    }
}

/// Validate a raw response body against the category's expected fields.
fn parse_result(model: &str, text: &str, spec: &CategorySpec) -> Result<FieldMap, ExtractError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ExtractError::EmptyResponse {
            model: model.to_string(),
        });
    }
    let value: Value = serde_json::from_str(trimmed).map_err(|e| ExtractError::Parse {
        model: model.to_string(),
        detail: e.to_string(),
    })?;
    let Some(object) = value.as_object() else {
        return Err(ExtractError::Parse {
            model: model.to_string(),
            detail: "response is not a JSON object".to_string(),
        });
    };

    let mut fields = FieldMap::new();
    for name in spec.fields {
        match object.get(*name) {
            Some(Value::String(s)) if !s.trim().is_empty() => {
                fields.insert((*name).to_string(), s.trim().to_string());
            }
            Some(Value::Number(n)) => {
                fields.insert((*name).to_string(), n.to_string());
            }
            _ => {}
        }
    }
    if fields.is_empty() {
        return Err(ExtractError::Parse {
            model: model.to_string(),
            detail: "no expected fields in response".to_string(),
        });
    }
    Ok(fields)
}

/// The extraction engine: a backend plus a model priority list and retry
/// policy.
pub struct Extractor<B> {
    backend: B,
    models: Vec<String>,
    policy: RetryPolicy,
}

impl<B: GenerateBackend> Extractor<B> {
    /// An empty model list falls back to [`DEFAULT_MODEL_PRIORITY`].
    pub fn new(backend: B, models: Vec<String>, policy: RetryPolicy) -> Self {
        let models = if models.is_empty() {
            DEFAULT_MODEL_PRIORITY.map(String::from).to_vec()
        } else {
            models
        };
        Self {
            backend,
            models,
            policy,
        }
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Run one extraction call to completion: Done with the parsed field
    /// map, or Failed with the last captured error.
    pub async fn extract(
        &self,
        category: DocCategory,
        payload: DocumentPayload,
    ) -> Result<FieldMap, ExtractError> {
        let spec = spec_for(category);
        let request = GenerateRequest {
            payload,
            instruction: spec.instruction.clone(),
            response_schema: spec.response_schema.clone(),
            web_lookup: spec.web_lookup,
        };

        let mut last_error: Option<ExtractError> = None;

        for (index, model) in self.models.iter().enumerate() {
            if index > 0 && !self.policy.model_pause.is_zero() {
                tokio::time::sleep(self.policy.model_pause).await;
            }
            match self.try_model(model, &request, &spec).await {
                Ok(fields) => {
                    info!("[extract] {} succeeded with {model}", category.slug());
                    return Ok(fields);
                }
                Err(err) => {
                    warn!("[extract] {model} gave up: {err}");
                    last_error = Some(err);
                }
            }
        }

        Err(last_error.unwrap_or(ExtractError::Exhausted))
    }

    /// All attempts against one model. Transient failures retry with linear
    /// backoff up to the policy bound; anything else is final for this model.
    async fn try_model(
        &self,
        model: &str,
        request: &GenerateRequest,
        spec: &CategorySpec,
    ) -> Result<FieldMap, ExtractError> {
        let attempts = self.policy.attempts_per_model.max(1);
        let mut attempt = 1;
        loop {
            debug!("[extract] attempting model {model} (attempt {attempt}/{attempts})");
            let outcome = self
                .backend
                .generate(model, request)
                .await
                .and_then(|text| parse_result(model, &text, spec));
            match outcome {
                Ok(fields) => return Ok(fields),
                Err(err) if err.is_transient() && attempt < attempts => {
                    let delay = self.policy.backoff_for(attempt);
                    warn!(
                        "[extract] {model} transient failure (attempt {attempt}/{attempts}), \
                         backing off {}s: {err}",
                        delay.as_secs()
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
