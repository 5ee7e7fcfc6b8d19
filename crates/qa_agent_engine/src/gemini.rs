use std::time::Duration;

use agent_logging::{agent_debug, agent_warn, excerpt};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::GenerationError;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";

const API_KEY_HEADER: &str = "x-goog-api-key";
const ERROR_BODY_EXCERPT: usize = 400;

#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_response_bytes: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(300),
            max_response_bytes: 8 * 1024 * 1024,
        }
    }
}

/// One text-in, text-out model call.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub prompt: String,
    pub system_instruction: Option<String>,
    pub temperature: Option<f32>,
    /// When set, the model is constrained to JSON matching this schema.
    pub response_schema: Option<Value>,
}

impl ModelRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_instruction: None,
            temperature: None,
            response_schema: None,
        }
    }
}

#[async_trait::async_trait]
pub trait ModelClient: Send + Sync {
    /// Returns the model's text output, possibly empty.
    async fn generate(&self, request: &ModelRequest) -> Result<String, GenerationError>;
}

/// Client for the Gemini `generateContent` REST endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    settings: ModelSettings,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(settings: ModelSettings) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| GenerationError::Network(err.to_string()))?;
        Ok(Self { settings, client })
    }

    fn endpoint(&self) -> Result<Url, GenerationError> {
        let mut base = self.settings.base_url.trim_end_matches('/').to_string();
        base.push('/');
        Url::parse(&base)
            .and_then(|base| {
                base.join(&format!(
                    "v1beta/models/{}:generateContent",
                    self.settings.model
                ))
            })
            .map_err(|err| GenerationError::InvalidEndpoint(err.to_string()))
    }
}

#[async_trait::async_trait]
impl ModelClient for GeminiClient {
    async fn generate(&self, request: &ModelRequest) -> Result<String, GenerationError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(GenerationError::MissingApiKey)?;
        let endpoint = self.endpoint()?;
        let body = GenerateContentBody::from_request(request);

        agent_debug!(
            "generateContent model={} prompt_chars={} schema={} temperature={:?}",
            self.settings.model,
            request.prompt.len(),
            request.response_schema.is_some(),
            request.temperature
        );

        let response = self
            .client
            .post(endpoint)
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GenerationError::HttpStatus {
                status: status.as_u16(),
                message: excerpt(&text, ERROR_BODY_EXCERPT),
            });
        }

        let max_bytes = self.settings.max_response_bytes;
        if response
            .content_length()
            .is_some_and(|content_len| content_len > max_bytes)
        {
            return Err(GenerationError::TooLarge { max_bytes });
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            if bytes.len() as u64 + chunk.len() as u64 > max_bytes {
                return Err(GenerationError::TooLarge { max_bytes });
            }
            bytes.extend_from_slice(&chunk);
        }

        let envelope: GenerateContentResponse = serde_json::from_slice(&bytes)
            .map_err(|err| GenerationError::MalformedEnvelope(err.to_string()))?;
        Ok(envelope.into_text())
    }
}

fn map_reqwest_error(err: reqwest::Error) -> GenerationError {
    if err.is_timeout() {
        return GenerationError::Timeout;
    }
    GenerationError::Network(err.to_string())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<&'a Value>,
}

impl<'a> GenerateContentBody<'a> {
    fn from_request(request: &'a ModelRequest) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part {
                    text: &request.prompt,
                }],
            }],
            system_instruction: request.system_instruction.as_deref().map(|text| Content {
                role: None,
                parts: vec![Part { text }],
            }),
            generation_config: GenerationConfig {
                temperature: request.temperature,
                response_mime_type: request
                    .response_schema
                    .as_ref()
                    .map(|_| "application/json"),
                response_schema: request.response_schema.as_ref(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, thought parts excluded.
    fn into_text(self) -> String {
        if let Some(reason) = self
            .prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_deref())
        {
            agent_warn!("Prompt blocked by model: {}", reason);
        }
        let Some(candidate) = self.candidates.into_iter().next() else {
            return String::new();
        };
        if let Some(reason) = candidate.finish_reason.as_deref() {
            if reason != "STOP" {
                agent_warn!("Model finished with reason {}", reason);
            }
        }
        candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter(|part| !part.thought)
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}
