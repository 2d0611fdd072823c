//! Structured generation client.
//!
//! Calls an OpenAI-compatible chat completions endpoint with a JSON schema
//! response format and returns the decoded JSON object. One client is built
//! at startup and shared by every handler through [`crate::context::AppContext`].

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::config::GenerationConfig;
use crate::observability::metrics;

/// Errors from the structured generation service.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("API key not set (expected in ${var})")]
    MissingApiKey { var: String },

    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("generation service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("generation timed out after {secs} seconds")]
    Timeout { secs: u64 },

    #[error("completion contained no content")]
    EmptyCompletion,

    #[error("model refused: {0}")]
    Refused(String),

    #[error("invalid JSON in completion: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("output does not match schema '{schema}': {reason}")]
    Schema { schema: &'static str, reason: String },
}

impl GenerationError {
    pub fn schema(schema: &'static str, reason: impl Into<String>) -> Self {
        Self::Schema {
            schema,
            reason: reason.into(),
        }
    }
}

/// Schema the output must conform to.
#[derive(Debug, Clone)]
pub struct OutputSchema {
    pub name: &'static str,
    pub schema: Value,
}

/// Sampling parameters shared by every generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self::from(&GenerationConfig::default())
    }
}

impl From<&GenerationConfig> for GenerationSettings {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// One structured generation call.
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    pub settings: GenerationSettings,
    pub system: String,
    pub prompt: String,
    pub schema: OutputSchema,
}

/// Text generation constrained to a declared schema.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Run the request and return the decoded JSON output. No retries.
    async fn generate(&self, request: StructuredRequest) -> Result<Value, GenerationError>;
}

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
    refusal: Option<String>,
}

/// Client for OpenAI-compatible chat completion APIs.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    api_key_env: String,
    timeout: Duration,
}

impl OpenAiClient {
    /// Build a client from config, reading the key from the configured
    /// environment variable.
    pub fn from_env(config: &GenerationConfig) -> Result<Self, GenerationError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            tracing::warn!(
                var = %config.api_key_env,
                "Generation API key not set; AI routes will fail until it is provided"
            );
        }
        Self::new(config, api_key)
    }

    pub fn new(config: &GenerationConfig, api_key: Option<String>) -> Result<Self, GenerationError> {
        completions_endpoint(&config.base_url)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self::with_http(config, http, api_key))
    }

    /// Build around an existing HTTP client. The base URL is checked on
    /// each call instead of here.
    pub fn with_http(config: &GenerationConfig, http: reqwest::Client, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: config.base_url.clone(),
            api_key,
            api_key_env: config.api_key_env.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    pub fn endpoint(&self) -> Result<Url, GenerationError> {
        Ok(completions_endpoint(&self.base_url)?)
    }

    fn request_body(request: &StructuredRequest) -> Value {
        json!({
            "model": request.settings.model,
            "temperature": request.settings.temperature,
            "max_tokens": request.settings.max_tokens,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.prompt },
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": request.schema.name,
                    "strict": true,
                    "schema": request.schema.schema,
                },
            },
        })
    }

    async fn call(&self, request: &StructuredRequest) -> Result<Value, GenerationError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| GenerationError::MissingApiKey {
            var: self.api_key_env.clone(),
        })?;

        tracing::debug!(
            schema = request.schema.name,
            model = %request.settings.model,
            prompt_len = request.system.len(),
            "Requesting structured generation"
        );

        let response = self
            .http
            .post(self.endpoint()?)
            .timeout(self.timeout)
            .bearer_auth(api_key)
            .json(&Self::request_body(request))
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletion = response.json().await.map_err(|e| self.classify(e))?;
        let message = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or(GenerationError::EmptyCompletion)?;

        if let Some(refusal) = message.refusal {
            return Err(GenerationError::Refused(refusal));
        }
        let content = message.content.ok_or(GenerationError::EmptyCompletion)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn classify(&self, error: reqwest::Error) -> GenerationError {
        if error.is_timeout() {
            GenerationError::Timeout {
                secs: self.timeout.as_secs(),
            }
        } else {
            GenerationError::Http(error)
        }
    }
}

#[async_trait]
impl GenerationClient for OpenAiClient {
    async fn generate(&self, request: StructuredRequest) -> Result<Value, GenerationError> {
        let result = self.call(&request).await;
        let outcome = match &result {
            Ok(_) => "ok",
            Err(_) => "error",
        };
        metrics::record_generation(request.schema.name, outcome);
        if let Err(e) = &result {
            tracing::warn!(schema = request.schema.name, error = %e, "Structured generation failed");
        }
        result
    }
}

fn completions_endpoint(base_url: &str) -> Result<Url, url::ParseError> {
    let mut base = Url::parse(base_url)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("chat/completions")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> StructuredRequest {
        StructuredRequest {
            settings: GenerationSettings::default(),
            system: "system prompt".into(),
            prompt: "Start the game".into(),
            schema: OutputSchema {
                name: "test_output",
                schema: json!({ "type": "object" }),
            },
        }
    }

    #[test]
    fn test_endpoint_joins_with_or_without_trailing_slash() {
        assert_eq!(
            completions_endpoint("https://api.openai.com/v1/").unwrap().as_str(),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            completions_endpoint("http://localhost:8080/v1").unwrap().as_str(),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let body = OpenAiClient::request_body(&request());

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["max_tokens"], 4000);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Start the game");
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(body["response_format"]["json_schema"]["name"], "test_output");
        assert_eq!(body["response_format"]["json_schema"]["strict"], true);
    }

    #[test]
    fn test_invalid_base_url_rejected_at_construction() {
        let config = GenerationConfig {
            base_url: "not a url".into(),
            ..GenerationConfig::default()
        };
        assert!(matches!(
            OpenAiClient::new(&config, Some("key".into())),
            Err(GenerationError::Endpoint(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_network() {
        let client = OpenAiClient::new(&GenerationConfig::default(), None).unwrap();
        let err = client.generate(request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::MissingApiKey { var } if var == "OPENAI_API_KEY"));
    }
}
