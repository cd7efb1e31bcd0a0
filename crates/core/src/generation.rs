use crate::traits::AnswerGenerator;
use crate::GenerationError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

pub const ENDPOINT_ENV: &str = "DOCCHAT_GENERATOR_ENDPOINT";
pub const API_KEY_ENV: &str = "DOCCHAT_GENERATOR_API_KEY";

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub endpoint: Url,
    pub api_key: Option<String>,
}

impl GeneratorConfig {
    pub fn from_parts(
        endpoint: Option<&str>,
        api_key: Option<&str>,
    ) -> Result<Option<Self>, GenerationError> {
        let endpoint = match endpoint.map(str::trim).filter(|value| !value.is_empty()) {
            Some(endpoint) => Url::parse(endpoint)?,
            None => return Ok(None),
        };

        let api_key = api_key
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string);

        Ok(Some(Self { endpoint, api_key }))
    }

    pub fn from_env() -> Result<Option<Self>, GenerationError> {
        let endpoint = std::env::var(ENDPOINT_ENV).ok();
        let api_key = std::env::var(API_KEY_ENV).ok();
        Self::from_parts(endpoint.as_deref(), api_key.as_deref())
    }
}

#[derive(Debug, Clone, Serialize)]
struct GenerateRequest<'a> {
    question: &'a str,
    context: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

pub struct HttpAnswerGenerator {
    config: GeneratorConfig,
    client: Client,
}

impl HttpAnswerGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.config.endpoint
    }
}

#[async_trait]
impl AnswerGenerator for HttpAnswerGenerator {
    async fn generate(&self, context: &str, question: &str) -> Result<String, GenerationError> {
        let payload = GenerateRequest { question, context };

        let mut request = self
            .client
            .post(self.config.endpoint.clone())
            .header("content-type", "application/json")
            .json(&payload);

        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(GenerationError::BackendResponse {
                backend: self.config.endpoint.to_string(),
                details: format!("status {status}: {body}"),
            });
        }

        parse_answer(&body, self.config.endpoint.as_str())
    }
}

fn parse_answer(body: &str, backend: &str) -> Result<String, GenerationError> {
    let payload: GenerateResponse = serde_json::from_str(body)?;
    payload
        .answer
        .or(payload.text)
        .map(|answer| answer.trim().to_string())
        .filter(|answer| !answer.is_empty())
        .ok_or_else(|| GenerationError::BackendResponse {
            backend: backend.to_string(),
            details: "response has no answer text".to_string(),
        })
}
