//! Client for the OpenAI `/audio/speech` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use super::error::BackendError;
use super::request::{Credential, Model, OutputFormat, SynthesisRequest, Voice};

/// Default base URL of the OpenAI REST API.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Something that turns a synthesis request into encoded audio.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Issue exactly one synthesis call and return the full audio payload.
    async fn create_speech(&self, credential: &Credential, request: &SynthesisRequest) -> Result<Bytes, BackendError>;
}

/// JSON body of a speech request.
#[derive(Debug, Serialize)]
struct SpeechBody<'a> {
    model: Model,
    input: &'a str,
    voice: Voice,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<OutputFormat>,
    speed: f64,
}

impl<'a> From<&'a SynthesisRequest> for SpeechBody<'a> {
    fn from(request: &'a SynthesisRequest) -> Self {
        Self {
            model: request.model,
            input: &request.text,
            voice: request.voice,
            response_format: request.output_format,
            speed: request.speed,
        }
    }
}

/// HTTP speech backend talking to OpenAI (or any compatible server).
pub struct OpenAiSpeechClient {
    http: Client,     // Shared connection pool
    endpoint: String, // Full URL of the speech endpoint
}

impl OpenAiSpeechClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `api_base` - Base URL such as `https://api.openai.com/v1`
    /// * `timeout` - Optional per-request timeout; `None` keeps the client default
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_base: &str, timeout: Option<Duration>) -> Result<Self, BackendError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self { http, endpoint: speech_endpoint(api_base) })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SpeechBackend for OpenAiSpeechClient {
    async fn create_speech(&self, credential: &Credential, request: &SynthesisRequest) -> Result<Bytes, BackendError> {
        debug!("POST {} (model={}, voice={}, speed={})", self.endpoint, request.model, request.voice, request.speed);

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(credential.expose())
            .json(&SpeechBody::from(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status { status: status.as_u16(), body });
        }

        Ok(response.bytes().await?)
    }
}

fn speech_endpoint(api_base: &str) -> String {
    format!("{}/audio/speech", api_base.trim_end_matches('/'))
}
