//! Request handlers.

use std::io::ErrorKind;
use std::path::Path as FsPath;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{error, warn};

use super::{AppState, NAMED_API, page};
use crate::tts::{Model, OutputFormat, SPEED_DEFAULT, SPEED_MAX, SPEED_MIN, SynthesisError, SynthesisRequest, Voice, deserialize_optional_format};

const EMPTY_TEXT_MESSAGE: &str = "请输入要转换为语音的文本。";
const SPEED_RANGE_MESSAGE: &str = "速度必须在 0.25 到 4.0 之间。";

/// Body accepted by both synthesis triggers.
#[derive(Debug, Deserialize)]
pub struct TtsPayload {
    pub text: String,
    #[serde(default)]
    pub model: Model,
    #[serde(default)]
    pub voice: Voice,
    #[serde(default, deserialize_with = "deserialize_optional_format")]
    pub output_format: Option<OutputFormat>,
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default)]
    pub api_key: String,
}

fn default_speed() -> f64 {
    SPEED_DEFAULT
}

impl TtsPayload {
    fn into_parts(self) -> (SynthesisRequest, String) {
        let request = SynthesisRequest {
            text: self.text,
            model: self.model,
            voice: self.voice,
            output_format: self.output_format,
            speed: self.speed,
        };
        (request, self.api_key)
    }
}

/// Tagged result returned to the page and to API callers.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum TtsResponse {
    Ok { path: String, url: String },
    Error { kind: &'static str, message: String },
}

impl TtsResponse {
    fn failure(status: StatusCode, kind: &'static str, message: &str) -> Response {
        (status, Json(TtsResponse::Error { kind, message: message.to_string() })).into_response()
    }

    fn invalid(message: &str) -> Response {
        Self::failure(StatusCode::UNPROCESSABLE_ENTITY, "invalid_request", message)
    }

    fn from_error(err: SynthesisError) -> Response {
        let status = match err {
            SynthesisError::Configuration => StatusCode::BAD_REQUEST,
            SynthesisError::Synthesis => StatusCode::BAD_GATEWAY,
        };
        Self::failure(status, err.kind(), err.user_message())
    }
}

pub async fn index() -> Html<String> {
    Html(page::render())
}

/// Describe the callable API. Only the named trigger is listed.
pub async fn api_info() -> Json<Value> {
    let endpoint = json!({
        "api_name": NAMED_API,
        "method": "POST",
        "parameters": [
            { "name": "text", "type": "string", "required": true },
            { "name": "model", "type": "string", "enum": Model::ALL.map(|m| m.as_str()), "default": Model::default().as_str() },
            { "name": "voice", "type": "string", "enum": Voice::ALL.map(|v| v.as_str()), "default": Voice::default().as_str() },
            { "name": "output_format", "type": "string", "enum": OutputFormat::ALL.map(|f| f.as_str()), "default": "" },
            { "name": "speed", "type": "number", "minimum": SPEED_MIN, "maximum": SPEED_MAX, "default": SPEED_DEFAULT },
            { "name": "api_key", "type": "string", "default": "" }
        ],
        "returns": { "path": "string", "url": "string" }
    });

    let mut endpoints = Map::new();
    endpoints.insert(page::NAMED_ROUTE.to_string(), endpoint);
    Json(json!({ "named_endpoints": endpoints }))
}

/// Shared handler behind the submit-on-enter and button triggers.
pub async fn synthesize(State(state): State<AppState>, Json(payload): Json<TtsPayload>) -> Response {
    let (request, api_key) = payload.into_parts();

    if request.text.trim().is_empty() {
        return TtsResponse::invalid(EMPTY_TEXT_MESSAGE);
    }
    if !request.speed_in_range() {
        return TtsResponse::invalid(SPEED_RANGE_MESSAGE);
    }

    let path = match state.synthesizer.synthesize(&request, &api_key).await {
        Ok(path) => path,
        Err(err) => return TtsResponse::from_error(err),
    };

    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        error!("❌ Audio file has no usable name: {}", path.display());
        return TtsResponse::from_error(SynthesisError::Synthesis);
    };

    let url = format!("/file/{}", name);
    Json(TtsResponse::Ok { path: path.display().to_string(), url }).into_response()
}

/// Serve a generated audio file by name.
pub async fn audio_file(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    if !is_safe_file_name(&name) {
        warn!("Rejected audio file name: {:?}", name);
        return StatusCode::NOT_FOUND.into_response();
    }

    let path = state.synthesizer.writer().dir().join(&name);
    match tokio::fs::read(&path).await {
        Ok(audio) => ([(header::CONTENT_TYPE, content_type_for(&path))], audio).into_response(),
        Err(e) if e.kind() == ErrorKind::NotFound => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            error!("❌ Failed to read {}: {}", path.display(), e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// A bare file name inside the output directory: no separators, no hidden files.
fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('.') && name.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

fn content_type_for(path: &FsPath) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("mp3") => "audio/mpeg",
        Some("opus") => "audio/ogg",
        Some("aac") => "audio/aac",
        Some("flac") => "audio/flac",
        _ => "application/octet-stream",
    }
}
