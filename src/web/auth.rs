//! Optional fixed-credential login gate (HTTP Basic).

use axum::extract::{Request, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};
use tracing::debug;

use super::AppState;

/// Reject requests without the configured credentials when the gate is enabled.
pub async fn require_login(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some((username, password)) = state.config.gate_credentials() else {
        return next.run(request).await;
    };

    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| basic_matches(value, username, password));

    if authorized {
        return next.run(request).await;
    }

    debug!("Rejected unauthenticated request to {}", request.uri().path());
    (StatusCode::UNAUTHORIZED, [(header::WWW_AUTHENTICATE, HeaderValue::from_static("Basic realm=\"openai-tts-web\""))]).into_response()
}

/// Check an `Authorization: Basic ...` header value against the expected pair.
fn basic_matches(header_value: &str, username: &str, password: &str) -> bool {
    let Some(encoded) = header_value.strip_prefix("Basic ") else {
        return false;
    };
    let Ok(decoded) = STANDARD.decode(encoded.trim()) else {
        return false;
    };
    let Ok(decoded) = String::from_utf8(decoded) else {
        return false;
    };

    decoded.split_once(':').is_some_and(|(user, pass)| same_secret(user, username) & same_secret(pass, password))
}

/// Compare two secrets in time independent of where they differ.
/// Both sides are hashed first so their lengths do not matter either.
fn same_secret(given: &str, expected: &str) -> bool {
    let given = Sha256::digest(given.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    given.iter().zip(expected.iter()).fold(0u8, |diff, (a, b)| diff | (a ^ b)) == 0
}
