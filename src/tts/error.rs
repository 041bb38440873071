//! Error kinds surfaced by the synthesis handler.

use thiserror::Error;

/// Shown when no API key was entered and none is configured.
pub const MISSING_CREDENTIAL_MESSAGE: &str = "OpenAI API Key is not provided. Please enter a valid API key.";

/// Shown for every remote failure. The underlying cause only goes to the log.
pub const SYNTHESIS_FAILED_MESSAGE: &str = "生成语音时出现错误，请检查您的 API 密钥后重试。";

/// Failure returned to the caller of [`crate::tts::Synthesizer::synthesize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SynthesisError {
    /// No credential was available; no network call was made.
    #[error("{}", MISSING_CREDENTIAL_MESSAGE)]
    Configuration,
    /// The remote call or the artifact write failed.
    #[error("{}", SYNTHESIS_FAILED_MESSAGE)]
    Synthesis,
}

impl SynthesisError {
    /// Stable machine-readable tag.
    pub fn kind(&self) -> &'static str {
        match self {
            SynthesisError::Configuration => "configuration",
            SynthesisError::Synthesis => "synthesis",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            SynthesisError::Configuration => MISSING_CREDENTIAL_MESSAGE,
            SynthesisError::Synthesis => SYNTHESIS_FAILED_MESSAGE,
        }
    }
}

/// Failure of the remote speech backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("speech request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("speech API returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// Failure while persisting the returned audio.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to write audio file: {0}")]
    Io(#[from] std::io::Error),
    #[error("audio writer task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
