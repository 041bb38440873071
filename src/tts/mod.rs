//! Text-to-speech module backed by the OpenAI speech API.
//!
//! Forwards a request to the remote service and stores the returned audio
//! in a temporary file.

mod artifact;
mod client;
mod error;
mod request;
mod synthesizer;

pub use artifact::SuffixPolicy;
pub use client::DEFAULT_API_BASE;
pub use error::SynthesisError;
pub use request::{Model, OutputFormat, SPEED_DEFAULT, SPEED_MAX, SPEED_MIN, SynthesisRequest, Voice, deserialize_optional_format};
pub use synthesizer::Synthesizer;

#[cfg(test)]
pub use {artifact::ArtifactWriter, client::SpeechBackend, error::BackendError, request::Credential};
