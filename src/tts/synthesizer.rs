//! Text-to-speech request handler backed by a remote speech API.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};

use super::artifact::ArtifactWriter;
use super::client::{OpenAiSpeechClient, SpeechBackend};
use super::error::SynthesisError;
use super::request::{Credential, SynthesisRequest};
use crate::config::AppConfig;

/// Resolves the credential, calls the speech backend once and stores the audio.
pub struct Synthesizer {
    backend: Arc<dyn SpeechBackend>,    // Remote speech API
    default_credential: Option<String>, // Key captured from configuration at start
    writer: ArtifactWriter,             // Output file writer
}

impl Synthesizer {
    /// Create a new synthesizer talking to the configured OpenAI endpoint.
    ///
    /// # Arguments
    /// * `config` - Application configuration
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = OpenAiSpeechClient::new(&config.api_base, config.request_timeout()).context("Failed to create speech API client")?;

        info!("Speech endpoint: {}", client.endpoint());
        if config.openai_key.as_deref().is_none_or(str::is_empty) {
            warn!("OPENAI_KEY is not set, every request must supply its own API key");
        }

        Ok(Self::with_backend(
            Arc::new(client),
            config.openai_key.clone(),
            ArtifactWriter::new(config.output_dir.clone(), config.suffix_policy),
        ))
    }

    /// Create a synthesizer around an arbitrary backend.
    pub fn with_backend(backend: Arc<dyn SpeechBackend>, default_credential: Option<String>, writer: ArtifactWriter) -> Self {
        Self { backend, default_credential, writer }
    }

    pub fn writer(&self) -> &ArtifactWriter {
        &self.writer
    }

    /// Synthesize `request` and return the path of the new audio file.
    ///
    /// # Arguments
    /// * `request` - Text and voice parameters, forwarded unchanged
    /// * `api_key` - Per-request key; empty means "use the configured one"
    ///
    /// # Errors
    /// [`SynthesisError::Configuration`] if no key is available (no network call is made),
    /// [`SynthesisError::Synthesis`] if the remote call or the file write fails.
    pub async fn synthesize(&self, request: &SynthesisRequest, api_key: &str) -> Result<PathBuf, SynthesisError> {
        let Some(credential) = Credential::resolve(api_key, self.default_credential.as_deref()) else {
            return Err(SynthesisError::Configuration);
        };

        debug!("Synthesizing {} chars with {}/{}", request.text.chars().count(), request.model, request.voice);

        let audio = self.backend.create_speech(&credential, request).await.map_err(|e| {
            error!("❌ Speech API error: {}", e);
            SynthesisError::Synthesis
        })?;

        let path = self.writer.write(audio, request.output_format).await.map_err(|e| {
            error!("❌ {}", e);
            SynthesisError::Synthesis
        })?;

        info!("🎵 Generated speech: {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use bytes::Bytes;
    use tempfile::TempDir;

    use super::*;
    use crate::tts::artifact::SuffixPolicy;
    use crate::tts::error::{BackendError, SYNTHESIS_FAILED_MESSAGE};
    use crate::tts::request::{Model, OutputFormat, Voice};

    /// Backend double that records every call.
    struct RecordingBackend {
        calls: AtomicUsize,
        seen: Mutex<Vec<(String, SynthesisRequest)>>,
        reply: std::result::Result<Bytes, String>,
    }

    impl RecordingBackend {
        fn ok(payload: &'static [u8]) -> Arc<Self> {
            Arc::new(Self { calls: AtomicUsize::new(0), seen: Mutex::new(Vec::new()), reply: Ok(Bytes::from_static(payload)) })
        }

        fn failing(detail: &str) -> Arc<Self> {
            Arc::new(Self { calls: AtomicUsize::new(0), seen: Mutex::new(Vec::new()), reply: Err(detail.to_string()) })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SpeechBackend for RecordingBackend {
        async fn create_speech(&self, credential: &Credential, request: &SynthesisRequest) -> std::result::Result<Bytes, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push((credential.expose().to_string(), request.clone()));
            self.reply.clone().map_err(|body| BackendError::Status { status: 429, body })
        }
    }

    /// In-memory sink for formatted log lines.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    /// Route this thread's events into a buffer until the guard drops.
    fn capture_logs() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt().with_writer(move || writer.clone()).with_ansi(false).with_max_level(tracing::Level::DEBUG).finish();
        (buffer, tracing::subscriber::set_default(subscriber))
    }

    fn synthesizer(backend: Arc<RecordingBackend>, default_key: Option<&str>, dir: &TempDir) -> Synthesizer {
        Synthesizer::with_backend(backend, default_key.map(String::from), ArtifactWriter::new(dir.path(), SuffixPolicy::Fixed))
    }

    #[tokio::test]
    async fn test_missing_credential_makes_no_call() {
        let dir = tempfile::tempdir().unwrap();
        let backend = RecordingBackend::ok(b"audio");
        let synth = synthesizer(backend.clone(), None, &dir);

        let err = synth.synthesize(&SynthesisRequest::new("hello"), "").await.unwrap_err();
        assert_eq!(err, SynthesisError::Configuration);

        let synth = synthesizer(backend.clone(), Some(""), &dir);
        let err = synth.synthesize(&SynthesisRequest::new("hello"), "").await.unwrap_err();
        assert_eq!(err, SynthesisError::Configuration);

        assert_eq!(backend.calls(), 0);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_explicit_credential_preferred() {
        let dir = tempfile::tempdir().unwrap();
        let backend = RecordingBackend::ok(b"audio");
        let synth = synthesizer(backend.clone(), Some("sk-env"), &dir);

        synth.synthesize(&SynthesisRequest::new("hello"), "sk-user").await.unwrap();
        synth.synthesize(&SynthesisRequest::new("hello"), "").await.unwrap();

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen[0].0, "sk-user");
        assert_eq!(seen[1].0, "sk-env");
    }

    #[tokio::test]
    async fn test_remote_failure_hides_detail() {
        let dir = tempfile::tempdir().unwrap();
        let backend = RecordingBackend::failing("429 quota exceeded for org-123");
        let synth = synthesizer(backend.clone(), Some("sk-env"), &dir);
        let (logs, _guard) = capture_logs();

        let err = synth.synthesize(&SynthesisRequest::new("hello"), "").await.unwrap_err();

        assert_eq!(err, SynthesisError::Synthesis);
        assert_eq!(err.user_message(), SYNTHESIS_FAILED_MESSAGE);
        assert!(!err.to_string().contains("quota"));
        assert_eq!(backend.calls(), 1);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

        let logged = logs.contents();
        assert!(logged.contains("ERROR"), "{logged}");
        assert!(logged.contains("429 quota exceeded for org-123"), "{logged}");
    }

    #[tokio::test]
    async fn test_artifact_write_failure_is_logged() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let backend = RecordingBackend::ok(b"audio");
        let synth = Synthesizer::with_backend(backend.clone(), Some("sk-env".to_string()), ArtifactWriter::new(&blocker, SuffixPolicy::Fixed));
        let (logs, _guard) = capture_logs();

        let err = synth.synthesize(&SynthesisRequest::new("hello"), "").await.unwrap_err();

        assert_eq!(err, SynthesisError::Synthesis);
        assert_eq!(backend.calls(), 1);
        let logged = logs.contents();
        assert!(logged.contains("failed to write audio file"), "{logged}");
        assert!(!err.to_string().contains("directory"));
    }

    #[tokio::test]
    async fn test_payload_round_trips_byte_exact() {
        let payload: &'static [u8] = &[0xFF, 0xFB, 0x90, 0x00, 0x00, 0x0A, 0x0D, 0x00, 0x7F];
        let dir = tempfile::tempdir().unwrap();
        let synth = synthesizer(RecordingBackend::ok(payload), Some("sk-env"), &dir);

        let path = synth.synthesize(&SynthesisRequest::new("hello"), "").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), payload);
        assert_eq!(path.extension().unwrap(), "mp3");
    }

    #[tokio::test]
    async fn test_each_call_gets_a_distinct_file() {
        let dir = tempfile::tempdir().unwrap();
        let backend = RecordingBackend::ok(b"audio");
        let synth = Arc::new(synthesizer(backend.clone(), Some("sk-env"), &dir));

        let mut paths = HashSet::new();
        for _ in 0..3 {
            paths.insert(synth.synthesize(&SynthesisRequest::new("hello"), "").await.unwrap());
        }

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let synth = synth.clone();
                tokio::spawn(async move { synth.synthesize(&SynthesisRequest::new(format!("line {i}")), "").await })
            })
            .collect();
        for handle in handles {
            paths.insert(handle.await.unwrap().unwrap());
        }

        assert_eq!(paths.len(), 11);
        assert_eq!(backend.calls(), 11);
    }

    #[tokio::test]
    async fn test_parameters_reach_backend_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let backend = RecordingBackend::ok(b"audio");
        let synth = synthesizer(backend.clone(), Some("sk-env"), &dir);
        let request = SynthesisRequest {
            text: "  keep  spacing ".to_string(),
            model: Model::HighDefinition,
            voice: Voice::Nova,
            output_format: Some(OutputFormat::Opus),
            speed: 0.25,
        };

        let path = synth.synthesize(&request, "").await.unwrap();

        assert_eq!(backend.seen.lock().unwrap()[0].1, request);
        // Suffix stays fixed regardless of codec
        assert_eq!(path.extension().unwrap(), "mp3");
    }
}
