//! Synthesis request data model.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Lowest speed multiplier accepted by the speech API.
pub const SPEED_MIN: f64 = 0.25;
/// Highest speed multiplier accepted by the speech API.
pub const SPEED_MAX: f64 = 4.0;
/// Speed used when a caller does not pick one.
pub const SPEED_DEFAULT: f64 = 1.0;

/// Speech model preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Model {
    /// Optimized for latency
    #[default]
    #[serde(rename = "tts-1")]
    Standard,
    /// Optimized for quality
    #[serde(rename = "tts-1-hd")]
    HighDefinition,
}

impl Model {
    pub const ALL: [Model; 2] = [Model::Standard, Model::HighDefinition];

    pub fn as_str(&self) -> &'static str {
        match self {
            Model::Standard => "tts-1",
            Model::HighDefinition => "tts-1-hd",
        }
    }
}

/// One of the six built-in voices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    Alloy,
    Echo,
    Fable,
    #[default]
    Onyx,
    Nova,
    Shimmer,
}

impl Voice {
    pub const ALL: [Voice; 6] = [Voice::Alloy, Voice::Echo, Voice::Fable, Voice::Onyx, Voice::Nova, Voice::Shimmer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Voice::Alloy => "alloy",
            Voice::Echo => "echo",
            Voice::Fable => "fable",
            Voice::Onyx => "onyx",
            Voice::Nova => "nova",
            Voice::Shimmer => "shimmer",
        }
    }
}

/// Audio codec requested from the speech API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Mp3,
    Opus,
    Aac,
    Flac,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [OutputFormat::Mp3, OutputFormat::Opus, OutputFormat::Aac, OutputFormat::Flac];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Mp3 => "mp3",
            OutputFormat::Opus => "opus",
            OutputFormat::Aac => "aac",
            OutputFormat::Flac => "flac",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(Model, Voice, OutputFormat);

/// Deserialize an optional output format where the empty string means "let the API decide".
pub fn deserialize_optional_format<'de, D>(deserializer: D) -> Result<Option<OutputFormat>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(value) => OutputFormat::deserialize(serde::de::value::StrDeserializer::<D::Error>::new(value)).map(Some),
    }
}

/// A single text-to-speech request. Constructed per call, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRequest {
    pub text: String,
    pub model: Model,
    pub voice: Voice,
    /// `None` leaves the codec to the remote service (mp3).
    pub output_format: Option<OutputFormat>,
    pub speed: f64,
}

impl SynthesisRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: Model::default(),
            voice: Voice::default(),
            output_format: None,
            speed: SPEED_DEFAULT,
        }
    }

    /// Whether `speed` lies in the range the API accepts.
    pub fn speed_in_range(&self) -> bool {
        (SPEED_MIN..=SPEED_MAX).contains(&self.speed)
    }
}

/// API credential for the speech service.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Pick the per-request key when present, otherwise the configured default.
    /// Empty strings count as absent.
    pub fn resolve(explicit: &str, fallback: Option<&str>) -> Option<Self> {
        if !explicit.is_empty() {
            return Some(Self(explicit.to_string()));
        }
        fallback.filter(|key| !key.is_empty()).map(|key| Self(key.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}
