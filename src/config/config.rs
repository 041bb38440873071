//! Application configuration and CLI argument parsing.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{ArgAction, Parser};
use tracing::info;

use super::voices;
use crate::tts::{DEFAULT_API_BASE, SuffixPolicy};

/// Text-to-speech web front-end configuration.
///
/// Built once at start-up (after `.env` is loaded) and shared by reference.
#[derive(Parser, Clone)]
#[command(name = "openai-tts-web")]
#[command(author, version, about = "A web front-end for the OpenAI text-to-speech API", long_about = None)]
pub struct AppConfig {
    /// List the available voices and exit
    #[arg(long)]
    pub list_voices: bool,

    /// Show detailed information about a specific voice and exit
    #[arg(long)]
    pub voice_info: Option<String>,

    /// Address to listen on
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, short = 'p', env = "PORT", default_value = "7860")]
    pub port: u16,

    /// Default OpenAI API key, used when a request does not carry one
    #[arg(long, env = "OPENAI_KEY", hide_env_values = true)]
    pub openai_key: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Require a username and password to use the page ("true" enables)
    #[arg(long, env = "LOGIN", default_value = "false", num_args = 0..=1, default_missing_value = "true", action = ArgAction::Set, value_parser = parse_login_flag)]
    pub login: bool,

    /// Username for the login gate
    #[arg(long, env = "GRADIO_USERNAME", default_value = "admin")]
    pub username: String,

    /// Password for the login gate
    #[arg(long, env = "GRADIO_PASSWORD", default_value = "123", hide_env_values = true, hide_default_value = true)]
    pub password: String,

    /// Directory where generated audio files are written (never cleaned up)
    #[arg(long, short = 'o', env = "TTS_OUTPUT_DIR", default_value_os_t = default_output_dir())]
    pub output_dir: PathBuf,

    /// How audio file suffixes are chosen: 'fixed' always uses .mp3, 'format' follows the codec
    #[arg(long, value_enum, default_value = "fixed")]
    pub suffix_policy: SuffixPolicy,

    /// Timeout for the speech API call in seconds (client default when unset)
    #[arg(long)]
    pub request_timeout_secs: Option<u64>,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl AppConfig {
    /// Load `.env`, then parse configuration from command line arguments and environment.
    pub fn from_args() -> Self {
        dotenv::dotenv().ok();

        let config = Self::parse();

        // Handle voice listing commands
        if config.list_voices {
            voices::print_voices();
            std::process::exit(0);
        }

        if let Some(ref voice_name) = config.voice_info {
            match voices::print_voice_info(voice_name) {
                Ok(_) => std::process::exit(0),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }

        config
    }

    /// Socket address string to bind the server to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Username and password of the login gate, if enabled.
    pub fn gate_credentials(&self) -> Option<(&str, &str)> {
        self.login.then_some((self.username.as_str(), self.password.as_str()))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            anyhow::bail!("Host must not be empty");
        }

        if self.port == 0 {
            anyhow::bail!("Port must be greater than 0");
        }

        if !self.api_base.starts_with("http://") && !self.api_base.starts_with("https://") {
            anyhow::bail!("API base URL must start with http:// or https://: {}", self.api_base);
        }

        if self.login && (self.username.is_empty() || self.password.is_empty()) {
            anyhow::bail!("Login is enabled but username or password is empty");
        }

        if self.request_timeout_secs == Some(0) {
            anyhow::bail!("Request timeout must be at least 1 second");
        }

        if self.output_dir.exists() && !self.output_dir.is_dir() {
            anyhow::bail!("Output path is not a directory: {}", self.output_dir.display());
        }

        Ok(())
    }

    /// Log the current configuration. Secrets are never printed.
    pub fn log_config(&self) {
        info!("Configuration:");
        info!("  Listen address: {}", self.bind_addr());
        info!("  API base: {}", self.api_base);
        info!("  Default API key: {}", if self.openai_key.as_deref().is_some_and(|k| !k.is_empty()) { "set" } else { "not set" });
        info!("  Output directory: {}", self.output_dir.display());
        info!("  Suffix policy: {}", self.suffix_policy);
        match self.request_timeout_secs {
            Some(secs) => info!("  Request timeout: {}s", secs),
            None => info!("  Request timeout: client default"),
        }
        if self.login {
            info!("  Login: enabled (user '{}')", self.username);
        } else {
            info!("  Login: disabled");
        }
    }
}

/// Get the default output directory (<system temp>/openai-tts-web).
fn default_output_dir() -> PathBuf {
    std::env::temp_dir().join("openai-tts-web")
}

/// Only a case-insensitive "true" turns the login gate on.
fn parse_login_flag(s: &str) -> Result<bool, String> {
    Ok(s.trim().eq_ignore_ascii_case("true"))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each flag is given at most once; clap rejects repeated single-value arguments.
    fn parse(args: &[&str]) -> AppConfig {
        let mut argv = vec!["openai-tts-web"];
        argv.extend_from_slice(args);
        AppConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_login_flag_parsing() {
        assert!(parse_login_flag("true").unwrap());
        assert!(parse_login_flag("TRUE").unwrap());
        assert!(!parse_login_flag("yes").unwrap());
        assert!(!parse_login_flag("false").unwrap());
    }

    #[test]
    fn test_login_switch() {
        assert!(parse(&["--login"]).login);
        assert!(parse(&["--login", "True"]).login);
        assert!(!parse(&["--login", "false"]).login);
        assert!(!parse(&["--login", "yes"]).login);
        assert!(parse(&["--login", "false"]).gate_credentials().is_none());
    }

    #[test]
    fn test_gate_credentials() {
        let config = parse(&["--login", "--username", "alice", "--password", "s3cret"]);
        assert_eq!(config.gate_credentials(), Some(("alice", "s3cret")));
    }

    #[test]
    fn test_validate() {
        assert!(parse(&["--login", "false", "--api-base", DEFAULT_API_BASE]).validate().is_ok());
        assert!(parse(&["--login", "--username", "alice", "--password", "s3cret"]).validate().is_ok());
        assert!(parse(&["--request-timeout-secs", "0"]).validate().is_err());
        assert!(parse(&["--api-base", "ftp://example.com"]).validate().is_err());
        assert!(parse(&["--login", "--password", ""]).validate().is_err());
    }

    #[test]
    fn test_helpers() {
        let config = parse(&["--host", "127.0.0.1", "--port", "8080", "--request-timeout-secs", "30"]);
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.suffix_policy, SuffixPolicy::Fixed);
        assert_eq!(parse(&["--suffix-policy", "format"]).suffix_policy, SuffixPolicy::Format);
    }

    #[test]
    fn test_repeated_flag_is_rejected() {
        assert!(AppConfig::try_parse_from(["openai-tts-web", "--port", "1", "--port", "2"]).is_err());
    }
}
