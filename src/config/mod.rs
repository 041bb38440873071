//! Configuration module for the text-to-speech front-end.
//!
//! Provides CLI argument parsing, `.env` loading and the voice catalogue.

#[allow(clippy::module_inception)]
mod config;
mod voices;

pub use config::AppConfig;
