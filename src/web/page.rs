//! Rendering of the single HTML page.

use crate::tts::{Model, OutputFormat, SPEED_DEFAULT, SPEED_MAX, SPEED_MIN, Voice};

const TEMPLATE: &str = include_str!("index.html");

/// Route bound to submit-on-enter.
pub const NAMED_ROUTE: &str = "/api/tts";
/// Route bound to the button.
pub const BUTTON_ROUTE: &str = "/run/tts";

/// Render the page with dropdowns populated from the request enums.
pub fn render() -> String {
    TEMPLATE
        .replace("{{MODEL_OPTIONS}}", &options(Model::ALL.map(|m| m.as_str()), Model::default().as_str()))
        .replace("{{VOICE_OPTIONS}}", &options(Voice::ALL.map(|v| v.as_str()), Voice::default().as_str()))
        .replace("{{FORMAT_OPTIONS}}", &options(OutputFormat::ALL.map(|f| f.as_str()), OutputFormat::default().as_str()))
        .replace("{{SPEED_MIN}}", &SPEED_MIN.to_string())
        .replace("{{SPEED_MAX}}", &SPEED_MAX.to_string())
        .replace("{{SPEED_DEFAULT}}", &format!("{:.1}", SPEED_DEFAULT))
        .replace("{{NAMED_ROUTE}}", NAMED_ROUTE)
        .replace("{{BUTTON_ROUTE}}", BUTTON_ROUTE)
}

fn options(values: impl IntoIterator<Item = &'static str>, selected: &str) -> String {
    values
        .into_iter()
        .map(|value| {
            let marker = if value == selected { " selected" } else { "" };
            format!("<option value=\"{value}\"{marker}>{value}</option>")
        })
        .collect()
}
