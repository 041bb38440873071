//! Metadata for the six built-in OpenAI voices.

use crate::tts::Voice;

/// Descriptive metadata for a voice.
#[derive(Debug, Clone, Copy)]
pub struct VoiceProfile {
    pub voice: Voice,
    pub character: &'static str,
}

/// All voices, sorted by name for binary search.
const VOICES: &[(&str, VoiceProfile)] = &[
    ("alloy", VoiceProfile { voice: Voice::Alloy, character: "neutral, balanced" }),
    ("echo", VoiceProfile { voice: Voice::Echo, character: "male, calm" }),
    ("fable", VoiceProfile { voice: Voice::Fable, character: "British accent, expressive" }),
    ("nova", VoiceProfile { voice: Voice::Nova, character: "female, bright" }),
    ("onyx", VoiceProfile { voice: Voice::Onyx, character: "male, deep" }),
    ("shimmer", VoiceProfile { voice: Voice::Shimmer, character: "female, soft" }),
];

/// Get voice metadata by name.
pub fn get_voice(name: &str) -> Option<&'static VoiceProfile> {
    VOICES.binary_search_by_key(&name, |(n, _)| n).ok().map(|idx| &VOICES[idx].1)
}

/// Print all available voices.
pub fn print_voices() {
    println!("═══════════════════════════════════════════════");
    println!("  OpenAI TTS - {} Voices", VOICES.len());
    println!("═══════════════════════════════════════════════");
    println!("{:<10} CHARACTER", "VOICE");
    println!("{}", "─".repeat(47));

    for (name, profile) in VOICES {
        println!("{:<10} {}", name, profile.character);
    }

    println!();
    println!("Default: {}", Voice::default());
    println!("Models: tts-1 (fast), tts-1-hd (quality)");
}

/// Print detailed information about a specific voice.
pub fn print_voice_info(name: &str) -> anyhow::Result<()> {
    let profile = get_voice(name).ok_or_else(|| anyhow::anyhow!("Voice '{}' not found. Run with --list-voices to see available voices", name))?;

    println!();
    println!("Voice: {}", profile.voice);
    println!("{}", "─".repeat(40));
    println!("Character:     {}", profile.character);
    println!("Formats:       mp3, opus, aac, flac");
    println!("Speed range:   0.25 - 4.0");
    println!();

    Ok(())
}
