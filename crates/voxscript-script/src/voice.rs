//! Voices and engine voice metadata.
//!
//! A [`Voice`] is the (engine voice id, speech rate) pair attached to one
//! script line. [`VoiceInfo`] describes a voice the synthesis engine
//! offers; its display name strips the `Microsoft <X>` vendor prefix that
//! some drivers prepend. [`ScriptMeta`] bundles the engine identity and
//! its available voices for serialization and fallback resolution.

use std::sync::LazyLock;

use regex::Regex;

/// Slowest accepted speech rate, in words per minute.
pub const MIN_RATE: u32 = 25;
/// Fastest accepted speech rate, in words per minute.
pub const MAX_RATE: u32 = 500;
/// Rate given to lines that never had one chosen.
pub const DEFAULT_RATE: u32 = 200;

static MS_VENDOR_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Microsoft\s+(\S+)").expect("static vendor pattern"));

/// The voice used for one line of a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    id: String,
    rate: u32,
}

impl Voice {
    /// Create a voice. Rates outside [`MIN_RATE`]..=[`MAX_RATE`] clamp to
    /// the nearest bound.
    pub fn new(id: impl Into<String>, rate: u32) -> Self {
        Self {
            id: id.into(),
            rate: rate.clamp(MIN_RATE, MAX_RATE),
        }
    }

    /// The first voice the engine offers, at [`DEFAULT_RATE`].
    pub fn first_available(meta: &ScriptMeta) -> Self {
        Self::new(meta.first_voice_id().unwrap_or_default(), DEFAULT_RATE)
    }

    /// The engine voice id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Speech rate in words per minute.
    pub fn rate(&self) -> u32 {
        self.rate
    }

    /// A new detached voice copying any field not overridden.
    pub fn clone_with(&self, id: Option<&str>, rate: Option<u32>) -> Self {
        Self::new(id.unwrap_or(&self.id), rate.unwrap_or(self.rate))
    }

    pub(crate) fn set_id(&mut self, id: impl Into<String>) -> String {
        std::mem::replace(&mut self.id, id.into())
    }

    pub(crate) fn set_rate(&mut self, rate: u32) -> u32 {
        std::mem::replace(&mut self.rate, rate.clamp(MIN_RATE, MAX_RATE))
    }
}

/// One voice the synthesis engine makes available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceInfo {
    /// Opaque engine voice id.
    pub id: String,
    /// Display name, with the known vendor prefix stripped.
    pub name: String,
}

impl VoiceInfo {
    /// Build voice metadata, reducing `"Microsoft <X> ..."` names to `"<X>"`.
    pub fn new(id: impl Into<String>, name: &str) -> Self {
        let name = match MS_VENDOR_NAME.captures(name) {
            Some(captures) => captures[1].to_string(),
            None => name.to_string(),
        };
        Self { id: id.into(), name }
    }
}

/// Engine identity and available voices, used for script serialization
/// and for resolving stored voice ids on load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptMeta {
    /// Version of the software that produced the script.
    pub version: String,
    /// Opaque synthesis-backend identifier.
    pub driver: String,
    /// Voices the backend offers, in the order it lists them.
    pub voices: Vec<VoiceInfo>,
}

impl ScriptMeta {
    pub fn new(
        version: impl Into<String>,
        driver: impl Into<String>,
        voices: Vec<VoiceInfo>,
    ) -> Self {
        Self {
            version: version.into(),
            driver: driver.into(),
            voices,
        }
    }

    /// Whether `id` names a voice the engine currently offers.
    pub fn has_voice(&self, id: &str) -> bool {
        self.voices.iter().any(|voice| voice.id == id)
    }

    /// The id of the first listed voice, if any.
    pub fn first_voice_id(&self) -> Option<&str> {
        self.voices.first().map(|voice| voice.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> ScriptMeta {
        ScriptMeta::new(
            "0.1.0",
            "espeak-ng",
            vec![
                VoiceInfo::new("en", "English"),
                VoiceInfo::new("de", "German"),
            ],
        )
    }

    #[test]
    fn rate_clamps_to_bounds() {
        assert_eq!(Voice::new("en", 10).rate(), MIN_RATE);
        assert_eq!(Voice::new("en", 9000).rate(), MAX_RATE);
        assert_eq!(Voice::new("en", 180).rate(), 180);
    }

    #[test]
    fn clone_with_overrides_only_given_fields() {
        let voice = Voice::new("en", 180);
        let copy = voice.clone_with(None, Some(300));
        assert_eq!(copy.id(), "en");
        assert_eq!(copy.rate(), 300);

        let copy = voice.clone_with(Some("de"), None);
        assert_eq!(copy.id(), "de");
        assert_eq!(copy.rate(), 180);
    }

    #[test]
    fn first_available_uses_first_listed_voice_at_default_rate() {
        let voice = Voice::first_available(&meta());
        assert_eq!(voice.id(), "en");
        assert_eq!(voice.rate(), DEFAULT_RATE);
    }

    #[test]
    fn vendor_prefix_is_stripped() {
        let info = VoiceInfo::new("tts-1", "Microsoft Zira Desktop - English");
        assert_eq!(info.name, "Zira");
    }

    #[test]
    fn other_names_pass_through() {
        let info = VoiceInfo::new("en", "English (Great Britain)");
        assert_eq!(info.name, "English (Great Britain)");
    }

    #[test]
    fn has_voice_checks_listed_ids() {
        let meta = meta();
        assert!(meta.has_voice("de"));
        assert!(!meta.has_voice("fr"));
    }
}
