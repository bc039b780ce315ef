//! The persisted script shape and its codec.
//!
//! Scripts are stored as a single JSON document:
//!
//! ```json
//! {
//!   "version": "0.1.0",
//!   "driver": "espeak-ng",
//!   "lines": [
//!     { "text": "Hello", "voice": { "id": "en", "rate": 200 } }
//!   ]
//! }
//! ```
//!
//! `version` and `driver` travel for informational/compatibility purposes
//! only: a mismatch on load is noted in the logs and otherwise ignored.
//! A stored voice id the engine no longer offers falls back to the first
//! available voice; the stored rate is kept.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ScriptError;
use crate::script::{Line, ScriptDocument};
use crate::voice::{ScriptMeta, Voice};

/// The serialized document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptFile {
    pub version: String,
    pub driver: String,
    pub lines: Vec<ScriptFileLine>,
}

/// One serialized line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptFileLine {
    pub text: String,
    pub voice: ScriptFileVoice,
}

/// One serialized voice setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptFileVoice {
    pub id: String,
    pub rate: u32,
}

/// Convert a document to its persisted shape. Pure; the document is not
/// touched.
pub fn to_file(doc: &ScriptDocument) -> ScriptFile {
    let lines = doc
        .iter()
        .map(|id| {
            let voice = doc.voice(id).expect("iterated line exists");
            ScriptFileLine {
                text: doc.text(id).expect("iterated line exists").to_string(),
                voice: ScriptFileVoice {
                    id: voice.id().to_string(),
                    rate: voice.rate(),
                },
            }
        })
        .collect();
    ScriptFile {
        version: doc.meta().version.clone(),
        driver: doc.meta().driver.clone(),
        lines,
    }
}

/// Reconstruct a document from its persisted shape under the current
/// engine metadata.
pub fn from_file(file: &ScriptFile, meta: ScriptMeta) -> ScriptDocument {
    if file.version != meta.version {
        tracing::debug!(
            stored = %file.version,
            current = %meta.version,
            "script version differs from current build",
        );
    }
    if file.driver != meta.driver {
        tracing::debug!(
            stored = %file.driver,
            current = %meta.driver,
            "script driver differs from current engine",
        );
    }

    let mut doc = ScriptDocument::empty(meta);
    for stored in &file.lines {
        let voice = resolve_voice(&stored.voice, doc.meta());
        let id = doc.adopt(Line::new(stored.text.clone(), voice));
        doc.add(id, None, None)
            .expect("freshly adopted line appends cleanly");
    }
    doc
}

/// A stored voice id the engine no longer offers falls back to the first
/// available voice id, keeping the stored rate.
fn resolve_voice(stored: &ScriptFileVoice, meta: &ScriptMeta) -> Voice {
    if meta.has_voice(&stored.id) {
        Voice::new(stored.id.clone(), stored.rate)
    } else {
        tracing::debug!(stored = %stored.id, "stored voice not offered; using first available");
        Voice::new(meta.first_voice_id().unwrap_or_default(), stored.rate)
    }
}

/// Write a document to `path` as indented JSON.
pub fn save(path: &Path, doc: &ScriptDocument) -> Result<(), ScriptError> {
    let file = to_file(doc);
    let json = serde_json::to_string_pretty(&file)?;
    fs::write(path, json)?;
    Ok(())
}

/// Read a document from `path` under the current engine metadata.
pub fn load(path: &Path, meta: ScriptMeta) -> Result<ScriptDocument, ScriptError> {
    let json = fs::read_to_string(path)?;
    let file: ScriptFile = serde_json::from_str(&json)?;
    Ok(from_file(&file, meta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voice::VoiceInfo;

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

    fn tuples(doc: &ScriptDocument) -> Vec<(String, String, u32)> {
        doc.iter()
            .map(|id| {
                let voice = doc.voice(id).unwrap();
                (
                    doc.text(id).unwrap().to_string(),
                    voice.id().to_string(),
                    voice.rate(),
                )
            })
            .collect()
    }

    #[test]
    fn roundtrip_preserves_ordered_tuples() {
        let mut doc = ScriptDocument::new(meta());
        let head = doc.head().unwrap();
        doc.set_text(head, "Hello").unwrap();
        let second = doc.clone_line(head, Some("World"), Some(Voice::new("de", 120))).unwrap();
        doc.add(second, None, None).unwrap();

        let restored = from_file(&to_file(&doc), meta());
        assert_eq!(tuples(&doc), tuples(&restored));
    }

    #[test]
    fn empty_text_lines_survive() {
        let mut doc = ScriptDocument::new(meta());
        let head = doc.head().unwrap();
        let blank = doc.clone_line(head, Some(""), None).unwrap();
        doc.add(blank, None, None).unwrap();

        let restored = from_file(&to_file(&doc), meta());
        assert_eq!(restored.len(), 2);
        assert_eq!(tuples(&doc), tuples(&restored));
    }

    #[test]
    fn version_and_driver_mismatch_is_tolerated() {
        let file = ScriptFile {
            version: "0.0.9".into(),
            driver: "some.other.Driver".into(),
            lines: vec![ScriptFileLine {
                text: "kept".into(),
                voice: ScriptFileVoice {
                    id: "en".into(),
                    rate: 200,
                },
            }],
        };
        let doc = from_file(&file, meta());
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn unknown_voice_falls_back_keeping_rate() {
        let file = ScriptFile {
            version: "0.1.0".into(),
            driver: "espeak-ng".into(),
            lines: vec![ScriptFileLine {
                text: "line".into(),
                voice: ScriptFileVoice {
                    id: "gone".into(),
                    rate: 140,
                },
            }],
        };
        let doc = from_file(&file, meta());
        let id = doc.head().unwrap();
        assert_eq!(doc.voice(id).unwrap().id(), "en");
        assert_eq!(doc.voice(id).unwrap().rate(), 140);
    }

    #[test]
    fn stored_rate_out_of_bounds_clamps() {
        let file = ScriptFile {
            version: "0.1.0".into(),
            driver: "espeak-ng".into(),
            lines: vec![ScriptFileLine {
                text: "line".into(),
                voice: ScriptFileVoice {
                    id: "en".into(),
                    rate: 10_000,
                },
            }],
        };
        let doc = from_file(&file, meta());
        let id = doc.head().unwrap();
        assert_eq!(doc.voice(id).unwrap().rate(), crate::voice::MAX_RATE);
    }

    #[test]
    fn json_shape_matches_persisted_format() {
        let file = ScriptFile {
            version: "0.1.0".into(),
            driver: "espeak-ng".into(),
            lines: vec![ScriptFileLine {
                text: "Hi".into(),
                voice: ScriptFileVoice {
                    id: "en".into(),
                    rate: 200,
                },
            }],
        };
        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "version": "0.1.0",
                "driver": "espeak-ng",
                "lines": [
                    { "text": "Hi", "voice": { "id": "en", "rate": 200 } }
                ]
            })
        );
    }

    #[test]
    fn save_and_load_roundtrip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.voxscript");

        let mut doc = ScriptDocument::new(meta());
        let head = doc.head().unwrap();
        doc.set_text(head, "On disk").unwrap();
        save(&path, &doc).unwrap();

        let restored = load(&path, meta()).unwrap();
        assert_eq!(tuples(&doc), tuples(&restored));
    }

    #[test]
    fn load_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.voxscript");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(load(&path, meta()), Err(ScriptError::Parse(_))));
    }
}
