//! The speech engine capability.
//!
//! The worker talks to exactly one synthesis backend through this trait.
//! Implementations are synchronous — `speak` blocks until the utterance
//! finishes, which is what gives the protocol its one-request-at-a-time
//! pacing.

use std::path::Path;

use crate::error::EngineError;
use crate::protocol::WorkerVoice;

/// An opaque synthesis backend.
pub trait SpeechEngine {
    /// Identifier of the underlying driver (e.g. `"espeak-ng"`).
    fn driver(&self) -> String;

    /// The voices the backend currently offers, in its own order.
    fn voices(&mut self) -> Result<Vec<WorkerVoice>, EngineError>;

    /// Speak `text` with the given voice and rate, blocking until done.
    fn speak(&mut self, text: &str, voice: &str, rate: u32) -> Result<(), EngineError>;

    /// Render `text` to an audio file at `path` instead of the speakers.
    fn render_to_file(
        &mut self,
        text: &str,
        voice: &str,
        rate: u32,
        path: &Path,
    ) -> Result<(), EngineError>;
}

/// Scripted stand-in engine for interpreter and archive tests.
#[cfg(test)]
pub(crate) struct FakeEngine {
    pub voices: Vec<WorkerVoice>,
    pub spoken: Vec<(String, String, u32)>,
    pub rendered: Vec<(String, String, u32)>,
    /// When set, any dispatch mentioning this text fails.
    pub fail_on: Option<String>,
}

#[cfg(test)]
impl FakeEngine {
    pub fn new() -> Self {
        Self {
            voices: vec![
                WorkerVoice {
                    id: "en".into(),
                    name: "English".into(),
                },
                WorkerVoice {
                    id: "de".into(),
                    name: "German".into(),
                },
            ],
            spoken: Vec::new(),
            rendered: Vec::new(),
            fail_on: None,
        }
    }

    fn check(&self, text: &str) -> Result<(), EngineError> {
        match &self.fail_on {
            Some(trigger) if text.contains(trigger.as_str()) => Err(EngineError::Unreadable(
                format!("engine choked on {text:?}"),
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
impl SpeechEngine for FakeEngine {
    fn driver(&self) -> String {
        "fake".into()
    }

    fn voices(&mut self) -> Result<Vec<WorkerVoice>, EngineError> {
        Ok(self.voices.clone())
    }

    fn speak(&mut self, text: &str, voice: &str, rate: u32) -> Result<(), EngineError> {
        self.check(text)?;
        self.spoken.push((text.into(), voice.into(), rate));
        Ok(())
    }

    fn render_to_file(
        &mut self,
        text: &str,
        voice: &str,
        rate: u32,
        path: &Path,
    ) -> Result<(), EngineError> {
        self.check(text)?;
        std::fs::write(path, format!("audio:{voice}:{rate}:{text}"))?;
        self.rendered.push((text.into(), voice.into(), rate));
        Ok(())
    }
}
