//! Sequential playback of script lines.
//!
//! Playing "from here" walks the remaining lines in order, speaking each
//! non-empty one through the gateway and advancing when the utterance
//! finishes. A [`StopSignal`] takes effect at the next line boundary —
//! an in-flight `play` call always runs to completion, because the
//! worker's `play` command is synchronous and uninterruptible.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use voxscript_script::ScriptFileLine;

use crate::error::TtsError;
use crate::gateway::TtsGateway;

/// One playable line: text plus its voice settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackCue {
    pub text: String,
    pub voice: String,
    pub rate: u32,
}

impl PlaybackCue {
    pub fn new(text: impl Into<String>, voice: impl Into<String>, rate: u32) -> Self {
        Self {
            text: text.into(),
            voice: voice.into(),
            rate,
        }
    }
}

impl From<&ScriptFileLine> for PlaybackCue {
    fn from(line: &ScriptFileLine) -> Self {
        Self::new(&line.text, &line.voice.id, line.voice.rate)
    }
}

/// Cloneable stop flag shared between the playback chain and whoever
/// wants to interrupt it.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop at the next chain boundary.
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// How a playback chain ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// Every non-empty cue was spoken.
    Completed,
    /// The stop signal fired between lines.
    Stopped,
}

/// Speak `cues` in order, skipping empty lines, honoring `stop` between
/// lines. Gateway errors propagate with the current line unplayed.
pub async fn play_chain(
    gateway: &TtsGateway,
    cues: impl IntoIterator<Item = PlaybackCue>,
    stop: &StopSignal,
) -> Result<PlaybackOutcome, TtsError> {
    for cue in cues {
        if stop.is_stopped() {
            tracing::debug!("playback stopped at chain boundary");
            return Ok(PlaybackOutcome::Stopped);
        }
        let text = cue.text.trim();
        if text.is_empty() {
            continue;
        }
        gateway.play(text, &cue.voice, cue.rate).await?;
    }
    Ok(PlaybackOutcome::Completed)
}
