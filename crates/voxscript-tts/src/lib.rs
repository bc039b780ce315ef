//! Speech-synthesis plumbing for voxscript.
//!
//! Everything between the script document and actual audio lives here,
//! split along the process boundary:
//!
//! **Gateway side** (the editor process):
//! - [`TtsGateway`]: owns the worker child process, single-flights all
//!   protocol traffic, exposes `meta` / `play` / `generate`.
//! - [`playback`]: the play-then-advance chain with boundary-only stop.
//!
//! **Worker side** (the spawned process):
//! - [`Interpreter`]: the stdio request loop.
//! - [`SpeechEngine`]: the opaque synthesis capability the loop drives.
//! - [`archive`]: the zip performance archive `generate` produces.
//!
//! Both sides share [`protocol`] — line-delimited JSON requests and
//! `{type, value}` response envelopes. The document model is a separate
//! crate; the two meet only at the serialized
//! [`ScriptFile`](voxscript_script::ScriptFile) shape.

pub mod archive;
mod engine;
mod error;
mod gateway;
mod interpreter;
pub mod playback;
pub mod protocol;

pub use engine::SpeechEngine;
pub use error::{EngineError, TtsError};
pub use gateway::{TtsGateway, WorkerConfig};
pub use interpreter::Interpreter;
pub use playback::{PlaybackCue, PlaybackOutcome, StopSignal, play_chain};
pub use protocol::{Envelope, WorkerMeta, WorkerRequest, WorkerVoice};

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, TtsError>;
