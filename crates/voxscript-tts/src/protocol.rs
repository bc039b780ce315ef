//! The worker wire protocol.
//!
//! Requests and responses are single-line, newline-terminated JSON.
//! A request names its command and carries that command's parameters:
//!
//! ```text
//! {"command":"play","text":"Hello","voice":"en","rate":200}
//! ```
//!
//! Every response is a `{type, value}` envelope:
//!
//! ```text
//! {"type":"result","value":"ok"}
//! {"type":"error","value":"Unknown command frobnicate"}
//! ```
//!
//! The channel relies on strict request/response alternation — there is
//! no request-id correlation. If the worker ever emits more or fewer
//! lines than expected the channel desynchronizes permanently and only a
//! terminate + respawn recovers it.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use voxscript_script::{ScriptFile, ScriptMeta, VoiceInfo};

/// A worker command, decoded from the request's `command` tag.
///
/// A closed set: anything else on the wire is answered with an `error`
/// envelope naming the unknown command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum WorkerRequest {
    /// Describe the worker build and its available voices.
    Meta,
    /// Speak `text` synchronously on the worker side.
    Play {
        text: String,
        voice: String,
        rate: u32,
    },
    /// Render `script` to an archive at `path`.
    Generate { path: PathBuf, script: ScriptFile },
}

impl WorkerRequest {
    /// The wire name of this command.
    pub fn command(&self) -> &'static str {
        match self {
            WorkerRequest::Meta => "meta",
            WorkerRequest::Play { .. } => "play",
            WorkerRequest::Generate { .. } => "generate",
        }
    }
}

/// The `{type, value}` response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Envelope {
    Result(serde_json::Value),
    Error(String),
}

/// The payload of a successful `meta` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerMeta {
    pub version: String,
    pub driver: String,
    pub voices: Vec<WorkerVoice>,
}

/// One voice as the worker reports it — raw vendor name included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerVoice {
    pub id: String,
    pub name: String,
}

impl WorkerMeta {
    /// Convert to script metadata, stripping vendor prefixes from the
    /// voice display names.
    pub fn into_script_meta(self) -> ScriptMeta {
        let voices = self
            .voices
            .into_iter()
            .map(|voice| VoiceInfo::new(voice.id, &voice.name))
            .collect();
        ScriptMeta::new(self.version, self.driver, voices)
    }
}
