//! The worker-side request loop.
//!
//! Reads one JSON request per line from its input, dispatches it to the
//! [`SpeechEngine`], and writes exactly one envelope per request to its
//! output. Malformed requests (bad JSON, unknown commands, missing
//! parameters) get an `error` envelope and the loop continues; an engine
//! failure gets an `error` envelope and ends the loop — the gateway sees
//! the next call come back disconnected and can respawn.

use std::io::{self, BufRead, Write};

use crate::engine::SpeechEngine;
use crate::error::EngineError;
use crate::protocol::{Envelope, WorkerMeta, WorkerRequest};

/// The text-to-speech interpreter: one engine, one request loop.
pub struct Interpreter<E> {
    version: String,
    engine: E,
}

impl<E: SpeechEngine> Interpreter<E> {
    pub fn new(version: impl Into<String>, engine: E) -> Self {
        Self {
            version: version.into(),
            engine,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Process requests until the input ends or the engine fails.
    pub fn run(&mut self, input: impl BufRead, mut output: impl Write) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;
            let (envelope, more) = self.handle(&line);
            writeline(&mut output, &envelope)?;
            if !more {
                break;
            }
        }
        tracing::info!("request loop ended");
        Ok(())
    }

    /// Answer one request line. Returns the envelope to write and whether
    /// the loop should continue.
    fn handle(&mut self, line: &str) -> (Envelope, bool) {
        let request = match decode(line) {
            Ok(request) => request,
            Err(message) => return (Envelope::Error(message), true),
        };
        let command = request.command();
        tracing::debug!(command, "dispatching");
        match self.dispatch(request) {
            Ok(value) => (Envelope::Result(value), true),
            Err(err) => {
                tracing::error!(command, error = %err, "engine failure, ending request loop");
                (Envelope::Error(err.to_string()), false)
            }
        }
    }

    fn dispatch(&mut self, request: WorkerRequest) -> Result<serde_json::Value, EngineError> {
        match request {
            WorkerRequest::Meta => {
                let meta = WorkerMeta {
                    version: self.version.clone(),
                    driver: self.engine.driver(),
                    voices: self.engine.voices()?,
                };
                serde_json::to_value(meta)
                    .map_err(|err| EngineError::Unreadable(err.to_string()))
            }
            WorkerRequest::Play { text, voice, rate } => {
                self.engine.speak(&text, &voice, rate)?;
                Ok(serde_json::Value::String("ok".into()))
            }
            WorkerRequest::Generate { path, script } => {
                crate::archive::write_archive(&path, &script, &mut self.engine)?;
                Ok(serde_json::Value::String("ok".into()))
            }
        }
    }
}

/// Decode one request line, mapping failures to the protocol's error
/// messages.
fn decode(line: &str) -> Result<WorkerRequest, String> {
    let value: serde_json::Value =
        serde_json::from_str(line).map_err(|err| format!("invalid request: {err}"))?;
    let command = value
        .get("command")
        .and_then(|command| command.as_str())
        .map(str::to_owned);

    match serde_json::from_value::<WorkerRequest>(value) {
        Ok(request) => Ok(request),
        Err(err) => Err(match command.as_deref() {
            Some("play") => "play command requires text, voice and rate parameters".into(),
            Some("generate") => "generate command requires path and script parameters".into(),
            Some("meta") => format!("invalid meta request: {err}"),
            Some(name) => format!("Unknown command {name}"),
            None => "request is missing a command".into(),
        }),
    }
}

fn writeline(output: &mut impl Write, envelope: &Envelope) -> io::Result<()> {
    let json = serde_json::to_string(envelope).map_err(io::Error::other)?;
    writeln!(output, "{json}")?;
    output.flush()
}
