//! Error types for the worker gateway and the worker side.

use std::io;

use thiserror::Error;

/// Gateway-side errors. These are caller-facing and recoverable: after a
/// [`TtsError::Disconnected`], terminating and re-issuing the call
/// respawns the worker.
#[derive(Error, Debug)]
pub enum TtsError {
    /// The worker process could not be started.
    #[error("failed to spawn worker `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The worker produced no response line, or its pipes closed.
    #[error("TTS engine disconnected")]
    Disconnected,

    /// The worker's response was not a valid protocol envelope, or a
    /// request could not be encoded.
    #[error("worker protocol error: {0}")]
    Protocol(String),

    /// The worker reported a synthesis-engine failure. The message is the
    /// engine's, verbatim.
    #[error("{0}")]
    Engine(String),

    /// I/O failure on the worker's pipes.
    #[error("worker I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Worker-side engine failures. Reported to the gateway as an `error`
/// envelope; any of these also ends the worker's request loop.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine executable could not be run.
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The engine executable ran and failed.
    #[error("{command} exited with {status}")]
    Failed {
        command: String,
        status: std::process::ExitStatus,
    },

    /// Engine output could not be interpreted.
    #[error("unreadable engine output: {0}")]
    Unreadable(String),

    /// Filesystem failure while rendering or archiving.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Archive container failure.
    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
}
