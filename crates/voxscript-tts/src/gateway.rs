//! The worker-process gateway.
//!
//! One [`TtsGateway`] owns one child worker process and all traffic to
//! it. The worker is spawned lazily on first use and memoized; every
//! request takes the single-flight gate (a fair tokio mutex), writes one
//! JSON line, and reads exactly one envelope line back:
//!
//! ```text
//!   caller ──▶ lock gate ──▶ write {"command":...}\n
//!                      ◀── read {"type":...,"value":...}\n ──▶ unlock
//! ```
//!
//! The gate's FIFO fairness means calls complete in the order they were
//! issued, and a pending call never interleaves its lines with another.
//! There is no request-id correlation: if the worker ever emits more or
//! fewer lines than expected the channel is permanently desynchronized,
//! and the only recovery is [`TtsGateway::terminate`] plus respawn on
//! the next call.

use std::path::Path;
use std::process::Stdio;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;

use voxscript_script::{ScriptFile, ScriptMeta};

use crate::error::TtsError;
use crate::protocol::{Envelope, WorkerMeta, WorkerRequest};

/// How to start the worker process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Executable to run.
    pub command: String,
    /// Arguments passed to it.
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            command: "voxscript-worker".into(),
            args: Vec::new(),
        }
    }
}

/// A live worker: the child and its two pipes. Stderr is inherited so
/// the worker's logs land wherever ours do.
struct Worker {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

/// Gateway to one speech-synthesis worker process.
pub struct TtsGateway {
    config: WorkerConfig,
    worker: Mutex<Option<Worker>>,
}

impl TtsGateway {
    pub fn new(config: WorkerConfig) -> Self {
        Self {
            config,
            worker: Mutex::new(None),
        }
    }

    /// Describe the worker build and its voices, vendor prefixes already
    /// stripped for display.
    pub async fn meta(&self) -> Result<ScriptMeta, TtsError> {
        let value = self.request(&WorkerRequest::Meta).await?;
        let meta: WorkerMeta = serde_json::from_value(value)
            .map_err(|err| TtsError::Protocol(format!("bad meta payload: {err}")))?;
        Ok(meta.into_script_meta())
    }

    /// Speak one line. Resolves when the worker finishes the utterance.
    pub async fn play(&self, text: &str, voice: &str, rate: u32) -> Result<(), TtsError> {
        self.request(&WorkerRequest::Play {
            text: text.into(),
            voice: voice.into(),
            rate,
        })
        .await?;
        Ok(())
    }

    /// Render a serialized script to an archive at `path`.
    pub async fn generate(&self, path: &Path, script: &ScriptFile) -> Result<(), TtsError> {
        let path = std::path::absolute(path)?;
        self.request(&WorkerRequest::Generate {
            path,
            script: script.clone(),
        })
        .await?;
        Ok(())
    }

    /// One protocol round trip under the single-flight gate.
    pub async fn request(&self, request: &WorkerRequest) -> Result<serde_json::Value, TtsError> {
        let mut slot = self.worker.lock().await;
        if slot.is_none() {
            tracing::info!(command = %self.config.command, "spawning TTS worker");
            *slot = Some(self.spawn()?);
        }
        let worker = slot.as_mut().expect("worker just ensured");
        exchange(worker, request).await
    }

    /// Stop the worker and forget it. Idempotent: terminating a gateway
    /// that never spawned (or already terminated) does nothing.
    pub async fn terminate(&self) {
        let mut slot = self.worker.lock().await;
        if let Some(mut worker) = slot.take() {
            tracing::info!("terminating TTS worker");
            if let Err(err) = worker.child.start_kill() {
                tracing::debug!(error = %err, "worker already gone");
            }
            let _ = worker.child.wait().await;
        }
    }

    fn spawn(&self) -> Result<Worker, TtsError> {
        let mut child = Command::new(&self.config.command)
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| TtsError::Spawn {
                command: self.config.command.clone(),
                source,
            })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| TtsError::Protocol("worker stdin not piped".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| TtsError::Protocol("worker stdout not piped".into()))?;
        Ok(Worker {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }
}

/// Write one request line, read one response line. The caller holds the
/// gate for the whole exchange.
async fn exchange(worker: &mut Worker, request: &WorkerRequest) -> Result<serde_json::Value, TtsError> {
    let mut line = serde_json::to_string(request)
        .map_err(|err| TtsError::Protocol(format!("unencodable request: {err}")))?;
    line.push('\n');
    worker
        .stdin
        .write_all(line.as_bytes())
        .await
        .map_err(disconnect_or_io)?;
    worker.stdin.flush().await.map_err(disconnect_or_io)?;

    let mut response = String::new();
    let read = worker
        .stdout
        .read_line(&mut response)
        .await
        .map_err(disconnect_or_io)?;
    if read == 0 {
        return Err(TtsError::Disconnected);
    }

    let envelope: Envelope = serde_json::from_str(response.trim_end())
        .map_err(|err| TtsError::Protocol(format!("bad envelope: {err}")))?;
    match envelope {
        Envelope::Result(value) => Ok(value),
        Envelope::Error(message) => Err(TtsError::Engine(message)),
    }
}

/// A closed pipe means the worker is gone, not a local I/O fault.
fn disconnect_or_io(err: std::io::Error) -> TtsError {
    match err.kind() {
        std::io::ErrorKind::BrokenPipe | std::io::ErrorKind::UnexpectedEof => {
            TtsError::Disconnected
        }
        _ => TtsError::Io(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    /// Gateway whose "worker" is a shell one-liner — enough to exercise
    /// the protocol without a real synthesis engine.
    fn sh_gateway(script: &str) -> TtsGateway {
        TtsGateway::new(WorkerConfig {
            command: "sh".into(),
            args: vec!["-c".into(), script.into()],
        })
    }

    const ECHO_OK: &str = r#"while read line; do echo '{"type":"result","value":"ok"}'; done"#;

    #[tokio::test]
    async fn result_envelope_resolves_the_call() {
        let gateway = sh_gateway(ECHO_OK);
        let value = gateway.request(&WorkerRequest::Meta).await.unwrap();
        assert_eq!(value, serde_json::json!("ok"));
        gateway.terminate().await;
    }

    #[tokio::test]
    async fn error_envelope_surfaces_the_message_verbatim() {
        let gateway =
            sh_gateway(r#"read line; echo '{"type":"error","value":"voice exploded"}'"#);
        let err = gateway.request(&WorkerRequest::Meta).await.unwrap_err();
        match err {
            TtsError::Engine(message) => assert_eq!(message, "voice exploded"),
            other => panic!("expected engine error, got {other:?}"),
        }
        gateway.terminate().await;
    }

    #[tokio::test]
    async fn silent_worker_means_disconnected() {
        let gateway = sh_gateway("read line; exit 0");
        let err = gateway.request(&WorkerRequest::Meta).await.unwrap_err();
        assert!(matches!(err, TtsError::Disconnected));

        // The channel stays dead until terminated.
        let err = gateway.request(&WorkerRequest::Meta).await.unwrap_err();
        assert!(matches!(err, TtsError::Disconnected | TtsError::Io(_)));
        gateway.terminate().await;
    }

    #[tokio::test]
    async fn garbage_response_is_a_protocol_error() {
        let gateway = sh_gateway(r#"read line; echo 'not an envelope'"#);
        let err = gateway.request(&WorkerRequest::Meta).await.unwrap_err();
        assert!(matches!(err, TtsError::Protocol(_)));
        gateway.terminate().await;
    }

    #[tokio::test]
    async fn unspawnable_worker_is_a_spawn_error() {
        let gateway = TtsGateway::new(WorkerConfig {
            command: "/nonexistent/voxscript-worker".into(),
            args: Vec::new(),
        });
        let err = gateway.request(&WorkerRequest::Meta).await.unwrap_err();
        assert!(matches!(err, TtsError::Spawn { .. }));
    }

    #[tokio::test]
    async fn terminate_is_idempotent_and_allows_respawn() {
        let gateway = sh_gateway(ECHO_OK);
        gateway.terminate().await; // never spawned: no-op

        gateway.request(&WorkerRequest::Meta).await.unwrap();
        gateway.terminate().await;
        gateway.terminate().await; // already terminated: no-op

        // Next call spawns a fresh worker.
        let value = gateway.request(&WorkerRequest::Meta).await.unwrap();
        assert_eq!(value, serde_json::json!("ok"));
        gateway.terminate().await;
    }

    #[tokio::test]
    async fn concurrent_calls_complete_in_issue_order() {
        // Each response carries a sequence number; the delay keeps the
        // first call holding the gate while the second queues behind it.
        let gateway = Arc::new(sh_gateway(
            r#"n=0; while read line; do sleep 0.3; n=$((n+1)); echo "{\"type\":\"result\",\"value\":$n}"; done"#,
        ));

        let first = {
            let gateway = gateway.clone();
            tokio::spawn(async move { gateway.request(&WorkerRequest::Meta).await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        let second = {
            let gateway = gateway.clone();
            tokio::spawn(async move { gateway.request(&WorkerRequest::Meta).await })
        };

        assert_eq!(first.await.unwrap().unwrap(), serde_json::json!(1));
        assert_eq!(second.await.unwrap().unwrap(), serde_json::json!(2));
        gateway.terminate().await;
    }

    #[tokio::test]
    async fn meta_converts_and_strips_vendor_prefix() {
        let payload = r#"{"type":"result","value":{"version":"9.9","driver":"sh","voices":[{"id":"v1","name":"Microsoft Zira Desktop"},{"id":"v2","name":"Alan"}]}}"#;
        let gateway = sh_gateway(&format!("read line; echo '{payload}'"));
        let meta = gateway.meta().await.unwrap();
        assert_eq!(meta.version, "9.9");
        assert_eq!(meta.driver, "sh");
        assert_eq!(meta.voices[0].name, "Zira");
        assert_eq!(meta.voices[1].name, "Alan");
        gateway.terminate().await;
    }

    #[tokio::test]
    async fn play_acknowledgement_resolves_to_unit() {
        let gateway = sh_gateway(ECHO_OK);
        gateway.play("Hello", "en", 200).await.unwrap();
        gateway.terminate().await;
    }
}
