//! espeak-ng backed speech engine.
//!
//! Shells out to the `espeak-ng` executable for everything: `--voices`
//! to enumerate voices, `-v`/`-s` to speak, `-w` to render into a file.
//! espeak-ng must be installed on the system (`apt-get install
//! espeak-ng`, `brew install espeak-ng`).

use std::path::Path;
use std::process::Command;

use voxscript_tts::{EngineError, SpeechEngine, WorkerVoice};

/// A speech engine driving the espeak-ng command-line synthesizer.
pub struct EspeakEngine {
    command: String,
}

impl EspeakEngine {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<(), EngineError> {
        let status = Command::new(&self.command)
            .args(args)
            .status()
            .map_err(|source| EngineError::Spawn {
                command: self.command.clone(),
                source,
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(EngineError::Failed {
                command: self.command.clone(),
                status,
            })
        }
    }
}

impl SpeechEngine for EspeakEngine {
    fn driver(&self) -> String {
        "espeak-ng".into()
    }

    fn voices(&mut self) -> Result<Vec<WorkerVoice>, EngineError> {
        let output = Command::new(&self.command)
            .arg("--voices")
            .output()
            .map_err(|source| EngineError::Spawn {
                command: self.command.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(EngineError::Failed {
                command: self.command.clone(),
                status: output.status,
            });
        }
        let listing = String::from_utf8(output.stdout)
            .map_err(|err| EngineError::Unreadable(err.to_string()))?;
        Ok(parse_voices(&listing))
    }

    fn speak(&mut self, text: &str, voice: &str, rate: u32) -> Result<(), EngineError> {
        tracing::debug!(voice, rate, "speaking");
        self.run(&["-v", voice, "-s", &rate.to_string(), text])
    }

    fn render_to_file(
        &mut self,
        text: &str,
        voice: &str,
        rate: u32,
        path: &Path,
    ) -> Result<(), EngineError> {
        tracing::debug!(voice, rate, path = %path.display(), "rendering");
        let path = path.to_string_lossy();
        self.run(&["-v", voice, "-s", &rate.to_string(), "-w", &path, text])
    }
}

/// Parse `espeak-ng --voices` output.
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  5  af              --/M      Afrikaans          gmw/af
/// ```
///
/// The language code is the voice id espeak accepts back through `-v`;
/// the fourth column is its display name.
fn parse_voices(listing: &str) -> Vec<WorkerVoice> {
    listing
        .lines()
        .skip(1)
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 4 {
                return None;
            }
            Some(WorkerVoice {
                id: fields[1].to_string(),
                name: fields[3].to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
Pty Language       Age/Gender VoiceName          File                 Other Languages
 5  af              --/M      Afrikaans          gmw/af
 5  de              --/M      German             gmw/de
 2  en-gb           --/M      English_(Great_Britain) gmw/en           (en 2)
";

    #[test]
    fn parses_voice_rows() {
        let voices = parse_voices(LISTING);
        assert_eq!(voices.len(), 3);
        assert_eq!(voices[0].id, "af");
        assert_eq!(voices[0].name, "Afrikaans");
        assert_eq!(voices[2].id, "en-gb");
        assert_eq!(voices[2].name, "English_(Great_Britain)");
    }

    #[test]
    fn tolerates_blank_and_short_lines() {
        let voices = parse_voices("header\n\n 5\n 5  de  --/M  German  gmw/de\n");
        assert_eq!(voices.len(), 1);
        assert_eq!(voices[0].id, "de");
    }
}
