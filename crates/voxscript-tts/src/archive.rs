//! The generated performance archive.
//!
//! Rendering a script produces one zip container:
//!
//! ```text
//! performance.zip
//! ├── lines.txt     every line, "NNNN: <trimmed text>" (empty lines too)
//! ├── script.txt    only the non-empty trimmed lines, in order
//! ├── 0000.mp3      rendered audio for line 0 (non-empty lines only)
//! └── 0002.mp3      ...
//! ```
//!
//! Audio is rendered to a temporary directory first, then copied into
//! the archive, so a failed render never leaves a half-written entry.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use voxscript_script::ScriptFile;

use crate::engine::SpeechEngine;
use crate::error::EngineError;

/// Render `script` into a zip archive at `path` using `engine`.
pub fn write_archive<E: SpeechEngine>(
    path: &Path,
    script: &ScriptFile,
    engine: &mut E,
) -> Result<(), EngineError> {
    let file = File::create(path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    zip.start_file("lines.txt", options)?;
    for (n, line) in script.lines.iter().enumerate() {
        writeln!(zip, "{n:04}: {}", line.text.trim())?;
    }

    zip.start_file("script.txt", options)?;
    for line in &script.lines {
        let text = line.text.trim();
        if !text.is_empty() {
            writeln!(zip, "{text}")?;
        }
    }

    let scratch = tempfile::tempdir()?;
    for (n, line) in script.lines.iter().enumerate() {
        let text = line.text.trim();
        if text.is_empty() {
            continue;
        }
        let name = format!("{n:04}.mp3");
        let rendered = scratch.path().join(&name);
        engine.render_to_file(text, &line.voice.id, line.voice.rate, &rendered)?;

        zip.start_file(name.as_str(), options)?;
        zip.write_all(&std::fs::read(&rendered)?)?;
    }

    zip.finish()?;
    Ok(())
}
