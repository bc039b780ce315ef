//! Script document model for voxscript.
//!
//! A voiceover script is an ordered sequence of spoken lines, each with
//! its own voice and speech rate. This crate owns everything about that
//! document that doesn't touch a speech engine:
//!
//! - **Document model** ([`ScriptDocument`]): an arena of [`Line`]s with
//!   stable [`LineId`] handles, threaded into a doubly linked chain.
//! - **Action ledger** ([`ActionLedger`]): a linear undo/redo history of
//!   replayable edits, with an identity-compared save checkpoint that
//!   answers "are there unsaved changes?" precisely.
//! - **Recorded edits** ([`edits`]): the eight editor operations, each
//!   applying its forward mutation and recording the paired undo/redo
//!   replay closures.
//! - **Codec** ([`codec`]): lossless conversion to and from the
//!   persisted JSON shape, with voice fallback on load.
//! - **Bindings** ([`NodeBindings`]): the weak lookup relation from line
//!   identity to presentation nodes, maintained by the UI layer.
//!
//! Rendering and playback live in `voxscript-tts`; the two crates meet
//! only at the serialized [`codec::ScriptFile`] shape.

mod actions;
mod bindings;
pub mod codec;
pub mod edits;
mod error;
mod script;
mod voice;

pub use actions::{Action, ActionLedger, ActionOp, Checkpoint};
pub use bindings::{NodeBindings, Workspace};
pub use codec::{ScriptFile, ScriptFileLine, ScriptFileVoice};
pub use error::ScriptError;
pub use script::{Line, LineId, Lines, ScriptDocument};
pub use voice::{DEFAULT_RATE, MAX_RATE, MIN_RATE, ScriptMeta, Voice, VoiceInfo};

/// Result type for document and ledger operations.
pub type Result<T> = std::result::Result<T, ScriptError>;

#[cfg(test)]
mod tests {
    use super::*;

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

    /// End-to-end: a short editing session with saves, undo, and reload.
    #[test]
    fn editing_session_with_save_and_reload() {
        let mut ws: Workspace<u32> = Workspace::new(ScriptDocument::new(meta()));
        let mut ledger = edits::EditLedger::new();
        let head = ws.script.head().unwrap();
        ws.line_nodes.bind(head, 0);
        ws.voice_nodes.bind(head, 0);

        edits::set_text(&mut ws, &mut ledger, head, "Welcome back").unwrap();
        let second = edits::insert_below(&mut ws, &mut ledger, head).unwrap();
        ws.line_nodes.bind(second, 1);
        ws.voice_nodes.bind(second, 1);
        edits::set_text(&mut ws, &mut ledger, second, "to the show").unwrap();
        edits::set_voice_rate(&mut ws, &mut ledger, second, 160).unwrap();

        assert!(!ledger.is_clean());
        ledger.mark_clean();
        assert!(ledger.is_clean());

        // Wander away and back: still clean at the saved position.
        ledger.undo(&mut ws).unwrap();
        assert!(!ledger.is_clean());
        ledger.redo(&mut ws).unwrap();
        assert!(ledger.is_clean());

        let file = codec::to_file(&ws.script);
        let reloaded = codec::from_file(&file, meta());
        let restored: Vec<String> = reloaded
            .iter()
            .map(|id| reloaded.text(id).unwrap().to_string())
            .collect();
        assert_eq!(restored, ["Welcome back", "to the show"]);
        let tail = reloaded.tail().unwrap();
        assert_eq!(reloaded.voice(tail).unwrap().rate(), 160);
    }

    /// The documented scenario: removing the middle line of [A, B, C]
    /// returns (A, C), and re-adding it after A restores the order.
    #[test]
    fn remove_and_restore_middle_line() {
        let mut doc = ScriptDocument::new(meta());
        let a = doc.head().unwrap();
        doc.set_text(a, "A").unwrap();
        let b = doc.clone_line(a, Some("B"), None).unwrap();
        doc.add(b, Some(a), None).unwrap();
        let c = doc.clone_line(a, Some("C"), None).unwrap();
        doc.add(c, Some(b), None).unwrap();

        let (prev, next) = doc.remove(b).unwrap();
        assert_eq!((prev, next), (Some(a), Some(c)));

        doc.add(b, Some(a), None).unwrap();
        let order: Vec<String> = doc
            .iter()
            .map(|id| doc.text(id).unwrap().to_string())
            .collect();
        assert_eq!(order, ["A", "B", "C"]);
    }
}
