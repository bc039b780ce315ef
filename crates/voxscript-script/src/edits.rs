//! Recorded document edits.
//!
//! Every structural or field edit the editor offers comes through here:
//! the forward mutation is applied to the [`Workspace`], then an
//! [`Action`] is recorded whose undo/redo closures capture the handles
//! and prior values they need to replay. Replays verify the presentation
//! bindings they depend on and fail with
//! [`ScriptError::Consistency`](crate::ScriptError) when a required node
//! has vanished — that is a bug in the presentation layer's bookkeeping,
//! not a recoverable condition.

use crate::actions::{Action, ActionLedger};
use crate::bindings::Workspace;
use crate::error::ScriptError;
use crate::script::LineId;

/// Ledger specialized to workspace mutations.
pub type EditLedger<N> = ActionLedger<Workspace<N>>;

fn require_line_node<N>(
    ws: &Workspace<N>,
    line: LineId,
    op: &'static str,
) -> Result<(), ScriptError> {
    if ws.line_nodes.contains(line) {
        Ok(())
    } else {
        Err(ScriptError::Consistency { line, op })
    }
}

fn require_voice_node<N>(
    ws: &Workspace<N>,
    line: LineId,
    op: &'static str,
) -> Result<(), ScriptError> {
    if ws.voice_nodes.contains(line) {
        Ok(())
    } else {
        Err(ScriptError::Consistency { line, op })
    }
}

/// Insert an empty line above `before`, cloned from it (same voice).
/// Returns the new line.
pub fn insert_above<N>(
    ws: &mut Workspace<N>,
    ledger: &mut EditLedger<N>,
    before: LineId,
) -> Result<LineId, ScriptError> {
    let line = ws.script.clone_line(before, Some(""), None)?;
    ws.script.add(line, None, Some(before))?;

    ledger.record(Action::new(
        Box::new(move |ws: &mut Workspace<N>| {
            require_line_node(ws, before, "undo line addition above")?;
            require_line_node(ws, line, "undo line addition above")?;
            ws.script.remove(line)?;
            Ok(())
        }),
        Box::new(move |ws: &mut Workspace<N>| {
            require_line_node(ws, before, "redo line addition above")?;
            ws.script.add(line, None, Some(before))?;
            Ok(())
        }),
    ));
    Ok(line)
}

/// Insert an empty line below `after`, cloned from it (same voice).
/// Returns the new line.
pub fn insert_below<N>(
    ws: &mut Workspace<N>,
    ledger: &mut EditLedger<N>,
    after: LineId,
) -> Result<LineId, ScriptError> {
    let line = ws.script.clone_line(after, Some(""), None)?;
    ws.script.add(line, Some(after), None)?;

    ledger.record(Action::new(
        Box::new(move |ws: &mut Workspace<N>| {
            require_line_node(ws, after, "undo line addition below")?;
            require_line_node(ws, line, "undo line addition below")?;
            ws.script.remove(line)?;
            Ok(())
        }),
        Box::new(move |ws: &mut Workspace<N>| {
            require_line_node(ws, after, "redo line addition below")?;
            ws.script.add(line, Some(after), None)?;
            Ok(())
        }),
    ));
    Ok(line)
}

/// Detach `line` from the script. Returns its former neighbors.
pub fn remove_line<N>(
    ws: &mut Workspace<N>,
    ledger: &mut EditLedger<N>,
    line: LineId,
) -> Result<(Option<LineId>, Option<LineId>), ScriptError> {
    let (prev, next) = ws.script.remove(line)?;

    ledger.record(Action::new(
        Box::new(move |ws: &mut Workspace<N>| {
            // The line goes back where it was: before its old successor,
            // or at the tail when it had none.
            if let Some(next) = next {
                require_line_node(ws, next, "undo line removal")?;
            }
            ws.script.add(line, None, next)?;
            Ok(())
        }),
        Box::new(move |ws: &mut Workspace<N>| {
            require_line_node(ws, line, "redo line removal")?;
            ws.script.remove(line)?;
            Ok(())
        }),
    ));
    Ok((prev, next))
}

/// Swap `line` with its predecessor. Returns `false` (recording nothing)
/// when `line` is already the head.
pub fn move_up<N>(
    ws: &mut Workspace<N>,
    ledger: &mut EditLedger<N>,
    line: LineId,
) -> Result<bool, ScriptError> {
    if ws.script.is_head(line) {
        return Ok(false);
    }
    let (prev, _) = ws.script.remove(line)?;
    let Some(before) = prev else {
        return Err(ScriptError::NotFound(line));
    };
    ws.script.add(line, None, Some(before))?;

    ledger.record(Action::new(
        Box::new(move |ws: &mut Workspace<N>| {
            require_line_node(ws, before, "undo line move up")?;
            require_line_node(ws, line, "undo line move up")?;
            ws.script.remove(before)?;
            ws.script.add(before, None, Some(line))?;
            Ok(())
        }),
        Box::new(move |ws: &mut Workspace<N>| {
            require_line_node(ws, before, "redo line move up")?;
            require_line_node(ws, line, "redo line move up")?;
            ws.script.remove(line)?;
            ws.script.add(line, None, Some(before))?;
            Ok(())
        }),
    ));
    Ok(true)
}

/// Swap `line` with its successor. Returns `false` (recording nothing)
/// when `line` is already the tail.
pub fn move_down<N>(
    ws: &mut Workspace<N>,
    ledger: &mut EditLedger<N>,
    line: LineId,
) -> Result<bool, ScriptError> {
    if ws.script.is_tail(line) {
        return Ok(false);
    }
    let (_, next) = ws.script.remove(line)?;
    let Some(after) = next else {
        return Err(ScriptError::NotFound(line));
    };
    ws.script.add(line, Some(after), None)?;

    ledger.record(Action::new(
        Box::new(move |ws: &mut Workspace<N>| {
            require_line_node(ws, after, "undo line move down")?;
            require_line_node(ws, line, "undo line move down")?;
            ws.script.remove(after)?;
            ws.script.add(after, Some(line), None)?;
            Ok(())
        }),
        Box::new(move |ws: &mut Workspace<N>| {
            require_line_node(ws, after, "redo line move down")?;
            require_line_node(ws, line, "redo line move down")?;
            ws.script.remove(line)?;
            ws.script.add(line, Some(after), None)?;
            Ok(())
        }),
    ));
    Ok(true)
}

/// Replace a line's text.
pub fn set_text<N>(
    ws: &mut Workspace<N>,
    ledger: &mut EditLedger<N>,
    line: LineId,
    text: &str,
) -> Result<(), ScriptError> {
    let prev = ws.script.set_text(line, text)?;
    let next = text.to_string();

    ledger.record(Action::new(
        Box::new(move |ws: &mut Workspace<N>| {
            require_line_node(ws, line, "undo line edit text")?;
            ws.script.set_text(line, prev.clone())?;
            Ok(())
        }),
        Box::new(move |ws: &mut Workspace<N>| {
            require_line_node(ws, line, "redo line edit text")?;
            ws.script.set_text(line, next.clone())?;
            Ok(())
        }),
    ));
    Ok(())
}

/// Replace a line's voice id.
pub fn set_voice_id<N>(
    ws: &mut Workspace<N>,
    ledger: &mut EditLedger<N>,
    line: LineId,
    id: &str,
) -> Result<(), ScriptError> {
    let prev = ws.script.set_voice_id(line, id)?;
    let next = id.to_string();

    ledger.record(Action::new(
        Box::new(move |ws: &mut Workspace<N>| {
            require_line_node(ws, line, "undo line edit voice id")?;
            require_voice_node(ws, line, "undo line edit voice id")?;
            ws.script.set_voice_id(line, prev.clone())?;
            Ok(())
        }),
        Box::new(move |ws: &mut Workspace<N>| {
            require_line_node(ws, line, "redo line edit voice id")?;
            require_voice_node(ws, line, "redo line edit voice id")?;
            ws.script.set_voice_id(line, next.clone())?;
            Ok(())
        }),
    ));
    Ok(())
}

/// Replace a line's speech rate.
pub fn set_voice_rate<N>(
    ws: &mut Workspace<N>,
    ledger: &mut EditLedger<N>,
    line: LineId,
    rate: u32,
) -> Result<(), ScriptError> {
    let prev = ws.script.set_voice_rate(line, rate)?;

    ledger.record(Action::new(
        Box::new(move |ws: &mut Workspace<N>| {
            require_line_node(ws, line, "undo line edit voice rate")?;
            require_voice_node(ws, line, "undo line edit voice rate")?;
            ws.script.set_voice_rate(line, prev)?;
            Ok(())
        }),
        Box::new(move |ws: &mut Workspace<N>| {
            require_line_node(ws, line, "redo line edit voice rate")?;
            require_voice_node(ws, line, "redo line edit voice rate")?;
            ws.script.set_voice_rate(line, rate)?;
            Ok(())
        }),
    ));
    Ok(())
}
