//! The undo/redo action ledger.
//!
//! A linear, truncatable history of reversible edits. Each [`Action`]
//! carries an undo operation and a redo operation as boxed closures whose
//! captured state is the context bag recorded at edit time — replaying is
//! idempotent application of captured parameters, never recomputation
//! from current state.
//!
//! The ledger is generic over the mutation context `C` (for voxscript
//! that is a [`Workspace`](crate::Workspace)); ops receive `&mut C` when
//! run. `record`/`undo`/`redo` must be invoked sequentially by the owning
//! context — the ledger does no locking of its own.

use std::sync::Arc;

use crate::error::ScriptError;

/// One replayable operation over the mutation context.
pub type ActionOp<C> = Box<dyn FnMut(&mut C) -> Result<(), ScriptError> + Send>;

/// An opaque save marker. Compared by identity: two checkpoints are the
/// same only if they came from the same [`ActionLedger::mark_clean`]
/// call, never by value.
#[derive(Clone, Debug)]
pub struct Checkpoint(Arc<()>);

impl Checkpoint {
    fn new() -> Self {
        Self(Arc::new(()))
    }

    /// Identity comparison — same allocation, not equal content.
    pub fn same(&self, other: &Checkpoint) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// A reversible edit with its captured context.
pub struct Action<C> {
    undo: Option<ActionOp<C>>,
    redo: Option<ActionOp<C>>,
    mark: Option<Checkpoint>,
}

impl<C> Action<C> {
    pub fn new(undo: ActionOp<C>, redo: ActionOp<C>) -> Self {
        Self {
            undo: Some(undo),
            redo: Some(redo),
            mark: None,
        }
    }

    /// An action with either direction optionally absent; running a
    /// missing direction is a no-op.
    pub fn with_ops(undo: Option<ActionOp<C>>, redo: Option<ActionOp<C>>) -> Self {
        Self {
            undo,
            redo,
            mark: None,
        }
    }
}

/// Linear undo/redo history with a clean-state checkpoint.
///
/// `index` is the cursor: entries before it have been applied, entries at
/// and after it are redoable. Recording while redoable entries exist
/// discards them — a new edit after undo abandons the redo branch.
pub struct ActionLedger<C> {
    queue: Vec<Action<C>>,
    index: usize,
    mark: Option<Checkpoint>,
}

impl<C> Default for ActionLedger<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> ActionLedger<C> {
    pub fn new() -> Self {
        Self {
            queue: Vec::new(),
            index: 0,
            mark: None,
        }
    }

    /// True when there is nothing to undo.
    pub fn undo_empty(&self) -> bool {
        self.index == 0
    }

    /// True when there is nothing to redo.
    pub fn redo_empty(&self) -> bool {
        self.index == self.queue.len()
    }

    /// Append an action, discarding any abandoned redo entries first.
    pub fn record(&mut self, action: Action<C>) {
        if self.index != self.queue.len() {
            self.queue.truncate(self.index);
        }
        self.queue.push(action);
        self.index += 1;
    }

    /// Step back one action and run its undo operation. No-op when the
    /// history is exhausted. Replay errors propagate to the caller.
    pub fn undo(&mut self, ctx: &mut C) -> Result<(), ScriptError> {
        if self.index == 0 {
            return Ok(());
        }
        self.index -= 1;
        let action = &mut self.queue[self.index];
        match action.undo.as_mut() {
            Some(op) => op(ctx),
            None => Ok(()),
        }
    }

    /// Re-run the next action's redo operation and step forward. No-op at
    /// the end of history.
    pub fn redo(&mut self, ctx: &mut C) -> Result<(), ScriptError> {
        if self.index == self.queue.len() {
            return Ok(());
        }
        let action = &mut self.queue[self.index];
        let result = match action.redo.as_mut() {
            Some(op) => op(ctx),
            None => Ok(()),
        };
        self.index += 1;
        result
    }

    /// Record "the document was just saved here": mint a fresh checkpoint
    /// and stamp it on the action at the cursor (when one exists).
    pub fn mark_clean(&mut self) {
        let mark = Checkpoint::new();
        self.mark = Some(mark.clone());
        if self.index > 0 && self.index <= self.queue.len() {
            self.queue[self.index - 1].mark = Some(mark);
        }
    }

    /// Whether the history cursor sits exactly where the last save
    /// happened. Before any save this means "no edits applied"; after a
    /// save it means the stamped action is the one at the cursor, even if
    /// undo/redo wandered away and came back.
    pub fn is_clean(&self) -> bool {
        match &self.mark {
            None => self.index == 0,
            Some(mark) => {
                self.index > 0
                    && self.index <= self.queue.len()
                    && self.queue[self.index - 1]
                        .mark
                        .as_ref()
                        .is_some_and(|stamped| stamped.same(mark))
            }
        }
    }
}
