//! The script document model.
//!
//! A [`ScriptDocument`] owns an arena of [`Line`]s addressed by stable
//! [`LineId`] handles. Document order is a doubly linked chain threaded
//! through the arena (`prev`/`next` optional handles plus `head`/`tail`),
//! so insertion and removal anywhere are O(1) and never shift other
//! lines' identities.
//!
//! Identity is the handle, not the content: two lines with identical text
//! and voice are distinct entities. Removing a line *detaches* it from
//! the chain but keeps its arena entry alive, so a recorded undo can
//! re-link the very same line later. Detached entries are dropped with
//! the document.

use std::collections::HashMap;
use std::fmt;

use crate::error::ScriptError;
use crate::voice::{ScriptMeta, Voice};

/// Stable handle to a line in a [`ScriptDocument`] arena.
///
/// Handles are never reused within one document.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct LineId(u64);

impl fmt::Debug for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LineId({})", self.0)
    }
}

/// One utterance: its text, its voice, and its place in the chain.
#[derive(Debug, Clone)]
pub struct Line {
    text: String,
    voice: Voice,
    prev: Option<LineId>,
    next: Option<LineId>,
}

impl Line {
    /// A detached line, ready to be adopted into a document.
    pub fn new(text: impl Into<String>, voice: Voice) -> Self {
        Self {
            text: text.into(),
            voice,
            prev: None,
            next: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn voice(&self) -> &Voice {
        &self.voice
    }

    fn is_linked(&self) -> bool {
        self.prev.is_some() || self.next.is_some()
    }
}

/// The full ordered script plus its synthesis metadata.
pub struct ScriptDocument {
    meta: ScriptMeta,
    arena: HashMap<LineId, Line>,
    head: Option<LineId>,
    tail: Option<LineId>,
    next_id: u64,
}

impl ScriptDocument {
    /// A fresh document: exactly one line with empty text and the first
    /// available voice at the default rate.
    pub fn new(meta: ScriptMeta) -> Self {
        let mut doc = Self::empty(meta);
        let voice = Voice::first_available(&doc.meta);
        let line = doc.adopt(Line::new("", voice));
        doc.head = Some(line);
        doc.tail = Some(line);
        doc
    }

    /// A document with no lines at all. Deserialization starts here and
    /// appends; everything else should use [`ScriptDocument::new`].
    pub fn empty(meta: ScriptMeta) -> Self {
        Self {
            meta,
            arena: HashMap::new(),
            head: None,
            tail: None,
            next_id: 0,
        }
    }

    pub fn meta(&self) -> &ScriptMeta {
        &self.meta
    }

    pub fn head(&self) -> Option<LineId> {
        self.head
    }

    pub fn tail(&self) -> Option<LineId> {
        self.tail
    }

    /// Whether `line` is the current first line.
    pub fn is_head(&self, line: LineId) -> bool {
        self.head == Some(line)
    }

    /// Whether `line` is the current last line.
    pub fn is_tail(&self, line: LineId) -> bool {
        self.tail == Some(line)
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none() && self.tail.is_none()
    }

    /// Number of lines currently linked into the chain.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    // ── Structural mutation ─────────────────────────────────────────────

    /// Bring a detached line into the arena, unlinked. Returns its handle.
    pub fn adopt(&mut self, line: Line) -> LineId {
        let id = LineId(self.next_id);
        self.next_id += 1;
        self.arena.insert(id, line);
        id
    }

    /// A new detached line copying `line`'s fields except those overridden.
    ///
    /// The clone gets its own voice instance, like the source line's voice
    /// but never shared with it.
    pub fn clone_line(
        &mut self,
        line: LineId,
        text: Option<&str>,
        voice: Option<Voice>,
    ) -> Result<LineId, ScriptError> {
        let source = self.get(line)?;
        let copy = Line::new(
            text.unwrap_or(&source.text),
            voice.unwrap_or_else(|| source.voice.clone_with(None, None)),
        );
        Ok(self.adopt(copy))
    }

    /// Link a detached line into the chain.
    ///
    /// At most one of `after`/`before` may be given; with neither, the
    /// line is appended at the tail (or becomes the sole line of an empty
    /// document). The two adjacent links are updated together — no
    /// half-linked state is observable. Returns the inserted line.
    pub fn add(
        &mut self,
        line: LineId,
        after: Option<LineId>,
        before: Option<LineId>,
    ) -> Result<LineId, ScriptError> {
        if after.is_some() && before.is_some() {
            return Err(ScriptError::InvalidArgument(
                "only one of `after` or `before` may be passed",
            ));
        }
        let entry = self.get(line)?;
        if entry.is_linked() || self.head == Some(line) {
            return Err(ScriptError::InvalidArgument("line is already linked"));
        }
        for anchor in [after, before].into_iter().flatten() {
            if !self.get(anchor)?.is_linked() && self.head != Some(anchor) {
                return Err(ScriptError::NotFound(anchor));
            }
        }

        match (after, before) {
            (None, None) => {
                if self.head.is_none() {
                    self.head = Some(line);
                }
                self.link(line, self.tail, None);
                self.tail = Some(line);
            }
            (Some(after), None) => {
                if self.is_tail(after) {
                    self.link(line, self.tail, None);
                    self.tail = Some(line);
                } else {
                    let next = self.get(after)?.next;
                    self.link(line, Some(after), next);
                }
            }
            (None, Some(before)) => {
                if self.is_head(before) {
                    self.link(line, None, self.head);
                    self.head = Some(line);
                } else {
                    let prev = self.get(before)?.prev;
                    self.link(line, prev, Some(before));
                }
            }
            (Some(_), Some(_)) => unreachable!("rejected above"),
        }
        Ok(line)
    }

    /// Detach `line` from the chain, re-linking its neighbors. Returns
    /// `(previous, next)` as they were at the moment of removal.
    ///
    /// The line's arena entry stays alive so it can be re-linked by an
    /// undo replay; only the chain forgets it.
    pub fn remove(&mut self, line: LineId) -> Result<(Option<LineId>, Option<LineId>), ScriptError> {
        let entry = self.get(line)?;
        if !entry.is_linked() && self.head != Some(line) {
            return Err(ScriptError::NotFound(line));
        }
        let (prev, next) = (entry.prev, entry.next);

        if self.is_head(line) {
            self.head = next;
        } else if let Some(prev) = prev {
            self.entry_mut(prev).next = next;
        }
        if self.is_tail(line) {
            self.tail = prev;
        } else if let Some(next) = next {
            self.entry_mut(next).prev = prev;
        }

        let entry = self.entry_mut(line);
        entry.prev = None;
        entry.next = None;
        Ok((prev, next))
    }

    // ── Traversal and field access ──────────────────────────────────────

    /// Forward traversal from head to tail.
    pub fn iter(&self) -> Lines<'_> {
        Lines {
            doc: self,
            cursor: self.head,
        }
    }

    /// Forward traversal from `line` to the tail — "play from here".
    pub fn iter_from(&self, line: LineId) -> Lines<'_> {
        Lines {
            doc: self,
            cursor: Some(line),
        }
    }

    pub fn text(&self, line: LineId) -> Result<&str, ScriptError> {
        Ok(&self.get(line)?.text)
    }

    pub fn voice(&self, line: LineId) -> Result<&Voice, ScriptError> {
        Ok(&self.get(line)?.voice)
    }

    /// Replace a line's text, returning the previous text.
    pub fn set_text(
        &mut self,
        line: LineId,
        text: impl Into<String>,
    ) -> Result<String, ScriptError> {
        let entry = self.get_mut(line)?;
        Ok(std::mem::replace(&mut entry.text, text.into()))
    }

    /// Replace a line's voice id, returning the previous id.
    pub fn set_voice_id(
        &mut self,
        line: LineId,
        id: impl Into<String>,
    ) -> Result<String, ScriptError> {
        let entry = self.get_mut(line)?;
        Ok(entry.voice.set_id(id))
    }

    /// Replace a line's speech rate, returning the previous rate.
    pub fn set_voice_rate(&mut self, line: LineId, rate: u32) -> Result<u32, ScriptError> {
        let entry = self.get_mut(line)?;
        Ok(entry.voice.set_rate(rate))
    }

    fn get(&self, line: LineId) -> Result<&Line, ScriptError> {
        self.arena.get(&line).ok_or(ScriptError::NotFound(line))
    }

    fn get_mut(&mut self, line: LineId) -> Result<&mut Line, ScriptError> {
        self.arena.get_mut(&line).ok_or(ScriptError::NotFound(line))
    }

    /// Arena access for a line known to exist. Only reachable after a
    /// successful `get`, so the entry is present.
    fn entry_mut(&mut self, line: LineId) -> &mut Line {
        self.arena
            .get_mut(&line)
            .expect("line handle verified before relink")
    }

    fn link(&mut self, line: LineId, prev: Option<LineId>, next: Option<LineId>) {
        {
            let entry = self.entry_mut(line);
            entry.prev = prev;
            entry.next = next;
        }
        if let Some(prev) = prev {
            self.entry_mut(prev).next = Some(line);
        }
        if let Some(next) = next {
            self.entry_mut(next).prev = Some(line);
        }
    }
}

/// Lazy forward traversal over a document's chain.
pub struct Lines<'a> {
    doc: &'a ScriptDocument,
    cursor: Option<LineId>,
}

impl Iterator for Lines<'_> {
    type Item = LineId;

    fn next(&mut self) -> Option<LineId> {
        let current = self.cursor?;
        self.cursor = self.doc.arena.get(&current).and_then(|line| line.next);
        Some(current)
    }
}
