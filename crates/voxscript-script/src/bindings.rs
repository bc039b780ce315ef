//! Presentation bindings: weak back-references from lines to UI nodes.
//!
//! The document owns its lines; the presentation layer owns its widgets.
//! [`NodeBindings`] is the lookup relation between the two — a plain map
//! from line identity to an external handle, holding no ownership and no
//! lifetime claims. The presentation side updates it on mount/unmount;
//! undo/redo replays consult it to verify the nodes they rely on still
//! exist.

use std::collections::HashMap;

use crate::script::{LineId, ScriptDocument};

/// Non-owning map from line identity to an external presentation node.
#[derive(Debug)]
pub struct NodeBindings<N> {
    nodes: HashMap<LineId, N>,
}

impl<N> Default for NodeBindings<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> NodeBindings<N> {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
        }
    }

    /// Attach a node to a line, replacing any previous binding.
    pub fn bind(&mut self, line: LineId, node: N) -> Option<N> {
        self.nodes.insert(line, node)
    }

    /// Detach and return the node bound to `line`, if any.
    pub fn unbind(&mut self, line: LineId) -> Option<N> {
        self.nodes.remove(&line)
    }

    pub fn get(&self, line: LineId) -> Option<&N> {
        self.nodes.get(&line)
    }

    pub fn contains(&self, line: LineId) -> bool {
        self.nodes.contains_key(&line)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}

/// One document plus the presentation bindings that shadow it.
///
/// This is the mutation context recorded edits and their undo/redo
/// replays run against: line widgets and voice-editor widgets are bound
/// separately, as each has its own presentation node in the UI layer.
pub struct Workspace<N> {
    pub script: ScriptDocument,
    pub line_nodes: NodeBindings<N>,
    pub voice_nodes: NodeBindings<N>,
}

impl<N> Workspace<N> {
    pub fn new(script: ScriptDocument) -> Self {
        Self {
            script,
            line_nodes: NodeBindings::new(),
            voice_nodes: NodeBindings::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voice::{ScriptMeta, Voice, VoiceInfo};
    use crate::script::Line;

    fn doc() -> ScriptDocument {
        ScriptDocument::new(ScriptMeta::new(
            "0.1.0",
            "espeak-ng",
            vec![VoiceInfo::new("en", "English")],
        ))
    }

    #[test]
    fn bind_get_unbind_roundtrip() {
        let mut doc = doc();
        let id = doc.adopt(Line::new("x", Voice::new("en", 200)));
        let mut bindings: NodeBindings<&str> = NodeBindings::new();

        assert!(!bindings.contains(id));
        assert_eq!(bindings.bind(id, "widget"), None);
        assert_eq!(bindings.get(id), Some(&"widget"));
        assert_eq!(bindings.unbind(id), Some("widget"));
        assert!(!bindings.contains(id));
    }

    #[test]
    fn rebinding_replaces_the_node() {
        let mut doc = doc();
        let id = doc.adopt(Line::new("x", Voice::new("en", 200)));
        let mut bindings: NodeBindings<u32> = NodeBindings::new();
        bindings.bind(id, 1);
        assert_eq!(bindings.bind(id, 2), Some(1));
        assert_eq!(bindings.get(id), Some(&2));
    }
}
