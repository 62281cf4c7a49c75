//! Linear undo/redo history over document snapshots.
//!
//! The history owns exactly one "present" document. Applying an edit pushes
//! the present onto the past stack and clears the future; undo and redo move
//! the present between the two stacks. Snapshots are whole documents, which
//! is cheap because large image payloads are shared ([`crate::ImageRef`]).

use std::collections::VecDeque;

use crate::SceneDocument;

/// Default number of undo steps retained.
pub const DEFAULT_HISTORY_LIMIT: usize = 200;

/// Undo/redo history of a [`SceneDocument`].
#[derive(Debug, Clone)]
pub struct EditHistory {
    past: VecDeque<SceneDocument>,
    present: SceneDocument,
    future: Vec<SceneDocument>,
    limit: usize,
}

impl EditHistory {
    /// Start a history at `initial` with the default step limit.
    #[must_use]
    pub fn new(initial: SceneDocument) -> Self {
        Self::with_limit(initial, DEFAULT_HISTORY_LIMIT)
    }

    /// Start a history that retains at most `limit` undo steps.
    ///
    /// A limit of zero is treated as one.
    #[must_use]
    pub fn with_limit(initial: SceneDocument, limit: usize) -> Self {
        Self {
            past: VecDeque::new(),
            present: initial,
            future: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// The current document.
    #[must_use]
    pub fn present(&self) -> &SceneDocument {
        &self.present
    }

    /// Apply an edit and record the previous state.
    ///
    /// The redo stack is always cleared. Returns `false` (and records no
    /// undo step) when the edit produced an identical document.
    pub fn apply<F>(&mut self, edit: F) -> bool
    where
        F: FnOnce(&SceneDocument) -> SceneDocument,
    {
        let next = edit(&self.present);
        self.commit(next)
    }

    /// Replace the present with `next`, recording the previous state.
    ///
    /// The redo stack is always cleared. Returns `false` (and records no
    /// undo step) when `next` equals the present.
    pub fn commit(&mut self, next: SceneDocument) -> bool {
        self.future.clear();
        if next == self.present {
            return false;
        }
        let previous = std::mem::replace(&mut self.present, next);
        self.past.push_back(previous);
        if self.past.len() > self.limit {
            self.past.pop_front();
        }
        true
    }

    /// Step back one edit. No-op (returns `false`) when there is no past.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.past.pop_back() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, previous);
        self.future.push(current);
        true
    }

    /// Step forward one edit. No-op (returns `false`) when there is no future.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.future.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, next);
        self.past.push_back(current);
        true
    }

    /// Whether [`undo`](Self::undo) would change the present.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    /// Whether [`redo`](Self::redo) would change the present.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Number of undo steps available.
    #[must_use]
    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    /// Number of redo steps available.
    #[must_use]
    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    /// Maximum number of undo steps retained.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Drop all history and start over at `document`.
    pub fn reset(&mut self, document: SceneDocument) {
        self.past.clear();
        self.future.clear();
        self.present = document;
    }

    /// Consume the history, returning the present document.
    #[must_use]
    pub fn into_present(self) -> SceneDocument {
        self.present
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Element, ElementPatch, Geometry};

    fn doc() -> SceneDocument {
        SceneDocument::new("page_1")
            .with_element(Element::text(
                "t",
                Geometry::new(100.0, 200.0, 500.0, 60.0, 5),
                "Title",
            ))
            .expect("build")
    }

    fn move_to(x: f32) -> impl FnOnce(&SceneDocument) -> SceneDocument {
        move |d| d.update_element(&"t".into(), &ElementPatch::position(x, 0.0))
    }

    fn x_of(h: &EditHistory) -> f32 {
        h.present().element(&"t".into()).expect("t").geometry.x
    }

    #[test]
    fn test_undo_redo_cycle() {
        let mut history = EditHistory::new(doc());
        let initial = history.present().clone();
        assert!(history.apply(move_to(10.0)));

        assert!(history.undo());
        assert_eq!(history.present(), &initial);
        assert!(history.redo());
        assert!((x_of(&history) - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_undo_on_empty_past_is_noop() {
        let mut history = EditHistory::new(doc());
        let before = history.present().clone();
        assert!(!history.undo());
        assert!(!history.can_undo());
        assert_eq!(history.present(), &before);
    }

    #[test]
    fn test_apply_clears_future() {
        let mut history = EditHistory::new(doc());
        history.apply(move_to(1.0));
        history.apply(move_to(2.0));
        history.undo();
        assert!(history.can_redo());

        history.apply(move_to(3.0));
        assert!(!history.can_redo());
        assert!(!history.redo());
        assert!((x_of(&history) - 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_identical_edit_records_nothing() {
        let mut history = EditHistory::new(doc());
        assert!(!history.apply(|d| d.update_element(&"missing".into(), &ElementPatch::position(1.0, 1.0))));
        assert_eq!(history.past_len(), 0);
    }

    #[test]
    fn test_identical_edit_after_undo_clears_future() {
        let mut history = EditHistory::new(doc());
        history.apply(move_to(10.0));
        history.undo();
        assert_eq!(history.future_len(), 1);

        assert!(!history.apply(|d| d.update_element(&"missing".into(), &ElementPatch::position(1.0, 1.0))));
        assert_eq!(history.future_len(), 0);
        assert!(!history.redo());
        assert_eq!(history.past_len(), 0);
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut history = EditHistory::with_limit(doc(), 3);
        for i in 1..=5u8 {
            history.apply(move_to(f32::from(i)));
        }
        assert_eq!(history.past_len(), 3);
        while history.undo() {}
        // Steps 1 and 2 were evicted; the oldest reachable state is x = 2.
        assert!((x_of(&history) - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_reset() {
        let mut history = EditHistory::new(doc());
        history.apply(move_to(1.0));
        history.reset(SceneDocument::new("other"));
        assert!(!history.can_undo());
        assert_eq!(history.present().id(), "other");
    }
}
