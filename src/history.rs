//! Linear undo/redo over full snapshots.

/// Snapshot history with a cursor.
///
/// Always holds at least one entry and `index < len`. Pushing after an undo
/// discards the undone entries.
///
/// ```
/// use photobooth_compositor::History;
///
/// let mut history = History::new("A");
/// history.push("B");
/// history.push("C");
/// assert_eq!(history.undo(), Some(&"B"));
/// history.push("D");
/// assert_eq!(history.entries(), ["A", "B", "D"]);
/// assert_eq!(history.index(), 2);
/// assert!(!history.can_redo());
/// ```
#[derive(Debug, Clone)]
pub struct History<T> {
    entries: Vec<T>,
    index: usize,
}

impl<T> History<T> {
    pub fn new(initial: T) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
        }
    }

    pub fn current(&self) -> &T {
        &self.entries[self.index]
    }

    /// Truncates everything after the cursor, appends, and moves to the end.
    pub fn push(&mut self, snapshot: T) {
        self.entries.truncate(self.index + 1);
        self.entries.push(snapshot);
        self.index = self.entries.len() - 1;
    }

    pub fn undo(&mut self) -> Option<&T> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        Some(self.current())
    }

    pub fn redo(&mut self) -> Option<&T> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        Some(self.current())
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }
}

impl<T: PartialEq> History<T> {
    /// Pushes only if `snapshot` differs from the current entry.
    pub fn push_if_changed(&mut self, snapshot: T) -> bool {
        if *self.current() == snapshot {
            return false;
        }
        self.push(snapshot);
        true
    }
}
