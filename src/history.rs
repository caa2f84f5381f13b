// Linear undo/redo over region snapshots.
//
// Index 0 always holds the empty region recorded at session start (or at
// the last reset) and can never be undone past. Recording after an undo
// drops the redo branch.

use tracing::debug;

use crate::region::Region;

/// Immutable copy of a region at a point in time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    region: Region,
}

impl Snapshot {
    pub fn capture(region: &Region) -> Self {
        Self { region: region.clone() }
    }

    pub fn region(&self) -> &Region {
        &self.region
    }
}

#[derive(Debug)]
pub struct History {
    snapshots: Vec<Snapshot>,
    cursor: usize,
}

impl History {
    pub fn new(initial: &Region) -> Self {
        Self {
            snapshots: vec![Snapshot::capture(initial)],
            cursor: 0,
        }
    }

    /// Back to a single snapshot of `initial`.
    pub fn reset(&mut self, initial: &Region) {
        self.snapshots.clear();
        self.snapshots.push(Snapshot::capture(initial));
        self.cursor = 0;
    }

    pub fn record(&mut self, region: &Region) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(Snapshot::capture(region));
        self.cursor = self.snapshots.len() - 1;
        debug!(cursor = self.cursor, len = self.snapshots.len(), "history recorded");
    }

    /// Step back; `None` at the floor.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        debug!(cursor = self.cursor, "undo");
        self.snapshots.get(self.cursor)
    }

    /// Step forward; `None` at the newest snapshot.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        debug!(cursor = self.cursor, "redo");
        self.snapshots.get(self.cursor)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    pub fn current(&self) -> &Snapshot {
        &self.snapshots[self.cursor]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
