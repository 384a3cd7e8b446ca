//! # Undo/Redo Stack
//!
//! Snapshot-based history for the block sequence.
//!
//! ## Design
//!
//! - A checkpoint captures a full copy of the blocks *before* a structural
//!   edit (insert, delete, paste, split, command answer), not per keystroke
//! - `past` is ordered oldest → newest and trimmed to `max_levels`
//! - Undo restores a past snapshot and moves the live state onto `future`
//! - Redo is the mirror image
//! - A new checkpoint clears `future`
//! - Multi-step undo/redo collapse `n` steps into one call
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut stack = UndoStack::new();
//!
//! stack.save_state(doc.blocks());
//! doc.insert_below(0, BlockType::Text, "hello");
//!
//! if let Some(blocks) = stack.undo(doc.blocks()) {
//!     doc.replace_blocks(blocks);
//! }
//! ```

use crate::block::Block;

/// Default number of snapshots kept in `past`
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Identifier of a checkpoint, increasing for every snapshot taken
pub type CheckpointId = u64;

/// Immutable copy of the block sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub id: CheckpointId,
    pub blocks: Vec<Block>,
}

/// Undo/redo history over block snapshots
#[derive(Debug)]
pub struct UndoStack {
    /// Snapshots behind the live state (most recent last)
    past: Vec<Snapshot>,

    /// Snapshots ahead of the live state (next redo first)
    future: Vec<Snapshot>,

    /// Maximum number of past snapshots (0 = unlimited)
    max_levels: usize,

    next_id: CheckpointId,
}

impl UndoStack {
    pub fn new() -> Self {
        Self::with_max_levels(DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            past: Vec::new(),
            future: Vec::new(),
            max_levels,
            next_id: 1,
        }
    }

    fn snapshot(&mut self, blocks: &[Block]) -> Snapshot {
        let id = self.next_id;
        self.next_id += 1;
        Snapshot {
            id,
            blocks: blocks.to_vec(),
        }
    }

    fn trim(&mut self) {
        if self.max_levels > 0 && self.past.len() > self.max_levels {
            let excess = self.past.len() - self.max_levels;
            self.past.drain(..excess);
        }
    }

    /// Record `current` as a checkpoint and invalidate the redo branch
    pub fn save_state(&mut self, current: &[Block]) -> CheckpointId {
        let snapshot = self.snapshot(current);
        let id = snapshot.id;
        self.past.push(snapshot);
        self.trim();
        self.future.clear();
        id
    }

    /// Step back `n` checkpoints (clamped to what is available)
    ///
    /// Returns the blocks to restore, or `None` when there is nothing to undo.
    pub fn multi_undo(&mut self, n: usize, current: &[Block]) -> Option<Vec<Block>> {
        let k = n.min(self.past.len());
        if k == 0 {
            return None;
        }

        let split = self.past.len() - k;
        let mut undone = self.past.split_off(split);
        let target = undone.remove(0);

        let live = self.snapshot(current);
        undone.push(live);
        undone.append(&mut self.future);
        self.future = undone;

        Some(target.blocks)
    }

    /// Step forward `n` checkpoints (clamped to what is available)
    pub fn multi_redo(&mut self, n: usize, current: &[Block]) -> Option<Vec<Block>> {
        let k = n.min(self.future.len());
        if k == 0 {
            return None;
        }

        let remaining = self.future.split_off(k);
        let mut redone = std::mem::replace(&mut self.future, remaining);
        let target = redone.pop()?;

        let live = self.snapshot(current);
        self.past.push(live);
        self.past.append(&mut redone);
        self.trim();

        Some(target.blocks)
    }

    pub fn undo(&mut self, current: &[Block]) -> Option<Vec<Block>> {
        self.multi_undo(1, current)
    }

    pub fn redo(&mut self, current: &[Block]) -> Option<Vec<Block>> {
        self.multi_redo(1, current)
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.past.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.future.len()
    }

    /// Id of the newest checkpoint in `past`
    pub fn last_checkpoint(&self) -> Option<CheckpointId> {
        self.past.last().map(|snapshot| snapshot.id)
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
