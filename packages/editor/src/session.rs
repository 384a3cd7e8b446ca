//! # Edit Session
//!
//! The editor controller for one open page.
//!
//! An EditSession owns the document together with everything that only
//! lives while the page is open: undo history, focus and selection, the
//! caret, and command-block state. UI layers call its command methods and
//! subscribe to [`SessionEvent`]s instead of reaching into the document.
//!
//! Structural edits (insert, delete, paste, command answer) take a history
//! checkpoint first. Content edits and overflow splits do not; a split is
//! re-derived from the content on the next render.
//!
//! Background tasks share a session through [`SessionHandle`]. The lock is
//! never held across an `.await`.

use crate::block::{split_at_char, Block, BlockId, BlockPayload, BlockType, BlockUpdate};
use crate::clipboard::{plan_paste, ClipboardPayload, PasteOutcome, PastePlan};
use crate::collaborators::PageStore;
use crate::command::CommandState;
use crate::config::EditorConfig;
use crate::document::Document;
use crate::errors::EditorResult;
use crate::overflow::{MonospaceMeasurer, OverflowSplitter, TextMeasurer};
use crate::selection::{Caret, ClickModifiers, Selection};
use crate::suggestion::TriggerInput;
use crate::undo_stack::{CheckpointId, UndoStack};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Shared handle to a session
pub type SessionHandle = Arc<Mutex<EditSession>>;

const EVENT_CAPACITY: usize = 64;

/// Change notification published by a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    BlocksChanged { version: u64 },
    FocusChanged(usize),
    SelectionChanged,
    HistoryChanged { can_undo: bool, can_redo: bool },
    CommandChanged(BlockId),
}

/// Editing state for one open page
pub struct EditSession {
    document: Document,
    history: UndoStack,
    selection: Selection,
    caret: Option<Caret>,
    commands: HashMap<BlockId, CommandState>,
    measurer: Arc<dyn TextMeasurer>,
    events: broadcast::Sender<SessionEvent>,
}

impl EditSession {
    pub fn new(document: Document, config: &EditorConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            document,
            history: UndoStack::with_max_levels(config.history_limit),
            selection: Selection::new(),
            caret: None,
            commands: HashMap::new(),
            measurer: Arc::new(MonospaceMeasurer::new(config.monospace_char_width)),
            events,
        }
    }

    /// Open a persisted page
    pub async fn load(store: &dyn PageStore, page_id: &str, config: &EditorConfig) -> EditorResult<Self> {
        let page = store.get(page_id).await?;
        tracing::info!(page_id, title = %page.title, "page loaded");
        Ok(Self::new(
            Document::from_page(page_id, &page.title, &page.content),
            config,
        ))
    }

    pub fn with_measurer(mut self, measurer: Arc<dyn TextMeasurer>) -> Self {
        self.measurer = measurer;
        self
    }

    pub fn into_handle(self) -> SessionHandle {
        Arc::new(Mutex::new(self))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn focused(&self) -> usize {
        self.selection.focused
    }

    pub fn caret(&self) -> Option<Caret> {
        self.caret
    }

    /// Snapshot of the state suggestion triggers look at
    pub fn trigger_input(&self, force: bool) -> TriggerInput<'_> {
        TriggerInput {
            blocks: self.document.blocks(),
            caret: self.caret,
            focused: Some(self.selection.focused),
            force,
        }
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn blocks_changed(&self) {
        self.emit(SessionEvent::BlocksChanged {
            version: self.document.version,
        });
    }

    fn history_changed(&self) {
        self.emit(SessionEvent::HistoryChanged {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        });
    }

    fn set_focus(&mut self, index: usize) {
        self.selection.focused = index;
        self.emit(SessionEvent::FocusChanged(index));
    }

    /// Take a history checkpoint of the current blocks
    pub fn checkpoint(&mut self) -> CheckpointId {
        let id = self.history.save_state(self.document.blocks());
        self.history_changed();
        id
    }

    // ---- content edits ----

    /// Change a block's type and/or content (no checkpoint)
    pub fn update_block(&mut self, index: usize, update: BlockUpdate) -> bool {
        let updated = self.document.update(index, update);
        if updated {
            self.blocks_changed();
        }
        updated
    }

    /// Switch a block to another type, clearing its content
    pub fn convert_block(&mut self, index: usize, block_type: BlockType) -> bool {
        self.update_block(index, BlockUpdate::block_type(block_type).with_content(""))
    }

    /// Insert text at the caret and move the caret past it
    pub fn insert_at_caret(&mut self, text: &str) -> bool {
        let Some(caret) = self.caret else {
            return false;
        };
        let Some(block) = self.document.get(caret.block_index) else {
            return false;
        };

        let (before, after) = split_at_char(&block.content, caret.offset);
        let content = format!("{before}{text}{after}");
        let offset = before.chars().count() + text.chars().count();

        self.update_block(caret.block_index, BlockUpdate::content(content));
        self.caret = Some(Caret::new(caret.block_index, offset));
        true
    }

    // ---- structural edits ----

    pub fn insert_block_below(&mut self, index: usize, block_type: BlockType, content: &str) -> usize {
        self.checkpoint();
        let at = self.document.insert_below(index, block_type, content);
        self.blocks_changed();
        self.set_focus(at);
        at
    }

    pub fn insert_block_above(&mut self, index: usize, block_type: BlockType, content: &str) -> usize {
        self.checkpoint();
        let at = self.document.insert_above(index, block_type, content);
        self.blocks_changed();
        self.set_focus(at);
        at
    }

    /// Delete a block; the title and the last block are kept
    pub fn delete_block(&mut self, index: usize) -> bool {
        let len = self.document.len();
        if index == 0 || len <= 1 || index >= len {
            return false;
        }

        self.checkpoint();
        if let Some(removed) = self.document.delete(index) {
            self.commands.remove(&removed.id);
        }
        self.blocks_changed();
        self.set_focus(index.min(len - 2));
        true
    }

    /// Insert a batch of blocks below `index` as one undo step
    pub fn insert_blocks_below(&mut self, index: usize, payloads: Vec<BlockPayload>) -> Option<usize> {
        if payloads.is_empty() {
            return None;
        }

        self.checkpoint();
        let first = self.document.insert_many_below(index, payloads)?;
        self.blocks_changed();
        Some(first)
    }

    /// Delete every selected block except the title as one undo step
    pub fn delete_selected(&mut self) -> usize {
        let indices = self.selection.body_indices();
        if indices.is_empty() {
            return 0;
        }

        self.checkpoint();
        let mut deleted = 0;
        for index in indices.into_iter().rev() {
            if let Some(removed) = self.document.delete(index) {
                self.commands.remove(&removed.id);
                deleted += 1;
            }
        }

        self.selection.clear();
        self.blocks_changed();
        self.emit(SessionEvent::SelectionChanged);
        let focus = self.selection.focused.min(self.document.len() - 1);
        self.set_focus(focus);
        deleted
    }

    // ---- history ----

    fn restore(&mut self, blocks: Option<Vec<Block>>) -> bool {
        let Some(blocks) = blocks else {
            return false;
        };

        self.document.replace_blocks(blocks);
        self.selection.clear();
        self.caret = None;
        self.blocks_changed();
        self.history_changed();
        self.emit(SessionEvent::SelectionChanged);
        self.set_focus(0);
        true
    }

    pub fn multi_undo(&mut self, steps: usize) -> bool {
        let restored = self.history.multi_undo(steps, self.document.blocks());
        self.restore(restored)
    }

    pub fn multi_redo(&mut self, steps: usize) -> bool {
        let restored = self.history.multi_redo(steps, self.document.blocks());
        self.restore(restored)
    }

    pub fn undo(&mut self) -> bool {
        self.multi_undo(1)
    }

    pub fn redo(&mut self) -> bool {
        self.multi_redo(1)
    }

    // ---- clipboard ----

    /// Paste into the block under the caret (or the focused block)
    pub fn paste(&mut self, payload: &ClipboardPayload) -> PasteOutcome {
        let index = self.selection.focused;
        let offset = match self.caret {
            Some(caret) if caret.block_index == index => caret.offset,
            _ => self.document.get(index).map(Block::char_len).unwrap_or(0),
        };
        let Some(block) = self.document.get(index) else {
            return PasteOutcome::Ignored;
        };

        match plan_paste(block.block_type, &block.content, offset, payload) {
            PastePlan::Ignore => PasteOutcome::Ignored,
            PastePlan::Unavailable(reason) => {
                tracing::warn!(reason = %reason, "clipboard unavailable");
                PasteOutcome::Unavailable(reason)
            }
            PastePlan::Splice { content, caret } => {
                self.update_block(index, BlockUpdate::content(content));
                self.caret = Some(Caret::new(index, caret));
                PasteOutcome::Spliced { index, caret }
            }
            PastePlan::Split { keep, blocks } => {
                let count = blocks.len();
                self.checkpoint();
                self.document.update(index, BlockUpdate::content(keep));
                let first_index = self
                    .document
                    .insert_many_below(index, blocks)
                    .unwrap_or(index + 1);
                self.blocks_changed();
                self.set_focus(first_index);
                self.caret = Some(Caret::new(first_index, 0));
                PasteOutcome::Inserted { first_index, count }
            }
        }
    }

    // ---- overflow ----

    /// Split the block at `index` if it is wider than `container_width`
    ///
    /// Returns the index of the new block holding the overflow.
    pub fn handle_overflow(&mut self, index: usize, container_width: f32) -> Option<usize> {
        let block = self.document.get(index)?;
        let split = OverflowSplitter::new(self.measurer.as_ref(), container_width)
            .split(block.block_type, &block.content)?;
        let block_type = block.block_type;

        self.document.update(index, BlockUpdate::content(split.keep));
        let moved_len = split.moved.chars().count();
        let at = self.document.insert_below(index, block_type, split.moved);

        tracing::debug!(index, new_index = at, "split overflowing block");
        self.blocks_changed();
        self.set_focus(at);
        self.caret = Some(Caret::new(at, moved_len));
        Some(at)
    }

    /// Keep splitting until every resulting block fits; returns the split count
    pub fn settle_overflow(&mut self, index: usize, container_width: f32) -> usize {
        let mut splits = 0;
        let mut current = index;
        while let Some(next) = self.handle_overflow(current, container_width) {
            splits += 1;
            current = next;
        }
        splits
    }

    // ---- focus, caret and selection ----

    pub fn focus(&mut self, index: usize) {
        let index = index.min(self.document.len().saturating_sub(1));
        self.set_focus(index);
    }

    pub fn set_caret(&mut self, caret: Option<Caret>) {
        self.caret = caret;
    }

    pub fn mouse_down(&mut self, index: usize, modifiers: ClickModifiers) {
        self.selection.mouse_down(index, modifiers);
        self.emit(SessionEvent::SelectionChanged);
        self.emit(SessionEvent::FocusChanged(index));
    }

    pub fn mouse_enter(&mut self, index: usize) {
        if self.selection.is_dragging() {
            self.selection.mouse_enter(index);
            self.emit(SessionEvent::SelectionChanged);
        }
    }

    pub fn mouse_up(&mut self) {
        self.selection.mouse_up();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.emit(SessionEvent::SelectionChanged);
    }

    // ---- command blocks ----

    /// Insert a command block (keyboard shortcut)
    ///
    /// With a selection the block goes above the first selected body block
    /// and remembers the selected text; otherwise it goes at the focused
    /// block. Returns the new block's id.
    pub fn open_command_block(&mut self) -> BlockId {
        let selected = self.selection.body_indices();

        let (at, highlight) = match selected.first() {
            Some(&first) => {
                let text = selected
                    .iter()
                    .filter_map(|&i| self.document.get(i))
                    .map(|b| b.content.as_str())
                    .collect::<Vec<_>>()
                    .join("\n");
                (first, Some(text))
            }
            None if !self.selection.is_empty() => (1, None),
            None => (self.selection.focused.max(1), None),
        };

        let at = self.document.insert_above(at, BlockType::Command, "");
        let id = self.document.blocks()[at].id.clone();
        self.commands.insert(id.clone(), CommandState::with_highlight(highlight));

        self.selection.clear();
        self.blocks_changed();
        self.emit(SessionEvent::SelectionChanged);
        self.set_focus(at);
        id
    }

    /// Remove a command block and forget its state
    pub fn close_command_block(&mut self, id: &BlockId) -> bool {
        self.commands.remove(id);
        let Some(index) = self.document.position(id) else {
            return false;
        };
        let closed = self.document.delete(index).is_some();
        if closed {
            self.blocks_changed();
            self.set_focus(index.saturating_sub(1));
        }
        closed
    }

    pub fn command_state(&self, id: &BlockId) -> Option<&CommandState> {
        self.commands.get(id)
    }

    pub(crate) fn command_state_mut(&mut self, id: &BlockId) -> &mut CommandState {
        self.commands.entry(id.clone()).or_default()
    }

    pub(crate) fn notify_command(&self, id: &BlockId) {
        self.emit(SessionEvent::CommandChanged(id.clone()));
    }

    /// Insert answer lines below a command block as one undo step
    pub(crate) fn insert_command_answer(&mut self, id: &BlockId, lines: Vec<String>) -> Option<usize> {
        let Some(index) = self.document.position(id) else {
            self.commands.remove(id);
            return None;
        };

        let checkpoint = self.checkpoint();
        let payloads = lines.into_iter().map(BlockPayload::text).collect();
        let first = self.document.insert_many_below(index, payloads);
        self.blocks_changed();

        let state = self.command_state_mut(id);
        state.loading = false;
        state.error = None;
        state.inserted_count += 1;
        state.last_checkpoint = Some(checkpoint);
        self.notify_command(id);
        first
    }

    pub(crate) fn fail_command(&mut self, id: &BlockId, message: &str) {
        if self.document.position(id).is_none() {
            self.commands.remove(id);
            return;
        }
        let state = self.command_state_mut(id);
        state.loading = false;
        state.error = Some(message.to_string());
        self.notify_command(id);
    }

    /// Undo the answer most recently inserted for a command block
    ///
    /// Only applies while that insertion is still the newest checkpoint;
    /// otherwise nothing happens and `false` is returned.
    pub fn undo_last_insertion(&mut self, id: &BlockId) -> bool {
        let Some(checkpoint) = self.commands.get(id).and_then(|s| s.last_checkpoint) else {
            return false;
        };
        if self.history.last_checkpoint() != Some(checkpoint) {
            return false;
        }
        if !self.undo() {
            return false;
        }

        let state = self.command_state_mut(id);
        state.last_checkpoint = None;
        state.inserted_count = state.inserted_count.saturating_sub(1);
        self.notify_command(id);
        true
    }
}
