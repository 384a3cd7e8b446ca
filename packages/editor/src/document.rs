//! # Document
//!
//! Canonical ordered block list of one page and its primitive mutations.
//!
//! Index 0 is the title block: its content is the page title and it is not
//! part of the serialized body. The document always holds at least one block
//! and the title can never be deleted.
//!
//! ## Lifecycle
//!
//! ```text
//! Load → Parse → Edit → Serialize → Save
//!   ↓      ↓       ↓        ↓         ↓
//! Store  Blocks  Mutations  Markdown  Store
//! ```

use crate::block::{Block, BlockId, BlockPayload, BlockType, BlockUpdate};
use crate::id_generator::IdGenerator;
use crate::markdown::{parse_blocks, serialize_blocks};

/// Editable page document
#[derive(Debug, Clone)]
pub struct Document {
    /// Page this document was loaded from
    pub page_id: String,

    /// Current version number (increments on each mutation)
    pub version: u64,

    blocks: Vec<Block>,

    /// Set by every mutation, cleared by a successful save
    dirty: bool,

    ids: IdGenerator,
}

impl Document {
    /// Create a document holding only an empty title block
    pub fn new(page_id: impl Into<String>) -> Self {
        Self::from_page(page_id, "", "")
    }

    /// Build `[title] ++ parse(content)` for a persisted page
    pub fn from_page(page_id: impl Into<String>, title: &str, content: &str) -> Self {
        let page_id = page_id.into();
        let mut ids = IdGenerator::new(&page_id);

        let mut blocks = vec![Block::new(ids.new_id(), BlockType::H1, title)];
        for payload in parse_blocks(content) {
            blocks.push(Block::new(ids.new_id(), payload.block_type, payload.content));
        }

        Self {
            page_id,
            version: 0,
            blocks,
            dirty: false,
            ids,
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    /// Current index of the block with the given id
    pub fn position(&self, id: &BlockId) -> Option<usize> {
        self.blocks.iter().position(|block| &block.id == id)
    }

    pub fn title(&self) -> &str {
        self.blocks
            .first()
            .map(|block| block.content.as_str())
            .unwrap_or_default()
    }

    /// Serialized markdown body (every block after the title)
    pub fn body_markdown(&self) -> String {
        serialize_blocks(self.blocks.iter().skip(1))
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    fn touch(&mut self) {
        self.version += 1;
        self.dirty = true;
    }

    fn new_block(&mut self, block_type: BlockType, content: impl Into<String>) -> Block {
        Block::new(self.ids.new_id(), block_type, content)
    }

    /// Apply a partial update; out-of-range indices are ignored
    pub fn update(&mut self, index: usize, update: BlockUpdate) -> bool {
        let Some(block) = self.blocks.get_mut(index) else {
            return false;
        };

        if let Some(block_type) = update.block_type {
            block.block_type = block_type;
        }
        if let Some(content) = update.content {
            block.content = content;
        }

        self.touch();
        true
    }

    /// Insert a block directly below `index`, returning the new index
    pub fn insert_below(
        &mut self,
        index: usize,
        block_type: BlockType,
        content: impl Into<String>,
    ) -> usize {
        let at = (index + 1).min(self.blocks.len());
        let block = self.new_block(block_type, content);
        self.blocks.insert(at, block);
        self.touch();
        at
    }

    /// Insert a block directly above `index`, returning the new index
    ///
    /// Never displaces the title: inserting above index 0 lands at 1.
    pub fn insert_above(
        &mut self,
        index: usize,
        block_type: BlockType,
        content: impl Into<String>,
    ) -> usize {
        let at = index.clamp(1, self.blocks.len());
        let block = self.new_block(block_type, content);
        self.blocks.insert(at, block);
        self.touch();
        at
    }

    /// Delete the block at `index`
    ///
    /// The title and the last remaining block are never deleted.
    pub fn delete(&mut self, index: usize) -> Option<Block> {
        if index == 0 || self.blocks.len() <= 1 || index >= self.blocks.len() {
            return None;
        }

        let removed = self.blocks.remove(index);
        self.touch();
        Some(removed)
    }

    /// Insert several blocks below `index`, in order
    ///
    /// Returns the index of the first inserted block, or `None` for an empty
    /// batch.
    pub fn insert_many_below(&mut self, index: usize, payloads: Vec<BlockPayload>) -> Option<usize> {
        if payloads.is_empty() {
            return None;
        }

        let at = (index + 1).min(self.blocks.len());
        let new_blocks: Vec<Block> = payloads
            .into_iter()
            .map(|payload| self.new_block(payload.block_type, payload.content))
            .collect();

        self.blocks.splice(at..at, new_blocks);
        self.touch();
        Some(at)
    }

    /// Swap in a whole block sequence (undo/redo restore)
    pub fn replace_blocks(&mut self, blocks: Vec<Block>) {
        if blocks.is_empty() {
            return;
        }
        self.blocks = blocks;
        self.touch();
    }
}
