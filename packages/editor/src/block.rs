//! # Blocks
//!
//! The atomic unit of a page: a type tag plus a single text payload.
//!
//! Headings and text are single-line blocks; `code` and `command` accept
//! multi-line content verbatim. `command` blocks are editor affordances for
//! delegated questions and never reach storage.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fence used for code blocks in the serialized body
pub const CODE_FENCE: &str = "```";

/// Kind of block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    H1,
    H2,
    H3,
    Text,
    Code,
    Command,
}

impl BlockType {
    /// Markdown prefix emitted for heading blocks
    pub fn heading_prefix(&self) -> Option<&'static str> {
        match self {
            BlockType::H1 => Some("# "),
            BlockType::H2 => Some("## "),
            BlockType::H3 => Some("### "),
            _ => None,
        }
    }

    pub fn is_heading(&self) -> bool {
        self.heading_prefix().is_some()
    }

    /// Blocks that take raw multi-line input (no paste ingestion)
    pub fn is_multiline(&self) -> bool {
        matches!(self, BlockType::Code | BlockType::Command)
    }

    /// Blocks that are split when their rendered line overflows
    pub fn is_splittable(&self) -> bool {
        !self.is_multiline()
    }

    pub fn is_persisted(&self) -> bool {
        *self != BlockType::Command
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::H1 => "h1",
            BlockType::H2 => "h2",
            BlockType::H3 => "h3",
            BlockType::Text => "text",
            BlockType::Code => "code",
            BlockType::Command => "command",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a block type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown block type: {0}")]
pub struct UnknownBlockType(pub String);

impl FromStr for BlockType {
    type Err = UnknownBlockType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "h1" => Ok(BlockType::H1),
            "h2" => Ok(BlockType::H2),
            "h3" => Ok(BlockType::H3),
            "text" => Ok(BlockType::Text),
            "code" => Ok(BlockType::Code),
            "command" => Ok(BlockType::Command),
            other => Err(UnknownBlockType(other.to_string())),
        }
    }
}

/// Opaque block identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single block of a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,

    #[serde(rename = "type")]
    pub block_type: BlockType,

    pub content: String,
}

impl Block {
    pub fn new(id: BlockId, block_type: BlockType, content: impl Into<String>) -> Self {
        Self {
            id,
            block_type,
            content: content.into(),
        }
    }

    /// Markdown line(s) for this block
    ///
    /// Headings get their `#` prefix, code is fenced, everything else is
    /// emitted verbatim (an empty text block is an empty line).
    pub fn to_markdown(&self) -> String {
        match self.block_type {
            BlockType::Code => format!("{CODE_FENCE}\n{}\n{CODE_FENCE}", self.content),
            ty => match ty.heading_prefix() {
                Some(prefix) => format!("{prefix}{}", self.content),
                None => self.content.clone(),
            },
        }
    }

    /// Length of the content in characters
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// Type and content for a block that does not exist yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockPayload {
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub content: String,
}

impl BlockPayload {
    pub fn new(block_type: BlockType, content: impl Into<String>) -> Self {
        Self {
            block_type,
            content: content.into(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::new(BlockType::Text, content)
    }

    pub fn to_markdown(&self) -> String {
        Block::new(BlockId::new(""), self.block_type, self.content.clone()).to_markdown()
    }
}

impl From<&Block> for BlockPayload {
    fn from(block: &Block) -> Self {
        Self::new(block.block_type, block.content.clone())
    }
}

/// Partial update applied by `Document::update`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockUpdate {
    pub block_type: Option<BlockType>,
    pub content: Option<String>,
}

impl BlockUpdate {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            block_type: None,
            content: Some(content.into()),
        }
    }

    pub fn block_type(block_type: BlockType) -> Self {
        Self {
            block_type: Some(block_type),
            content: None,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.block_type.is_none() && self.content.is_none()
    }
}

/// Byte index of the `offset`-th character, clamped to the end of `s`
pub(crate) fn byte_offset(s: &str, offset: usize) -> usize {
    s.char_indices()
        .nth(offset)
        .map(|(idx, _)| idx)
        .unwrap_or(s.len())
}

/// Split `s` at a character offset (clamped)
pub(crate) fn split_at_char(s: &str, offset: usize) -> (&str, &str) {
    s.split_at(byte_offset(s, offset))
}
