//! # Markdown Body Format
//!
//! The persisted page body is a flat, line-oriented markdown subset. Each
//! line maps to one block, except fenced code which spans several lines:
//!
//! ```text
//! # Heading          → h1 "Heading"
//! ## Sub             → h2 "Sub"
//! ### Minor          → h3 "Minor"
//! ```                → code (lines up to the closing fence, verbatim)
//! <blank>            → text ""   (spacing is preserved)
//! anything else      → text "anything else"
//! ```
//!
//! Serialization is the inverse and skips `command` blocks, so
//! `serialize(parse(x)) == x` for input without ambiguous fences.

use crate::block::{Block, BlockPayload, BlockType, CODE_FENCE};

/// Parse a markdown body into block payloads
///
/// Never fails; an empty (or whitespace-only) body yields a single empty
/// text block.
pub fn parse_blocks(content: &str) -> Vec<BlockPayload> {
    if content.trim().is_empty() {
        return vec![BlockPayload::text("")];
    }

    let lines: Vec<&str> = content.split('\n').collect();
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if line.trim().is_empty() {
            blocks.push(BlockPayload::text(""));
            i += 1;
            continue;
        }

        if let Some(heading) = parse_heading(line) {
            blocks.push(heading);
            i += 1;
        } else if line.starts_with(CODE_FENCE) {
            // Skip opening fence, collect until the closing one
            i += 1;
            let mut code_lines = Vec::new();
            while i < lines.len() && !lines[i].starts_with(CODE_FENCE) {
                code_lines.push(lines[i]);
                i += 1;
            }
            blocks.push(BlockPayload::new(BlockType::Code, code_lines.join("\n")));
            // Skip closing fence
            i += 1;
        } else {
            blocks.push(BlockPayload::text(line));
            i += 1;
        }
    }

    if blocks.is_empty() {
        blocks.push(BlockPayload::text(""));
    }

    blocks
}

fn parse_heading(line: &str) -> Option<BlockPayload> {
    [BlockType::H1, BlockType::H2, BlockType::H3]
        .into_iter()
        .find_map(|ty| {
            let prefix = ty.heading_prefix()?;
            line.strip_prefix(prefix)
                .map(|rest| BlockPayload::new(ty, rest))
        })
}

/// Serialize blocks to the markdown body (command blocks are skipped)
pub fn serialize_blocks<'a>(blocks: impl IntoIterator<Item = &'a Block>) -> String {
    blocks
        .into_iter()
        .filter(|block| block.block_type.is_persisted())
        .map(Block::to_markdown)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Serialize payloads with the same rules as [`serialize_blocks`]
pub fn serialize_payloads(payloads: &[BlockPayload]) -> String {
    payloads
        .iter()
        .filter(|payload| payload.block_type.is_persisted())
        .map(BlockPayload::to_markdown)
        .collect::<Vec<_>>()
        .join("\n")
}
