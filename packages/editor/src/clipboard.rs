//! Clipboard ingestion: turns pasted plain/rich text into a paste plan for
//! the focused block.
//!
//! Planning is pure; [`crate::EditSession::paste`] applies the plan to the
//! document and history.

use crate::block::{split_at_char, BlockPayload, BlockType};
use crate::html::{has_markdown_markup, html_to_markdown};
use crate::markdown::parse_blocks;

/// What the platform clipboard handed over
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardPayload {
    Content {
        plain: String,
        html: Option<String>,
    },
    /// Clipboard access failed (permission denied, no clipboard API, ...)
    Unavailable(String),
}

impl ClipboardPayload {
    pub fn plain(text: impl Into<String>) -> Self {
        ClipboardPayload::Content {
            plain: text.into(),
            html: None,
        }
    }

    pub fn rich(plain: impl Into<String>, html: impl Into<String>) -> Self {
        ClipboardPayload::Content {
            plain: plain.into(),
            html: Some(html.into()),
        }
    }
}

/// How a paste changes the focused block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PastePlan {
    /// Nothing to paste
    Ignore,
    /// Report a transient status; the document is untouched
    Unavailable(String),
    /// Replace the block content and move the caret, no checkpoint
    Splice { content: String, caret: usize },
    /// Truncate the block to `keep` and insert `blocks` below it
    Split {
        keep: String,
        blocks: Vec<BlockPayload>,
    },
}

/// What a paste did to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasteOutcome {
    Ignored,
    /// Transient status for the user; nothing changed
    Unavailable(String),
    /// Text spliced into the focused block
    Spliced { index: usize, caret: usize },
    /// Blocks inserted below the focused block
    Inserted { first_index: usize, count: usize },
}

/// Text to ingest from a rich payload
///
/// HTML wins when it carries markdown-relevant markup, or when it is the
/// only thing on the clipboard.
pub fn resolve_text(plain: &str, html: Option<&str>) -> String {
    let text = match html {
        Some(html) if !html.trim().is_empty() && (has_markdown_markup(html) || plain.is_empty()) => {
            html_to_markdown(html)
        }
        _ => plain.to_string(),
    };
    text.replace("\r\n", "\n")
}

/// Plan a paste into a block of `block_type` holding `content`, with the
/// caret at character `caret`
pub fn plan_paste(
    block_type: BlockType,
    content: &str,
    caret: usize,
    payload: &ClipboardPayload,
) -> PastePlan {
    let (plain, html) = match payload {
        ClipboardPayload::Unavailable(reason) => return PastePlan::Unavailable(reason.clone()),
        ClipboardPayload::Content { plain, html } => (plain, html.as_deref()),
    };

    let (before, after) = split_at_char(content, caret);

    // Raw input for multi-line blocks
    if block_type.is_multiline() {
        let text = plain.replace("\r\n", "\n");
        if text.is_empty() {
            return PastePlan::Ignore;
        }
        return PastePlan::Splice {
            content: format!("{before}{text}{after}"),
            caret: before.chars().count() + text.chars().count(),
        };
    }

    let text = resolve_text(plain, html);
    if text.is_empty() {
        return PastePlan::Ignore;
    }

    if !text.contains('\n') {
        return PastePlan::Splice {
            content: format!("{before}{text}{after}"),
            caret: before.chars().count() + text.chars().count(),
        };
    }

    let mut blocks = parse_blocks(&text);
    if !after.trim().is_empty() {
        blocks.push(BlockPayload::text(after));
    }

    PastePlan::Split {
        keep: before.to_string(),
        blocks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_splices_at_caret() {
        let plan = plan_paste(BlockType::Text, "hello world", 6, &ClipboardPayload::plain("big "));
        assert_eq!(
            plan,
            PastePlan::Splice {
                content: "hello big world".into(),
                caret: 10
            }
        );
    }

    #[test]
    fn test_multi_line_splits_block() {
        let plan = plan_paste(BlockType::Text, "tail", 0, &ClipboardPayload::plain("a\nb\nc"));
        assert_eq!(
            plan,
            PastePlan::Split {
                keep: String::new(),
                blocks: vec![
                    BlockPayload::text("a"),
                    BlockPayload::text("b"),
                    BlockPayload::text("c"),
                    BlockPayload::text("tail"),
                ],
            }
        );
    }

    #[test]
    fn test_blank_trailing_text_is_dropped() {
        let plan = plan_paste(BlockType::Text, "keep   ", 4, &ClipboardPayload::plain("# A\nb"));
        let PastePlan::Split { keep, blocks } = plan else {
            panic!("expected split");
        };
        assert_eq!(keep, "keep");
        assert_eq!(blocks, vec![BlockPayload::new(BlockType::H1, "A"), BlockPayload::text("b")]);
    }

    #[test]
    fn test_code_block_takes_raw_text() {
        let plan = plan_paste(
            BlockType::Code,
            "fn main() {}",
            11,
            &ClipboardPayload::rich("\n  body\n", "<p>ignored</p>"),
        );
        assert_eq!(
            plan,
            PastePlan::Splice {
                content: "fn main() {\n  body\n}".into(),
                caret: 19
            }
        );
    }

    #[test]
    fn test_significant_html_wins() {
        let payload = ClipboardPayload::rich("Title\nbody", "<h2>Title</h2><p><b>body</b></p>");
        let PastePlan::Split { blocks, .. } = plan_paste(BlockType::Text, "", 0, &payload) else {
            panic!("expected split");
        };
        assert_eq!(
            blocks,
            vec![BlockPayload::new(BlockType::H2, "Title"), BlockPayload::text("**body**")]
        );
    }

    #[test]
    fn test_insignificant_html_falls_back_to_plain() {
        let payload = ClipboardPayload::rich("plain words", "<span>styled words</span>");
        let plan = plan_paste(BlockType::Text, "", 0, &payload);
        assert_eq!(
            plan,
            PastePlan::Splice {
                content: "plain words".into(),
                caret: 11
            }
        );
    }

    #[test]
    fn test_html_only_payload_is_used() {
        let payload = ClipboardPayload::rich("", "<span>only html</span>");
        let plan = plan_paste(BlockType::Text, "", 0, &payload);
        assert_eq!(
            plan,
            PastePlan::Splice {
                content: "only html".into(),
                caret: 9
            }
        );
    }

    #[test]
    fn test_crlf_is_normalized() {
        let plan = plan_paste(BlockType::Text, "", 0, &ClipboardPayload::plain("a\r\nb"));
        let PastePlan::Split { blocks, .. } = plan else {
            panic!("expected split");
        };
        assert_eq!(blocks, vec![BlockPayload::text("a"), BlockPayload::text("b")]);
    }

    #[test]
    fn test_empty_and_unavailable() {
        assert_eq!(
            plan_paste(BlockType::Text, "x", 0, &ClipboardPayload::plain("")),
            PastePlan::Ignore
        );
        assert_eq!(
            plan_paste(
                BlockType::Text,
                "x",
                0,
                &ClipboardPayload::Unavailable("permission denied".into())
            ),
            PastePlan::Unavailable("permission denied".into())
        );
    }
}
