//! # Line Overflow
//!
//! Single-line blocks (headings and text) never wrap. When the rendered
//! content is wider than its container the block is split in two at a word
//! boundary, the tail moving to a new block of the same type.
//!
//! Width measurement is injected through [`TextMeasurer`] so the same logic
//! runs against a real layout engine or the fixed-width
//! [`MonospaceMeasurer`].

use crate::block::{split_at_char, BlockType};

/// Font parameters a measurer needs for one block type
#[derive(Debug, Clone, PartialEq)]
pub struct StyleContext {
    pub font_family: &'static str,
    pub font_size: f32,
    pub font_weight: u16,
}

impl StyleContext {
    pub fn for_block(block_type: BlockType) -> Self {
        let (font_size, font_weight) = match block_type {
            BlockType::H1 => (30.0, 700),
            BlockType::H2 => (24.0, 600),
            BlockType::H3 => (20.0, 600),
            _ => (16.0, 400),
        };
        let font_family = if block_type.is_multiline() {
            "monospace"
        } else {
            "sans-serif"
        };

        Self {
            font_family,
            font_size,
            font_weight,
        }
    }
}

/// Measures rendered text width
pub trait TextMeasurer: Send + Sync {
    fn measure_width(&self, text: &str, style: &StyleContext) -> f32;
}

/// Fixed advance per character, scaled by font size relative to 16px
#[derive(Debug, Clone, Copy)]
pub struct MonospaceMeasurer {
    pub char_width: f32,
}

impl MonospaceMeasurer {
    pub fn new(char_width: f32) -> Self {
        Self { char_width }
    }
}

impl Default for MonospaceMeasurer {
    fn default() -> Self {
        Self::new(8.0)
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn measure_width(&self, text: &str, style: &StyleContext) -> f32 {
        text.chars().count() as f32 * self.char_width * (style.font_size / 16.0)
    }
}

/// Result of splitting an overflowing line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverflowSplit {
    /// Content that stays in the original block
    pub keep: String,
    /// Content moved to the new block below
    pub moved: String,
}

/// Finds break points for content wider than `container_width`
pub struct OverflowSplitter<'a> {
    measurer: &'a dyn TextMeasurer,
    container_width: f32,
}

impl<'a> OverflowSplitter<'a> {
    pub fn new(measurer: &'a dyn TextMeasurer, container_width: f32) -> Self {
        Self {
            measurer,
            container_width,
        }
    }

    fn fits(&self, text: &str, style: &StyleContext) -> bool {
        self.measurer.measure_width(text, style) <= self.container_width
    }

    /// Longest prefix length (in characters) that fits the container
    pub fn find_fit(&self, content: &str, style: &StyleContext) -> usize {
        let chars: Vec<char> = content.chars().collect();
        let (mut lo, mut hi) = (0usize, chars.len());

        while lo < hi {
            let mid = (lo + hi + 1) / 2;
            let prefix: String = chars[..mid].iter().collect();
            if self.fits(&prefix, style) {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }

        lo
    }

    /// Split point for `content`, or `None` when it fits
    pub fn break_point(&self, content: &str, style: &StyleContext) -> Option<usize> {
        let chars: Vec<char> = content.chars().collect();
        let len = chars.len();
        if len <= 1 {
            return None;
        }

        let fit = self.find_fit(content, style);
        if fit >= len {
            return None;
        }

        // Break after the nearest space so the word moves as a whole
        let start = fit.min(len - 1);
        let at = (0..=start)
            .rev()
            .find(|&i| chars[i] == ' ')
            .map(|space| space + 1)
            .unwrap_or(fit);

        Some(at.clamp(1, len - 1))
    }

    /// Split a block's content if it overflows
    pub fn split(&self, block_type: BlockType, content: &str) -> Option<OverflowSplit> {
        if !block_type.is_splittable() {
            return None;
        }

        let style = StyleContext::for_block(block_type);
        let at = self.break_point(content, &style)?;
        let (keep, moved) = split_at_char(content, at);

        Some(OverflowSplit {
            keep: keep.to_string(),
            moved: moved.to_string(),
        })
    }
}
