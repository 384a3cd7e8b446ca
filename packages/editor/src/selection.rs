//! Block focus, caret and multi-block selection.

/// Caret position: block index plus character offset into its content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Caret {
    pub block_index: usize,
    pub offset: usize,
}

impl Caret {
    pub fn new(block_index: usize, offset: usize) -> Self {
        Self {
            block_index,
            offset,
        }
    }
}

/// Modifier keys held during a click
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClickModifiers {
    /// Ctrl or Meta
    pub toggle: bool,
    pub shift: bool,
}

impl ClickModifiers {
    pub fn toggle() -> Self {
        Self {
            toggle: true,
            shift: false,
        }
    }

    pub fn shift() -> Self {
        Self {
            toggle: false,
            shift: true,
        }
    }
}

/// Focused block plus the set of selected blocks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub focused: usize,
    /// Selected indices in the order they were selected
    selected: Vec<usize>,
    drag_start: Option<usize>,
}

fn range(a: usize, b: usize) -> Vec<usize> {
    (a.min(b)..=a.max(b)).collect()
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> &[usize] {
        &self.selected
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_start.is_some()
    }

    /// Selected indices excluding the title, ascending
    pub fn body_indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self.selected.iter().copied().filter(|&i| i > 0).collect();
        indices.sort_unstable();
        indices.dedup();
        indices
    }

    pub fn mouse_down(&mut self, index: usize, modifiers: ClickModifiers) {
        if modifiers.shift && !self.selected.is_empty() {
            let last = self.selected[self.selected.len() - 1];
            self.selected = range(last, index);
        } else if modifiers.toggle {
            match self.selected.iter().position(|&i| i == index) {
                Some(pos) => {
                    self.selected.remove(pos);
                }
                None => self.selected.push(index),
            }
        } else {
            self.drag_start = Some(index);
            self.selected = vec![index];
        }
        self.focused = index;
    }

    pub fn mouse_enter(&mut self, index: usize) {
        if let Some(start) = self.drag_start {
            self.selected = range(start, index);
        }
    }

    pub fn mouse_up(&mut self) {
        self.drag_start = None;
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }
}
