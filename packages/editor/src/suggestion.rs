//! # Inline Suggestions
//!
//! Ghost-text completions proposed at the caret.
//!
//! ## State machine
//!
//! ```text
//!            trigger (debounced)          response (non-empty)
//!   Idle ────────────────────► Pending ─────────────────────► Shown
//!    ▲                            │                             │
//!    └──── empty / error ─────────┘◄──── caret moved ───────────┘
//!
//!   reject(): Suppressed until the caret moves (orthogonal flag)
//! ```
//!
//! - The first change from "no context" to "some context" fires immediately;
//!   every later change waits out the debounce window
//! - A new trigger cancels the pending or in-flight request; a superseded
//!   response is dropped without touching state
//! - While a suggestion is shown and the caret has not moved, triggers are
//!   ignored
//!
//! Triggers spawn tokio tasks and must run inside a runtime.

use crate::block::{split_at_char, Block, BlockType};
use crate::collaborators::{Autocompleter, SuggestionRequest};
use crate::config::EditorConfig;
use crate::selection::Caret;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Build `pre_context` / `post_context` around the caret
pub fn compute_surrounding_content(blocks: &[Block], caret: Caret) -> SuggestionRequest {
    if blocks.is_empty() {
        return SuggestionRequest::default();
    }

    let index = caret.block_index.min(blocks.len());
    let current = blocks.get(index).map(|b| b.content.as_str()).unwrap_or_default();
    let (before_caret, after_caret) = split_at_char(current, caret.offset);

    let above = blocks[..index]
        .iter()
        .map(Block::to_markdown)
        .collect::<Vec<_>>()
        .join("\n");
    let below = blocks
        .get(index + 1..)
        .unwrap_or_default()
        .iter()
        .map(Block::to_markdown)
        .collect::<Vec<_>>()
        .join("\n");

    let pre_context = if !above.is_empty() && !before_caret.is_empty() {
        format!("{above}\n{before_caret}")
    } else {
        format!("{above}{before_caret}")
    };
    let post_context = if !below.is_empty() && !after_caret.is_empty() {
        format!("{after_caret}\n{below}")
    } else {
        format!("{after_caret}{below}")
    };

    SuggestionRequest {
        pre_context,
        post_context,
    }
}

/// Editor state a trigger is evaluated against
#[derive(Debug, Clone, Copy)]
pub struct TriggerInput<'a> {
    pub blocks: &'a [Block],
    pub caret: Option<Caret>,
    pub focused: Option<usize>,
    /// Bypass the block-type, suppression and retention guards
    pub force: bool,
}

#[derive(Default)]
struct SuggestionState {
    suggestion: Option<String>,
    in_flight: bool,
    suppressed: bool,
    caret_at_suggestion: Option<Caret>,
    last_caret: Option<Caret>,
    had_context: bool,
    generation: u64,
    task: Option<JoinHandle<()>>,
}

/// Debounced, cancellable suggestion fetcher for one editing session
pub struct SuggestionEngine {
    state: Arc<Mutex<SuggestionState>>,
    autocompleter: Arc<dyn Autocompleter>,
    enabled_types: Vec<BlockType>,
    debounce: Duration,
    updates: Arc<watch::Sender<Option<String>>>,
}

impl SuggestionEngine {
    pub fn new(autocompleter: Arc<dyn Autocompleter>, config: &EditorConfig) -> Self {
        let (updates, _) = watch::channel(None);
        Self {
            state: Arc::new(Mutex::new(SuggestionState::default())),
            autocompleter,
            enabled_types: config.suggestion_block_types.clone(),
            debounce: config.suggestion_debounce(),
            updates: Arc::new(updates),
        }
    }

    /// Currently shown suggestion
    pub fn suggestion(&self) -> Option<String> {
        self.state.lock().suggestion.clone()
    }

    pub fn in_flight(&self) -> bool {
        self.state.lock().in_flight
    }

    pub fn is_suppressed(&self) -> bool {
        self.state.lock().suppressed
    }

    /// Receiver notified every time the shown suggestion changes
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.updates.subscribe()
    }

    fn set_suggestion(state: &mut SuggestionState, updates: &watch::Sender<Option<String>>, value: Option<String>) {
        if state.suggestion != value {
            state.suggestion = value.clone();
            updates.send_replace(value);
        }
    }

    fn cancel_pending(state: &mut SuggestionState) {
        state.generation += 1;
        state.in_flight = false;
        if let Some(task) = state.task.take() {
            task.abort();
        }
    }

    /// Re-evaluate after a content, caret or focus change
    pub fn trigger(&self, input: TriggerInput<'_>) {
        let mut state = self.state.lock();
        Self::cancel_pending(&mut state);
        state.last_caret = input.caret;

        let Some(caret) = input.caret else {
            Self::set_suggestion(&mut state, &self.updates, None);
            return;
        };
        if input.focused != Some(caret.block_index) {
            Self::set_suggestion(&mut state, &self.updates, None);
            return;
        }
        let block_type = input.blocks.get(caret.block_index).map(|b| b.block_type);
        let enabled = block_type.is_some_and(|ty| self.enabled_types.contains(&ty));
        if !input.force && !enabled {
            Self::set_suggestion(&mut state, &self.updates, None);
            return;
        }

        let caret_changed = state.caret_at_suggestion != Some(caret);

        if !input.force && state.suppressed {
            if !caret_changed {
                Self::set_suggestion(&mut state, &self.updates, None);
                return;
            }
            tracing::debug!("suggestion suppression lifted");
            state.suppressed = false;
        }

        if !input.force && state.suggestion.is_some() && !caret_changed {
            return;
        }

        let request = compute_surrounding_content(input.blocks, caret);
        let has_context = !request.pre_context.is_empty() || !request.post_context.is_empty();
        let had_context = std::mem::replace(&mut state.had_context, has_context);

        let leading_edge = !input.force && state.suggestion.is_none() && !had_context && has_context;
        let delay = (!leading_edge).then_some(self.debounce);

        let generation = state.generation;
        let task = tokio::spawn(Self::fetch(
            self.state.clone(),
            self.autocompleter.clone(),
            self.updates.clone(),
            FetchJob {
                generation,
                caret,
                request,
                delay,
                skip_empty: !input.force && !has_context,
            },
        ));
        state.task = Some(task);
        tracing::debug!(generation, leading_edge, "suggestion scheduled");
    }

    async fn fetch(
        state: Arc<Mutex<SuggestionState>>,
        autocompleter: Arc<dyn Autocompleter>,
        updates: Arc<watch::Sender<Option<String>>>,
        job: FetchJob,
    ) {
        if let Some(delay) = job.delay {
            tokio::time::sleep(delay).await;
        }

        {
            let mut state = state.lock();
            if state.generation != job.generation {
                return;
            }
            if job.skip_empty {
                Self::set_suggestion(&mut state, &updates, None);
                return;
            }
            state.in_flight = true;
        }

        let result = autocompleter.complete(job.request).await;

        let mut state = state.lock();
        if state.generation != job.generation {
            tracing::debug!(generation = job.generation, "discarding superseded suggestion");
            return;
        }
        state.in_flight = false;
        state.task = None;

        match result {
            Ok(response) => {
                let text = response.suggestion.trim();
                if text.is_empty() {
                    Self::set_suggestion(&mut state, &updates, None);
                } else {
                    state.caret_at_suggestion = Some(job.caret);
                    Self::set_suggestion(&mut state, &updates, Some(text.to_string()));
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "suggestion request failed");
                Self::set_suggestion(&mut state, &updates, None);
            }
        }
    }

    /// Take the shown suggestion for insertion at the caret
    pub fn accept(&self) -> Option<String> {
        let mut state = self.state.lock();
        let accepted = state.suggestion.clone();
        Self::set_suggestion(&mut state, &self.updates, None);
        accepted
    }

    /// Hide the suggestion and suppress new ones until the caret moves
    pub fn reject(&self) {
        let mut state = self.state.lock();
        Self::cancel_pending(&mut state);
        state.suppressed = true;
        state.caret_at_suggestion = state.last_caret;
        Self::set_suggestion(&mut state, &self.updates, None);
    }

    pub fn clear(&self) {
        let mut state = self.state.lock();
        Self::set_suggestion(&mut state, &self.updates, None);
    }

    /// Cancel pending work (session teardown)
    pub fn shutdown(&self) {
        Self::cancel_pending(&mut self.state.lock());
    }
}

impl Drop for SuggestionEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct FetchJob {
    generation: u64,
    caret: Caret,
    request: SuggestionRequest,
    delay: Option<Duration>,
    skip_empty: bool,
}
