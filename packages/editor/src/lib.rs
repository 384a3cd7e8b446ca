//! # Pagesmith Editor
//!
//! Block-based document editing engine for Pagesmith pages.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ markdown: page body ↔ typed blocks          │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ session: Document + history + selection     │
//! │  - Structural edits with undo checkpoints   │
//! │  - Clipboard ingestion                      │
//! │  - Overflow splitting                       │
//! │  - Command blocks                           │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ background: suggestions, autosave, Q&A      │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Blocks are the source of truth**: markdown is derived on save
//! 2. **Index 0 is the title**: it can never be deleted or displaced
//! 3. **Checkpoint before structure**: typing is not an undo step
//! 4. **Collaborators are traits**: storage, completion and Q&A are injected
//! 5. **Late results never win**: superseded async work is discarded
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pagesmith_editor::{EditSession, EditorConfig, BlockType, ClipboardPayload};
//!
//! let config = EditorConfig::load(".")?;
//! let mut session = EditSession::load(&store, "page-1", &config).await?;
//!
//! session.insert_block_below(0, BlockType::Text, "hello");
//! session.paste(&ClipboardPayload::plain("a\nb"));
//! session.undo();
//!
//! println!("{}", session.document().body_markdown());
//! ```

mod autosave;
mod block;
mod clipboard;
mod collaborators;
mod command;
mod config;
mod document;
mod errors;
mod html;
mod id_generator;
mod markdown;
mod mentions;
mod overflow;
mod selection;
mod session;
mod suggestion;
mod undo_stack;

pub use autosave::{format_time_since, AbortOnDrop, AutoSaveCoordinator};
pub use block::{Block, BlockId, BlockPayload, BlockType, BlockUpdate, UnknownBlockType, CODE_FENCE};
pub use clipboard::{plan_paste, resolve_text, ClipboardPayload, PasteOutcome, PastePlan};
pub use collaborators::{
    Autocompleter, CollaboratorResult, DefinitionSource, MentionedDefinition, NodeType, PageRecord,
    PageStore, PageUpdate, QaClient, QaRequest, QaResponse, SuggestionRequest, SuggestionResponse,
    SymbolRecord,
};
pub use command::{answer_lines, compose_prompt, CommandDelegate, CommandState, FETCH_FAILED, NO_RESPONSE};
pub use config::{EditorConfig, DEFAULT_CONFIG_NAME};
pub use document::Document;
pub use errors::{CollaboratorError, EditorError, EditorResult};
pub use html::{has_markdown_markup, html_to_markdown};
pub use id_generator::{get_page_seed, IdGenerator};
pub use markdown::{parse_blocks, serialize_blocks, serialize_payloads};
pub use mentions::{
    complete_mention, extract_mentions, mention_query_at, rank_matches, MentionResolver, MentionSpan,
};
pub use overflow::{MonospaceMeasurer, OverflowSplit, OverflowSplitter, StyleContext, TextMeasurer};
pub use selection::{Caret, ClickModifiers, Selection};
pub use session::{EditSession, SessionEvent, SessionHandle};
pub use suggestion::{compute_surrounding_content, SuggestionEngine, TriggerInput};
pub use undo_stack::{CheckpointId, Snapshot, UndoStack, DEFAULT_HISTORY_LIMIT};
