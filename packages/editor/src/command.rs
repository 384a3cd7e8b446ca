//! # Command Blocks
//!
//! A command block holds a question for the Q&A collaborator. On submit the
//! surrounding page is packed into a tagged prompt, mentioned symbols are
//! attached as a side channel, and the answer is inserted below the block
//! one line per `text` block.
//!
//! ```text
//! <content_above>        blocks before the command block
//! <user_query>           the command block's text
//! <highlighted_selection> | <response>
//! <content_below>        blocks after the command block
//! ```
//!
//! Command blocks are never persisted.

use crate::block::{BlockId, BlockType};
use crate::collaborators::{QaClient, QaRequest};
use crate::errors::{EditorError, EditorResult};
use crate::mentions::MentionResolver;
use crate::session::SessionHandle;
use crate::undo_stack::CheckpointId;
use std::sync::Arc;

pub const NO_RESPONSE: &str = "No response received.";
pub const FETCH_FAILED: &str = "Failed to fetch response";

/// Per-block command status
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandState {
    /// A submission is waiting for its answer
    pub loading: bool,
    /// Block-scoped error shown next to the block
    pub error: Option<String>,
    /// Successful submissions so far
    pub inserted_count: usize,
    /// Checkpoint taken right before the last answer was inserted
    pub last_checkpoint: Option<CheckpointId>,
    /// Contents of the blocks selected when the command block was opened
    pub highlight: Option<String>,
}

impl CommandState {
    pub fn with_highlight(highlight: Option<String>) -> Self {
        Self {
            highlight,
            ..Self::default()
        }
    }
}

/// Compose the tagged prompt for the command block at `index`
pub fn compose_prompt(contents: &[&str], index: usize, query: &str, highlight: Option<&str>) -> String {
    let index = index.min(contents.len());
    let above = contents[..index].join("\n\n");
    let below = contents.get(index + 1..).unwrap_or_default().join("\n\n");

    let middle = match highlight {
        Some(selection) => format!("<highlighted_selection>\n{selection}\n</highlighted_selection>"),
        None => "<response></response>".to_string(),
    };

    format!(
        "<content_above>\n{above}\n</content_above>\n\
         <user_query>\n{query}\n</user_query>\n\
         {middle}\n\
         <content_below>\n{below}\n</content_below>"
    )
}

/// Answer text split into one line per block
pub fn answer_lines(answer: &str) -> Vec<String> {
    let answer = answer.trim();
    let answer = if answer.is_empty() { NO_RESPONSE } else { answer };

    answer
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}

/// Submits command blocks to the Q&A collaborator
pub struct CommandDelegate {
    qa: Arc<dyn QaClient>,
    mentions: Option<Arc<MentionResolver>>,
    page_id: String,
    repo_hash: String,
}

impl CommandDelegate {
    pub fn new(qa: Arc<dyn QaClient>, page_id: impl Into<String>, repo_hash: impl Into<String>) -> Self {
        Self {
            qa,
            mentions: None,
            page_id: page_id.into(),
            repo_hash: repo_hash.into(),
        }
    }

    pub fn with_mentions(mut self, resolver: Arc<MentionResolver>) -> Self {
        self.mentions = Some(resolver);
        self
    }

    fn prepare(&self, session: &SessionHandle, block_id: &BlockId) -> EditorResult<QaRequest> {
        let mut session = session.lock();

        let index = session
            .document()
            .position(block_id)
            .ok_or_else(|| EditorError::BlockNotFound(block_id.clone()))?;
        let block = &session.document().blocks()[index];
        if block.block_type != BlockType::Command {
            return Err(EditorError::NotACommandBlock(block_id.clone()));
        }
        let query = block.content.trim().to_string();

        let state = session.command_state_mut(block_id);
        if state.loading {
            return Err(EditorError::CommandBusy(block_id.clone()));
        }
        if query.is_empty() {
            state.error = Some(EditorError::EmptyQuery.to_string());
            session.notify_command(block_id);
            return Err(EditorError::EmptyQuery);
        }
        state.loading = true;
        state.error = None;
        let highlight = state.highlight.clone();

        let contents: Vec<&str> = session
            .document()
            .blocks()
            .iter()
            .map(|b| b.content.as_str())
            .collect();
        let prompt = compose_prompt(&contents, index, &query, highlight.as_deref());

        let mentioned_definitions = match &self.mentions {
            Some(resolver) => {
                resolver.mentioned_definitions(std::iter::once(query.as_str()).chain(contents.iter().copied()))
            }
            None => Vec::new(),
        };

        session.notify_command(block_id);

        Ok(QaRequest {
            query: prompt,
            page_id: self.page_id.clone(),
            repo_hash: self.repo_hash.clone(),
            mentioned_definitions,
        })
    }

    /// Ask the question in a command block and insert the answer below it
    ///
    /// Returns the number of inserted blocks; zero when the command block
    /// was removed while the request was in flight.
    pub async fn submit(&self, session: &SessionHandle, block_id: &BlockId) -> EditorResult<usize> {
        if let Some(resolver) = &self.mentions {
            // A stale index still resolves from the previous cache
            let _ = resolver.refresh().await;
        }

        let request = self.prepare(session, block_id)?;
        tracing::info!(
            page_id = %self.page_id,
            block_id = %block_id,
            mentions = request.mentioned_definitions.len(),
            "submitting command"
        );

        let result = self.qa.ask(request).await;

        let mut session = session.lock();
        match result {
            Ok(response) => {
                let lines = answer_lines(&response.answer);
                let count = lines.len();
                match session.insert_command_answer(block_id, lines) {
                    Some(_) => Ok(count),
                    None => {
                        tracing::info!(block_id = %block_id, "command block removed, discarding answer");
                        Ok(0)
                    }
                }
            }
            Err(e) => {
                tracing::error!(block_id = %block_id, error = %e, "command failed");
                session.fail_command(block_id, FETCH_FAILED);
                Err(e.into())
            }
        }
    }
}
