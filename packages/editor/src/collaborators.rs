//! # Collaborators
//!
//! Contracts for the services the editor talks to. Implementations live
//! outside this crate (HTTP clients, file-backed stores, test doubles);
//! the editor only depends on these traits and wire types.
//!
//! | Trait | Request | Response |
//! |---|---|---|
//! | [`PageStore`] | page id / [`PageUpdate`] | [`PageRecord`] |
//! | [`Autocompleter`] | [`SuggestionRequest`] | [`SuggestionResponse`] |
//! | [`QaClient`] | [`QaRequest`] | [`QaResponse`] |
//! | [`DefinitionSource`] | repository id | `Vec<SymbolRecord>` |

use crate::errors::CollaboratorError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type CollaboratorResult<T> = Result<T, CollaboratorError>;

/// Persisted page: title plus serialized markdown body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageUpdate {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionRequest {
    pub pre_context: String,
    pub post_context: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionResponse {
    pub suggestion: String,
}

/// Kind of symbol in the repository index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    File,
    Class,
    Function,
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NodeType::File => "file",
            NodeType::Class => "class",
            NodeType::Function => "function",
        })
    }
}

/// One entry of the repository symbol index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolRecord {
    pub node_type: NodeType,
    pub node_name: String,
    pub file_name: String,
    #[serde(default)]
    pub code_snippet: String,
    pub start_end_lines: [u32; 2],
}

impl SymbolRecord {
    /// Identity used for de-duplication
    pub fn key(&self) -> (NodeType, &str, &str) {
        (self.node_type, &self.node_name, &self.file_name)
    }
}

/// Symbol reference attached to a Q&A request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionedDefinition {
    pub node_name: String,
    pub file_name: String,
    pub start_end_lines: [u32; 2],
    pub node_type: NodeType,
}

impl From<&SymbolRecord> for MentionedDefinition {
    fn from(symbol: &SymbolRecord) -> Self {
        Self {
            node_name: symbol.node_name.clone(),
            file_name: symbol.file_name.clone(),
            start_end_lines: symbol.start_end_lines,
            node_type: symbol.node_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaRequest {
    pub query: String,
    pub page_id: String,
    pub repo_hash: String,
    pub mentioned_definitions: Vec<MentionedDefinition>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaResponse {
    pub answer: String,
}

/// Page persistence
#[async_trait]
pub trait PageStore: Send + Sync {
    async fn get(&self, page_id: &str) -> CollaboratorResult<PageRecord>;
    async fn update(&self, page_id: &str, update: PageUpdate) -> CollaboratorResult<()>;
}

/// Inline completion service
#[async_trait]
pub trait Autocompleter: Send + Sync {
    async fn complete(&self, request: SuggestionRequest) -> CollaboratorResult<SuggestionResponse>;
}

/// Structured question answering over a repository
#[async_trait]
pub trait QaClient: Send + Sync {
    async fn ask(&self, request: QaRequest) -> CollaboratorResult<QaResponse>;
}

/// Repository symbol index
#[async_trait]
pub trait DefinitionSource: Send + Sync {
    async fn get_definitions(&self, repo_id: &str) -> CollaboratorResult<Vec<SymbolRecord>>;
}
