//! Error types for the editor

use crate::block::BlockId;
use thiserror::Error;

/// Failure reported by an external collaborator
#[derive(Error, Debug)]
pub enum CollaboratorError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(String),
}

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Block not found: {0}")]
    BlockNotFound(BlockId),

    #[error("Block {0} is not a command block")]
    NotACommandBlock(BlockId),

    #[error("Command block {0} is already waiting for an answer")]
    CommandBusy(BlockId),

    #[error("Please enter a value")]
    EmptyQuery,
}

pub type EditorResult<T> = Result<T, EditorError>;
