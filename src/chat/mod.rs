pub mod context;
pub mod orchestrator;

use thiserror::Error;

use crate::db::StorageError;

pub use context::ContextBuilder;
pub use orchestrator::{ChatReply, Orchestrator};

/// Failures that reach the caller. Completion failures are absent on
/// purpose: the orchestrator absorbs them into the fallback reply.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("invalid message: {0}")]
    Validation(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
