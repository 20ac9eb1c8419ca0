use thiserror::Error;

use crate::model::ModelError;

/// Errors that end a conversation.
///
/// Tool failures are not here; they go back to the model as failed tool
/// results.
#[derive(Debug, Error)]
pub enum ConversationError {
    /// Model inference failed.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The model produced neither text nor a tool call.
    #[error("model returned an empty response")]
    EmptyResponse,
}

pub type Result<T> = std::result::Result<T, ConversationError>;
