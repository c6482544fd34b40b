//! UI error types.

use thiserror::Error;

use crate::id::ItemId;

#[derive(Debug, Error)]
pub enum UiError {
    #[error("out of memory reserving {requested} bytes for text")]
    OutOfMemory { requested: usize },

    #[error("event queue full ({capacity} slots)")]
    QueueFull { capacity: usize },

    #[error("no live item with id {0}")]
    UnknownItem(ItemId),

    #[error("item {0} is not a container")]
    NotAContainer(ItemId),

    #[error("item {0} is not a list")]
    NotAList(ItemId),

    #[error("item {0} has no text")]
    NotText(ItemId),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<serde_json::Error> for UiError {
    fn from(err: serde_json::Error) -> Self {
        UiError::Config(err.to_string())
    }
}

pub type Result<T, E = UiError> = std::result::Result<T, E>;
