use capture_protocol::{Id, NodeAddress};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TreeError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("No node at address {0}")]
    InvalidAddress(NodeAddress),

    #[error("Invalid group '{name}' [{start}, {end}): {reason}")]
    InvalidGroup {
        name: String,
        start: u64,
        end: u64,
        reason: String,
    },

    #[error("Encoding error: {0}")]
    Encode(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Capture not found: {0}")]
    CaptureNotFound(Id),

    #[error("Command tree not found: {0}")]
    TreeNotFound(Id),

    #[error("Failed to build command tree {id}: {source}")]
    Build {
        id: Id,
        #[source]
        source: TreeError,
    },
}
