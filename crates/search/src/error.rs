use capture_protocol::{ErrorCode, ErrorEnvelope};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unimplemented: {0}")]
    Unimplemented(String),

    #[error("Couldn't compile regular expression: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Resolution error: {0}")]
    Resolution(#[from] capture_tree::ResolveError),

    #[error("Traversal error: {0}")]
    Traversal(#[from] capture_tree::TreeError),

    #[error("Command {index} is not in capture '{capture}'")]
    CommandOutOfRange { index: u64, capture: String },

    /// Error returned by the result handler, passed through unchanged.
    #[error(transparent)]
    Handler(anyhow::Error),
}

impl SearchError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SearchError::InvalidArgument(_) => ErrorCode::InvalidArgument,
            SearchError::Unimplemented(_) => ErrorCode::Unimplemented,
            SearchError::InvalidPattern(_) => ErrorCode::InvalidPattern,
            SearchError::Resolution(_) | SearchError::CommandOutOfRange { .. } => {
                ErrorCode::Resolution
            }
            SearchError::Traversal(_) => ErrorCode::Traversal,
            SearchError::Handler(_) => ErrorCode::Handler,
        }
    }

    pub fn to_envelope(&self) -> ErrorEnvelope {
        let envelope = ErrorEnvelope::new(self.code(), self.to_string());
        match self {
            SearchError::InvalidPattern(_) => {
                envelope.with_hint("Escape regex metacharacters or search without regex")
            }
            SearchError::InvalidArgument(_) => {
                envelope.with_hint("Set `from` to a command tree node")
            }
            _ => envelope,
        }
    }
}
