use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

mod find;
mod id;
mod path;

pub use find::{FindFrom, FindRequest, FindResponse, FindSummary, StopReason};
pub use id::{CaptureId, Id, IdParseError, TreeId, ID_LEN};
pub use path::{CommandTreeNode, NodeAddress, StateTreeNode};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidArgument,
    Unimplemented,
    InvalidPattern,
    Resolution,
    Traversal,
    Handler,
}

#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct ErrorEnvelope {
    pub code: ErrorCode,
    pub message: String,
    pub hint: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}
