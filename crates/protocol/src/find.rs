use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::path::{CommandTreeNode, StateTreeNode};

/// Where a search starts: which tree, and the cursor within it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FindFrom {
    CommandTreeNode(CommandTreeNode),
    StateTreeNode(StateTreeNode),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FindRequest {
    /// Text or regular expression to look for in node labels
    pub text: String,

    pub is_case_sensitive: bool,

    /// Treat `text` as a regular expression
    pub is_regex: bool,

    /// Search towards the start of the tree
    pub backwards: bool,

    /// Continue from the opposite end once the tree boundary is reached
    pub wrap: bool,

    /// Maximum number of results; 0 means unbounded
    pub max_items: u32,

    pub from: Option<FindFrom>,
}

/// One streamed search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FindResponse {
    pub command_tree_node: CommandTreeNode,
}

/// Why a search stopped before running out of nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Traversal ran to completion.
    #[default]
    None,
    MaxItemsReached,
    /// The wrap pass arrived back at the original cursor.
    WrapBoundaryReached,
    Cancelled,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FindSummary {
    pub matches: u32,
    pub stopped: StopReason,
}
