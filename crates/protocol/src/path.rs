use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::id::TreeId;

/// Path of indices from a tree root to one node.
///
/// The empty address means "no cursor": a search starting there begins at the
/// first (or, searching backwards, the last) node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct NodeAddress(Vec<u64>);

impl NodeAddress {
    pub fn new(indices: Vec<u64>) -> Self {
        Self(indices)
    }

    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn indices(&self) -> &[u64] {
        &self.0
    }

    pub fn into_indices(self) -> Vec<u64> {
        self.0
    }
}

impl From<Vec<u64>> for NodeAddress {
    fn from(indices: Vec<u64>) -> Self {
        Self(indices)
    }
}

impl From<&[u64]> for NodeAddress {
    fn from(indices: &[u64]) -> Self {
        Self(indices.to_vec())
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// Parses dotted form: `""` is the empty address, `"1.0.3"` is `[1, 0, 3]`.
impl FromStr for NodeAddress {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::root());
        }
        s.split('.')
            .map(|part| part.trim().parse::<u64>())
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

/// A node of a command tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CommandTreeNode {
    #[schemars(with = "String")]
    pub tree: TreeId,
    #[serde(default)]
    pub indices: NodeAddress,
}

/// A node of a state tree. Searching state trees is not supported yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StateTreeNode {
    #[schemars(with = "String")]
    pub tree: TreeId,
    #[serde(default)]
    pub indices: NodeAddress,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dotted() {
        assert_eq!("".parse::<NodeAddress>().unwrap(), NodeAddress::root());
        assert_eq!(
            "1.0.3".parse::<NodeAddress>().unwrap(),
            NodeAddress::new(vec![1, 0, 3])
        );
        assert!("1..2".parse::<NodeAddress>().is_err());
        assert!("-1".parse::<NodeAddress>().is_err());
    }

    #[test]
    fn test_depth_and_display() {
        let addr = NodeAddress::new(vec![2, 5]);
        assert_eq!(addr.indices(), &[2, 5]);
        assert_eq!(addr.depth(), 2);
        assert_eq!(addr.to_string(), "[2, 5]");
    }

    #[test]
    fn test_equality_is_elementwise() {
        assert_eq!(NodeAddress::from(vec![1, 2]), NodeAddress::from(&[1u64, 2][..]));
        assert_ne!(NodeAddress::from(vec![1, 2]), NodeAddress::from(vec![1]));
        assert_ne!(NodeAddress::from(vec![1]), NodeAddress::root());
    }
}
