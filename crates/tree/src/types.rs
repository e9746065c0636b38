use capture_protocol::{CaptureId, Id};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::{Result, TreeError};

/// Named argument of a recorded call, already rendered to text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub value: String,
}

/// One recorded API call (an "atom")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Function name (e.g., "glDrawArrays")
    pub name: String,

    #[serde(default)]
    pub params: Vec<Param>,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push(Param {
            name: name.into(),
            value: value.into(),
        });
        self
    }
}

/// Renders as `name(p1: v1, p2: v2)`; this is the label a command shows in the tree
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", param.name, param.value)?;
        }
        f.write_str(")")
    }
}

/// A captured, linear stream of API calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capture {
    pub name: String,
    pub commands: Vec<Command>,
}

impl Capture {
    pub fn new(name: impl Into<String>, commands: Vec<Command>) -> Self {
        Self {
            name: name.into(),
            commands,
        }
    }

    pub fn command(&self, index: u64) -> Option<&Command> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.commands.get(i))
    }

    /// Content id: identical captures share an id
    pub fn id(&self) -> Result<CaptureId> {
        content_id("capture", self)
    }
}

/// Node in a command tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Named run of commands and sub-groups
    Group(Group),

    /// Index into the capture's command list
    Command(u64),
}

impl Node {
    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Node::Group(group) => Some(group),
            Node::Command(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    pub items: Vec<Node>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
        }
    }

    pub fn with_items(name: impl Into<String>, items: Vec<Node>) -> Self {
        Self {
            name: name.into(),
            items,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, index: u64) -> Option<&Node> {
        usize::try_from(index).ok().and_then(|i| self.items.get(i))
    }
}

pub(crate) fn content_id<T: Serialize>(domain: &str, value: &T) -> Result<Id> {
    let encoded = serde_json::to_vec(value).map_err(|e| TreeError::Encode(e.to_string()))?;
    let mut hasher = Sha256::new();
    hasher.update(domain.as_bytes());
    hasher.update([0u8]);
    hasher.update(&encoded);
    Ok(Id::from_bytes(hasher.finalize().into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_display() {
        let cmd = Command::new("glDrawArrays")
            .param("mode", "GL_TRIANGLES")
            .param("first", "0")
            .param("count", "3");
        assert_eq!(
            cmd.to_string(),
            "glDrawArrays(mode: GL_TRIANGLES, first: 0, count: 3)"
        );
        assert_eq!(Command::new("glFlush").to_string(), "glFlush()");
    }

    #[test]
    fn test_capture_id_is_content_addressed() {
        let a = Capture::new("frame", vec![Command::new("glClear")]);
        let b = Capture::new("frame", vec![Command::new("glClear")]);
        let c = Capture::new("frame", vec![Command::new("glFlush")]);

        assert_eq!(a.id().unwrap(), b.id().unwrap());
        assert_ne!(a.id().unwrap(), c.id().unwrap());
    }

    #[test]
    fn test_command_lookup_out_of_range() {
        let capture = Capture::new("frame", vec![Command::new("glClear")]);
        assert!(capture.command(0).is_some());
        assert!(capture.command(1).is_none());
        assert!(capture.command(u64::MAX).is_none());
    }
}
