use capture_protocol::{CaptureId, TreeId};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TreeError};
use crate::tree::CommandTree;
use crate::types::{content_id, Capture, Group, Node};

/// Half-open run of commands `[start, end)` shown as one named group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRange {
    pub name: String,
    pub start: u64,
    pub end: u64,
}

impl GroupRange {
    pub fn new(name: impl Into<String>, start: u64, end: u64) -> Self {
        Self {
            name: name.into(),
            start,
            end,
        }
    }

    fn invalid(&self, reason: impl Into<String>) -> TreeError {
        TreeError::InvalidGroup {
            name: self.name.clone(),
            start: self.start,
            end: self.end,
            reason: reason.into(),
        }
    }
}

/// Recipe for a command tree: a capture plus the groups layered over it.
///
/// Groups may nest but must not partially overlap. Commands not covered by any
/// group sit directly under the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSpec {
    pub capture: CaptureId,
    #[serde(default)]
    pub groups: Vec<GroupRange>,
}

impl TreeSpec {
    pub fn new(capture: CaptureId, groups: Vec<GroupRange>) -> Self {
        Self { capture, groups }
    }

    pub fn id(&self) -> Result<TreeId> {
        content_id("command-tree", self)
    }

    pub fn build(&self, capture: &Capture) -> Result<CommandTree> {
        let len = capture.commands.len() as u64;
        for range in &self.groups {
            if range.start > range.end {
                return Err(range.invalid("start is after end"));
            }
            if range.end > len {
                return Err(range.invalid(format!("capture has only {len} commands")));
            }
        }

        // Outer groups first when two start together.
        let mut ranges: Vec<&GroupRange> = self.groups.iter().collect();
        ranges.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| b.end.cmp(&a.end)));

        let mut builder = Builder {
            open: vec![(Group::new(capture.name.clone()), len)],
            next: 0,
        };
        for range in ranges {
            builder.fill(range.start);
            let parent_end = builder.open.last().map_or(len, |(_, end)| *end);
            if range.end > parent_end {
                return Err(range.invalid("overlaps an enclosing group"));
            }
            builder.open.push((Group::new(range.name.clone()), range.end));
        }
        builder.fill(len);
        builder.close_to(1);

        let root = builder
            .open
            .pop()
            .map(|(group, _)| group)
            .unwrap_or_default();
        Ok(CommandTree::new(self.capture, root))
    }
}

struct Builder {
    /// Stack of groups still accepting items, with their end index. The root is at the bottom.
    open: Vec<(Group, u64)>,
    next: u64,
}

impl Builder {
    /// Append commands up to `until`, closing groups as their range ends.
    fn fill(&mut self, until: u64) {
        loop {
            self.close_ended();
            if self.next >= until {
                return;
            }
            let top_end = self.open.last().map_or(until, |(_, end)| *end);
            let stop = until.min(top_end);
            let Some((top, _)) = self.open.last_mut() else {
                return;
            };
            while self.next < stop {
                top.items.push(Node::Command(self.next));
                self.next += 1;
            }
        }
    }

    fn close_ended(&mut self) {
        while self.open.len() > 1 && self.open.last().is_some_and(|(_, end)| *end <= self.next) {
            self.close_top();
        }
    }

    fn close_to(&mut self, depth: usize) {
        while self.open.len() > depth.max(1) {
            self.close_top();
        }
    }

    fn close_top(&mut self) {
        if let Some((group, _)) = self.open.pop() {
            if let Some((parent, _)) = self.open.last_mut() {
                parent.items.push(Node::Group(group));
            }
        }
    }
}
