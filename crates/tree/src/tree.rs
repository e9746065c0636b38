use capture_protocol::{CaptureId, NodeAddress};
use std::ops::ControlFlow;
use tokio_util::sync::CancellationToken;

use crate::error::TreeError;
use crate::types::{Group, Node};

/// What a traversal visitor wants to happen next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    Continue,
    /// End the traversal successfully.
    Stop,
}

/// How a traversal that did not fail ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    /// Every node from the start to the boundary was visited.
    Completed,
    /// The visitor returned [`Visit::Stop`].
    Stopped,
    /// The cancellation token was observed between two visits.
    Cancelled,
}

/// Hierarchical view over a capture's command stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTree {
    /// Capture whose commands the `Node::Command` leaves index into
    pub capture: CaptureId,
    pub root: Group,
}

impl CommandTree {
    pub fn new(capture: CaptureId, root: Group) -> Self {
        Self { capture, root }
    }

    /// Number of top-level items. `[count() - 1]` addresses the last one.
    pub fn count(&self) -> u64 {
        self.root.len() as u64
    }

    /// Look up a node; the empty address names no node
    pub fn node(&self, address: &NodeAddress) -> Option<&Node> {
        let (first, rest) = address.indices().split_first()?;
        let mut node = self.root.item(*first)?;
        for index in rest {
            node = node.as_group()?.item(*index)?;
        }
        Some(node)
    }

    /// Visit nodes in document order, or in its exact reverse when `backwards`.
    ///
    /// Document order is pre-order: a group comes before its children. Both
    /// directions begin at `start` itself, so a backward walk from a group never
    /// visits that group's descendants. An empty `start` means the first (last)
    /// node of the whole tree.
    ///
    /// `cancel` is polled before every visit. Visitor errors abort the walk and
    /// are returned unchanged.
    pub fn traverse<E, F>(
        &self,
        backwards: bool,
        start: &NodeAddress,
        cancel: &CancellationToken,
        visit: F,
    ) -> Result<Traversal, E>
    where
        E: From<TreeError>,
        F: FnMut(&NodeAddress, &Node) -> Result<Visit, E>,
    {
        if !start.is_empty() && self.node(start).is_none() {
            return Err(TreeError::InvalidAddress(start.clone()).into());
        }

        let mut walker = Walker {
            cancel,
            visit,
            address: Vec::with_capacity(start.depth().max(4)),
        };
        let flow = if backwards {
            walker.backward::<E>(&self.root, start.indices())?
        } else {
            walker.forward::<E>(&self.root, start.indices())?
        };
        Ok(match flow {
            ControlFlow::Continue(()) => Traversal::Completed,
            ControlFlow::Break(end) => end,
        })
    }
}

struct Walker<'a, F> {
    cancel: &'a CancellationToken,
    visit: F,
    address: Vec<u64>,
}

impl<F> Walker<'_, F> {
    fn emit<E>(&mut self, node: &Node) -> Result<ControlFlow<Traversal>, E>
    where
        F: FnMut(&NodeAddress, &Node) -> Result<Visit, E>,
    {
        if self.cancel.is_cancelled() {
            return Ok(ControlFlow::Break(Traversal::Cancelled));
        }
        let address = NodeAddress::from(self.address.as_slice());
        match (self.visit)(&address, node)? {
            Visit::Continue => Ok(ControlFlow::Continue(())),
            Visit::Stop => Ok(ControlFlow::Break(Traversal::Stopped)),
        }
    }

    fn forward<E>(&mut self, group: &Group, start: &[u64]) -> Result<ControlFlow<Traversal>, E>
    where
        F: FnMut(&NodeAddress, &Node) -> Result<Visit, E>,
    {
        let first = start.first().copied().unwrap_or(0);
        for (index, node) in (first..).zip(group.items.iter().skip(first as usize)) {
            // Only the item on the start path resumes part-way through its subtree.
            let rest = if index == first && !start.is_empty() {
                &start[1..]
            } else {
                &[]
            };

            self.address.push(index);
            let flow = self.forward_node::<E>(node, rest);
            self.address.pop();
            if let ControlFlow::Break(end) = flow? {
                return Ok(ControlFlow::Break(end));
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    fn forward_node<E>(&mut self, node: &Node, rest: &[u64]) -> Result<ControlFlow<Traversal>, E>
    where
        F: FnMut(&NodeAddress, &Node) -> Result<Visit, E>,
    {
        if rest.is_empty() {
            if let ControlFlow::Break(end) = self.emit::<E>(node)? {
                return Ok(ControlFlow::Break(end));
            }
        }
        match node {
            Node::Group(group) => self.forward::<E>(group, rest),
            Node::Command(_) => Ok(ControlFlow::Continue(())),
        }
    }

    /// Reverse pre-order over `group`. A non-empty `start` begins at that
    /// descendant itself; its own subtree follows it in document order and is
    /// not visited.
    fn backward<E>(&mut self, group: &Group, start: &[u64]) -> Result<ControlFlow<Traversal>, E>
    where
        F: FnMut(&NodeAddress, &Node) -> Result<Visit, E>,
    {
        let end = match start.first() {
            Some(first) => (*first as usize + 1).min(group.items.len()),
            None => group.items.len(),
        };
        for index in (0..end).rev() {
            let node = &group.items[index];
            let index = index as u64;
            let path = match start.split_first() {
                Some((first, rest)) if *first == index => Some(rest),
                _ => None,
            };

            self.address.push(index);
            let flow = self.backward_node::<E>(node, path);
            self.address.pop();
            if let ControlFlow::Break(end) = flow? {
                return Ok(ControlFlow::Break(end));
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    /// `path` is `None` for a whole subtree, or the rest of the start address
    /// when `node` lies on it.
    fn backward_node<E>(
        &mut self,
        node: &Node,
        path: Option<&[u64]>,
    ) -> Result<ControlFlow<Traversal>, E>
    where
        F: FnMut(&NodeAddress, &Node) -> Result<Visit, E>,
    {
        if let Node::Group(group) = node {
            let rest = match path {
                None => Some(&[][..]),
                Some([]) => None,
                Some(rest) => Some(rest),
            };
            if let Some(rest) = rest {
                if let ControlFlow::Break(end) = self.backward::<E>(group, rest)? {
                    return Ok(ControlFlow::Break(end));
                }
            }
        }
        self.emit::<E>(node)
    }
}
