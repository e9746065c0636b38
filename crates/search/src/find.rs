use capture_protocol::{
    CommandTreeNode, FindFrom, FindRequest, FindResponse, FindSummary, NodeAddress, StopReason,
};
use capture_tree::{Capture, CaptureResolver, CommandTree, Node, Traversal, TreeResolver, Visit};
use tokio_util::sync::CancellationToken;

use crate::error::{Result, SearchError};
use crate::label::node_label;
use crate::predicate::Predicate;

/// Run `request`, calling `handler` for every match in traversal order.
///
/// The search walks from the cursor in `request.from` towards the tree boundary.
/// With `wrap` set (and a non-empty cursor) a second pass restarts at the
/// opposite boundary and runs back to the cursor. The first pass skips the
/// cursor when it is the first node visited; the wrap pass tests the cursor
/// again and ends there, so a matching cursor is reported at the very end.
/// The wrap pass only runs when the first pass reached the boundary.
///
/// Reaching `max_items`, the wrap boundary, or cancellation all end the search
/// successfully; [`FindSummary::stopped`] says which. A handler error aborts
/// the search and is returned as [`SearchError::Handler`].
pub fn find<R, H>(
    request: &FindRequest,
    resolver: &R,
    cancel: &CancellationToken,
    handler: H,
) -> Result<FindSummary>
where
    R: TreeResolver + CaptureResolver + ?Sized,
    H: FnMut(FindResponse) -> anyhow::Result<()>,
{
    let from = match &request.from {
        Some(FindFrom::CommandTreeNode(from)) => from,
        Some(FindFrom::StateTreeNode(_)) => {
            return Err(SearchError::Unimplemented(
                "searching state trees".to_string(),
            ));
        }
        None => {
            return Err(SearchError::InvalidArgument(
                "FindRequest.from cannot be empty".to_string(),
            ));
        }
    };

    let predicate =
        Predicate::compile(&request.text, request.is_case_sensitive, request.is_regex)?;
    let tree = resolver.resolve_tree(&from.tree)?;
    let capture = resolver.resolve_capture(&tree.capture)?;

    let mut session = Session {
        request,
        from,
        predicate,
        capture: capture.as_ref(),
        cancel,
        handler,
        count: 0,
        skip_cursor: true,
        wrapping: false,
        stopped: StopReason::None,
    };

    log::debug!(
        "Find {:?} in tree {} from {} (backwards: {}, wrap: {})",
        request.text,
        from.tree,
        from.indices,
        request.backwards,
        request.wrap
    );
    let primary = session.run_pass(&tree, &from.indices)?;

    // Nothing to wrap into when the search already started at the boundary.
    if primary == Traversal::Completed && request.wrap && !from.indices.is_empty() {
        let start = wrap_start(&tree, request.backwards);
        log::debug!("Wrapping search from {start}");
        session.wrapping = true;
        session.run_pass(&tree, &start)?;
    }

    log::debug!(
        "Find finished with {} matches (stopped: {:?})",
        session.count,
        session.stopped
    );
    Ok(FindSummary {
        matches: session.count,
        stopped: session.stopped,
    })
}

/// First node of the wrap pass: the opposite end of the tree. Going backward
/// that is the last node in document order, which the empty address names.
fn wrap_start(tree: &CommandTree, backwards: bool) -> NodeAddress {
    if backwards || tree.count() == 0 {
        NodeAddress::root()
    } else {
        NodeAddress::new(vec![0])
    }
}

/// State of one `find` call; never shared between calls.
struct Session<'a, H> {
    request: &'a FindRequest,
    from: &'a CommandTreeNode,
    predicate: Predicate,
    capture: &'a Capture,
    cancel: &'a CancellationToken,
    handler: H,
    count: u32,
    /// Set until the first node of the first pass has been seen.
    skip_cursor: bool,
    wrapping: bool,
    stopped: StopReason,
}

impl<H> Session<'_, H>
where
    H: FnMut(FindResponse) -> anyhow::Result<()>,
{
    fn run_pass(&mut self, tree: &CommandTree, start: &NodeAddress) -> Result<Traversal> {
        let cancel = self.cancel;
        let end = tree.traverse(self.request.backwards, start, cancel, |address, node| {
            self.process(address, node)
        })?;
        if end == Traversal::Cancelled {
            self.stopped = StopReason::Cancelled;
        }
        Ok(end)
    }

    fn process(&mut self, address: &NodeAddress, node: &Node) -> Result<Visit> {
        if !self.wrapping && self.skip_cursor {
            self.skip_cursor = false;
            if *address == self.from.indices {
                return Ok(self.check_cancelled());
            }
        }

        let label = node_label(node, self.capture)?;
        if self.predicate.matches(&label) {
            self.emit(address)?;
            let max = self.request.max_items;
            if max != 0 && self.count >= max {
                self.stopped = StopReason::MaxItemsReached;
                return Ok(Visit::Stop);
            }
        }

        if self.wrapping && *address == self.from.indices {
            self.stopped = StopReason::WrapBoundaryReached;
            return Ok(Visit::Stop);
        }
        Ok(self.check_cancelled())
    }

    fn emit(&mut self, address: &NodeAddress) -> Result<()> {
        let response = FindResponse {
            command_tree_node: CommandTreeNode {
                tree: self.from.tree,
                indices: address.clone(),
            },
        };
        (self.handler)(response).map_err(SearchError::Handler)?;
        self.count += 1;
        Ok(())
    }

    fn check_cancelled(&mut self) -> Visit {
        if self.cancel.is_cancelled() {
            self.stopped = StopReason::Cancelled;
            Visit::Stop
        } else {
            Visit::Continue
        }
    }
}
