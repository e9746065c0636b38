use capture_tree::{Capture, Node};
use std::borrow::Cow;

use crate::error::{Result, SearchError};

/// Display label of a node: a group's name, or the rendered command it points at.
pub fn node_label<'a>(node: &'a Node, capture: &Capture) -> Result<Cow<'a, str>> {
    match node {
        Node::Group(group) => Ok(Cow::Borrowed(group.name.as_str())),
        Node::Command(index) => capture
            .command(*index)
            .map(|command| Cow::Owned(command.to_string()))
            .ok_or_else(|| SearchError::CommandOutOfRange {
                index: *index,
                capture: capture.name.clone(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capture_tree::{Command, Group};

    #[test]
    fn test_group_and_command_labels() {
        let capture = Capture::new(
            "frame",
            vec![Command::new("glClear").param("mask", "GL_COLOR_BUFFER_BIT")],
        );

        let group = Node::Group(Group::new("Render Pass"));
        assert_eq!(node_label(&group, &capture).unwrap(), "Render Pass");

        let command = Node::Command(0);
        assert_eq!(
            node_label(&command, &capture).unwrap(),
            "glClear(mask: GL_COLOR_BUFFER_BIT)"
        );
    }

    #[test]
    fn test_missing_command() {
        let capture = Capture::new("frame", Vec::new());
        let err = node_label(&Node::Command(4), &capture).unwrap_err();
        assert!(matches!(err, SearchError::CommandOutOfRange { index: 4, .. }));
    }
}
