//! # Edit Events
//!
//! Structural operations on a document, addressed by child-index path.
//!
//! Events only check that their target exists and has the right shape.
//! Whether the result is a valid document is decided afterwards by
//! re-normalizing the whole tree, so an event never has to duplicate schema
//! rules.
//!
//! ### Move
//! - `index` is the position in the destination *after* the node has been
//!   taken out of its old parent
//! - Moving a node into itself or its own subtree fails
//!
//! ### ReplaceText
//! - Atomic replacement of the whole text leaf
//! - Replacing with `""` removes the leaf on re-normalization

use crate::EditorError;
use lessondoc_document::{node_spec, AttrValue, Document, Mark, MarkKind, Node, NodePath};

#[derive(Debug, Clone, PartialEq)]
pub enum EditEvent {
    /// Insert `node` as child `index` of the container at `parent`
    InsertNode {
        parent: NodePath,
        index: usize,
        node: Node,
    },

    /// Remove a node and its subtree
    RemoveNode { path: NodePath },

    /// Relocate a node to a new parent
    MoveNode {
        from: NodePath,
        to_parent: NodePath,
        index: usize,
    },

    /// Replace the text of a text leaf
    ReplaceText { path: NodePath, text: String },

    SetAttribute {
        path: NodePath,
        name: String,
        value: AttrValue,
    },

    RemoveAttribute { path: NodePath, name: String },

    /// Add a mark to a text leaf, replacing any mark of the same kind
    AddMark { path: NodePath, mark: Mark },

    RemoveMark { path: NodePath, kind: MarkKind },
}

impl EditEvent {
    /// Apply the event in place
    ///
    /// On error the document may be partially modified; callers apply to a
    /// copy.
    pub fn apply(&self, doc: &mut Document) -> Result<(), EditorError> {
        match self {
            EditEvent::InsertNode {
                parent,
                index,
                node,
            } => apply_insert(doc, parent, *index, node.clone()),

            EditEvent::RemoveNode { path } => apply_remove(doc, path).map(|_| ()),

            EditEvent::MoveNode {
                from,
                to_parent,
                index,
            } => apply_move(doc, from, to_parent, *index),

            EditEvent::ReplaceText { path, text } => {
                let node = text_node_mut(doc, path)?;
                node.text = Some(text.clone());
                Ok(())
            }

            EditEvent::SetAttribute { path, name, value } => {
                let node = node_mut(doc, path)?;
                node.attributes.insert(name.clone(), value.clone());
                Ok(())
            }

            EditEvent::RemoveAttribute { path, name } => {
                let node = node_mut(doc, path)?;
                node.attributes.remove(name);
                Ok(())
            }

            EditEvent::AddMark { path, mark } => {
                let node = text_node_mut(doc, path)?;
                node.marks.retain(|existing| existing.kind != mark.kind);
                node.marks.push(mark.clone());
                Ok(())
            }

            EditEvent::RemoveMark { path, kind } => {
                let node = text_node_mut(doc, path)?;
                node.marks.retain(|existing| existing.kind != *kind);
                Ok(())
            }
        }
    }

    /// Short label for history and logs
    pub fn describe(&self) -> String {
        match self {
            EditEvent::InsertNode { parent, node, .. } => {
                format!("insert {} into {}", node.kind, parent)
            }
            EditEvent::RemoveNode { path } => format!("remove {}", path),
            EditEvent::MoveNode { from, to_parent, .. } => {
                format!("move {} to {}", from, to_parent)
            }
            EditEvent::ReplaceText { path, .. } => format!("edit text at {}", path),
            EditEvent::SetAttribute { path, name, .. } => format!("set {} at {}", name, path),
            EditEvent::RemoveAttribute { path, name } => format!("unset {} at {}", name, path),
            EditEvent::AddMark { path, mark } => format!("add {} at {}", mark.kind.name(), path),
            EditEvent::RemoveMark { path, kind } => format!("remove {} at {}", kind.name(), path),
        }
    }
}

fn apply_insert(
    doc: &mut Document,
    parent: &NodePath,
    index: usize,
    node: Node,
) -> Result<(), EditorError> {
    let children = container_mut(doc, parent)?;
    if index > children.len() {
        return Err(EditorError::IndexOutOfBounds {
            path: parent.clone(),
            index,
            len: children.len(),
        });
    }
    children.insert(index, node);
    Ok(())
}

fn apply_remove(doc: &mut Document, path: &NodePath) -> Result<Node, EditorError> {
    let (parent, index) = path
        .split_last()
        .ok_or_else(|| EditorError::PathNotFound(path.clone()))?;
    let children = doc
        .children_at_mut(&parent)
        .ok_or_else(|| EditorError::PathNotFound(path.clone()))?;
    if index >= children.len() {
        return Err(EditorError::PathNotFound(path.clone()));
    }
    Ok(children.remove(index))
}

fn apply_move(
    doc: &mut Document,
    from: &NodePath,
    to_parent: &NodePath,
    index: usize,
) -> Result<(), EditorError> {
    if to_parent.indices().starts_with(from.indices()) {
        return Err(EditorError::CycleDetected {
            from: from.clone(),
            to_parent: to_parent.clone(),
        });
    }

    // Fail before detaching anything
    container_mut(doc, to_parent)?;

    let node = apply_remove(doc, from)?;
    let to_parent = shift_after_removal(to_parent, from);
    apply_insert(doc, &to_parent, index, node)
}

/// Rewrite `path` for a tree where the node at `removed` no longer exists
fn shift_after_removal(path: &NodePath, removed: &NodePath) -> NodePath {
    let Some((removed_parent, removed_index)) = removed.split_last() else {
        return path.clone();
    };
    let depth = removed_parent.indices().len();
    let mut indices = path.indices().to_vec();

    if path.indices().starts_with(removed_parent.indices()) {
        if let Some(sibling) = indices.get_mut(depth) {
            if *sibling > removed_index {
                *sibling -= 1;
            }
        }
    }
    NodePath::from(indices)
}

fn node_mut<'a>(doc: &'a mut Document, path: &NodePath) -> Result<&'a mut Node, EditorError> {
    doc.node_at_mut(path)
        .ok_or_else(|| EditorError::PathNotFound(path.clone()))
}

fn text_node_mut<'a>(doc: &'a mut Document, path: &NodePath) -> Result<&'a mut Node, EditorError> {
    let node = node_mut(doc, path)?;
    if !node.is_text() {
        return Err(EditorError::NotText {
            path: path.clone(),
            kind: node.kind,
        });
    }
    Ok(node)
}

fn container_mut<'a>(
    doc: &'a mut Document,
    path: &NodePath,
) -> Result<&'a mut Vec<Node>, EditorError> {
    let kind = doc
        .kind_at(path)
        .ok_or_else(|| EditorError::PathNotFound(path.clone()))?;
    if node_spec(kind).map_or(true, |spec| spec.is_leaf()) {
        return Err(EditorError::NotAContainer {
            path: path.clone(),
            kind,
        });
    }
    doc.children_at_mut(path)
        .ok_or_else(|| EditorError::PathNotFound(path.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lessondoc_document::NodeKind;

    fn lesson() -> Document {
        Document::new(vec![
            Node::heading(2, vec![Node::text("Intro")]),
            Node::paragraph(vec![Node::text("Hello")]),
            Node::paragraph(vec![Node::text("World")]),
        ])
    }

    #[test]
    fn test_insert_node() {
        let mut doc = lesson();
        let event = EditEvent::InsertNode {
            parent: NodePath::root(),
            index: 1,
            node: Node::new(NodeKind::HorizontalRule),
        };

        event.apply(&mut doc).unwrap();

        assert_eq!(doc.children.len(), 4);
        assert_eq!(doc.children[1].kind, NodeKind::HorizontalRule);
    }

    #[test]
    fn test_insert_past_end_fails() {
        let mut doc = lesson();
        let event = EditEvent::InsertNode {
            parent: NodePath::root(),
            index: 9,
            node: Node::new(NodeKind::HorizontalRule),
        };

        assert_eq!(
            event.apply(&mut doc),
            Err(EditorError::IndexOutOfBounds {
                path: NodePath::root(),
                index: 9,
                len: 3,
            })
        );
    }

    #[test]
    fn test_insert_into_leaf_fails() {
        let mut doc = lesson();
        let event = EditEvent::InsertNode {
            parent: NodePath::from(vec![1, 0]),
            index: 0,
            node: Node::text("x"),
        };

        assert!(matches!(
            event.apply(&mut doc),
            Err(EditorError::NotAContainer {
                kind: NodeKind::Text,
                ..
            })
        ));
    }

    #[test]
    fn test_remove_root_fails() {
        let mut doc = lesson();
        let event = EditEvent::RemoveNode {
            path: NodePath::root(),
        };

        assert_eq!(
            event.apply(&mut doc),
            Err(EditorError::PathNotFound(NodePath::root()))
        );
    }

    #[test]
    fn test_move_forward_accounts_for_removal() {
        let mut doc = Document::new(vec![
            Node::paragraph(vec![Node::text("a")]),
            Node::new(NodeKind::Blockquote),
            Node::new(NodeKind::Blockquote),
        ]);
        let event = EditEvent::MoveNode {
            from: NodePath::from(vec![0]),
            to_parent: NodePath::from(vec![2]),
            index: 0,
        };

        event.apply(&mut doc).unwrap();

        assert_eq!(doc.children.len(), 2);
        assert!(doc.children[0].children.is_empty());
        assert_eq!(doc.children[1].children[0].text_content(), "a");
    }

    #[test]
    fn test_move_into_own_subtree_fails() {
        let mut doc = lesson();
        let event = EditEvent::MoveNode {
            from: NodePath::from(vec![1]),
            to_parent: NodePath::from(vec![1]),
            index: 0,
        };

        assert!(matches!(
            event.apply(&mut doc),
            Err(EditorError::CycleDetected { .. })
        ));
        assert_eq!(doc, lesson());
    }

    #[test]
    fn test_replace_text_requires_text_node() {
        let mut doc = lesson();
        let event = EditEvent::ReplaceText {
            path: NodePath::from(vec![1]),
            text: "x".to_string(),
        };

        assert_eq!(
            event.apply(&mut doc),
            Err(EditorError::NotText {
                path: NodePath::from(vec![1]),
                kind: NodeKind::Paragraph,
            })
        );
    }

    #[test]
    fn test_add_mark_replaces_same_kind() {
        let mut doc = lesson();
        let path = NodePath::from(vec![1, 0]);
        EditEvent::AddMark {
            path: path.clone(),
            mark: Mark::link("https://a.example"),
        }
        .apply(&mut doc)
        .unwrap();
        EditEvent::AddMark {
            path: path.clone(),
            mark: Mark::link("https://b.example"),
        }
        .apply(&mut doc)
        .unwrap();

        let node = doc.node_at(&path).unwrap();
        assert_eq!(node.marks.len(), 1);
        assert_eq!(
            node.marks[0].attr("href").and_then(AttrValue::as_str),
            Some("https://b.example")
        );
    }

    #[test]
    fn test_shift_after_removal() {
        let removed = NodePath::from(vec![0, 1]);
        assert_eq!(
            shift_after_removal(&NodePath::from(vec![0, 3, 2]), &removed),
            NodePath::from(vec![0, 2, 2])
        );
        assert_eq!(
            shift_after_removal(&NodePath::from(vec![0, 0]), &removed),
            NodePath::from(vec![0, 0])
        );
        assert_eq!(
            shift_after_removal(&NodePath::from(vec![1, 4]), &removed),
            NodePath::from(vec![1, 4])
        );
    }
}
