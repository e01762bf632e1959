//! Flattening bookmark trees into ordered leaf lists.

use crate::domain::model::{BookmarkNode, LeafBookmark};

/// Collect the leaves of `root` in depth-first, children-in-order sequence.
///
/// Leaves are never descended into, so children wrongly attached to a leaf are ignored.
/// The walk keeps its own stack of child iterators and does not recurse.
pub fn flatten(root: &BookmarkNode) -> Vec<LeafBookmark> {
    if root.is_leaf {
        return vec![LeafBookmark::from(root)];
    }

    let mut leaves = Vec::new();
    let mut stack = vec![root.children.iter()];

    while let Some(children) = stack.last_mut() {
        let Some(node) = children.next() else {
            stack.pop();
            continue;
        };

        if node.is_leaf {
            leaves.push(LeafBookmark::from(node));
        } else if !node.children.is_empty() {
            stack.push(node.children.iter());
        }
    }

    leaves
}
