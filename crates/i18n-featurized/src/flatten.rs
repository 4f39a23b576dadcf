//! Depth-first flattening of nested locale trees into dotted keys.
//!
//! A nested structure like
//!
//! ```text
//! checkout:
//!   title: "Checkout"
//!   button: "Pay now"
//! ```
//!
//! flattens to `checkout.title`, `checkout.button`. Traversal follows the
//! tree's insertion order, so output is stable across calls. Leaves
//! terminate recursion whatever their value, including explicitly absent
//! ones, which still contribute their key. Empty branches contribute
//! nothing.

use crate::catalog::{KEY_SEPARATOR, LocaleTree, TreeNode};

/// Flatten `tree` into fully qualified keys, joined with [`KEY_SEPARATOR`]
/// and prefixed with `prefix` when given.
#[must_use]
pub fn flatten_keys(tree: &LocaleTree, prefix: Option<&str>) -> Vec<String> {
    let mut out = Vec::new();
    walk(tree, prefix, &mut out);
    out
}

fn walk(tree: &LocaleTree, prefix: Option<&str>, out: &mut Vec<String>) {
    for (name, node) in tree.entries() {
        let qualified = match prefix {
            Some(prefix) => format!("{prefix}{KEY_SEPARATOR}{name}"),
            None => name.to_string(),
        };
        match node {
            TreeNode::Leaf(_) => out.push(qualified),
            TreeNode::Branch(sub) => walk(sub, Some(&qualified), out),
        }
    }
}
