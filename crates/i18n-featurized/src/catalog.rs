//! Catalog access: the store seam and an in-memory implementation.
//!
//! # Invariants
//!
//! 1. **Read-only**: the query layer never mutates a catalog it was handed;
//!    [`Catalog`] exposes no mutating operations.
//!
//! 2. **Dot-path lookup**: `lookup` splits the key on [`KEY_SEPARATOR`] and
//!    walks the nested tree; a flat key without separators resolves at the
//!    top level.
//!
//! 3. **Absent leaves exist**: a key inserted with [`LocaleTree::insert_absent`]
//!    appears in key scans but yields `None` from `lookup`. This models an
//!    explicitly nil translation in a loaded locale file.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Missing key | Key not in the language's tree | `Ok(None)` |
//! | Missing language | Language never registered | `Ok(None)` / empty scans |
//! | Store failure | External backend errored | `Err(CoverageError::Store)` |

use indexmap::IndexMap;

use crate::error::Result;
use crate::flatten::flatten_keys;

/// Identifier naming a supported locale (e.g., `"en"`, `"de"`).
pub type LanguageId = String;

/// Identifier naming a gated capability (e.g., `"sexy_bookings"`).
pub type FeatureId = String;

/// Separator joining path segments into fully qualified keys.
pub const KEY_SEPARATOR: char = '.';

/// Read side of a per-language translation store.
///
/// The query layer depends only on this trait; [`SimpleCatalog`] is the
/// bundled in-memory implementation. External stores surface their own
/// failures through [`CoverageError::Store`](crate::CoverageError::Store),
/// which the query layer propagates unchanged.
///
/// The two key-scan methods exist because the two tagging strategies operate
/// over different catalog shapes: the inline marker convention tags flat
/// top-level keys, while the hierarchical convention tags the first segment
/// of fully qualified dotted keys.
pub trait Catalog {
    /// Base catalog read: the translation for `key` in `language`, or
    /// `Ok(None)` when absent.
    fn lookup(&self, language: &str, key: &str) -> Result<Option<String>>;

    /// Raw top-level key names for `language`, in storage order.
    fn root_keys(&self, language: &str) -> Result<Vec<String>>;

    /// Fully qualified dotted keys for `language`, in storage order.
    fn qualified_keys(&self, language: &str) -> Result<Vec<String>>;
}

impl<T: Catalog + ?Sized> Catalog for &T {
    fn lookup(&self, language: &str, key: &str) -> Result<Option<String>> {
        (**self).lookup(language, key)
    }

    fn root_keys(&self, language: &str) -> Result<Vec<String>> {
        (**self).root_keys(language)
    }

    fn qualified_keys(&self, language: &str) -> Result<Vec<String>> {
        (**self).qualified_keys(language)
    }
}

/// A node in a locale tree: a leaf translation or a nested branch.
///
/// `Leaf(None)` is a key that exists without a translation.
#[derive(Debug, Clone)]
pub enum TreeNode {
    /// Terminal translation value, possibly explicitly absent.
    Leaf(Option<String>),
    /// Nested sub-mapping.
    Branch(LocaleTree),
}

/// Nested key/value mapping for a single language.
///
/// Branch entries preserve insertion order so flattened key listings are
/// deterministic across calls.
#[derive(Debug, Clone, Default)]
pub struct LocaleTree {
    nodes: IndexMap<String, TreeNode>,
}

impl LocaleTree {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a translation, splitting `key` on [`KEY_SEPARATOR`] into
    /// nested branches. Inserting over an existing leaf replaces it.
    ///
    /// A key whose text contains a literal period gets nested by the
    /// split; use [`insert_flat`](Self::insert_flat) for inline-marker
    /// keys, which are prose and must stay top-level in one piece.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.insert_node(&key, TreeNode::Leaf(Some(value.into())));
    }

    /// Insert a translation as a single top-level entry, without
    /// splitting on [`KEY_SEPARATOR`].
    pub fn insert_flat(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.nodes
            .insert(key.into(), TreeNode::Leaf(Some(value.into())));
    }

    /// Insert a key with an explicitly absent translation.
    ///
    /// The key shows up in [`root_keys`](Self::root_keys) and in flattened
    /// listings, but lookups against it yield `None`.
    pub fn insert_absent(&mut self, key: impl Into<String>) {
        let key = key.into();
        self.insert_node(&key, TreeNode::Leaf(None));
    }

    fn insert_node(&mut self, key: &str, node: TreeNode) {
        match key.split_once(KEY_SEPARATOR) {
            None => {
                self.nodes.insert(key.to_string(), node);
            }
            Some((head, rest)) => {
                let entry = self
                    .nodes
                    .entry(head.to_string())
                    .or_insert_with(|| TreeNode::Branch(LocaleTree::new()));
                // A leaf in the middle of a deeper path gets widened.
                if !matches!(entry, TreeNode::Branch(_)) {
                    *entry = TreeNode::Branch(LocaleTree::new());
                }
                if let TreeNode::Branch(sub) = entry {
                    sub.insert_node(rest, node);
                }
            }
        }
    }

    /// Walk a dotted path to its node, if present.
    ///
    /// An exact entry name wins over path splitting, so a flat key
    /// containing a literal period resolves to its own leaf rather than
    /// being misread as a nested path.
    #[must_use]
    pub fn node_at(&self, key: &str) -> Option<&TreeNode> {
        if let Some(node) = self.nodes.get(key) {
            return Some(node);
        }
        match key.split_once(KEY_SEPARATOR) {
            None => None,
            Some((head, rest)) => match self.nodes.get(head)? {
                TreeNode::Branch(sub) => sub.node_at(rest),
                TreeNode::Leaf(_) => None,
            },
        }
    }

    /// Resolve a dotted path to its translation.
    #[must_use]
    pub fn translation_at(&self, key: &str) -> Option<&str> {
        match self.node_at(key)? {
            TreeNode::Leaf(Some(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Top-level entry names in insertion order.
    #[must_use]
    pub fn root_keys(&self) -> Vec<String> {
        self.nodes.keys().cloned().collect()
    }

    /// Fully qualified dotted keys in insertion order.
    #[must_use]
    pub fn flattened_keys(&self) -> Vec<String> {
        flatten_keys(self, None)
    }

    /// Iterate over direct entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &TreeNode)> {
        self.nodes.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// Number of direct entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// In-memory multi-language catalog backed by [`LocaleTree`]s.
///
/// # Example
///
/// ```
/// use i18n_featurized::{Catalog, LocaleTree, SimpleCatalog};
///
/// let mut en = LocaleTree::new();
/// en.insert("checkout.title", "Checkout");
///
/// let mut catalog = SimpleCatalog::new();
/// catalog.add_locale("en", en);
///
/// assert_eq!(
///     catalog.lookup("en", "checkout.title").unwrap(),
///     Some("Checkout".to_string())
/// );
/// assert_eq!(
///     catalog.qualified_keys("en").unwrap(),
///     vec!["checkout.title".to_string()]
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct SimpleCatalog {
    locales: IndexMap<LanguageId, LocaleTree>,
}

impl SimpleCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a language's tree.
    pub fn add_locale(&mut self, language: impl Into<LanguageId>, tree: LocaleTree) {
        self.locales.insert(language.into(), tree);
    }

    /// The tree for `language`, if registered.
    #[must_use]
    pub fn locale(&self, language: &str) -> Option<&LocaleTree> {
        self.locales.get(language)
    }

    /// All registered language identifiers in insertion order.
    #[must_use]
    pub fn languages(&self) -> Vec<LanguageId> {
        self.locales.keys().cloned().collect()
    }
}

impl Catalog for SimpleCatalog {
    fn lookup(&self, language: &str, key: &str) -> Result<Option<String>> {
        Ok(self
            .locales
            .get(language)
            .and_then(|tree| tree.translation_at(key))
            .map(str::to_string))
    }

    fn root_keys(&self, language: &str) -> Result<Vec<String>> {
        Ok(self
            .locales
            .get(language)
            .map(LocaleTree::root_keys)
            .unwrap_or_default())
    }

    fn qualified_keys(&self, language: &str) -> Result<Vec<String>> {
        Ok(self
            .locales
            .get(language)
            .map(LocaleTree::flattened_keys)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested_tree() -> LocaleTree {
        let mut tree = LocaleTree::new();
        tree.insert("checkout.title", "Checkout");
        tree.insert("checkout.button", "Pay now");
        tree.insert("search.hint", "Type to search");
        tree
    }

    #[test]
    fn lookup_walks_dotted_path() {
        let mut catalog = SimpleCatalog::new();
        catalog.add_locale("en", nested_tree());
        assert_eq!(
            catalog.lookup("en", "checkout.button").unwrap(),
            Some("Pay now".to_string())
        );
    }

    #[test]
    fn lookup_flat_key_resolves_at_top_level() {
        let mut tree = LocaleTree::new();
        tree.insert("Do something @sexy_bookings", "Do something");
        let mut catalog = SimpleCatalog::new();
        catalog.add_locale("en", tree);
        assert_eq!(
            catalog.lookup("en", "Do something @sexy_bookings").unwrap(),
            Some("Do something".to_string())
        );
    }

    #[test]
    fn lookup_missing_key_is_none() {
        let mut catalog = SimpleCatalog::new();
        catalog.add_locale("en", nested_tree());
        assert_eq!(catalog.lookup("en", "checkout.missing").unwrap(), None);
        assert_eq!(catalog.lookup("en", "nope").unwrap(), None);
    }

    #[test]
    fn lookup_unknown_language_is_none() {
        let mut catalog = SimpleCatalog::new();
        catalog.add_locale("en", nested_tree());
        assert_eq!(catalog.lookup("fr", "checkout.title").unwrap(), None);
    }

    #[test]
    fn absent_leaf_scans_but_does_not_resolve() {
        let mut tree = nested_tree();
        tree.insert_absent("checkout.subtitle");
        let mut catalog = SimpleCatalog::new();
        catalog.add_locale("en", tree);

        let keys = catalog.qualified_keys("en").unwrap();
        assert!(keys.contains(&"checkout.subtitle".to_string()));
        assert_eq!(catalog.lookup("en", "checkout.subtitle").unwrap(), None);
    }

    #[test]
    fn root_keys_preserve_insertion_order() {
        let mut catalog = SimpleCatalog::new();
        catalog.add_locale("en", nested_tree());
        assert_eq!(
            catalog.root_keys("en").unwrap(),
            vec!["checkout".to_string(), "search".to_string()]
        );
    }

    #[test]
    fn scans_on_unknown_language_are_empty() {
        let catalog = SimpleCatalog::new();
        assert!(catalog.root_keys("en").unwrap().is_empty());
        assert!(catalog.qualified_keys("en").unwrap().is_empty());
    }

    #[test]
    fn flat_key_with_period_stays_top_level() {
        let mut tree = LocaleTree::new();
        tree.insert_flat("Do it. Now @sexy_bookings", "Do it now");
        let mut catalog = SimpleCatalog::new();
        catalog.add_locale("en", tree);

        assert_eq!(
            catalog.root_keys("en").unwrap(),
            vec!["Do it. Now @sexy_bookings".to_string()]
        );
        assert_eq!(
            catalog.lookup("en", "Do it. Now @sexy_bookings").unwrap(),
            Some("Do it now".to_string())
        );
    }

    #[test]
    fn exact_entry_wins_over_path_split() {
        let mut tree = LocaleTree::new();
        tree.insert("checkout.title", "Checkout");
        tree.insert_flat("checkout.title.legacy", "Old checkout");
        assert_eq!(tree.translation_at("checkout.title"), Some("Checkout"));
        assert_eq!(
            tree.translation_at("checkout.title.legacy"),
            Some("Old checkout")
        );
    }

    #[test]
    fn insert_over_leaf_widens_to_branch() {
        let mut tree = LocaleTree::new();
        tree.insert("checkout", "stub");
        tree.insert("checkout.title", "Checkout");
        assert_eq!(tree.translation_at("checkout.title"), Some("Checkout"));
        assert_eq!(tree.translation_at("checkout"), None);
    }

    #[test]
    fn catalog_usable_through_reference() {
        fn total_keys<C: Catalog>(catalog: C, language: &str) -> usize {
            catalog.qualified_keys(language).map(|k| k.len()).unwrap_or(0)
        }

        let mut catalog = SimpleCatalog::new();
        catalog.add_locale("en", nested_tree());
        assert_eq!(total_keys(&catalog, "en"), 3);
    }
}
