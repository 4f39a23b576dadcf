#![forbid(unsafe_code)]

//! Feature-flag-aware translation coverage queries.
//!
//! Applications gating functionality behind feature flags need to know,
//! before a flag flips on, whether the feature's strings are actually
//! translated. This crate answers three questions over a multi-language
//! string catalog:
//!
//! - which translation keys belong to a given feature,
//! - which of those keys lack a translation in which supported languages,
//! - given a language, which features are not yet fully localized.
//!
//! Keys declare their feature through one of two tagging conventions,
//! selected via [`TagStrategy`]: an inline `@feature` marker embedded in
//! the key text, or the feature name as the first segment of a dotted
//! hierarchical key.
//!
//! # How it fits in the system
//! The crate is a pure, synchronous query library meant to be embedded by
//! a host application's reporting or dashboard layer. Translation file
//! parsing, locale fallback, pluralization, and interpolation are out of
//! scope: the catalog enters through the [`Catalog`] trait (or the bundled
//! in-memory [`SimpleCatalog`]), and the active feature set and supported
//! language list come from caller-supplied closures on the [`Registry`].
//! Unset sources degrade to empty result sets rather than erroring.

/// Catalog trait, nested locale trees, and the in-memory store.
pub mod catalog;
/// Error taxonomy.
pub mod error;
/// Nested-key flattening into dotted paths.
pub mod flatten;
/// Feature- and language-centric view handles.
pub mod query;
/// The coverage query engine.
pub mod registry;
/// Key-tagging strategies and compiled matchers.
pub mod tagging;

pub use catalog::{
    Catalog, FeatureId, KEY_SEPARATOR, LanguageId, LocaleTree, SimpleCatalog, TreeNode,
};
pub use error::{CoverageError, Result};
pub use flatten::flatten_keys;
pub use query::{Feature, Language};
pub use registry::{DEFAULT_FEATURE_STATE, FeaturizedKey, Registry};
pub use tagging::{KeyMatcher, TagStrategy};
