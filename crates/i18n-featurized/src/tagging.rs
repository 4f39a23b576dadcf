//! Key-tagging strategies: how a translation key declares its feature.
//!
//! Two conventions exist side by side in real catalogs and are modeled as
//! one polymorphic strategy with two variants:
//!
//! - **Inline marker**: the key text carries a literal `@feature` token,
//!   e.g. `"Add another place @sexy_bookings"`.
//! - **Hierarchical prefix**: the feature is the first dot-separated
//!   segment, e.g. `"sexy_bookings.add_another_place"`.
//!
//! Feature identifiers coming from the active-features source are untrusted
//! input for pattern construction, so the compiled matcher escapes every
//! identifier, and [`TagStrategy::validate_feature`] rejects identifiers
//! that do not fit the convention before any pattern is built.

use std::collections::BTreeSet;

use regex_lite::Regex;

use crate::catalog::{FeatureId, KEY_SEPARATOR};
use crate::error::{CoverageError, Result};

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Tagging convention selected at [`Registry`](crate::Registry)
/// construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagStrategy {
    /// Keys carry a literal `@feature` token in their text.
    InlineMarker,
    /// The feature is the key's first dot-separated path segment.
    HierarchicalPrefix,
}

impl TagStrategy {
    /// Derive the feature a key is listed under, or `None` when the key
    /// carries no feature tag.
    ///
    /// Inline: the word-character token after the first `@` that is
    /// followed by at least one word character. A key with several markers
    /// is *listed* under its first marker's feature, although
    /// [`matches`](Self::matches) still honors every marker. Hierarchical:
    /// the first dot-separated segment.
    #[must_use]
    pub fn feature_of(&self, key: &str) -> Option<FeatureId> {
        match self {
            Self::InlineMarker => {
                let mut rest = key;
                while let Some(at) = rest.find('@') {
                    let tail = &rest[at + 1..];
                    let token: String =
                        tail.chars().take_while(|&c| is_word_char(c)).collect();
                    if !token.is_empty() {
                        return Some(token);
                    }
                    rest = tail;
                }
                None
            }
            Self::HierarchicalPrefix => {
                let first = key.split(KEY_SEPARATOR).next().unwrap_or("");
                (!first.is_empty()).then(|| first.to_string())
            }
        }
    }

    /// Whether `key` belongs to `feature` under this convention.
    ///
    /// Inline matching requires a word boundary after the marker, so a key
    /// tagged `@sexy_bookings` does not belong to a feature named `sexy`.
    /// Callers are expected to have validated `feature` first.
    #[must_use]
    pub fn matches(&self, key: &str, feature: &str) -> bool {
        match self {
            Self::InlineMarker => {
                let marker = format!("@{feature}");
                key.match_indices(&marker).any(|(idx, text)| {
                    key[idx + text.len()..]
                        .chars()
                        .next()
                        .is_none_or(|c| !is_word_char(c))
                })
            }
            Self::HierarchicalPrefix => key.split(KEY_SEPARATOR).next() == Some(feature),
        }
    }

    /// Reject feature identifiers that would not work under this
    /// convention: empty ids always; non-word characters for the inline
    /// marker; an embedded [`KEY_SEPARATOR`] for the hierarchical prefix.
    pub fn validate_feature(&self, id: &str) -> Result<()> {
        let ok = match self {
            Self::InlineMarker => !id.is_empty() && id.chars().all(is_word_char),
            Self::HierarchicalPrefix => !id.is_empty() && !id.contains(KEY_SEPARATOR),
        };
        if ok {
            Ok(())
        } else {
            Err(CoverageError::InvalidFeature(id.to_string()))
        }
    }

    /// Compile a matcher testing any key against the whole active feature
    /// set at once. Validates every identifier; inline identifiers are
    /// additionally regex-escaped before the alternation is built. An
    /// empty active set yields a matcher that matches nothing.
    pub fn matcher(&self, active: &[FeatureId]) -> Result<KeyMatcher> {
        for id in active {
            self.validate_feature(id)?;
        }
        match self {
            Self::InlineMarker => {
                if active.is_empty() {
                    return Ok(KeyMatcher(MatcherImpl::Never));
                }
                let alternation = active
                    .iter()
                    .map(|id| regex_lite::escape(id))
                    .collect::<Vec<_>>()
                    .join("|");
                let pattern = format!("@(?:{alternation})\\b");
                let regex = Regex::new(&pattern)
                    .map_err(|err| CoverageError::Matcher(err.to_string()))?;
                Ok(KeyMatcher(MatcherImpl::Pattern(regex)))
            }
            Self::HierarchicalPrefix => Ok(KeyMatcher(MatcherImpl::Prefixes(
                active.iter().cloned().collect(),
            ))),
        }
    }
}

/// Compiled matcher over an active feature set, built once per query.
#[derive(Debug, Clone)]
pub struct KeyMatcher(MatcherImpl);

#[derive(Debug, Clone)]
enum MatcherImpl {
    Never,
    Pattern(Regex),
    Prefixes(BTreeSet<FeatureId>),
}

impl KeyMatcher {
    /// Whether `key` belongs to any active feature.
    #[must_use]
    pub fn is_match(&self, key: &str) -> bool {
        match &self.0 {
            MatcherImpl::Never => false,
            MatcherImpl::Pattern(regex) => regex.is_match(key),
            MatcherImpl::Prefixes(prefixes) => key
                .split(KEY_SEPARATOR)
                .next()
                .is_some_and(|first| prefixes.contains(first)),
        }
    }
}
