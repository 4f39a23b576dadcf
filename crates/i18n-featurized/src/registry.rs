//! The coverage registry: cross-indexes catalog keys, active features, and
//! supported languages.
//!
//! # Invariants
//!
//! 1. **Pure reads**: every query recomputes from the catalog and the
//!    source closures; nothing is cached, nothing is mutated.
//!
//! 2. **Set semantics**: [`Registry::featurized_keys`] unions key sets
//!    across languages, deduplicates by key text, and returns them sorted
//!    lexicographically; a key present in a single language still counts
//!    once.
//!
//! 3. **Snapshot per query**: each top-level query reads the feature and
//!    language sources once at entry and iterates that snapshot for all of
//!    its lookups.
//!
//! 4. **Degrade gracefully**: unset sources resolve to empty collections,
//!    so every query answers "everything complete" rather than failing.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Invalid feature id | Source emitted a malformed id | `CoverageError::InvalidFeature` |
//! | Store failure | Catalog backend errored | Propagated via `?`, no retry |

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use tracing::debug;

use crate::catalog::{Catalog, FeatureId, LanguageId};
use crate::error::Result;
use crate::tagging::TagStrategy;

/// Label reported for a feature when no state source is configured.
pub const DEFAULT_FEATURE_STATE: &str = "live";

type FeaturesFn = Box<dyn Fn() -> Vec<FeatureId> + Send + Sync>;
type LanguagesFn = Box<dyn Fn() -> Vec<LanguageId> + Send + Sync>;
type StateFn = Box<dyn Fn(&str) -> String + Send + Sync>;

/// Coverage query engine over a catalog, a tagging strategy, and the two
/// caller-supplied sources for active features and supported languages.
///
/// The registry owns its catalog value; hand it a `&C` (via the blanket
/// `Catalog` impl for references) to keep the store shared.
///
/// # Example
///
/// ```
/// use i18n_featurized::{LocaleTree, Registry, SimpleCatalog, TagStrategy};
///
/// let mut en = LocaleTree::new();
/// en.insert("Add another place @sexy_bookings", "Add another place");
/// en.insert("Do something @sexy_bookings", "Do something");
/// let mut de = LocaleTree::new();
/// de.insert("Add another place @sexy_bookings", "Noch einen Ort");
///
/// let mut catalog = SimpleCatalog::new();
/// catalog.add_locale("en", en);
/// catalog.add_locale("de", de);
///
/// let mut registry = Registry::new(catalog, TagStrategy::InlineMarker);
/// registry.set_active_features_source(|| vec!["sexy_bookings".into()]);
/// registry.set_supported_languages_source(|| vec!["en".into(), "de".into()]);
///
/// let missing = registry.keys_missing_for("sexy_bookings")?;
/// assert_eq!(missing.len(), 1);
/// assert_eq!(missing[0].name(), "Do something @sexy_bookings");
/// assert_eq!(
///     registry.unready_languages_for("sexy_bookings")?,
///     vec!["de".to_string()]
/// );
/// # Ok::<(), i18n_featurized::CoverageError>(())
/// ```
pub struct Registry<C: Catalog> {
    catalog: C,
    strategy: TagStrategy,
    active_features_source: Option<FeaturesFn>,
    supported_languages_source: Option<LanguagesFn>,
    feature_state_source: Option<StateFn>,
}

impl<C: Catalog> Registry<C> {
    /// Create a registry over `catalog` with the given tagging strategy and
    /// no sources configured.
    pub fn new(catalog: C, strategy: TagStrategy) -> Self {
        Self {
            catalog,
            strategy,
            active_features_source: None,
            supported_languages_source: None,
            feature_state_source: None,
        }
    }

    /// The configured tagging strategy.
    #[must_use]
    pub fn strategy(&self) -> TagStrategy {
        self.strategy
    }

    /// The underlying catalog.
    #[must_use]
    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Configure the active-features source (e.g. a feature-flag service).
    /// Called afresh on every query, so keep it cheap and idempotent.
    pub fn set_active_features_source(
        &mut self,
        source: impl Fn() -> Vec<FeatureId> + Send + Sync + 'static,
    ) {
        self.active_features_source = Some(Box::new(source));
    }

    /// Configure the supported-languages source.
    pub fn set_supported_languages_source(
        &mut self,
        source: impl Fn() -> Vec<LanguageId> + Send + Sync + 'static,
    ) {
        self.supported_languages_source = Some(Box::new(source));
    }

    /// Configure the lifecycle-state lookup used by
    /// [`feature_state`](Self::feature_state). Unset, every feature reports
    /// [`DEFAULT_FEATURE_STATE`].
    pub fn set_feature_state_source(
        &mut self,
        source: impl Fn(&str) -> String + Send + Sync + 'static,
    ) {
        self.feature_state_source = Some(Box::new(source));
    }

    /// Supported languages, sorted and deduplicated. Empty when no source
    /// is configured.
    #[must_use]
    pub fn supported_languages(&self) -> Vec<LanguageId> {
        let mut languages = self
            .supported_languages_source
            .as_ref()
            .map(|source| source())
            .unwrap_or_default();
        languages.sort_unstable();
        languages.dedup();
        languages
    }

    /// Active features, sorted and deduplicated. Empty when no source is
    /// configured. Malformed identifiers are rejected here, before any
    /// matcher is built from them.
    pub fn active_features(&self) -> Result<Vec<FeatureId>> {
        let mut features = self
            .active_features_source
            .as_ref()
            .map(|source| source())
            .unwrap_or_default();
        for feature in &features {
            self.strategy.validate_feature(feature)?;
        }
        features.sort_unstable();
        features.dedup();
        Ok(features)
    }

    /// Lifecycle label for `feature`, via the configured state source.
    #[must_use]
    pub fn feature_state(&self, feature: &str) -> String {
        match &self.feature_state_source {
            Some(source) => source(feature),
            None => DEFAULT_FEATURE_STATE.to_string(),
        }
    }

    /// All keys belonging to at least one active feature, unioned across
    /// the supported languages, deduplicated by text, sorted
    /// lexicographically.
    ///
    /// The key shape scanned per language follows the strategy: raw
    /// top-level keys for the inline marker, flattened dotted keys for the
    /// hierarchical prefix.
    pub fn featurized_keys(&self) -> Result<Vec<FeaturizedKey<'_, C>>> {
        let features = self.active_features()?;
        let matcher = self.strategy.matcher(&features)?;
        let languages = self.supported_languages();

        let mut names = BTreeSet::new();
        for language in &languages {
            let keys = match self.strategy {
                TagStrategy::InlineMarker => self.catalog.root_keys(language)?,
                TagStrategy::HierarchicalPrefix => self.catalog.qualified_keys(language)?,
            };
            names.extend(keys.into_iter().filter(|key| matcher.is_match(key)));
        }
        debug!(
            keys = names.len(),
            features = features.len(),
            languages = languages.len(),
            "collected featurized keys"
        );
        Ok(names
            .into_iter()
            .map(|name| FeaturizedKey { name, registry: self })
            .collect())
    }

    /// Supported languages for which `key` has no translation, sorted.
    /// Empty means the key is fully translated.
    pub fn missing_languages_for(&self, key: &str) -> Result<Vec<LanguageId>> {
        self.missing_languages_with(&self.supported_languages(), key)
    }

    fn missing_languages_with(
        &self,
        languages: &[LanguageId],
        key: &str,
    ) -> Result<Vec<LanguageId>> {
        let mut missing = Vec::new();
        for language in languages {
            if self.catalog.lookup(language, key)?.is_none() {
                missing.push(language.clone());
            }
        }
        Ok(missing)
    }

    /// The featurized keys lacking a translation in at least one supported
    /// language.
    pub fn keys_with_translations_missing(&self) -> Result<Vec<FeaturizedKey<'_, C>>> {
        let languages = self.supported_languages();
        let mut incomplete = Vec::new();
        for key in self.featurized_keys()? {
            if !self.missing_languages_with(&languages, key.name())?.is_empty() {
                incomplete.push(key);
            }
        }
        Ok(incomplete)
    }

    /// The incompletely translated keys belonging to `feature`, sorted.
    pub fn keys_missing_for(&self, feature: &str) -> Result<Vec<FeaturizedKey<'_, C>>> {
        self.strategy.validate_feature(feature)?;
        Ok(self
            .keys_with_translations_missing()?
            .into_iter()
            .filter(|key| self.strategy.matches(key.name(), feature))
            .collect())
    }

    /// Languages missing at least one of `feature`'s keys: the union of
    /// [`missing_languages_for`](Self::missing_languages_for) over
    /// [`keys_missing_for`](Self::keys_missing_for), deduplicated, sorted.
    pub fn unready_languages_for(&self, feature: &str) -> Result<Vec<LanguageId>> {
        let supported = self.supported_languages();
        let mut unready = BTreeSet::new();
        for key in self.keys_missing_for(feature)? {
            unready.extend(self.missing_languages_with(&supported, key.name())?);
        }
        Ok(unready.into_iter().collect())
    }

    /// For each supported language, the featurized keys it lacks a
    /// translation for. Languages with full coverage map to an empty list.
    pub fn missing_keys_by_language(
        &self,
    ) -> Result<BTreeMap<LanguageId, Vec<FeaturizedKey<'_, C>>>> {
        let keys = self.featurized_keys()?;
        let mut by_language = BTreeMap::new();
        for language in self.supported_languages() {
            let mut missing = Vec::new();
            for key in &keys {
                if self.catalog.lookup(&language, key.name())?.is_none() {
                    missing.push(key.clone());
                }
            }
            by_language.insert(language, missing);
        }
        debug!(languages = by_language.len(), "indexed missing keys by language");
        Ok(by_language)
    }

    /// The distinct features the featurized keys are listed under, sorted.
    pub fn features(&self) -> Result<Vec<FeatureId>> {
        let mut features = BTreeSet::new();
        for key in self.featurized_keys()? {
            if let Some(feature) = self.strategy.feature_of(key.name()) {
                features.insert(feature);
            }
        }
        Ok(features.into_iter().collect())
    }
}

impl<C: Catalog> fmt::Debug for Registry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("strategy", &self.strategy)
            .field("active_features_source", &self.active_features_source.is_some())
            .field("supported_languages_source", &self.supported_languages_source.is_some())
            .field("feature_state_source", &self.feature_state_source.is_some())
            .finish_non_exhaustive()
    }
}

/// A translation key that belongs to at least one active feature.
///
/// Carries a non-owning reference to its registry so completeness can be
/// re-queried lazily. Equality, ordering, and hashing consider only the key
/// text: two keys with identical text are the same key.
pub struct FeaturizedKey<'r, C: Catalog> {
    name: String,
    registry: &'r Registry<C>,
}

impl<C: Catalog> FeaturizedKey<'_, C> {
    /// The raw key text.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The feature this key is listed under, per the registry's strategy.
    #[must_use]
    pub fn feature(&self) -> Option<FeatureId> {
        self.registry.strategy.feature_of(&self.name)
    }

    /// Supported languages with no translation for this key, sorted.
    pub fn missing_languages(&self) -> Result<Vec<LanguageId>> {
        self.registry.missing_languages_for(&self.name)
    }

    /// Whether every supported language has a translation for this key,
    /// evaluated against the current catalog snapshot.
    pub fn translations_complete(&self) -> Result<bool> {
        Ok(self.missing_languages()?.is_empty())
    }
}

impl<'r, C: Catalog> Clone for FeaturizedKey<'r, C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            registry: self.registry,
        }
    }
}

impl<C: Catalog> PartialEq for FeaturizedKey<'_, C> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<C: Catalog> Eq for FeaturizedKey<'_, C> {}

impl<C: Catalog> PartialOrd for FeaturizedKey<'_, C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<C: Catalog> Ord for FeaturizedKey<'_, C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl<C: Catalog> fmt::Display for FeaturizedKey<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl<C: Catalog> fmt::Debug for FeaturizedKey<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeaturizedKey")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
