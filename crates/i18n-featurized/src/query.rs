//! Entity-centric views over the registry.
//!
//! [`Feature`] and [`Language`] are thin handles answering coverage
//! questions from their own vantage point. They delegate every computation
//! to the registry's canonical queries, so a view can never disagree with
//! the engine it wraps.

use std::collections::BTreeSet;
use std::fmt;

use crate::catalog::{Catalog, FeatureId, LanguageId};
use crate::error::Result;
use crate::registry::{FeaturizedKey, Registry};

impl<C: Catalog> Registry<C> {
    /// A feature-centric view handle. The name is not required to be
    /// active; an inactive feature simply has no keys.
    pub fn feature(&self, name: impl Into<FeatureId>) -> Feature<'_, C> {
        Feature {
            name: name.into(),
            registry: self,
        }
    }

    /// A language-centric view handle.
    pub fn language(&self, name: impl Into<LanguageId>) -> Language<'_, C> {
        Language {
            name: name.into(),
            registry: self,
        }
    }

    /// Whether `feature` has at least one incompletely translated key.
    pub fn has_keys_missing_for(&self, feature: &str) -> Result<bool> {
        Ok(!self.keys_missing_for(feature)?.is_empty())
    }

    /// Whether at least one language is missing part of `feature`.
    pub fn has_unready_languages_for(&self, feature: &str) -> Result<bool> {
        Ok(!self.unready_languages_for(feature)?.is_empty())
    }
}

/// Coverage view of a single feature.
pub struct Feature<'r, C: Catalog> {
    name: FeatureId,
    registry: &'r Registry<C>,
}

impl<'r, C: Catalog> Feature<'r, C> {
    /// The feature identifier.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every featurized key belonging to this feature, complete or not.
    pub fn keys(&self) -> Result<Vec<FeaturizedKey<'r, C>>> {
        let strategy = self.registry.strategy();
        Ok(self
            .registry
            .featurized_keys()?
            .into_iter()
            .filter(|key| strategy.matches(key.name(), &self.name))
            .collect())
    }

    /// The feature's incompletely translated keys.
    pub fn missing_keys(&self) -> Result<Vec<FeaturizedKey<'r, C>>> {
        self.registry.keys_missing_for(&self.name)
    }

    /// Languages missing at least one of this feature's keys.
    pub fn languages_with_missing_keys(&self) -> Result<Vec<LanguageId>> {
        self.registry.unready_languages_for(&self.name)
    }

    /// Whether every key of this feature is translated everywhere.
    /// Vacuously true for a feature with no keys.
    pub fn is_fully_translated(&self) -> Result<bool> {
        Ok(self.missing_keys()?.is_empty())
    }

    /// Lifecycle label from the registry's state source.
    #[must_use]
    pub fn state(&self) -> String {
        self.registry.feature_state(&self.name)
    }
}

impl<C: Catalog> fmt::Display for Feature<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl<C: Catalog> fmt::Debug for Feature<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Feature").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Coverage view of a single language.
pub struct Language<'r, C: Catalog> {
    name: LanguageId,
    registry: &'r Registry<C>,
}

impl<'r, C: Catalog> Language<'r, C> {
    /// The language identifier.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Featurized keys this language has no translation for.
    pub fn keys_with_translations_missing(&self) -> Result<Vec<FeaturizedKey<'r, C>>> {
        let mut by_language = self.registry.missing_keys_by_language()?;
        Ok(by_language.remove(&self.name).unwrap_or_default())
    }

    /// Features that are not fully localized for this language, sorted.
    pub fn features_with_missing_keys(&self) -> Result<Vec<FeatureId>> {
        let strategy = self.registry.strategy();
        let mut features = BTreeSet::new();
        for key in self.keys_with_translations_missing()? {
            if let Some(feature) = strategy.feature_of(key.name()) {
                features.insert(feature);
            }
        }
        Ok(features.into_iter().collect())
    }
}

impl<C: Catalog> fmt::Display for Language<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl<C: Catalog> fmt::Debug for Language<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Language").field("name", &self.name).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{LocaleTree, SimpleCatalog};
    use crate::tagging::TagStrategy;

    fn registry() -> Registry<SimpleCatalog> {
        let mut en = LocaleTree::new();
        en.insert("Add another place @sexy_bookings", "Add another place");
        en.insert("Do something @sexy_bookings", "Do something");
        en.insert("something plural with spaces @my_feature", "lots of things");

        let mut de = LocaleTree::new();
        de.insert("Add another place @sexy_bookings", "Noch einen Ort");
        de.insert("Etwas nur auf Deutsch @deutsch", "Etwas nur auf Deutsch");
        de.insert("something plural with spaces @my_feature", "viele Dinge");

        let mut catalog = SimpleCatalog::new();
        catalog.add_locale("en", en);
        catalog.add_locale("de", de);

        let mut registry = Registry::new(catalog, TagStrategy::InlineMarker);
        registry.set_active_features_source(|| {
            vec![
                "sexy_bookings".to_string(),
                "my_feature".to_string(),
                "deutsch".to_string(),
            ]
        });
        registry.set_supported_languages_source(|| vec!["de".to_string(), "en".to_string()]);
        registry
    }

    #[test]
    fn boolean_forms_mirror_result_sets() {
        let registry = registry();
        assert!(registry.has_keys_missing_for("sexy_bookings").unwrap());
        assert!(!registry.has_keys_missing_for("my_feature").unwrap());
        assert!(registry.has_unready_languages_for("deutsch").unwrap());
        assert!(!registry.has_unready_languages_for("my_feature").unwrap());
    }

    #[test]
    fn feature_view_lists_its_keys() {
        let registry = registry();
        let feature = registry.feature("sexy_bookings");
        let keys: Vec<String> = feature
            .keys()
            .unwrap()
            .iter()
            .map(|k| k.name().to_string())
            .collect();
        assert_eq!(
            keys,
            vec![
                "Add another place @sexy_bookings",
                "Do something @sexy_bookings",
            ]
        );
    }

    #[test]
    fn feature_view_coverage() {
        let registry = registry();
        let feature = registry.feature("sexy_bookings");
        assert_eq!(feature.missing_keys().unwrap().len(), 1);
        assert_eq!(feature.languages_with_missing_keys().unwrap(), vec!["de"]);
        assert!(!feature.is_fully_translated().unwrap());
        assert!(registry.feature("my_feature").is_fully_translated().unwrap());
    }

    #[test]
    fn inactive_feature_view_is_empty_and_complete() {
        let registry = registry();
        let feature = registry.feature("not_active");
        assert!(feature.keys().unwrap().is_empty());
        assert!(feature.is_fully_translated().unwrap());
    }

    #[test]
    fn feature_state_comes_from_source() {
        let mut registry = registry();
        assert_eq!(registry.feature("deutsch").state(), "live");
        registry.set_feature_state_source(|_| "rollout".to_string());
        assert_eq!(registry.feature("deutsch").state(), "rollout");
    }

    #[test]
    fn language_view_missing_keys() {
        let registry = registry();
        let en = registry.language("en");
        let keys: Vec<String> = en
            .keys_with_translations_missing()
            .unwrap()
            .iter()
            .map(|k| k.name().to_string())
            .collect();
        assert_eq!(keys, vec!["Etwas nur auf Deutsch @deutsch"]);
    }

    #[test]
    fn language_view_unlocalized_features() {
        let registry = registry();
        assert_eq!(
            registry.language("en").features_with_missing_keys().unwrap(),
            vec!["deutsch"]
        );
        assert_eq!(
            registry.language("de").features_with_missing_keys().unwrap(),
            vec!["sexy_bookings"]
        );
    }

    #[test]
    fn unsupported_language_view_is_empty() {
        let registry = registry();
        let fr = registry.language("fr");
        assert!(fr.keys_with_translations_missing().unwrap().is_empty());
        assert!(fr.features_with_missing_keys().unwrap().is_empty());
    }

    #[test]
    fn views_display_their_name() {
        let registry = registry();
        assert_eq!(registry.feature("deutsch").to_string(), "deutsch");
        assert_eq!(registry.language("de").to_string(), "de");
    }
}
