//! Named profiles and the process-wide profile registry.
//!
//! Built-in profiles are fixed. Custom profiles are added through
//! [`ProfileBuilder`] and [`register`]; the registry only ever grows, and
//! lookups hand out shared snapshots so readers never hold the lock while a
//! comparison runs.

use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use tracing::debug;

use super::{Behavior, Dimension, Preprocessing};
use crate::error::ConfigError;

/// Names of the profiles every process knows about.
pub const BUILTIN_PROFILE_NAMES: [&str; 4] = ["strict", "rendered", "spec_friendly", "content_only"];

/// A named, immutable bundle of dimension settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    name: String,
    preprocessing: Option<Preprocessing>,
    settings: Vec<(Dimension, Behavior)>,
}

impl Profile {
    /// Returns the profile name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the preprocessing mode the profile selects, if any.
    pub fn preprocessing(&self) -> Option<Preprocessing> {
        self.preprocessing
    }

    /// Returns the dimension settings in application order.
    pub fn settings(&self) -> &[(Dimension, Behavior)] {
        &self.settings
    }
}

/// Builds and validates a custom profile.
#[derive(Debug, Clone)]
pub struct ProfileBuilder {
    name: String,
    preprocessing: Option<String>,
    settings: Vec<(String, String)>,
}

impl ProfileBuilder {
    /// Starts a profile with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        ProfileBuilder {
            name: name.into(),
            preprocessing: None,
            settings: Vec::new(),
        }
    }

    /// Adds a dimension setting by name.
    pub fn set(mut self, dimension: impl Into<String>, behavior: impl Into<String>) -> Self {
        self.settings.push((dimension.into(), behavior.into()));
        self
    }

    /// Selects a preprocessing mode.
    pub fn preprocessing(mut self, mode: impl Into<String>) -> Self {
        self.preprocessing = Some(mode.into());
        self
    }

    /// Validates the settings with the same rules as option resolution.
    pub fn build(self) -> Result<Profile, ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyProfileName);
        }
        let preprocessing = self
            .preprocessing
            .as_deref()
            .map(Preprocessing::parse)
            .transpose()?;
        let settings = self
            .settings
            .iter()
            .map(|(d, b)| Dimension::parse_setting(d, b))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Profile {
            name: self.name,
            preprocessing,
            settings,
        })
    }
}

static BUILTINS: Lazy<FxHashMap<&'static str, Arc<Profile>>> = Lazy::new(|| {
    use Behavior::{Ignore, Normalize, Strict};
    use Dimension::*;

    let strict = Profile {
        name: "strict".to_string(),
        preprocessing: Some(Preprocessing::None),
        settings: Dimension::CONFIGURABLE.iter().map(|d| (*d, Strict)).collect(),
    };
    let rendered = Profile {
        name: "rendered".to_string(),
        preprocessing: Some(Preprocessing::Rendered),
        settings: vec![
            (TextContent, Normalize),
            (StructuralWhitespace, Normalize),
            (Comments, Ignore),
        ],
    };
    let spec_friendly = Profile {
        name: "spec_friendly".to_string(),
        preprocessing: Some(Preprocessing::Normalize),
        settings: vec![
            (TextContent, Normalize),
            (StructuralWhitespace, Ignore),
            (AttributeOrder, Ignore),
            (ElementPosition, Ignore),
            (KeyOrder, Ignore),
            (Comments, Ignore),
        ],
    };
    let content_only = Profile {
        name: "content_only".to_string(),
        preprocessing: Some(Preprocessing::Canonicalize),
        settings: vec![
            (TextContent, Normalize),
            (AttributeValues, Normalize),
            (StructuralWhitespace, Ignore),
            (AttributeOrder, Ignore),
            (ElementPosition, Ignore),
            (KeyOrder, Ignore),
            (Comments, Ignore),
        ],
    };

    [
        ("strict", strict),
        ("rendered", rendered),
        ("spec_friendly", spec_friendly),
        ("content_only", content_only),
    ]
    .into_iter()
    .map(|(name, p)| (name, Arc::new(p)))
    .collect()
});

static REGISTRY: Lazy<RwLock<FxHashMap<String, Arc<Profile>>>> =
    Lazy::new(|| RwLock::new(FxHashMap::default()));

/// Adds a validated profile to the process-wide registry.
pub fn register(profile: Profile) -> Result<(), ConfigError> {
    if BUILTINS.contains_key(profile.name.as_str()) {
        return Err(ConfigError::DuplicateProfile(profile.name));
    }
    let mut registry = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
    if registry.contains_key(&profile.name) {
        return Err(ConfigError::DuplicateProfile(profile.name));
    }
    debug!(profile = %profile.name, settings = profile.settings.len(), "registered profile");
    registry.insert(profile.name.clone(), Arc::new(profile));
    Ok(())
}

/// Builds, validates and registers a profile from `(dimension, behavior)` names.
pub fn register_profile(name: &str, settings: &[(&str, &str)]) -> Result<(), ConfigError> {
    let builder = settings
        .iter()
        .fold(ProfileBuilder::new(name), |b, (d, v)| b.set(*d, *v));
    register(builder.build()?)
}

/// Looks up a built-in or registered profile.
pub fn lookup_profile(name: &str) -> Result<Arc<Profile>, ConfigError> {
    if let Some(profile) = BUILTINS.get(name) {
        return Ok(profile.clone());
    }
    REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(name)
        .cloned()
        .ok_or_else(|| ConfigError::UnknownProfile(name.to_string()))
}

/// Lists built-in profiles followed by registered ones (sorted).
pub fn profile_names() -> Vec<String> {
    let mut custom: Vec<String> = REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .keys()
        .cloned()
        .collect();
    custom.sort();
    BUILTIN_PROFILE_NAMES
        .iter()
        .map(|n| n.to_string())
        .chain(custom)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_resolve() {
        for name in BUILTIN_PROFILE_NAMES {
            let profile = lookup_profile(name).unwrap();
            assert_eq!(profile.name(), name);
        }
    }

    #[test]
    fn test_strict_sets_every_dimension() {
        let strict = lookup_profile("strict").unwrap();
        assert_eq!(strict.settings().len(), Dimension::CONFIGURABLE.len());
        assert!(strict.settings().iter().all(|(_, b)| *b == Behavior::Strict));
        assert_eq!(strict.preprocessing(), Some(Preprocessing::None));
    }

    #[test]
    fn test_unknown_profile() {
        let err = lookup_profile("no_such_profile").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProfile(name) if name == "no_such_profile"));
    }

    #[test]
    fn test_register_and_lookup() {
        register_profile(
            "profile_unit_test_register",
            &[("text_content", "normalize"), ("comments", "ignore")],
        )
        .unwrap();
        let profile = lookup_profile("profile_unit_test_register").unwrap();
        assert_eq!(
            profile.settings(),
            &[
                (Dimension::TextContent, Behavior::Normalize),
                (Dimension::Comments, Behavior::Ignore)
            ]
        );
        assert!(profile_names().contains(&"profile_unit_test_register".to_string()));
    }

    #[test]
    fn test_register_validates() {
        let err = register_profile("profile_unit_test_bad", &[("attribute_order", "normalize")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::BehaviorNotAllowed { .. }));
        assert!(lookup_profile("profile_unit_test_bad").is_err());

        let err = ProfileBuilder::new("  ").build().unwrap_err();
        assert!(matches!(err, ConfigError::EmptyProfileName));

        let err = ProfileBuilder::new("profile_unit_test_pre")
            .preprocessing("sideways")
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownPreprocessing(_)));
    }

    #[test]
    fn test_duplicates_rejected() {
        let err = register_profile("strict", &[]).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateProfile(_)));

        register_profile("profile_unit_test_dup", &[]).unwrap();
        let err = register_profile("profile_unit_test_dup", &[]).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateProfile(_)));
    }
}
