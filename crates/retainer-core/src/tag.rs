//! Tag classification.
//!
//! Every tag falls into exactly one [`TagClass`]. Classification is total:
//! strings that are not versions become [`TagClass::NonSemantic`] rather than
//! errors, so nothing the policy cannot understand is ever selected for
//! deletion.

use crate::version::SemVersion;

/// Default reserved aliases.
pub const DEFAULT_RESERVED_ALIASES: &[&str] = &["latest"];

/// Default architecture / variant suffixes.
pub const DEFAULT_VARIANT_SUFFIXES: &[&str] = &["-avx2"];

/// Classification of a single tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagClass {
    /// A reserved alias such as `latest` or `latest-avx2`.
    ReservedAlias,

    /// A semantic version with any variant suffix removed.
    Semantic(SemVersion),

    /// Anything that is neither an alias nor a parseable version.
    NonSemantic,
}

impl TagClass {
    /// Returns true if the tag keeps its version regardless of the keep window.
    #[must_use]
    pub const fn is_unconditionally_preserved(&self) -> bool {
        matches!(self, Self::ReservedAlias | Self::NonSemantic)
    }

    /// Returns the parsed version for semantic tags.
    #[must_use]
    pub const fn version(&self) -> Option<&SemVersion> {
        match self {
            Self::Semantic(version) => Some(version),
            _ => None,
        }
    }
}

/// Classifies tags into aliases, semantic versions and everything else.
#[derive(Debug, Clone)]
pub struct TagClassifier {
    reserved_aliases: Vec<String>,
    variant_suffixes: Vec<String>,
}

impl TagClassifier {
    /// Creates a classifier with the default aliases and suffixes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            reserved_aliases: DEFAULT_RESERVED_ALIASES
                .iter()
                .map(ToString::to_string)
                .collect(),
            variant_suffixes: DEFAULT_VARIANT_SUFFIXES
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }

    /// Creates a classifier with no aliases and no suffixes.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            reserved_aliases: Vec::new(),
            variant_suffixes: Vec::new(),
        }
    }

    /// Adds a reserved alias.
    #[must_use]
    pub fn with_reserved_alias(mut self, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        if !alias.is_empty() && !self.reserved_aliases.contains(&alias) {
            self.reserved_aliases.push(alias);
        }
        self
    }

    /// Adds a variant suffix (e.g. `-avx2`).
    #[must_use]
    pub fn with_variant_suffix(mut self, suffix: impl Into<String>) -> Self {
        let suffix = suffix.into();
        if !suffix.is_empty() && !self.variant_suffixes.contains(&suffix) {
            self.variant_suffixes.push(suffix);
        }
        self
    }

    /// Returns the configured reserved aliases.
    #[must_use]
    pub fn reserved_aliases(&self) -> &[String] {
        &self.reserved_aliases
    }

    /// Returns the configured variant suffixes.
    #[must_use]
    pub fn variant_suffixes(&self) -> &[String] {
        &self.variant_suffixes
    }

    /// Classifies a tag.
    ///
    /// # Examples
    ///
    /// ```
    /// use retainer_core::{SemVersion, TagClass, TagClassifier};
    ///
    /// let classifier = TagClassifier::new();
    /// assert_eq!(classifier.classify("latest-avx2"), TagClass::ReservedAlias);
    /// assert_eq!(
    ///     classifier.classify("1.2.3-avx2"),
    ///     TagClass::Semantic(SemVersion::new(1, 2, 3))
    /// );
    /// assert_eq!(classifier.classify("main"), TagClass::NonSemantic);
    /// ```
    #[must_use]
    pub fn classify(&self, tag: &str) -> TagClass {
        let cleaned = self.strip_variant(tag);

        if self.reserved_aliases.iter().any(|alias| alias == cleaned) {
            return TagClass::ReservedAlias;
        }

        cleaned
            .parse::<SemVersion>()
            .map_or(TagClass::NonSemantic, TagClass::Semantic)
    }

    /// Removes one trailing variant suffix, if present.
    fn strip_variant<'a>(&self, tag: &'a str) -> &'a str {
        self.variant_suffixes
            .iter()
            .find_map(|suffix| tag.strip_suffix(suffix.as_str()))
            .filter(|stripped| !stripped.is_empty())
            .unwrap_or(tag)
    }
}

impl Default for TagClassifier {
    fn default() -> Self {
        Self::new()
    }
}
