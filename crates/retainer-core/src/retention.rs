//! Retention evaluation.
//!
//! [`RetentionPolicy::evaluate`] is a pure function of a [`Catalog`] snapshot
//! and the configured keep count. It ranks every distinct semantic version
//! across the whole catalog, selects the top `keep` as the keep window, and
//! then decides each version by its own tags:
//!
//! - any reserved alias tag → preserve
//! - any non-semantic tag → preserve
//! - any semantic tag inside the keep window → preserve
//! - otherwise (including untagged versions) → delete

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use crate::catalog::{Catalog, VersionId};
use crate::tag::{TagClass, TagClassifier};
use crate::version::SemVersion;

/// Default number of semantic versions to keep.
pub const DEFAULT_KEEP: usize = 10;

/// Retention policy: how many semantic versions to keep and how to read tags.
#[derive(Debug, Clone)]
pub struct RetentionPolicy {
    keep: usize,
    classifier: TagClassifier,
}

impl RetentionPolicy {
    /// Creates a policy keeping the `keep` highest semantic versions.
    #[must_use]
    pub fn new(keep: usize) -> Self {
        Self {
            keep,
            classifier: TagClassifier::new(),
        }
    }

    /// Replaces the tag classifier.
    #[must_use]
    pub fn with_classifier(mut self, classifier: TagClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Returns the keep count.
    #[must_use]
    pub const fn keep(&self) -> usize {
        self.keep
    }

    /// Returns the tag classifier.
    #[must_use]
    pub const fn classifier(&self) -> &TagClassifier {
        &self.classifier
    }

    /// Evaluates the policy against a catalog snapshot.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::Utc;
    /// use retainer_core::{Catalog, RetentionPolicy, VersionId, VersionRecord};
    ///
    /// let now = Utc::now();
    /// let catalog = Catalog::from_records(vec![
    ///     VersionRecord::new(1, ["1.0.0"], now),
    ///     VersionRecord::new(2, ["1.1.0"], now),
    ///     VersionRecord::new(3, ["latest"], now),
    /// ]);
    ///
    /// let plan = RetentionPolicy::new(1).evaluate(&catalog);
    /// assert!(plan.delete_ids.contains(&VersionId(1)));
    /// assert!(plan.preserve_ids.contains(&VersionId(2)));
    /// assert!(plan.preserve_ids.contains(&VersionId(3)));
    /// ```
    #[must_use]
    pub fn evaluate(&self, catalog: &Catalog) -> RetentionPlan {
        let classified: Vec<Vec<TagClass>> = catalog
            .iter()
            .map(|record| {
                record
                    .tags
                    .iter()
                    .map(|tag| self.classifier.classify(tag))
                    .collect()
            })
            .collect();

        let keep_window = self.select_keep_window(catalog, &classified);
        let ranks: HashMap<SemVersion, usize> = keep_window
            .iter()
            .map(|kept| (kept.version.clone(), kept.rank))
            .collect();

        let mut decisions = Vec::with_capacity(catalog.len());
        let mut preserve_ids = BTreeSet::new();
        let mut delete_ids = BTreeSet::new();
        let mut preserved_tags = 0;

        for (record, classes) in catalog.iter().zip(&classified) {
            let mut justification = None;

            for (tag, class) in record.tags.iter().zip(classes) {
                let reason = match class {
                    TagClass::ReservedAlias => Some(PreserveReason::ReservedAlias),
                    TagClass::NonSemantic => Some(PreserveReason::NonSemantic),
                    TagClass::Semantic(version) => ranks
                        .get(version)
                        .map(|&rank| PreserveReason::KeepWindow { rank }),
                };

                if let Some(reason) = reason {
                    preserved_tags += 1;
                    justification = Some(Justification {
                        tag: tag.clone(),
                        reason,
                    });
                    break;
                }
            }

            let preserve = justification.is_some();
            if preserve {
                preserve_ids.insert(record.id);
            } else {
                delete_ids.insert(record.id);
            }

            decisions.push(RetentionDecision {
                id: record.id,
                preserve,
                justification,
            });
        }

        tracing::debug!(
            versions = catalog.len(),
            keep = self.keep,
            window = keep_window.len(),
            preserved = preserve_ids.len(),
            deletable = delete_ids.len(),
            "evaluated retention policy"
        );

        RetentionPlan {
            keep_window,
            decisions,
            preserve_ids,
            delete_ids,
            total_tags: catalog.total_tags(),
            preserved_tags,
        }
    }

    /// Ranks distinct semantic versions across the catalog, highest first,
    /// and keeps the first `keep`.
    fn select_keep_window(
        &self,
        catalog: &Catalog,
        classified: &[Vec<TagClass>],
    ) -> Vec<KeptVersion> {
        let mut by_version: BTreeMap<&SemVersion, Vec<String>> = BTreeMap::new();

        for (record, classes) in catalog.iter().zip(classified) {
            for (tag, class) in record.tags.iter().zip(classes) {
                if let TagClass::Semantic(version) = class {
                    by_version.entry(version).or_default().push(tag.clone());
                }
            }
        }

        by_version
            .into_iter()
            .rev()
            .take(self.keep)
            .enumerate()
            .map(|(i, (version, tags))| KeptVersion {
                rank: i + 1,
                version: version.clone(),
                tags,
            })
            .collect()
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_KEEP)
    }
}

/// A semantic version selected into the keep window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeptVersion {
    /// 1-based rank, 1 being the highest version.
    pub rank: usize,

    /// The ranked version.
    pub version: SemVersion,

    /// Every tag in the catalog that resolved to this version.
    pub tags: Vec<String>,
}

/// Why a version is preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreserveReason {
    /// Tagged with a reserved alias.
    ReservedAlias,

    /// Tagged with something that is not a semantic version.
    NonSemantic,

    /// Tagged with a semantic version inside the keep window.
    KeepWindow {
        /// Rank of the version in the window.
        rank: usize,
    },
}

impl fmt::Display for PreserveReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReservedAlias => write!(f, "reserved alias"),
            Self::NonSemantic => write!(f, "non-semantic tag"),
            Self::KeepWindow { rank } => write!(f, "within keep window (#{rank})"),
        }
    }
}

/// The tag that caused a version to be preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Justification {
    /// The first qualifying tag, in tag order.
    pub tag: String,

    /// Why the tag qualifies.
    pub reason: PreserveReason,
}

/// Decision for one version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionDecision {
    /// Version identifier.
    pub id: VersionId,

    /// Whether the version is kept.
    pub preserve: bool,

    /// Present exactly when `preserve` is true.
    pub justification: Option<Justification>,
}

/// Outcome of evaluating a policy against a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionPlan {
    /// Keep window, highest version first.
    pub keep_window: Vec<KeptVersion>,

    /// One decision per catalog record, in catalog order.
    pub decisions: Vec<RetentionDecision>,

    /// Versions to keep.
    pub preserve_ids: BTreeSet<VersionId>,

    /// Versions to delete.
    pub delete_ids: BTreeSet<VersionId>,

    /// Tags seen across the catalog.
    pub total_tags: usize,

    /// Justifying tags, one per preserved version.
    pub preserved_tags: usize,
}

impl RetentionPlan {
    /// Returns true if no version needs deleting.
    #[must_use]
    pub fn nothing_to_delete(&self) -> bool {
        self.delete_ids.is_empty()
    }

    /// Returns the decision for a version id.
    #[must_use]
    pub fn decision(&self, id: VersionId) -> Option<&RetentionDecision> {
        self.decisions.iter().find(|d| d.id == id)
    }

    /// Returns the kept semantic versions, highest first.
    pub fn kept_versions(&self) -> impl Iterator<Item = &SemVersion> {
        self.keep_window.iter().map(|kept| &kept.version)
    }

    /// Returns the reporting counts.
    #[must_use]
    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            total_versions: self.decisions.len(),
            total_tags: self.total_tags,
            preserved_tags: self.preserved_tags,
            preserved_versions: self.preserve_ids.len(),
            deletable_versions: self.delete_ids.len(),
        }
    }
}

/// Reporting counts for a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanSummary {
    /// Versions in the catalog.
    pub total_versions: usize,
    /// Tags in the catalog.
    pub total_tags: usize,
    /// Tags that warrant preservation.
    pub preserved_tags: usize,
    /// Versions kept.
    pub preserved_versions: usize,
    /// Versions to delete.
    pub deletable_versions: usize,
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total tags: {}", self.total_tags)?;
        writeln!(f, "Preserved tags: {}", self.preserved_tags)?;
        writeln!(
            f,
            "Preserved image versions: {}/{}",
            self.preserved_versions, self.total_versions
        )?;
        write!(f, "Image versions to delete: {}", self.deletable_versions)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::catalog::VersionRecord;

    fn catalog(records: &[(u64, &[&str])]) -> Catalog {
        let now = Utc::now();
        records
            .iter()
            .map(|(id, tags)| VersionRecord::new(*id, tags.iter().copied(), now))
            .collect()
    }

    fn ids(values: &[u64]) -> BTreeSet<VersionId> {
        values.iter().copied().map(VersionId).collect()
    }

    #[test]
    fn test_keep_two_of_three_plus_latest() {
        let catalog = catalog(&[
            (1, &["1.0.0"]),
            (2, &["1.1.0"]),
            (3, &["1.2.0"]),
            (4, &["latest"]),
        ]);

        let plan = RetentionPolicy::new(2).evaluate(&catalog);

        let kept: Vec<String> = plan.kept_versions().map(ToString::to_string).collect();
        assert_eq!(kept, vec!["1.2.0", "1.1.0"]);
        assert_eq!(plan.preserve_ids, ids(&[2, 3, 4]));
        assert_eq!(plan.delete_ids, ids(&[1]));
    }

    #[test]
    fn test_variant_tags_rank_once() {
        let catalog = catalog(&[(1, &["1.5.0", "1.5.0-avx2"])]);

        let plan = RetentionPolicy::new(1).evaluate(&catalog);

        assert_eq!(plan.keep_window.len(), 1);
        assert_eq!(plan.keep_window[0].tags, vec!["1.5.0", "1.5.0-avx2"]);
        assert_eq!(plan.preserve_ids, ids(&[1]));
        assert_eq!(plan.preserved_tags, 1);
    }

    #[test]
    fn test_preserved_tags_counts_one_tag_per_version() {
        let catalog = catalog(&[
            (1, &["1.0.0", "1.0.0-avx2"]),
            (2, &["latest", "latest-avx2"]),
        ]);

        let plan = RetentionPolicy::new(10).evaluate(&catalog);

        assert_eq!(plan.total_tags, 4);
        assert_eq!(plan.preserved_tags, 2);
        assert_eq!(
            plan.decision(VersionId(2)).unwrap().justification.as_ref().unwrap().tag,
            "latest"
        );
    }

    #[test]
    fn test_variant_does_not_consume_extra_slot() {
        let catalog = catalog(&[
            (1, &["2.0.0"]),
            (2, &["2.0.0-avx2"]),
            (3, &["1.0.0"]),
        ]);

        let plan = RetentionPolicy::new(2).evaluate(&catalog);

        assert_eq!(plan.preserve_ids, ids(&[1, 2, 3]));
        assert!(plan.nothing_to_delete());
    }

    #[test]
    fn test_non_semantic_preserved_with_zero_keep() {
        let catalog = catalog(&[(1, &["build-7a1c2"])]);

        let plan = RetentionPolicy::new(0).evaluate(&catalog);

        assert!(plan.keep_window.is_empty());
        assert_eq!(plan.preserve_ids, ids(&[1]));
        let justification = plan.decision(VersionId(1)).unwrap().justification.as_ref().unwrap();
        assert_eq!(justification.reason, PreserveReason::NonSemantic);
    }

    #[test]
    fn test_empty_catalog() {
        let plan = RetentionPolicy::new(10).evaluate(&Catalog::default());
        assert!(plan.preserve_ids.is_empty());
        assert!(plan.delete_ids.is_empty());
        assert!(plan.nothing_to_delete());
        assert_eq!(plan.summary().total_tags, 0);
    }

    #[test]
    fn test_untagged_versions_are_deleted() {
        let catalog = catalog(&[(1, &[]), (2, &["1.0.0"])]);

        let plan = RetentionPolicy::new(10).evaluate(&catalog);

        assert_eq!(plan.delete_ids, ids(&[1]));
        assert!(plan.decision(VersionId(1)).unwrap().justification.is_none());
    }

    #[test]
    fn test_window_smaller_than_keep() {
        let catalog = catalog(&[(1, &["1.0.0"]), (2, &["0.9.0"])]);

        let plan = RetentionPolicy::new(10).evaluate(&catalog);

        assert_eq!(plan.keep_window.len(), 2);
        assert!(plan.nothing_to_delete());
    }

    #[test]
    fn test_any_qualifying_tag_preserves_version() {
        let catalog = catalog(&[
            (1, &["0.1.0", "stable"]),
            (2, &["0.2.0"]),
            (3, &["0.3.0"]),
        ]);

        let plan = RetentionPolicy::new(1).evaluate(&catalog);

        assert_eq!(plan.preserve_ids, ids(&[1, 3]));
        assert_eq!(plan.delete_ids, ids(&[2]));
        let justification = plan.decision(VersionId(1)).unwrap().justification.clone().unwrap();
        assert_eq!(justification.tag, "stable");
    }

    #[test]
    fn test_republished_version_evaluated_per_record() {
        // Same version under two ids: both rank once and both are preserved.
        let catalog = catalog(&[
            (1, &["3.0.0"]),
            (2, &["3.0.0-avx2", "old-build"]),
            (3, &["2.0.0"]),
        ]);

        let plan = RetentionPolicy::new(1).evaluate(&catalog);

        assert_eq!(plan.keep_window.len(), 1);
        assert_eq!(plan.preserve_ids, ids(&[1, 2]));
        assert_eq!(plan.delete_ids, ids(&[3]));
    }

    #[test]
    fn test_prerelease_ranks_below_release() {
        let catalog = catalog(&[(1, &["2.0.0-rc.1"]), (2, &["2.0.0"]), (3, &["1.9.0"])]);

        let plan = RetentionPolicy::new(1).evaluate(&catalog);

        assert_eq!(plan.preserve_ids, ids(&[2]));
        assert_eq!(plan.delete_ids, ids(&[1, 3]));
    }

    #[test]
    fn test_justification_reports_rank() {
        let catalog = catalog(&[(1, &["1.0.0"]), (2, &["1.1.0"])]);

        let plan = RetentionPolicy::new(2).evaluate(&catalog);

        let reason = plan.decision(VersionId(1)).unwrap().justification.as_ref().unwrap().reason;
        assert_eq!(reason, PreserveReason::KeepWindow { rank: 2 });
        assert_eq!(reason.to_string(), "within keep window (#2)");
    }

    #[test]
    fn test_summary_counts() {
        let catalog = catalog(&[
            (1, &["1.0.0", "1.0.0-avx2"]),
            (2, &["1.1.0"]),
            (3, &["latest", "latest-avx2"]),
            (4, &[]),
        ]);

        let summary = RetentionPolicy::new(1).evaluate(&catalog).summary();

        assert_eq!(
            summary,
            PlanSummary {
                total_versions: 4,
                total_tags: 5,
                preserved_tags: 2,
                preserved_versions: 2,
                deletable_versions: 2,
            }
        );
        let text = summary.to_string();
        assert!(text.contains("Total tags: 5"));
        assert!(text.contains("Image versions to delete: 2"));
    }

    #[test]
    fn test_default_policy_keeps_ten() {
        assert_eq!(RetentionPolicy::default().keep(), DEFAULT_KEEP);
    }
}
