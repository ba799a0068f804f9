//! End-to-end retention scenarios against the public API.

use std::collections::BTreeSet;

use chrono::{Duration, TimeZone, Utc};
use retainer_core::{
    Catalog, PreserveReason, RetentionPolicy, TagClassifier, VersionId, VersionRecord,
};

/// Builds a catalog with one record per entry, spaced a day apart.
fn catalog(entries: &[(u64, &[&str])]) -> Catalog {
    let base = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    entries
        .iter()
        .zip(0_i64..)
        .map(|((id, tags), day)| VersionRecord::new(*id, tags.iter().copied(), base + Duration::days(day)))
        .collect()
}

fn ids(values: &[u64]) -> BTreeSet<VersionId> {
    values.iter().copied().map(VersionId).collect()
}

#[test]
fn scenario_keep_window_plus_latest() {
    let catalog = catalog(&[
        (1, &["1.0.0"]),
        (2, &["1.1.0"]),
        (3, &["1.2.0"]),
        (4, &["latest"]),
    ]);

    let plan = RetentionPolicy::new(2).evaluate(&catalog);

    let kept: Vec<String> = plan.kept_versions().map(ToString::to_string).collect();
    assert_eq!(kept, ["1.2.0", "1.1.0"]);
    assert_eq!(plan.preserve_ids, ids(&[2, 3, 4]));
    assert_eq!(plan.delete_ids, ids(&[1]));
    assert_eq!(
        plan.decision(VersionId(4)).unwrap().justification.as_ref().unwrap().reason,
        PreserveReason::ReservedAlias
    );
}

#[test]
fn scenario_variant_tags_share_one_rank() {
    let catalog = catalog(&[(1, &["1.5.0", "1.5.0-avx2"])]);

    let plan = RetentionPolicy::new(1).evaluate(&catalog);

    assert_eq!(plan.preserve_ids, ids(&[1]));
    assert!(plan.delete_ids.is_empty());
}

#[test]
fn scenario_unparseable_tag_with_zero_keep() {
    let catalog = catalog(&[(1, &["build-7a1c2"])]);

    let plan = RetentionPolicy::new(0).evaluate(&catalog);

    assert_eq!(plan.preserve_ids, ids(&[1]));
    assert!(plan.delete_ids.is_empty());
}

#[test]
fn scenario_empty_catalog() {
    let plan = RetentionPolicy::new(10).evaluate(&Catalog::default());

    assert!(plan.preserve_ids.is_empty());
    assert!(plan.delete_ids.is_empty());
    assert!(plan.nothing_to_delete());
}

#[test]
fn realistic_registry_listing() {
    let catalog = catalog(&[
        (900, &["0.8.0", "0.8.0-avx2"]),
        (901, &["0.9.0"]),
        (902, &["0.9.0-avx2"]),
        (903, &["0.10.0-rc.1"]),
        (904, &["0.10.0", "latest"]),
        (905, &["0.10.0-avx2", "latest-avx2"]),
        (906, &[]),
        (907, &["main"]),
        (908, &["0.7.3"]),
    ]);

    let plan = RetentionPolicy::new(2).evaluate(&catalog);

    // The release candidate of the newest line outranks every older release.
    let kept: Vec<String> = plan.kept_versions().map(ToString::to_string).collect();
    assert_eq!(kept, ["0.10.0", "0.10.0-rc.1"]);
    assert_eq!(plan.keep_window[0].tags, ["0.10.0", "0.10.0-avx2"]);
    assert_eq!(plan.preserve_ids, ids(&[903, 904, 905, 907]));
    assert_eq!(plan.delete_ids, ids(&[900, 901, 902, 906, 908]));

    let summary = plan.summary();
    assert_eq!(summary.total_versions, 9);
    assert_eq!(summary.total_tags, 11);
    assert_eq!(summary.deletable_versions, 5);
}

#[test]
fn custom_classifier_changes_aliases() {
    let catalog = catalog(&[(1, &["stable"]), (2, &["1.0.0-cuda"]), (3, &["0.9.0"])]);
    let classifier = TagClassifier::empty()
        .with_reserved_alias("stable")
        .with_variant_suffix("-cuda");

    let plan = RetentionPolicy::new(1)
        .with_classifier(classifier)
        .evaluate(&catalog);

    assert_eq!(plan.preserve_ids, ids(&[1, 2]));
    assert_eq!(plan.delete_ids, ids(&[3]));
}
