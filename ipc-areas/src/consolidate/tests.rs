//! Tests for feature consolidation

use super::*;
use crate::feature::{AreaGeometry, AreaProperties};

fn square_at(x: f64) -> AreaGeometry {
    AreaGeometry::Polygon(vec![vec![
        vec![x, 0.0],
        vec![x + 1.0, 0.0],
        vec![x + 1.0, 1.0],
        vec![x, 1.0],
        vec![x, 0.0],
    ]])
}

fn area(id: Option<&str>, title: &str, year: Option<i32>, x: f64) -> Feature {
    let mut props = AreaProperties::new(title, "KE", "KEN", year);
    if let Some(id) = id {
        props = props.with_id(id);
    }
    Feature::new(square_at(x), props)
}

fn x_of(feature: &Feature) -> f64 {
    feature.geometry().rings().next().unwrap()[0][0]
}

#[test]
fn test_new_keys_are_added() {
    let mut collection = CanonicalCollection::new();
    let stats = collection.merge(
        vec![area(Some("A1"), "A", None, 0.0), area(Some("A2"), "B", None, 1.0)],
        &BatchSource::existing(),
    );

    assert_eq!(stats.added, 2);
    assert_eq!(stats.updated, 0);
    assert_eq!(collection.len(), 2);
    assert!(collection.get("id::ken::A1").is_some());
}

#[test]
fn test_priority_dominates_year() {
    let mut collection = CanonicalCollection::new();
    collection.merge(
        vec![area(Some("X1"), "X", None, 10.0)],
        &BatchSource::download(2022),
    );
    let stats = collection.merge(
        vec![area(Some("X1"), "X", None, 0.0)],
        &BatchSource::new(0, Some(2025), "stale"),
    );

    assert_eq!(stats.skipped, 1);
    let survivor = collection.get("id::ken::X1").unwrap();
    assert_eq!(survivor.priority, 10);
    assert_eq!(survivor.source_year, Some(2022));
    assert_eq!(x_of(&survivor.feature), 10.0);
}

#[test]
fn test_higher_priority_replaces_regardless_of_year() {
    let mut collection = CanonicalCollection::new();
    collection.merge(
        vec![area(Some("X1"), "X", None, 0.0)],
        &BatchSource::new(0, Some(2025), "existing"),
    );
    let stats = collection.merge(
        vec![area(Some("X1"), "X", None, 10.0)],
        &BatchSource::download(2022),
    );

    assert_eq!(stats.updated, 1);
    assert_eq!(x_of(&collection.into_features()[0]), 10.0);
}

#[test]
fn test_newer_year_wins_at_equal_priority() {
    let mut collection = CanonicalCollection::new();
    collection.merge(
        vec![area(Some("X1"), "X", None, 3.0)],
        &BatchSource::download(2023),
    );
    let stats = collection.merge(
        vec![area(Some("X1"), "X", None, 4.0)],
        &BatchSource::download(2024),
    );
    assert_eq!(stats.updated, 1);

    // Older year arriving later loses.
    let stats = collection.merge(
        vec![area(Some("X1"), "X", None, 5.0)],
        &BatchSource::download(2023),
    );
    assert_eq!(stats.skipped, 1);
    assert_eq!(x_of(&collection.features()[0]), 4.0);
}

#[test]
fn test_feature_year_overrides_batch_year() {
    let mut collection = CanonicalCollection::new();
    collection.merge(
        vec![area(Some("X1"), "X", Some(2021), 0.0)],
        &BatchSource::download(2025),
    );
    assert_eq!(
        collection.get("id::ken::X1").unwrap().source_year,
        Some(2021)
    );
}

#[test]
fn test_missing_year_counts_as_zero() {
    let mut collection = CanonicalCollection::new();
    collection.merge(
        vec![area(Some("X1"), "X", Some(2020), 1.0)],
        &BatchSource::existing(),
    );
    let stats = collection.merge(
        vec![area(Some("X1"), "X", None, 2.0)],
        &BatchSource::existing(),
    );

    assert_eq!(stats.skipped, 1);
    assert_eq!(x_of(&collection.features()[0]), 1.0);
}

#[test]
fn test_equal_year_favors_later_batch() {
    let mut collection = CanonicalCollection::new();
    collection.merge(
        vec![area(Some("X1"), "X", None, 1.0)],
        &BatchSource::download(2024),
    );
    collection.merge(
        vec![area(Some("X1"), "X", None, 2.0)],
        &BatchSource::download(2024),
    );
    assert_eq!(x_of(&collection.features()[0]), 2.0);
}

#[test]
fn test_reapplying_identical_batch_is_idempotent() {
    let batch = vec![
        area(Some("X1"), "X", None, 1.0),
        area(None, "Turkana", None, 2.0),
    ];
    let source = BatchSource::download(2024);

    let (once, first) = merge(CanonicalCollection::new(), batch.clone(), &source);
    let (twice, second) = merge(once.clone(), batch.clone(), &source);

    assert_eq!(once, twice);
    assert_eq!(first.added, 2);
    // Identical re-inserts replace the entry and are counted as updates.
    assert_eq!(second.added, 0);
    assert_eq!(second.updated, batch.len());
    assert_eq!(second.skipped, 0);
}

#[test]
fn test_output_is_sorted_by_key() {
    let mut collection = CanonicalCollection::new();
    collection.merge(
        vec![
            area(None, "Zeta", None, 0.0),
            area(Some("B2"), "", None, 1.0),
            area(None, "Alpha", None, 2.0),
        ],
        &BatchSource::existing(),
    );

    let keys: Vec<&str> = collection.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["id::ken::B2", "ken::alpha", "ken::zeta"]);

    let titles: Vec<String> = collection
        .into_features()
        .iter()
        .map(|f| f.properties().title.clone())
        .collect();
    assert_eq!(titles, vec!["", "Alpha", "Zeta"]);
}

#[test]
fn test_final_set_is_independent_of_batch_order() {
    let batches = vec![
        (vec![area(Some("X1"), "X", None, 1.0)], BatchSource::existing()),
        (
            vec![area(Some("X1"), "X", None, 2.0), area(Some("X2"), "Y", None, 3.0)],
            BatchSource::download(2023),
        ),
        (vec![area(Some("X2"), "Y", None, 4.0)], BatchSource::download(2024)),
        (vec![area(Some("X3"), "Z", None, 5.0)], BatchSource::legacy(Some(2020))),
    ];

    let mut forward = CanonicalCollection::new();
    for (features, source) in &batches {
        forward.merge(features.clone(), source);
    }
    let mut backward = CanonicalCollection::new();
    for (features, source) in batches.iter().rev() {
        backward.merge(features.clone(), source);
    }

    assert_eq!(forward.features(), backward.features());
    let xs: Vec<f64> = forward.features().iter().map(x_of).collect();
    assert_eq!(xs, vec![2.0, 4.0, 5.0]);
}

#[test]
fn test_unkeyable_feature_is_rejected_not_fatal() {
    let broken = Feature::new(
        AreaGeometry::Polygon(vec![vec![vec![f64::NAN, 0.0]]]),
        AreaProperties::new("", "KE", "KEN", None),
    );
    let mut collection = CanonicalCollection::new();
    let stats = collection.merge(
        vec![broken, area(Some("X1"), "X", None, 0.0)],
        &BatchSource::existing(),
    );

    assert_eq!(stats.rejected, 1);
    assert_eq!(stats.added, 1);
    assert_eq!(collection.len(), 1);
}

#[test]
fn test_end_to_end_three_batches() {
    let c1 = 1.0;
    let c2 = 2.0;
    let mut collection = CanonicalCollection::new();

    collection.merge(
        vec![area(Some("X1"), "X", None, c1)],
        &BatchSource::new(0, Some(2023), "existing"),
    );
    collection.merge(
        vec![area(Some("X1"), "X", None, c2)],
        &BatchSource::new(10, Some(2024), "download:2024"),
    );
    let stats = collection.merge(
        vec![area(Some("X1"), "X", None, 9.0)],
        &BatchSource::new(10, Some(2022), "download:2022"),
    );

    assert_eq!(stats.skipped, 1);
    let features = collection.into_features();
    assert_eq!(features.len(), 1);
    assert_eq!(features[0].id().map(|id| id.to_string()), Some("X1".to_string()));
    assert_eq!(x_of(&features[0]), c2);
}

#[test]
fn test_target_year_and_stats_accumulate() {
    let mut collection = CanonicalCollection::new();
    let mut total = MergeStats::default();
    total += collection.merge(vec![area(Some("A"), "A", None, 0.0)], &BatchSource::existing());
    total += collection.merge(vec![area(Some("B"), "B", None, 0.0)], &BatchSource::download(2024));
    total += collection.merge(vec![area(Some("A"), "A", None, 0.0)], &BatchSource::download(2023));

    assert_eq!(total.added, 2);
    assert_eq!(total.updated, 1);
    assert!(total.changed());
    assert_eq!(collection.target_year(), Some(2024));
    assert_eq!(CanonicalCollection::new().target_year(), None);
}

#[test]
fn test_batch_source_constructors() {
    assert_eq!(BatchSource::existing().priority, PRIORITY_EXISTING);
    assert_eq!(BatchSource::download(2024).label, "download:2024");
    assert_eq!(BatchSource::legacy(Some(2021)).priority, PRIORITY_LEGACY);
    assert_eq!(BatchSource::legacy(None).label, "legacy");
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn batch(ids: &[u8], x: f64) -> Vec<Feature> {
        ids.iter()
            .map(|id| area(Some(&format!("A{}", id)), "Area", None, x))
            .collect()
    }

    proptest! {
        /// Property: survivors depend only on priority and year, not on the
        /// order batches are merged in.
        #[test]
        fn prop_merge_order_does_not_change_survivors(
            ids_a in prop::collection::vec(0u8..6, 0..6),
            ids_b in prop::collection::vec(0u8..6, 0..6),
            ids_c in prop::collection::vec(0u8..6, 0..6),
            year_b in 2000i32..2030,
            year_c in 2000i32..2030,
        ) {
            let batches = [
                (batch(&ids_a, 1.0), BatchSource::legacy(Some(2020))),
                (batch(&ids_b, 2.0), BatchSource::existing()),
                (batch(&ids_c, 3.0), BatchSource::new(PRIORITY_DOWNLOAD, Some(year_c.max(year_b)), "c")),
            ];

            let mut forward = CanonicalCollection::new();
            for (features, source) in batches.iter() {
                forward.merge(features.clone(), source);
            }
            let mut backward = CanonicalCollection::new();
            for (features, source) in batches.iter().rev() {
                backward.merge(features.clone(), source);
            }

            prop_assert_eq!(forward.features(), backward.features());
        }
    }
}
