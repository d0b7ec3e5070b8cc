// Integration tests for the emotion summarizer
//
// Pure aggregation over prosody readings; only user readings count and
// empty input degrades to empty aggregates.

use std::collections::BTreeMap;

use pitchcoach::analysis::{summarize_emotions, TIMELINE_BUCKETS};
use pitchcoach::{ProsodyReading, Role};

fn reading(role: Role, timestamp_ms: i64, scores: &[(&str, f64)]) -> ProsodyReading {
    let scores: BTreeMap<String, f64> = scores
        .iter()
        .map(|(name, score)| (name.to_string(), *score))
        .collect();
    ProsodyReading {
        role,
        scores,
        timestamp_ms,
    }
}

#[test]
fn test_basic_summary() {
    let readings = vec![
        reading(
            Role::User,
            1000,
            &[
                ("Determination", 0.8),
                ("Confidence", 0.7),
                ("Excitement", 0.6),
                ("Joy", 0.5),
                ("Interest", 0.4),
                ("Doubt", 0.1),
            ],
        ),
        reading(
            Role::User,
            2000,
            &[
                ("Determination", 0.9),
                ("Confidence", 0.8),
                ("Excitement", 0.7),
                ("Joy", 0.6),
                ("Interest", 0.5),
                ("Doubt", 0.2),
            ],
        ),
    ];

    let summary = summarize_emotions(&readings);

    assert_eq!(summary.total_readings, 2);
    assert!(summary.dimension_averages["Confidence"] > 0.0);
    assert!(summary.dimension_averages["Enthusiasm"] > 0.0);
    assert!(summary.dominant_emotions.len() <= 3);
    assert!(!summary.timeline.is_empty());
}

#[test]
fn test_all_dimensions_surfaced_even_when_zero() {
    let readings = vec![reading(Role::User, 1000, &[("Determination", 0.5)])];
    let summary = summarize_emotions(&readings);

    for dimension in ["Confidence", "Enthusiasm", "Hesitation", "Empathy", "Frustration"] {
        assert!(
            summary.dimension_averages.contains_key(dimension),
            "missing dimension {dimension}"
        );
    }
    assert_eq!(summary.dimension_averages["Frustration"], 0.0);
}

#[test]
fn test_empty_input_yields_empty_aggregates() {
    let summary = summarize_emotions(&[]);

    assert_eq!(summary.total_readings, 0);
    assert!(summary.dominant_emotions.is_empty());
    assert!(summary.timeline.is_empty());
    assert_eq!(summary.dimension_averages.len(), 5);
    assert!(summary.dimension_averages.values().all(|v| *v == 0.0));
}

#[test]
fn test_prospect_readings_ignored() {
    let readings = vec![reading(Role::Prospect, 1000, &[("Confidence", 0.8)])];
    let summary = summarize_emotions(&readings);
    assert_eq!(summary.total_readings, 0);
    assert!(summary.dominant_emotions.is_empty());
}

#[test]
fn test_dominant_ordering_is_deterministic() {
    // Confidence and Hesitation end up with the same average; the tie must
    // break by name, Confidence first.
    let readings = vec![reading(
        Role::User,
        1000,
        &[("Determination", 0.6), ("Doubt", 0.6), ("Excitement", 0.9)],
    )];
    let summary = summarize_emotions(&readings);

    let order: Vec<&str> = summary
        .dominant_emotions
        .iter()
        .map(|d| d.dimension.as_str())
        .collect();
    assert_eq!(order, vec!["Enthusiasm", "Confidence", "Hesitation"]);
}

#[test]
fn test_dimension_average_is_mean_of_present_emotions() {
    let readings = vec![reading(
        Role::User,
        1000,
        &[("Determination", 0.4), ("Conviction", 0.8)],
    )];
    let summary = summarize_emotions(&readings);
    // Confidence = mean(Determination, Conviction); the absent raw emotion
    // does not drag the average down.
    assert_eq!(summary.dimension_averages["Confidence"], 0.6);
}

#[test]
fn test_timeline_points_carry_all_dimensions() {
    let readings = vec![reading(
        Role::User,
        1000,
        &[("Determination", 0.5), ("Excitement", 0.3)],
    )];
    let summary = summarize_emotions(&readings);

    assert_eq!(summary.timeline.len(), 1);
    let point = &summary.timeline[0];
    assert!(point.dimensions.contains_key("Confidence"));
    assert!(point.dimensions.contains_key("Enthusiasm"));
    assert!(point.dimensions.contains_key("Hesitation"));
}

#[test]
fn test_timeline_is_coarse_bucketed() {
    // 100 readings spread across 100 seconds collapse into at most the
    // fixed bucket count.
    let readings: Vec<ProsodyReading> = (0..100)
        .map(|i| reading(Role::User, i * 1000, &[("Determination", 0.5)]))
        .collect();
    let summary = summarize_emotions(&readings);

    assert!(summary.timeline.len() <= TIMELINE_BUCKETS);
    assert!(summary.timeline.len() > 1);
    assert_eq!(summary.total_readings, 100);

    // Bucket indices ascend.
    let indices: Vec<usize> = summary.timeline.iter().map(|p| p.index).collect();
    let mut sorted = indices.clone();
    sorted.sort_unstable();
    assert_eq!(indices, sorted);
}

#[test]
fn test_identical_timestamps_land_in_one_bucket() {
    let readings: Vec<ProsodyReading> = (0..5)
        .map(|_| reading(Role::User, 42_000, &[("Doubt", 0.4)]))
        .collect();
    let summary = summarize_emotions(&readings);

    assert_eq!(summary.timeline.len(), 1);
    assert_eq!(summary.timeline[0].dimensions["Hesitation"], 0.4);
}

#[test]
fn test_summary_is_pure() {
    let readings = vec![
        reading(Role::User, 1000, &[("Determination", 0.8), ("Doubt", 0.3)]),
        reading(Role::User, 9000, &[("Excitement", 0.6)]),
    ];
    let first = serde_json::to_value(summarize_emotions(&readings)).unwrap();
    let second = serde_json::to_value(summarize_emotions(&readings)).unwrap();
    assert_eq!(first, second);
}
