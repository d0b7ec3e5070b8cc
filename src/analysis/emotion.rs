use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::call::{ProsodyReading, Role};

/// Coaching-relevant dimensions and the raw prosody emotions feeding each
///
/// All five are always surfaced in a summary, even when near zero.
pub const COACHING_DIMENSIONS: &[(&str, &[&str])] = &[
    ("Confidence", &["Determination", "Confidence", "Conviction"]),
    ("Enthusiasm", &["Excitement", "Joy", "Interest"]),
    ("Hesitation", &["Doubt", "Confusion", "Anxiety"]),
    ("Empathy", &["Sympathy", "Compassion", "Understanding"]),
    ("Frustration", &["Anger", "Annoyance", "Contempt"]),
];

/// How many dominant dimensions a summary surfaces
pub const DOMINANT_COUNT: usize = 3;

/// Fixed bucket count for the coarse timeline
pub const TIMELINE_BUCKETS: usize = 12;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DominantEmotion {
    pub dimension: String,
    pub score: f64,
}

/// One averaged timeline bucket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelinePoint {
    /// Bucket index across the call span
    pub index: usize,

    /// Bucket start, milliseconds since epoch
    pub timestamp_ms: i64,

    /// Averaged dimension scores for readings in this bucket
    pub dimensions: BTreeMap<String, f64>,
}

/// Aggregated emotion view of one call, restricted to user readings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionSummary {
    pub dimension_averages: BTreeMap<String, f64>,
    pub dominant_emotions: Vec<DominantEmotion>,
    pub timeline: Vec<TimelinePoint>,
    pub total_readings: usize,
}

impl EmotionSummary {
    fn empty() -> Self {
        let dimension_averages = COACHING_DIMENSIONS
            .iter()
            .map(|&(dimension, _)| (dimension.to_string(), 0.0))
            .collect();
        Self {
            dimension_averages,
            dominant_emotions: Vec::new(),
            timeline: Vec::new(),
            total_readings: 0,
        }
    }
}

/// Summarize raw prosody readings into coaching dimensions
///
/// Pure function over the reading sequence; only `user` readings count.
/// Empty input yields empty aggregates, not an error. Dominant dimensions
/// are ordered by score descending with ties broken by name ascending, so
/// the output is deterministic for a given input.
pub fn summarize_emotions(readings: &[ProsodyReading]) -> EmotionSummary {
    let user_readings: Vec<&ProsodyReading> =
        readings.iter().filter(|r| r.role == Role::User).collect();
    if user_readings.is_empty() {
        return EmotionSummary::empty();
    }

    // Per-dimension averages across readings that carry data for it.
    let mut dimension_averages = BTreeMap::new();
    for &(dimension, related) in COACHING_DIMENSIONS {
        let samples: Vec<f64> = user_readings
            .iter()
            .filter_map(|r| dimension_mean(&r.scores, related))
            .collect();
        let average = if samples.is_empty() {
            0.0
        } else {
            round3(samples.iter().sum::<f64>() / samples.len() as f64)
        };
        dimension_averages.insert(dimension.to_string(), average);
    }

    // The map iterates names ascending; the stable sort keeps that order
    // for equal scores.
    let mut ranked: Vec<DominantEmotion> = dimension_averages
        .iter()
        .map(|(dimension, score)| DominantEmotion {
            dimension: dimension.clone(),
            score: *score,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(DOMINANT_COUNT);

    EmotionSummary {
        dimension_averages,
        dominant_emotions: ranked,
        timeline: build_timeline(&user_readings),
        total_readings: user_readings.len(),
    }
}

/// Bucket readings into at most `TIMELINE_BUCKETS` intervals across the
/// observed timestamp span and average each bucket per dimension; buckets
/// without readings are omitted
fn build_timeline(user_readings: &[&ProsodyReading]) -> Vec<TimelinePoint> {
    let min_ts = user_readings.iter().map(|r| r.timestamp_ms).min();
    let max_ts = user_readings.iter().map(|r| r.timestamp_ms).max();
    let (Some(min_ts), Some(max_ts)) = (min_ts, max_ts) else {
        return Vec::new();
    };
    let span = (max_ts - min_ts) as u128 + 1;

    let mut buckets: Vec<Vec<&ProsodyReading>> = vec![Vec::new(); TIMELINE_BUCKETS];
    for reading in user_readings.iter().copied() {
        let offset = (reading.timestamp_ms - min_ts) as u128;
        let index = ((offset * TIMELINE_BUCKETS as u128) / span) as usize;
        buckets[index.min(TIMELINE_BUCKETS - 1)].push(reading);
    }

    let bucket_width = ((max_ts - min_ts) / TIMELINE_BUCKETS as i64).max(1);
    buckets
        .into_iter()
        .enumerate()
        .filter(|(_, readings)| !readings.is_empty())
        .map(|(index, readings)| {
            let mut dimensions = BTreeMap::new();
            for &(dimension, related) in COACHING_DIMENSIONS {
                let mean = readings
                    .iter()
                    .map(|r| dimension_mean(&r.scores, related).unwrap_or(0.0))
                    .sum::<f64>()
                    / readings.len() as f64;
                dimensions.insert(dimension.to_string(), round3(mean));
            }
            TimelinePoint {
                index,
                timestamp_ms: min_ts + index as i64 * bucket_width,
                dimensions,
            }
        })
        .collect()
}

/// Mean of the related raw emotions present in one reading, if any
fn dimension_mean(scores: &BTreeMap<String, f64>, related: &[&str]) -> Option<f64> {
    let present: Vec<f64> = related
        .iter()
        .filter_map(|emotion| scores.get(*emotion).copied())
        .collect();
    if present.is_empty() {
        None
    } else {
        Some(present.iter().sum::<f64>() / present.len() as f64)
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
