use serde::{Deserialize, Serialize};

use crate::analysis::{EmotionSummary, SpeechMetrics};

/// Kind of a highlighted call moment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MomentKind {
    Strength,
    Improvement,
}

/// One notable moment the coach calls out
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyMoment {
    pub kind: MomentKind,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Qualitative part of the report, authored by the language model
///
/// Parsed strictly: a response missing any of these fields is a synthesis
/// failure, never a partially accepted report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    /// 0-100 overall call score
    pub overall_score: u8,

    /// Short summary of the salesperson's tone and delivery
    pub tone_summary: String,

    pub key_moments: Vec<KeyMoment>,
    pub recommendations: Vec<String>,
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
}

/// The full coaching report stored on a session
///
/// A value object: produced whole by one analysis run and replaced whole by
/// a retry, never edited in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoachingReport {
    #[serde(flatten)]
    pub assessment: Assessment,

    pub speech_metrics: SpeechMetrics,
    pub emotion_summary: EmotionSummary,
}
