use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::CallError;
use super::report::CoachingReport;

/// Speaker role in a simulated sales call
///
/// The salesperson practicing is always `user`; the AI counterpart is
/// always `prospect`. There is no further diarization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Prospect,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Prospect => "prospect",
        }
    }
}

/// One reconciled utterance in the call transcript
///
/// Entries are insertion-ordered. The last entry is the "open turn" and may
/// still be refined by progressive updates; all earlier entries are frozen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Who spoke
    pub role: Role,

    /// Final text of the turn (latest refinement wins)
    pub text: String,

    /// Receipt time of the turn's first event, in milliseconds since epoch
    pub timestamp_ms: i64,
}

/// One emotion-score vector derived from voice prosody
///
/// Readings are append-only and never revised or deduplicated; every
/// reading is a genuine new measurement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProsodyReading {
    /// Which speaker the reading belongs to
    pub role: Role,

    /// Emotion dimension name -> score in [0, 1]
    pub scores: BTreeMap<String, f64>,

    /// Receipt time in milliseconds since epoch
    pub timestamp_ms: i64,
}

/// A single named emotion score, used for display-ordered snapshots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionScore {
    pub name: String,
    pub score: f64,
}

/// Lifecycle status of a call session
///
/// `active -> completed -> analyzing -> done | error`; `error` and `done`
/// re-enter `analyzing` on an explicit retry. The store is the only writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    Active,
    Completed,
    Analyzing,
    Done,
    Error,
}

impl CallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallStatus::Active => "active",
            CallStatus::Completed => "completed",
            CallStatus::Analyzing => "analyzing",
            CallStatus::Done => "done",
            CallStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for CallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One simulated sales call and everything derived from it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallSession {
    /// Unique session identifier, assigned at creation
    pub id: Uuid,

    /// Identity of the initiating user; used for all access checks
    pub owner: String,

    /// Persona id of the AI counterpart
    pub persona: String,

    /// Optional free-text practice scenario
    pub scenario: Option<String>,

    /// Lifecycle status; the single analysis lock
    pub status: CallStatus,

    pub created_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,

    /// Call length in seconds, set at completion (coerced to >= 1.0)
    pub duration_seconds: Option<f64>,

    /// Opaque id of the upstream voice-service conversation
    pub external_conversation_id: Option<String>,

    /// Reconciled transcript; set exactly once at completion
    pub transcript: Option<Vec<TranscriptEntry>>,

    /// Prosody readings; set exactly once at completion
    pub emotion_data: Option<Vec<ProsodyReading>>,

    /// Coaching report; set only when a run succeeds, replaced wholesale on retry
    pub analysis_results: Option<CoachingReport>,

    /// Generic retry-able message from the last failed run
    pub last_error: Option<String>,
}

impl CallSession {
    pub fn new(owner: impl Into<String>, persona: impl Into<String>, scenario: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner: owner.into(),
            persona: persona.into(),
            scenario,
            status: CallStatus::Active,
            created_at: Utc::now(),
            ended_at: None,
            duration_seconds: None,
            external_conversation_id: None,
            transcript: None,
            emotion_data: None,
            analysis_results: None,
            last_error: None,
        }
    }
}

/// Validated completion payload: everything the live call hands over
#[derive(Debug, Clone)]
pub struct CallOutcome {
    pub duration_seconds: f64,
    pub transcript: Vec<TranscriptEntry>,
    pub emotion_data: Vec<ProsodyReading>,
    pub external_conversation_id: Option<String>,
}

impl CallOutcome {
    /// Validate a completion payload. Duration must be positive; anything
    /// under one second is coerced up to 1.0 so downstream rates stay finite.
    pub fn new(
        duration_seconds: f64,
        transcript: Vec<TranscriptEntry>,
        emotion_data: Vec<ProsodyReading>,
        external_conversation_id: Option<String>,
    ) -> Result<Self, CallError> {
        if !duration_seconds.is_finite() || duration_seconds <= 0.0 {
            return Err(CallError::Validation(
                "duration_seconds must be a positive number".to_string(),
            ));
        }
        Ok(Self {
            duration_seconds: duration_seconds.max(1.0),
            transcript,
            emotion_data,
            external_conversation_id,
        })
    }
}
