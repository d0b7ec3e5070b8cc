use std::collections::BTreeMap;

use chrono::Utc;

use super::event::SpeechEvent;
use crate::call::{EmotionScore, ProsodyReading, Role, TranscriptEntry};

/// Merges the progressive speech-event stream into one canonical transcript
///
/// The last transcript entry is the mutable "open turn". An event whose role
/// matches the open turn refines it (its text replaces the turn's text); an
/// event from the other role closes the turn and opens a new one. The result
/// is a transcript with exactly one entry per role change and no duplicated
/// turns.
///
/// Prosody scores are kept separately: every scored event appends a reading
/// whether or not its text caused a replace or an append, since each reading
/// is a genuine new measurement. Timestamps are receipt times; upstream
/// clocks are neither monotonic nor synchronized and are not trusted.
#[derive(Debug, Default)]
pub struct TranscriptReconciler {
    entries: Vec<TranscriptEntry>,
    readings: Vec<ProsodyReading>,
    current_emotions: Vec<EmotionScore>,
}

impl TranscriptReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one speech event
    ///
    /// Events for one session must be applied one at a time in arrival
    /// order; the caller serializes access (see `LiveCall`).
    pub fn apply(&mut self, event: SpeechEvent) {
        let received_at = Utc::now().timestamp_millis();

        // Scores are recorded even when the text is ignored.
        if let Some(scores) = &event.scores {
            self.readings.push(ProsodyReading {
                role: event.role,
                scores: scores.clone(),
                timestamp_ms: received_at,
            });
            if event.role == Role::User {
                self.current_emotions = display_snapshot(scores);
            }
        }

        if event.text.trim().is_empty() {
            return;
        }

        match self.entries.last_mut() {
            // Same role as the open turn: progressive refinement, the new
            // text supersedes the old. The turn keeps its first receipt time.
            Some(open) if open.role == event.role => {
                open.text = event.text;
            }
            // Role change (or first event): a new turn opens.
            _ => {
                self.entries.push(TranscriptEntry {
                    role: event.role,
                    text: event.text,
                    timestamp_ms: received_at,
                });
            }
        }
    }

    /// Reconciled transcript so far
    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// All prosody readings so far, in arrival order
    pub fn readings(&self) -> &[ProsodyReading] {
        &self.readings
    }

    /// Most recent user emotion reading, sorted for display
    pub fn current_emotions(&self) -> &[EmotionScore] {
        &self.current_emotions
    }

    /// Hand over the accumulated transcript and readings
    pub fn into_parts(self) -> (Vec<TranscriptEntry>, Vec<ProsodyReading>) {
        (self.entries, self.readings)
    }
}

/// Sort a score map for presentation: descending score, ties by name
/// ascending (the map iterates names in order, and the sort is stable)
fn display_snapshot(scores: &BTreeMap<String, f64>) -> Vec<EmotionScore> {
    let mut snapshot: Vec<EmotionScore> = scores
        .iter()
        .map(|(name, score)| EmotionScore {
            name: name.clone(),
            score: *score,
        })
        .collect();
    snapshot.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    snapshot
}
