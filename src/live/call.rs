use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use super::event::SpeechEvent;
use super::reconciler::TranscriptReconciler;
use crate::call::{EmotionScore, ProsodyReading, TranscriptEntry};

/// Point-in-time view of an active call, for live display
#[derive(Debug, Clone, Serialize)]
pub struct LiveSnapshot {
    pub session_id: Uuid,

    /// Seconds since the live buffer was opened
    pub elapsed_seconds: f64,

    /// Reconciled transcript so far
    pub transcript: Vec<TranscriptEntry>,

    /// Most recent user emotion reading, sorted for display
    pub current_emotions: Vec<EmotionScore>,
}

/// In-memory buffer for one active call
///
/// Owns the reconciler while the call is live and hands its output to the
/// session store exactly once at completion. The mutex serializes event
/// application, so no two events for the same session are ever processed
/// concurrently and the reconciler's replace-vs-append rule never races.
pub struct LiveCall {
    session_id: Uuid,
    started_at: DateTime<Utc>,
    reconciler: Mutex<TranscriptReconciler>,
}

impl LiveCall {
    pub fn new(session_id: Uuid) -> Self {
        info!("opening live buffer for call session {session_id}");
        Self {
            session_id,
            started_at: Utc::now(),
            reconciler: Mutex::new(TranscriptReconciler::new()),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Apply one inbound speech event in arrival order
    pub async fn push(&self, event: SpeechEvent) {
        let mut reconciler = self.reconciler.lock().await;
        reconciler.apply(event);
    }

    /// Current transcript and emotion snapshot for live display
    pub async fn snapshot(&self) -> LiveSnapshot {
        let reconciler = self.reconciler.lock().await;
        LiveSnapshot {
            session_id: self.session_id,
            elapsed_seconds: self.elapsed_seconds(),
            transcript: reconciler.transcript().to_vec(),
            current_emotions: reconciler.current_emotions().to_vec(),
        }
    }

    pub fn elapsed_seconds(&self) -> f64 {
        let elapsed = Utc::now().signed_duration_since(self.started_at);
        elapsed.num_milliseconds() as f64 / 1000.0
    }

    /// Drain the buffer for completion
    ///
    /// Returns the accumulated transcript and readings, leaving the buffer
    /// empty; called exactly once when the call ends.
    pub async fn drain(&self) -> (Vec<TranscriptEntry>, Vec<ProsodyReading>) {
        let mut reconciler = self.reconciler.lock().await;
        info!("draining live buffer for call session {}", self.session_id);
        std::mem::take(&mut *reconciler).into_parts()
    }
}
