use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use super::error::CallError;
use super::model::{CallOutcome, CallSession, CallStatus, ProsodyReading, TranscriptEntry};
use super::report::CoachingReport;

/// Admission decision for an analyze trigger
///
/// `AlreadyRunning` makes a second trigger an idempotent no-op instead of a
/// duplicate pipeline run: the `analyzing` status is the lock.
#[derive(Debug)]
pub enum AnalysisAdmission {
    /// The session entered `analyzing`; the caller owns the run
    Started(AnalysisInput),
    /// An analysis is already in flight for this session
    AlreadyRunning,
}

/// Immutable input snapshot handed to the analysis pipeline
///
/// Taken under the same write lock as the transition into `analyzing`, so
/// the pipeline never re-reads mutable session state.
#[derive(Debug, Clone)]
pub struct AnalysisInput {
    pub persona: String,
    pub scenario: Option<String>,
    pub duration_seconds: Option<f64>,
    pub transcript: Option<Vec<TranscriptEntry>>,
    pub emotion_data: Option<Vec<ProsodyReading>>,
}

/// Classification of one report read, for pollers and the report endpoint
#[derive(Debug)]
pub enum ReportPoll {
    /// Terminal: the report is ready
    Ready(Box<CoachingReport>),
    /// Not yet terminal; try again later
    Processing,
    /// Terminal: the last run failed with a retry-able message
    Failed(String),
}

/// Durable record of call sessions and the single source of truth for
/// lifecycle transitions
///
/// Every transition is one compare-and-transition under the write lock, so
/// overlapping triggers can never race a session into two pipelines and
/// readers never observe a torn status/report pair. Persistence technology
/// is intentionally out of scope; sessions live in process memory with the
/// JSON-valued fields kept as opaque structured documents.
pub struct CallSessionStore {
    sessions: RwLock<HashMap<Uuid, CallSession>>,
}

impl CallSessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Create a new active session
    pub async fn create(
        &self,
        owner: impl Into<String>,
        persona: impl Into<String>,
        scenario: Option<String>,
    ) -> CallSession {
        let session = CallSession::new(owner, persona, scenario);
        info!("created call session {} ({})", session.id, session.persona);
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id, session.clone());
        session
    }

    pub async fn get(&self, id: Uuid) -> Option<CallSession> {
        let sessions = self.sessions.read().await;
        sessions.get(&id).cloned()
    }

    /// List one owner's sessions, newest first, with the owner's total count
    pub async fn list(&self, owner: &str, skip: usize, limit: usize) -> (Vec<CallSession>, usize) {
        let sessions = self.sessions.read().await;
        let mut owned: Vec<CallSession> = sessions
            .values()
            .filter(|s| s.owner == owner)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let count = owned.len();
        let page = owned.into_iter().skip(skip).take(limit).collect();
        (page, count)
    }

    pub async fn delete(&self, id: Uuid) -> bool {
        let mut sessions = self.sessions.write().await;
        sessions.remove(&id).is_some()
    }

    /// Store the call outcome and transition `active -> completed`
    ///
    /// Transcript and emotion data are written exactly once here and never
    /// mutated afterwards.
    pub async fn complete(&self, id: Uuid, outcome: CallOutcome) -> Result<CallSession, CallError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(CallError::NotFound)?;
        if session.status != CallStatus::Active {
            return Err(CallError::InvalidTransition {
                from: session.status,
                action: "complete",
            });
        }
        session.duration_seconds = Some(outcome.duration_seconds);
        session.transcript = Some(outcome.transcript);
        session.emotion_data = Some(outcome.emotion_data);
        session.external_conversation_id = outcome.external_conversation_id;
        session.ended_at = Some(Utc::now());
        session.status = CallStatus::Completed;
        info!(
            "call session {} completed ({:.1}s, {} turns)",
            id,
            outcome.duration_seconds,
            session.transcript.as_ref().map_or(0, Vec::len)
        );
        Ok(session.clone())
    }

    /// Try to enter `analyzing`
    ///
    /// Accepted from `completed`, `error` (retry) and `done` (explicit
    /// re-analysis). While already `analyzing` the call reports
    /// `AlreadyRunning` so the trigger stays idempotent.
    pub async fn begin_analysis(&self, id: Uuid) -> Result<AnalysisAdmission, CallError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(CallError::NotFound)?;
        match session.status {
            CallStatus::Analyzing => {
                warn!("analysis already running for call session {id}, ignoring trigger");
                Ok(AnalysisAdmission::AlreadyRunning)
            }
            CallStatus::Completed | CallStatus::Error | CallStatus::Done => {
                session.status = CallStatus::Analyzing;
                info!("call session {id} entered analysis");
                Ok(AnalysisAdmission::Started(AnalysisInput {
                    persona: session.persona.clone(),
                    scenario: session.scenario.clone(),
                    duration_seconds: session.duration_seconds,
                    transcript: session.transcript.clone(),
                    emotion_data: session.emotion_data.clone(),
                }))
            }
            CallStatus::Active => Err(CallError::InvalidTransition {
                from: session.status,
                action: "analyze",
            }),
        }
    }

    /// Atomically store the finished report and transition to `done`
    pub async fn finish_analysis(&self, id: Uuid, report: CoachingReport) -> Result<(), CallError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(CallError::NotFound)?;
        if session.status != CallStatus::Analyzing {
            return Err(CallError::InvalidTransition {
                from: session.status,
                action: "finish analysis",
            });
        }
        session.analysis_results = Some(report);
        session.last_error = None;
        session.status = CallStatus::Done;
        info!("call session {id} analysis done");
        Ok(())
    }

    /// Record a failed run and transition to `error`
    ///
    /// Any previously stored report stays untouched; a partial result is
    /// never written.
    pub async fn fail_analysis(
        &self,
        id: Uuid,
        message: impl Into<String>,
    ) -> Result<(), CallError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(CallError::NotFound)?;
        if session.status != CallStatus::Analyzing {
            return Err(CallError::InvalidTransition {
                from: session.status,
                action: "fail analysis",
            });
        }
        session.last_error = Some(message.into());
        session.status = CallStatus::Error;
        warn!("call session {id} analysis failed");
        Ok(())
    }

    /// Classify a report read for polling clients
    pub async fn report_status(&self, id: Uuid) -> Result<ReportPoll, CallError> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(&id).ok_or(CallError::NotFound)?;
        match session.status {
            CallStatus::Done => match &session.analysis_results {
                Some(report) => Ok(ReportPoll::Ready(Box::new(report.clone()))),
                None => Ok(ReportPoll::Failed("report not found".to_string())),
            },
            CallStatus::Error => Ok(ReportPoll::Failed(
                session
                    .last_error
                    .clone()
                    .unwrap_or_else(|| "Analysis failed. Please try again.".to_string()),
            )),
            CallStatus::Active | CallStatus::Completed | CallStatus::Analyzing => {
                Ok(ReportPoll::Processing)
            }
        }
    }
}

impl Default for CallSessionStore {
    fn default() -> Self {
        Self::new()
    }
}
