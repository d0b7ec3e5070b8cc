//! Call-session domain: data model, lifecycle state machine, session store
//!
//! This module owns:
//! - The `CallSession` record and its value objects (transcript entries,
//!   prosody readings, coaching report)
//! - The lifecycle state machine (`active -> completed -> analyzing ->
//!   done | error`) with guarded transitions
//! - The `CallSessionStore`, single source of truth and sole status writer

mod error;
mod model;
mod report;
mod store;

pub use error::CallError;
pub use model::{
    CallOutcome, CallSession, CallStatus, EmotionScore, ProsodyReading, Role, TranscriptEntry,
};
pub use report::{Assessment, CoachingReport, KeyMoment, MomentKind};
pub use store::{AnalysisAdmission, AnalysisInput, CallSessionStore, ReportPoll};
