pub mod analysis;
pub mod call;
pub mod config;
pub mod http;
pub mod live;
pub mod personas;

pub use analysis::{
    analyze_speech_metrics, summarize_emotions, AnalysisOrchestrator, EmotionSummary,
    LlmReportSynthesizer, PollOutcome, PollPolicy, ReportPoller, ReportSynthesizer, SpeechMetrics,
    SynthesisInput,
};
pub use call::{
    Assessment, CallError, CallOutcome, CallSession, CallSessionStore, CallStatus, CoachingReport,
    EmotionScore, KeyMoment, MomentKind, ProsodyReading, Role, TranscriptEntry,
};
pub use config::Config;
pub use http::{create_router, AppState};
pub use live::{LiveCall, LiveSnapshot, SpeechEvent, TranscriptReconciler};
