//! Post-call analysis pipeline
//!
//! Two pure engines (speech metrics, emotion summary) feed one external
//! synthesis call; the orchestrator drives them through the session state
//! machine and the poller gives clients a bounded wait on the result.

mod emotion;
mod orchestrator;
mod poller;
mod speech;
mod synthesizer;

pub use emotion::{
    summarize_emotions, DominantEmotion, EmotionSummary, TimelinePoint, COACHING_DIMENSIONS,
    DOMINANT_COUNT, TIMELINE_BUCKETS,
};
pub use orchestrator::AnalysisOrchestrator;
pub use poller::{PollOutcome, PollPolicy, ReportPoller};
pub use speech::{
    analyze_speech_metrics, count_fillers, FillerWords, PaceAssessment, SpeechMetrics,
    TalkAssessment, TalkListenRatio, TurnCounts, FILLER_WORDS,
};
pub use synthesizer::{LlmReportSynthesizer, ReportSynthesizer, SynthesisInput};
