use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tracing::{error, info};
use uuid::Uuid;

use super::emotion::summarize_emotions;
use super::speech::analyze_speech_metrics;
use super::synthesizer::{ReportSynthesizer, SynthesisInput};
use crate::call::{
    AnalysisAdmission, AnalysisInput, CallError, CallSessionStore, CoachingReport,
};

/// Message stored on a session when a run fails; the real cause is logged
/// but never exposed to the end user
const GENERIC_FAILURE: &str = "Analysis failed. Please try again.";

/// Drives the post-call analysis pipeline
///
/// A trigger transitions the session into `analyzing` first (visible to
/// pollers before any work starts) and then runs the pipeline as a detached
/// background task: speech metrics and emotion summary concurrently, one
/// timed synthesis call, then a single atomic finish or fail write. The
/// `analyzing` status itself guarantees at most one run per session.
pub struct AnalysisOrchestrator {
    store: Arc<CallSessionStore>,
    synthesizer: Arc<dyn ReportSynthesizer>,
    synthesis_timeout: Duration,
}

impl AnalysisOrchestrator {
    pub fn new(
        store: Arc<CallSessionStore>,
        synthesizer: Arc<dyn ReportSynthesizer>,
        synthesis_timeout: Duration,
    ) -> Self {
        Self {
            store,
            synthesizer,
            synthesis_timeout,
        }
    }

    /// Trigger analysis for a session
    ///
    /// Returns immediately: `Ok(true)` when a new pipeline run was started,
    /// `Ok(false)` when one is already in flight (idempotent no-op). The
    /// spawned task owns all subsequent state writes.
    pub async fn trigger(&self, call_id: Uuid) -> Result<bool, CallError> {
        match self.store.begin_analysis(call_id).await? {
            AnalysisAdmission::AlreadyRunning => Ok(false),
            AnalysisAdmission::Started(input) => {
                let store = Arc::clone(&self.store);
                let synthesizer = Arc::clone(&self.synthesizer);
                let timeout = self.synthesis_timeout;
                tokio::spawn(async move {
                    Self::run_pipeline(store, synthesizer, timeout, call_id, input).await;
                });
                Ok(true)
            }
        }
    }

    async fn run_pipeline(
        store: Arc<CallSessionStore>,
        synthesizer: Arc<dyn ReportSynthesizer>,
        timeout: Duration,
        call_id: Uuid,
        input: AnalysisInput,
    ) {
        info!("analysis pipeline started for call session {call_id}");

        match Self::analyze(synthesizer, timeout, input).await {
            Ok(report) => {
                if let Err(e) = store.finish_analysis(call_id, report).await {
                    error!("failed to store report for call session {call_id}: {e}");
                } else {
                    info!("analysis pipeline finished for call session {call_id}");
                }
            }
            Err(e) => {
                error!("analysis pipeline failed for call session {call_id}: {e:#}");
                if let Err(e) = store.fail_analysis(call_id, GENERIC_FAILURE).await {
                    error!("failed to record analysis failure for call session {call_id}: {e}");
                }
            }
        }
    }

    async fn analyze(
        synthesizer: Arc<dyn ReportSynthesizer>,
        timeout: Duration,
        input: AnalysisInput,
    ) -> Result<CoachingReport> {
        let transcript = input
            .transcript
            .ok_or_else(|| anyhow!("call session has no transcript"))?;
        let duration_seconds = input
            .duration_seconds
            .ok_or_else(|| anyhow!("call session has no duration"))?;
        let emotion_data = input.emotion_data.unwrap_or_default();

        // Both engines are pure with no ordering constraint between them.
        let metrics_transcript = transcript.clone();
        let (speech_metrics, emotion_summary) = tokio::join!(
            tokio::task::spawn_blocking(move || {
                analyze_speech_metrics(&metrics_transcript, duration_seconds)
            }),
            tokio::task::spawn_blocking(move || summarize_emotions(&emotion_data)),
        );
        let speech_metrics = speech_metrics.context("speech metrics task failed")?;
        let emotion_summary = emotion_summary.context("emotion summary task failed")?;

        let synthesis_input = SynthesisInput {
            persona: input.persona,
            scenario: input.scenario,
            transcript,
            speech_metrics: speech_metrics.clone(),
            emotion_summary: emotion_summary.clone(),
        };

        // The single suspend point that can block on real network latency;
        // the timeout keeps a stalled external call from stranding the
        // session in `analyzing`.
        let assessment = tokio::time::timeout(timeout, synthesizer.synthesize(&synthesis_input))
            .await
            .map_err(|_| anyhow!("synthesis timed out after {}s", timeout.as_secs()))?
            .context("synthesis failed")?;

        Ok(CoachingReport {
            assessment,
            speech_metrics,
            emotion_summary,
        })
    }
}
