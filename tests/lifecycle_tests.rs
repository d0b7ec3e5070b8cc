// Integration tests for the session state machine and analysis pipeline
//
// A scripted synthesizer stands in for the external language-generation
// service so the full lifecycle runs in-process: complete -> analyze ->
// done/error, idempotent triggers, retry replacing the report, timeouts.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use pitchcoach::analysis::{
    AnalysisOrchestrator, PollOutcome, PollPolicy, ReportPoller, ReportSynthesizer, SynthesisInput,
};
use pitchcoach::{
    Assessment, CallError, CallOutcome, CallSessionStore, CallStatus, Role, TranscriptEntry,
};
use tokio::sync::Mutex;

fn assessment(score: u8) -> Assessment {
    Assessment {
        overall_score: score,
        tone_summary: "Confident and warm throughout.".to_string(),
        key_moments: Vec::new(),
        recommendations: vec!["Ask more discovery questions.".to_string()],
        strengths: vec!["Clear value proposition.".to_string()],
        areas_for_improvement: vec!["Pacing near the close.".to_string()],
    }
}

fn transcript() -> Vec<TranscriptEntry> {
    vec![
        TranscriptEntry {
            role: Role::User,
            text: "Hello, I wanted to discuss our product.".to_string(),
            timestamp_ms: 1000,
        },
        TranscriptEntry {
            role: Role::Prospect,
            text: "Sure, tell me more.".to_string(),
            timestamp_ms: 2000,
        },
    ]
}

fn outcome() -> CallOutcome {
    CallOutcome::new(120.0, transcript(), Vec::new(), None).unwrap()
}

/// Pops one scripted response per synthesis call and counts invocations
struct ScriptedSynthesizer {
    responses: Mutex<VecDeque<Result<Assessment>>>,
    calls: AtomicUsize,
    delay: Duration,
}

impl ScriptedSynthesizer {
    fn new(responses: Vec<Result<Assessment>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
        }
    }

    fn with_delay(responses: Vec<Result<Assessment>>, delay: Duration) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
            delay,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ReportSynthesizer for ScriptedSynthesizer {
    async fn synthesize(&self, _input: &SynthesisInput) -> Result<Assessment> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let mut responses = self.responses.lock().await;
        responses
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("no scripted response left")))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn orchestrator(
    store: &Arc<CallSessionStore>,
    synthesizer: Arc<ScriptedSynthesizer>,
    timeout: Duration,
) -> AnalysisOrchestrator {
    AnalysisOrchestrator::new(Arc::clone(store), synthesizer, timeout)
}

fn fast_poller(store: &Arc<CallSessionStore>) -> ReportPoller {
    ReportPoller::new(
        Arc::clone(store),
        PollPolicy {
            interval: Duration::from_millis(10),
            max_attempts: 200,
        },
    )
}

#[tokio::test]
async fn test_complete_transitions_active_to_completed() -> Result<()> {
    let store = Arc::new(CallSessionStore::new());
    let session = store.create("alice", "friendly_prospect", None).await;
    assert_eq!(session.status, CallStatus::Active);

    let completed = store.complete(session.id, outcome()).await?;
    assert_eq!(completed.status, CallStatus::Completed);
    assert_eq!(completed.duration_seconds, Some(120.0));
    assert!(completed.ended_at.is_some());
    assert_eq!(completed.transcript.as_ref().map(Vec::len), Some(2));

    Ok(())
}

#[tokio::test]
async fn test_complete_rejected_when_not_active() -> Result<()> {
    let store = Arc::new(CallSessionStore::new());
    let session = store.create("alice", "friendly_prospect", None).await;
    store.complete(session.id, outcome()).await?;

    let err = store.complete(session.id, outcome()).await.unwrap_err();
    assert!(matches!(
        err,
        CallError::InvalidTransition {
            from: CallStatus::Completed,
            ..
        }
    ));

    Ok(())
}

#[tokio::test]
async fn test_analyze_rejected_while_active() {
    let store = Arc::new(CallSessionStore::new());
    let synthesizer = Arc::new(ScriptedSynthesizer::new(vec![Ok(assessment(80))]));
    let orchestrator = orchestrator(&store, synthesizer, Duration::from_secs(5));

    let session = store.create("alice", "friendly_prospect", None).await;
    let err = orchestrator.trigger(session.id).await.unwrap_err();
    assert!(matches!(
        err,
        CallError::InvalidTransition {
            from: CallStatus::Active,
            ..
        }
    ));
}

#[tokio::test]
async fn test_successful_pipeline_lands_in_done() -> Result<()> {
    let store = Arc::new(CallSessionStore::new());
    let synthesizer = Arc::new(ScriptedSynthesizer::new(vec![Ok(assessment(85))]));
    let orchestrator = orchestrator(&store, Arc::clone(&synthesizer), Duration::from_secs(5));

    let session = store.create("alice", "friendly_prospect", None).await;
    store.complete(session.id, outcome()).await?;

    let started = orchestrator.trigger(session.id).await?;
    assert!(started);

    match fast_poller(&store).wait_for_report(session.id).await? {
        PollOutcome::Ready(report) => {
            assert_eq!(report.assessment.overall_score, 85);
            assert!(report.speech_metrics.total_user_words > 0);
            assert_eq!(report.emotion_summary.total_readings, 0);
        }
        other => panic!("expected ready report, got {other:?}"),
    }

    let session = store.get(session.id).await.unwrap();
    assert_eq!(session.status, CallStatus::Done);
    assert!(session.last_error.is_none());
    assert_eq!(synthesizer.calls(), 1);

    Ok(())
}

#[tokio::test]
async fn test_second_trigger_while_analyzing_is_noop() -> Result<()> {
    let store = Arc::new(CallSessionStore::new());
    let synthesizer = Arc::new(ScriptedSynthesizer::with_delay(
        vec![Ok(assessment(70)), Ok(assessment(99))],
        Duration::from_millis(200),
    ));
    let orchestrator = orchestrator(&store, Arc::clone(&synthesizer), Duration::from_secs(5));

    let session = store.create("alice", "friendly_prospect", None).await;
    store.complete(session.id, outcome()).await?;

    assert!(orchestrator.trigger(session.id).await?);
    // The first run is still sleeping inside the synthesizer.
    assert!(!orchestrator.trigger(session.id).await?);
    assert!(!orchestrator.trigger(session.id).await?);

    match fast_poller(&store).wait_for_report(session.id).await? {
        PollOutcome::Ready(report) => assert_eq!(report.assessment.overall_score, 70),
        other => panic!("expected ready report, got {other:?}"),
    }
    assert_eq!(synthesizer.calls(), 1, "only one pipeline run may start");

    Ok(())
}

#[tokio::test]
async fn test_failed_synthesis_lands_in_error_and_retry_replaces_report() -> Result<()> {
    let store = Arc::new(CallSessionStore::new());
    let synthesizer = Arc::new(ScriptedSynthesizer::new(vec![
        Err(anyhow!("model returned malformed JSON")),
        Ok(assessment(91)),
    ]));
    let orchestrator = orchestrator(&store, Arc::clone(&synthesizer), Duration::from_secs(5));

    let session = store.create("alice", "friendly_prospect", None).await;
    store.complete(session.id, outcome()).await?;

    assert!(orchestrator.trigger(session.id).await?);
    match fast_poller(&store).wait_for_report(session.id).await? {
        PollOutcome::Failed(message) => {
            // The stored message is generic; the cause stays in the logs.
            assert!(!message.contains("malformed"));
        }
        other => panic!("expected failed report, got {other:?}"),
    }

    let failed = store.get(session.id).await.unwrap();
    assert_eq!(failed.status, CallStatus::Error);
    assert!(failed.analysis_results.is_none(), "no partial report stored");

    // Retry from `error` replaces the result wholesale.
    assert!(orchestrator.trigger(session.id).await?);
    match fast_poller(&store).wait_for_report(session.id).await? {
        PollOutcome::Ready(report) => assert_eq!(report.assessment.overall_score, 91),
        other => panic!("expected ready report, got {other:?}"),
    }

    let recovered = store.get(session.id).await.unwrap();
    assert_eq!(recovered.status, CallStatus::Done);
    assert!(recovered.last_error.is_none());
    assert_eq!(synthesizer.calls(), 2);

    Ok(())
}

#[tokio::test]
async fn test_synthesis_timeout_lands_in_error_not_stuck() -> Result<()> {
    let store = Arc::new(CallSessionStore::new());
    let synthesizer = Arc::new(ScriptedSynthesizer::with_delay(
        vec![Ok(assessment(88))],
        Duration::from_secs(30),
    ));
    let orchestrator = orchestrator(&store, synthesizer, Duration::from_millis(50));

    let session = store.create("alice", "friendly_prospect", None).await;
    store.complete(session.id, outcome()).await?;
    assert!(orchestrator.trigger(session.id).await?);

    match fast_poller(&store).wait_for_report(session.id).await? {
        PollOutcome::Failed(_) => {}
        other => panic!("expected failure after timeout, got {other:?}"),
    }
    let session = store.get(session.id).await.unwrap();
    assert_eq!(
        session.status,
        CallStatus::Error,
        "a stalled external call must not strand the session in analyzing"
    );

    Ok(())
}

#[tokio::test]
async fn test_reanalysis_from_done_replaces_report() -> Result<()> {
    let store = Arc::new(CallSessionStore::new());
    let synthesizer = Arc::new(ScriptedSynthesizer::new(vec![
        Ok(assessment(60)),
        Ok(assessment(75)),
    ]));
    let orchestrator = orchestrator(&store, Arc::clone(&synthesizer), Duration::from_secs(5));

    let session = store.create("alice", "friendly_prospect", None).await;
    store.complete(session.id, outcome()).await?;

    assert!(orchestrator.trigger(session.id).await?);
    match fast_poller(&store).wait_for_report(session.id).await? {
        PollOutcome::Ready(report) => assert_eq!(report.assessment.overall_score, 60),
        other => panic!("expected ready report, got {other:?}"),
    }

    assert!(orchestrator.trigger(session.id).await?);
    match fast_poller(&store).wait_for_report(session.id).await? {
        PollOutcome::Ready(report) => assert_eq!(report.assessment.overall_score, 75),
        other => panic!("expected ready report, got {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn test_poller_times_out_without_terminal_state() -> Result<()> {
    let store = Arc::new(CallSessionStore::new());
    let session = store.create("alice", "friendly_prospect", None).await;
    store.complete(session.id, outcome()).await?;

    // Never triggered: the session sits in `completed` forever.
    let poller = ReportPoller::new(
        Arc::clone(&store),
        PollPolicy {
            interval: Duration::from_millis(5),
            max_attempts: 3,
        },
    );
    match poller.wait_for_report(session.id).await? {
        PollOutcome::TimedOut => {}
        other => panic!("expected poll timeout, got {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn test_poller_reports_unknown_session() {
    let store = Arc::new(CallSessionStore::new());
    let poller = fast_poller(&store);
    let err = poller.wait_for_report(uuid::Uuid::new_v4()).await;
    assert!(matches!(err, Err(CallError::NotFound)));
}

#[test]
fn test_duration_is_coerced_to_at_least_one_second() {
    let outcome = CallOutcome::new(0.2, transcript(), Vec::new(), None).unwrap();
    assert_eq!(outcome.duration_seconds, 1.0);

    let outcome = CallOutcome::new(42.5, transcript(), Vec::new(), None).unwrap();
    assert_eq!(outcome.duration_seconds, 42.5);
}

#[test]
fn test_non_positive_duration_rejected() {
    assert!(matches!(
        CallOutcome::new(0.0, transcript(), Vec::new(), None),
        Err(CallError::Validation(_))
    ));
    assert!(matches!(
        CallOutcome::new(-3.0, transcript(), Vec::new(), None),
        Err(CallError::Validation(_))
    ));
    assert!(matches!(
        CallOutcome::new(f64::NAN, transcript(), Vec::new(), None),
        Err(CallError::Validation(_))
    ));
}
