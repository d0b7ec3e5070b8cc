use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::error::ApiError;
use super::state::AppState;
use crate::call::{
    CallOutcome, CallSession, CallStatus, CoachingReport, ProsodyReading, ReportPoll,
    TranscriptEntry,
};
use crate::live::{LiveCall, SpeechEvent};
use crate::personas;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateCallRequest {
    /// Persona id of the AI counterpart
    pub persona: String,

    /// Optional free-text practice scenario
    pub scenario: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListCallsParams {
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct CallListResponse {
    pub data: Vec<CallSession>,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct CompleteCallRequest {
    pub duration_seconds: f64,

    /// Client-reconciled transcript; falls back to the server-side live
    /// buffer when omitted
    pub transcript: Option<Vec<TranscriptEntry>>,

    /// Client-collected prosody readings; same fallback as the transcript
    pub emotion_data: Option<Vec<ProsodyReading>>,

    pub external_conversation_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    #[serde(flatten)]
    pub report: CoachingReport,

    pub transcript: Vec<TranscriptEntry>,
}

// ============================================================================
// Identity & access checks
// ============================================================================

/// Caller identity from the `x-user-id` header; authentication itself is an
/// upstream concern
fn owner_id(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(ApiError::MissingIdentity)
}

fn authorize(session: &CallSession, owner: &str) -> Result<(), ApiError> {
    if session.owner != owner {
        return Err(ApiError::Forbidden);
    }
    Ok(())
}

async fn fetch_owned(
    state: &AppState,
    call_id: Uuid,
    owner: &str,
) -> Result<CallSession, ApiError> {
    let session = state
        .store
        .get(call_id)
        .await
        .ok_or_else(|| ApiError::NotFound("call session not found".to_string()))?;
    authorize(&session, owner)?;
    Ok(session)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /calls
/// Create a new call session and open its live buffer
pub async fn create_call(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateCallRequest>,
) -> Result<Json<CallSession>, ApiError> {
    let owner = owner_id(&headers)?;

    if personas::find(&req.persona).is_none() {
        return Err(ApiError::Unprocessable(format!(
            "unknown persona: {}",
            req.persona
        )));
    }

    let session = state.store.create(owner, req.persona, req.scenario).await;

    {
        let mut live = state.live.write().await;
        live.insert(session.id, Arc::new(LiveCall::new(session.id)));
    }

    Ok(Json(session))
}

/// GET /calls
/// List the caller's call sessions, newest first
pub async fn list_calls(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ListCallsParams>,
) -> Result<Json<CallListResponse>, ApiError> {
    let owner = owner_id(&headers)?;
    let skip = params.skip.unwrap_or(0);
    let limit = params.limit.unwrap_or(100);

    let (data, count) = state.store.list(&owner, skip, limit).await;
    Ok(Json(CallListResponse { data, count }))
}

/// GET /personas
/// List available sales personas
pub async fn list_personas() -> Json<Vec<personas::PersonaSummary>> {
    Json(personas::list())
}

/// GET /calls/:call_id
pub async fn get_call(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(call_id): Path<Uuid>,
) -> Result<Json<CallSession>, ApiError> {
    let owner = owner_id(&headers)?;
    let session = fetch_owned(&state, call_id, &owner).await?;
    Ok(Json(session))
}

/// POST /calls/:call_id/events
/// Feed one speech event into the live buffer of an active call
pub async fn ingest_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(call_id): Path<Uuid>,
    Json(event): Json<SpeechEvent>,
) -> Result<Response, ApiError> {
    let owner = owner_id(&headers)?;
    let session = fetch_owned(&state, call_id, &owner).await?;

    if session.status != CallStatus::Active {
        return Err(ApiError::Conflict(format!(
            "cannot ingest events while call is {}",
            session.status
        )));
    }

    let live = {
        let mut live = state.live.write().await;
        Arc::clone(
            live.entry(call_id)
                .or_insert_with(|| Arc::new(LiveCall::new(call_id))),
        )
    };
    live.push(event).await;

    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse {
            message: "event accepted".to_string(),
        }),
    )
        .into_response())
}

/// GET /calls/:call_id/live
/// Current transcript and emotion snapshot of an active call
pub async fn live_snapshot(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(call_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let owner = owner_id(&headers)?;
    let session = fetch_owned(&state, call_id, &owner).await?;

    if session.status != CallStatus::Active {
        return Err(ApiError::Conflict(format!(
            "call is {}, no live view available",
            session.status
        )));
    }

    let live = {
        let live = state.live.read().await;
        live.get(&call_id).cloned()
    };
    match live {
        Some(live) => Ok(Json(live.snapshot().await).into_response()),
        None => Err(ApiError::NotFound(
            "no live buffer for this call".to_string(),
        )),
    }
}

/// POST /calls/:call_id/complete
/// Store the call outcome after the call ends
pub async fn complete_call(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(call_id): Path<Uuid>,
    Json(req): Json<CompleteCallRequest>,
) -> Result<Json<CallSession>, ApiError> {
    let owner = owner_id(&headers)?;
    let session = fetch_owned(&state, call_id, &owner).await?;

    if session.status != CallStatus::Active {
        return Err(ApiError::Conflict(format!(
            "cannot complete while call is {}",
            session.status
        )));
    }

    // Checked before the live buffer is drained so a rejected payload
    // leaves it intact for a corrected retry.
    if !req.duration_seconds.is_finite() || req.duration_seconds <= 0.0 {
        return Err(ApiError::Unprocessable(
            "duration_seconds must be a positive number".to_string(),
        ));
    }

    // The live buffer is done either way; drain it before deciding which
    // transcript source wins.
    let live = {
        let mut live = state.live.write().await;
        live.remove(&call_id)
    };
    let (live_transcript, live_readings) = match live {
        Some(live) => live.drain().await,
        None => (Vec::new(), Vec::new()),
    };

    let transcript = match req.transcript {
        Some(transcript) => transcript,
        None if !live_transcript.is_empty() => live_transcript,
        None => {
            return Err(ApiError::Unprocessable(
                "transcript is required to complete a call".to_string(),
            ))
        }
    };
    let emotion_data = req.emotion_data.unwrap_or(live_readings);

    let outcome = CallOutcome::new(
        req.duration_seconds,
        transcript,
        emotion_data,
        req.external_conversation_id,
    )?;

    let session = state.store.complete(call_id, outcome).await?;
    Ok(Json(session))
}

/// POST /calls/:call_id/analyze
/// Trigger background coaching-report generation
pub async fn analyze_call(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(call_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let owner = owner_id(&headers)?;
    fetch_owned(&state, call_id, &owner).await?;

    let started = state.orchestrator.trigger(call_id).await?;
    let message = if started {
        "analysis started"
    } else {
        "analysis already in progress"
    };
    info!("analyze trigger for call session {call_id}: {message}");

    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse {
            message: message.to_string(),
        }),
    )
        .into_response())
}

/// GET /calls/:call_id/report
/// The coaching report, a processing signal, or the failure payload
pub async fn get_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(call_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let owner = owner_id(&headers)?;
    let session = fetch_owned(&state, call_id, &owner).await?;

    match state.store.report_status(call_id).await? {
        ReportPoll::Ready(report) => Ok(Json(ReportResponse {
            report: *report,
            transcript: session.transcript.unwrap_or_default(),
        })
        .into_response()),
        ReportPoll::Processing => Ok((
            StatusCode::ACCEPTED,
            Json(MessageResponse {
                message: "analysis in progress".to_string(),
            }),
        )
            .into_response()),
        ReportPoll::Failed(message) => Err(ApiError::Unprocessable(message)),
    }
}

/// DELETE /calls/:call_id
pub async fn delete_call(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(call_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let owner = owner_id(&headers)?;
    fetch_owned(&state, call_id, &owner).await?;

    state.store.delete(call_id).await;
    {
        let mut live = state.live.write().await;
        live.remove(&call_id);
    }

    Ok(Json(MessageResponse {
        message: "call session deleted".to_string(),
    }))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
