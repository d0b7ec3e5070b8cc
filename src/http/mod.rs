//! HTTP API for the coaching client
//!
//! - POST /calls - Create a call session
//! - GET  /calls - List the caller's sessions
//! - GET  /personas - List available personas
//! - GET  /calls/:id - Fetch one session
//! - POST /calls/:id/events - Feed a live speech event
//! - GET  /calls/:id/live - Live transcript/emotion snapshot
//! - POST /calls/:id/complete - Store the call outcome
//! - POST /calls/:id/analyze - Trigger report generation (202)
//! - GET  /calls/:id/report - Report, processing signal, or failure
//! - DELETE /calls/:id - Delete a session
//! - GET  /health - Health check

mod error;
mod handlers;
mod routes;
mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
