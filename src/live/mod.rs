//! Live-call domain: the event stream side of a session
//!
//! This module provides:
//! - `SpeechEvent`: the validated inbound event shape
//! - `TranscriptReconciler`: progressive-update merge into one canonical
//!   transcript plus append-only prosody readings
//! - `LiveCall`: the per-session buffer that serializes event application
//!   and hands its output to the store at completion

mod call;
mod event;
mod reconciler;

pub use call::{LiveCall, LiveSnapshot};
pub use event::SpeechEvent;
pub use reconciler::TranscriptReconciler;
