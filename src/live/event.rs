use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::call::Role;

/// One inbound speech event from the realtime voice service
///
/// The upstream emits progressive updates: while one party is still
/// speaking, several events may arrive for the same logical turn, each a
/// longer or refined version of the same utterance. Events are validated
/// into this closed shape once at the boundary; nothing downstream inspects
/// ad hoc fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechEvent {
    pub role: Role,

    /// Current text of the turn being spoken; may be empty for
    /// score-only events
    #[serde(default)]
    pub text: String,

    /// Prosody scores attached to this event, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scores: Option<BTreeMap<String, f64>>,
}
