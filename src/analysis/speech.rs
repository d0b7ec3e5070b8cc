use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::call::{Role, TranscriptEntry};

/// Default filler vocabulary, matched as whole words/phrases
pub const FILLER_WORDS: &[&str] = &[
    "um", "uh", "uh-huh", "like", "you know", "basically", "actually", "literally", "honestly",
    "right", "so", "well", "i mean", "sort of", "kind of",
];

/// Speaking-pace band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaceAssessment {
    TooSlow,
    Ideal,
    TooFast,
    NoData,
}

/// Talk/listen balance band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TalkAssessment {
    TooQuiet,
    Ideal,
    TalkingTooMuch,
    NoData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillerWords {
    pub total: usize,

    /// Fillers per minute of call time
    pub per_minute: f64,

    /// Per-term counts; terms that never occurred are omitted
    pub breakdown: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TalkListenRatio {
    /// User share of all words, as a percentage
    pub user_percent: f64,

    /// Complement; the two always sum to 100
    pub prospect_percent: f64,

    pub assessment: TalkAssessment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnCounts {
    pub user: usize,
    pub prospect: usize,
}

/// Objective speech metrics for one call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechMetrics {
    pub words_per_minute: f64,
    pub wpm_assessment: PaceAssessment,
    pub total_user_words: usize,
    pub total_prospect_words: usize,
    pub filler_words: FillerWords,
    pub talk_listen_ratio: TalkListenRatio,
    pub longest_monologue_words: usize,
    pub questions_asked: usize,
    pub turn_counts: TurnCounts,
}

impl SpeechMetrics {
    fn empty() -> Self {
        Self {
            words_per_minute: 0.0,
            wpm_assessment: PaceAssessment::NoData,
            total_user_words: 0,
            total_prospect_words: 0,
            filler_words: FillerWords {
                total: 0,
                per_minute: 0.0,
                breakdown: BTreeMap::new(),
            },
            talk_listen_ratio: TalkListenRatio {
                user_percent: 0.0,
                prospect_percent: 0.0,
                assessment: TalkAssessment::NoData,
            },
            longest_monologue_words: 0,
            questions_asked: 0,
            turn_counts: TurnCounts {
                user: 0,
                prospect: 0,
            },
        }
    }
}

/// Compute objective speech metrics from a reconciled transcript
///
/// Pure function. An empty transcript or non-positive duration is the
/// normal very-short-call case and yields zeroed metrics, never an error.
///
/// Pace approximates the user's speaking time by the full call duration
/// (user words / call minutes), as the original product did; if true
/// per-utterance timing ever becomes available upstream, summed per-turn
/// durations should replace this.
pub fn analyze_speech_metrics(transcript: &[TranscriptEntry], duration_seconds: f64) -> SpeechMetrics {
    if transcript.is_empty() || duration_seconds <= 0.0 {
        return SpeechMetrics::empty();
    }

    let user_turns: Vec<&TranscriptEntry> =
        transcript.iter().filter(|e| e.role == Role::User).collect();
    let prospect_turns: Vec<&TranscriptEntry> = transcript
        .iter()
        .filter(|e| e.role == Role::Prospect)
        .collect();

    let user_text = user_turns
        .iter()
        .map(|e| e.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let prospect_text = prospect_turns
        .iter()
        .map(|e| e.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    let user_words = count_words(&user_text);
    let prospect_words = count_words(&prospect_text);
    let total_words = user_words + prospect_words;

    let minutes = duration_seconds / 60.0;
    let wpm = round1(user_words as f64 / minutes);

    let breakdown = count_fillers(&user_text, FILLER_WORDS);
    let total_fillers: usize = breakdown.values().sum();
    let filler_rate = round1(total_fillers as f64 / minutes);

    let talk_listen_ratio = if total_words > 0 {
        let user_percent = round1(user_words as f64 / total_words as f64 * 100.0);
        TalkListenRatio {
            user_percent,
            prospect_percent: round1(100.0 - user_percent),
            assessment: assess_talk_ratio(user_percent),
        }
    } else {
        TalkListenRatio {
            user_percent: 0.0,
            prospect_percent: 0.0,
            assessment: TalkAssessment::NoData,
        }
    };

    // Same-role turns are already collapsed by reconciliation, so the
    // longest monologue reduces to the longest single user turn.
    let longest_monologue_words = user_turns
        .iter()
        .map(|e| count_words(&e.text))
        .max()
        .unwrap_or(0);

    let questions_asked = user_turns
        .iter()
        .filter(|e| e.text.trim().ends_with('?'))
        .count();

    SpeechMetrics {
        words_per_minute: wpm,
        wpm_assessment: assess_wpm(wpm),
        total_user_words: user_words,
        total_prospect_words: prospect_words,
        filler_words: FillerWords {
            total: total_fillers,
            per_minute: filler_rate,
            breakdown,
        },
        talk_listen_ratio,
        longest_monologue_words,
        questions_asked,
        turn_counts: TurnCounts {
            user: user_turns.len(),
            prospect: prospect_turns.len(),
        },
    }
}

/// Count whole-word/phrase filler occurrences, case-insensitively
///
/// Matches are boundary-anchored so "like" never matches inside "likely".
/// Only terms with at least one occurrence appear in the result.
pub fn count_fillers(text: &str, vocabulary: &[&str]) -> BTreeMap<String, usize> {
    let lowered = text.to_lowercase();
    let mut counts = BTreeMap::new();
    for term in vocabulary {
        let pattern = format!(r"\b{}\b", regex::escape(&term.to_lowercase()));
        let Ok(matcher) = Regex::new(&pattern) else {
            continue;
        };
        let occurrences = matcher.find_iter(&lowered).count();
        if occurrences > 0 {
            counts.insert(term.to_lowercase(), occurrences);
        }
    }
    counts
}

fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

fn assess_wpm(wpm: f64) -> PaceAssessment {
    if wpm < 130.0 {
        PaceAssessment::TooSlow
    } else if wpm <= 160.0 {
        PaceAssessment::Ideal
    } else {
        PaceAssessment::TooFast
    }
}

fn assess_talk_ratio(user_percent: f64) -> TalkAssessment {
    if user_percent < 40.0 {
        TalkAssessment::TooQuiet
    } else if user_percent <= 60.0 {
        TalkAssessment::Ideal
    } else {
        TalkAssessment::TalkingTooMuch
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
