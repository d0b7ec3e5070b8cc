use anyhow::{anyhow, bail, Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::emotion::EmotionSummary;
use super::speech::SpeechMetrics;
use crate::call::{Assessment, TranscriptEntry};
use crate::config::LlmConfig;
use crate::personas;

const COACHING_SYSTEM_PROMPT: &str = r#"You are an expert sales coach analyzing a practice sales call.
You will receive:
1. The full transcript of the call
2. Speech metrics (WPM, filler words, talk-listen ratio, etc.)
3. Emotion/tone analysis from voice prosody

Provide a detailed coaching report in the following JSON format:
{
    "overall_score": <0-100 integer>,
    "tone_summary": "<2-3 sentence summary of the salesperson's tone and delivery>",
    "key_moments": [
        {
            "kind": "strength" or "improvement",
            "description": "<what happened>",
            "suggestion": "<actionable advice>"
        }
    ],
    "recommendations": ["<specific actionable recommendation>", ...],
    "strengths": ["<observed strength>", ...],
    "areas_for_improvement": ["<specific area>", ...]
}

Scoring guide:
- 90-100: Exceptional - masterful rapport, perfect objection handling, strong close
- 70-89: Good - solid fundamentals with minor areas to improve
- 40-69: Developing - shows promise but needs work on key areas
- 0-39: Needs significant improvement - major gaps in technique

Be specific, actionable, and encouraging. Reference specific moments from the transcript."#;

/// Everything the synthesis step needs, assembled by the orchestrator
#[derive(Debug, Clone)]
pub struct SynthesisInput {
    pub persona: String,
    pub scenario: Option<String>,
    pub transcript: Vec<TranscriptEntry>,
    pub speech_metrics: SpeechMetrics,
    pub emotion_summary: EmotionSummary,
}

/// The external language-generation boundary
///
/// The only component with external I/O and non-deterministic latency; the
/// orchestrator wraps calls in a timeout. Implementations must return the
/// full assessment or an error, never a partial result.
#[async_trait::async_trait]
pub trait ReportSynthesizer: Send + Sync {
    async fn synthesize(&self, input: &SynthesisInput) -> Result<Assessment>;

    /// Synthesizer name for logging
    fn name(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Coaching-report synthesis over an OpenAI-compatible chat completions API
pub struct LlmReportSynthesizer {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f64,
}

impl LlmReportSynthesizer {
    /// Build a synthesizer from configuration; the API key is read from the
    /// environment variable the config names
    pub fn new(cfg: &LlmConfig) -> Result<Self> {
        let api_key = std::env::var(&cfg.api_key_env)
            .with_context(|| format!("environment variable {} is not set", cfg.api_key_env))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}"))
                .context("API key is not a valid header value")?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
            temperature: cfg.temperature,
        })
    }

    fn build_prompt(input: &SynthesisInput) -> String {
        let persona_name = personas::find(&input.persona)
            .map(|p| p.name)
            .unwrap_or(input.persona.as_str());
        let scenario = input.scenario.as_deref().unwrap_or("(none given)");

        let transcript_text = input
            .transcript
            .iter()
            .map(|entry| format!("[{}]: {}", entry.role.as_str().to_uppercase(), entry.text))
            .collect::<Vec<_>>()
            .join("\n");

        let metrics = &input.speech_metrics;
        let averages = serde_json::to_string_pretty(&input.emotion_summary.dimension_averages)
            .unwrap_or_else(|_| "{}".to_string());
        let dominant = serde_json::to_string_pretty(&input.emotion_summary.dominant_emotions)
            .unwrap_or_else(|_| "[]".to_string());

        format!(
            "## Call Context\n\
             Persona: {persona_name}\n\
             Scenario: {scenario}\n\
             \n\
             ## Transcript\n\
             {transcript_text}\n\
             \n\
             ## Speech Metrics\n\
             - Words per minute: {wpm}\n\
             - Filler words: {filler_total} total ({filler_rate}/min)\n\
             - Talk-listen ratio: User {user_pct}% / Prospect {prospect_pct}%\n\
             - Questions asked: {questions}\n\
             - Longest monologue: {monologue} words\n\
             \n\
             ## Emotion Analysis\n\
             - Dimension averages: {averages}\n\
             - Dominant emotions: {dominant}\n\
             \n\
             Please provide your coaching analysis in the specified JSON format.",
            wpm = metrics.words_per_minute,
            filler_total = metrics.filler_words.total,
            filler_rate = metrics.filler_words.per_minute,
            user_pct = metrics.talk_listen_ratio.user_percent,
            prospect_pct = metrics.talk_listen_ratio.prospect_percent,
            questions = metrics.questions_asked,
            monologue = metrics.longest_monologue_words,
        )
    }
}

#[async_trait::async_trait]
impl ReportSynthesizer for LlmReportSynthesizer {
    async fn synthesize(&self, input: &SynthesisInput) -> Result<Assessment> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!("requesting coaching assessment from {url}");

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: COACHING_SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: Self::build_prompt(input),
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .context("chat completion request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error response".to_string());
            bail!("chat completion returned {status}: {body}");
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .context("failed to parse chat completion response")?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("chat completion carried no content"))?;

        // Strict parse: a response missing any assessment field is a
        // synthesis failure, never a partially accepted report.
        let assessment: Assessment = serde_json::from_str(&content)
            .context("assessment JSON did not match the expected shape")?;
        if assessment.overall_score > 100 {
            bail!("overall_score {} out of range", assessment.overall_score);
        }

        Ok(assessment)
    }

    fn name(&self) -> &str {
        "llm"
    }
}
