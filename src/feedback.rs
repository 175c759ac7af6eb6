//! AI feedback collaborator: the port and its implementations.
//!
//! The coaching feedback is advisory text from a hosted text-generation
//! service. It never participates in scoring; callers bound it with a
//! timeout and substitute the `FALLBACK_*` placeholders on any failure
//! (see [`crate::submission`]).
//!
//! Two operations:
//! - [`FeedbackProvider::analyze_decision`] — per-submission coaching:
//!   recommendation, reasoning, confidence in [0,1].
//! - [`FeedbackProvider::analyze_performance`] — a free-text report over the
//!   user's whole score history.
//!
//! [`GeminiFeedback`] talks to the Generative Language API; [`CannedFeedback`]
//! is the offline implementation used by tests and by the server when no API
//! key is configured.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Recommendation text substituted when analysis fails or times out.
pub const FALLBACK_RECOMMENDATION: &str = "AI analysis could not be completed for this decision.";

/// Reasoning text substituted when analysis fails or times out.
pub const FALLBACK_REASONING: &str =
    "No reasoning is available because the analysis did not finish. The score above is unaffected.";

/// Performance report substituted when report generation fails or times out.
pub const FALLBACK_ANALYSIS: &str =
    "The performance analysis could not be generated. Please try again later.";

/// Performance report returned without consulting the provider when the user
/// has no score history yet.
pub const NO_HISTORY_ANALYSIS: &str =
    "Not enough quiz history to analyze yet. Complete a few scenarios first.";

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("feedback transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("feedback service returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("feedback service returned no candidates")]
    Empty,

    #[error("cannot parse feedback response: {0}")]
    Malformed(String),
}

/// Everything the provider sees about one submission.
#[derive(Debug, Clone)]
pub struct DecisionAnalysisRequest {
    /// Scenario description: position, stacks, action so far.
    pub scenario: String,
    /// Display form of the player's hole cards, e.g. `A♠ K♥`.
    pub hand: String,
    /// Display form of the board, absent preflop.
    pub board: Option<String>,
    /// Textual rendering of the user's decision, e.g. `"Raise to $40"`.
    pub user_decision: String,
}

/// Advisory coaching bundle for one decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionAnalysis {
    /// Short imperative advice.
    pub recommendation: String,
    /// Explanation of the factors behind the recommendation.
    pub reasoning: String,
    /// Provider self-assessed confidence, clamped to [0, 1].
    pub confidence: f64,
}

/// One historical result handed to the performance analyzer.
#[derive(Debug, Clone)]
pub struct PerformanceSample {
    pub scenario_title: String,
    pub score: u32,
    pub user_full_decision_text: String,
    pub ai_recommendation: Option<String>,
    pub ai_reasoning: Option<String>,
}

/// Port for the hosted text-generation service.
#[async_trait]
pub trait FeedbackProvider: Send + Sync {
    async fn analyze_decision(
        &self,
        request: &DecisionAnalysisRequest,
    ) -> Result<DecisionAnalysis, FeedbackError>;

    /// Overall coaching report across past results, newest first.
    async fn analyze_performance(
        &self,
        samples: &[PerformanceSample],
    ) -> Result<String, FeedbackError>;
}

// ── Gemini implementation ───────────────────────────────────────────

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
}

#[derive(Serialize)]
struct RequestContent {
    parts: Vec<TextPart>,
}

#[derive(Serialize)]
struct TextPart {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: String,
}

/// Feedback provider backed by the Generative Language API.
pub struct GeminiFeedback {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiFeedback {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: "gemini-2.0-flash".to_string(),
        }
    }

    async fn generate(&self, prompt: String) -> Result<String, FeedbackError> {
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![TextPart { text: prompt }],
            }],
        };

        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key
        );

        let response = self.client.post(&url).json(&request).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FeedbackError::Api { status, body });
        }

        let parsed: GenerateResponse = response.json().await?;
        parsed
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .ok_or(FeedbackError::Empty)
    }
}

#[async_trait]
impl FeedbackProvider for GeminiFeedback {
    async fn analyze_decision(
        &self,
        request: &DecisionAnalysisRequest,
    ) -> Result<DecisionAnalysis, FeedbackError> {
        let prompt = decision_prompt(request);
        let text = self.generate(prompt).await?;
        let clean = strip_code_fences(&text);
        let mut analysis: DecisionAnalysis = serde_json::from_str(clean).map_err(|e| {
            FeedbackError::Malformed(format!("{} in response: {}", e, clean))
        })?;
        analysis.confidence = analysis.confidence.clamp(0.0, 1.0);
        Ok(analysis)
    }

    async fn analyze_performance(
        &self,
        samples: &[PerformanceSample],
    ) -> Result<String, FeedbackError> {
        let text = self.generate(performance_prompt(samples)).await?;
        let report = text.trim();
        if report.is_empty() {
            return Err(FeedbackError::Empty);
        }
        Ok(report.to_string())
    }
}

fn decision_prompt(request: &DecisionAnalysisRequest) -> String {
    format!(
        r#"You are a Texas Hold'em strategy expert. Analyze the situation and the user's decision, then answer with ONLY a JSON object (no markdown, no extra text):

{{"recommendation": "<one concise sentence naming the best decision>", "reasoning": "<a short paragraph explaining the factors you weighed>", "confidence": <number between 0 and 1>}}

Situation: {}
User's hand: {}
Board: {}
User's decision: {}"#,
        request.scenario,
        request.hand,
        request.board.as_deref().unwrap_or("(none, preflop)"),
        request.user_decision,
    )
}

fn performance_prompt(samples: &[PerformanceSample]) -> String {
    let mut prompt = String::from(
        "You are an experienced Texas Hold'em coach. Below are a student's quiz results, \
         newest first. Write a structured report in markdown with these sections: \
         '### Overall Summary', '### Strengths', '### Areas to Improve', \
         '### Study Suggestions', '### Encouragement'. Be specific and constructive, and \
         cite scenarios by title where relevant.\n\nResults:\n",
    );
    for s in samples {
        prompt.push_str(&format!(
            "- Scenario: {} | score {}/100 | decision: {}\n",
            s.scenario_title, s.score, s.user_full_decision_text
        ));
        if let Some(rec) = &s.ai_recommendation {
            prompt.push_str(&format!("  earlier advice: {}\n", rec));
        }
        if let Some(why) = &s.ai_reasoning {
            prompt.push_str(&format!("  earlier reasoning: {}\n", why));
        }
    }
    prompt
}

/// Model responses often wrap JSON in ```json fences despite instructions.
fn strip_code_fences(text: &str) -> &str {
    text.trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

// ── Canned implementation ───────────────────────────────────────────

pub const CANNED_RECOMMENDATION: &str =
    "Compare the price you are being offered against the strength of your hand.";
pub const CANNED_REASONING: &str =
    "Offline analysis: no model is configured, so this feedback is a generic prompt to \
     review pot odds, position, and opponent ranges for this spot.";
pub const CANNED_CONFIDENCE: f64 = 0.5;

/// Deterministic provider for tests and keyless deployments.
#[derive(Default)]
pub struct CannedFeedback;

#[async_trait]
impl FeedbackProvider for CannedFeedback {
    async fn analyze_decision(
        &self,
        _request: &DecisionAnalysisRequest,
    ) -> Result<DecisionAnalysis, FeedbackError> {
        Ok(DecisionAnalysis {
            recommendation: CANNED_RECOMMENDATION.to_string(),
            reasoning: CANNED_REASONING.to_string(),
            confidence: CANNED_CONFIDENCE,
        })
    }

    async fn analyze_performance(
        &self,
        samples: &[PerformanceSample],
    ) -> Result<String, FeedbackError> {
        let total: u32 = samples.iter().map(|s| s.score).sum();
        let avg = total as f64 / samples.len().max(1) as f64;
        Ok(format!(
            "### Overall Summary\nYou have completed {} scenario(s) with an average score of {:.0}/100. \
             Configure an API key for a full coaching report.",
            samples.len(),
            avg
        ))
    }
}
