//! Submission orchestration: score, fetch advisory feedback, update progress.
//!
//! [`CoachContext`] is the shared immutable application state (catalog +
//! ports + config), built once at startup and handed to every handler as
//! `Arc<CoachContext>`.
//!
//! The submit flow is strictly ordered only where it has to be: scoring is
//! pure and runs first; the feedback call is advisory, bounded by a timeout,
//! and fails open to placeholder text; the progress write happens after
//! scoring (the mastered counter depends on the score) and is best-effort —
//! a store failure is logged and the user still gets their result.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tokio::time::timeout;

use crate::cards::{display_cards, parse_board, parse_hand};
use crate::content::{ContentCatalog, DecisionOption, Scenario};
use crate::feedback::{
    DecisionAnalysis, DecisionAnalysisRequest, FeedbackProvider, PerformanceSample,
    FALLBACK_ANALYSIS, FALLBACK_REASONING, FALLBACK_RECOMMENDATION, NO_HISTORY_ANALYSIS,
};
use crate::progress::{ProgressStore, ScoreRecord, StoreError};
use crate::scoring::{score_decision, ActionFamily, DecisionValue};

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("scenario {0:?} not found")]
    ScenarioNotFound(String),

    #[error("scenario {0:?} has no ideal decision configured; scoring is undefined")]
    ScoringNotConfigured(String),
}

/// What the user gets back for one submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioFeedback {
    pub scenario_id: String,
    pub user_decision: String,
    pub user_full_decision_text: String,
    pub score: u32,
    pub ai_recommendation: String,
    pub ai_reasoning: String,
    pub ai_confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub historical_context: Option<String>,
    pub submitted_at: String,
}

/// Dashboard aggregates for one user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub scenarios_completed: u32,
    pub tutorials_completed: usize,
    pub total_scenarios: usize,
    pub total_lessons: usize,
    pub scores: Vec<ScoredScenario>,
}

/// A score record plus the scenario it belongs to, newest first in listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredScenario {
    pub scenario_id: String,
    #[serde(flatten)]
    pub record: ScoreRecord,
}

/// Shared application state: immutable catalog plus the two collaborator
/// ports and the feedback timeout.
pub struct CoachContext {
    catalog: ContentCatalog,
    store: Arc<dyn ProgressStore>,
    feedback: Arc<dyn FeedbackProvider>,
    feedback_timeout: Duration,
}

impl CoachContext {
    pub fn new(
        catalog: ContentCatalog,
        store: Arc<dyn ProgressStore>,
        feedback: Arc<dyn FeedbackProvider>,
        feedback_timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            store,
            feedback,
            feedback_timeout,
        }
    }

    pub fn catalog(&self) -> &ContentCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &dyn ProgressStore {
        self.store.as_ref()
    }

    /// Score a decision, gather advisory feedback, and (for signed-in users)
    /// record the result. Anonymous submissions score and get feedback but
    /// persist nothing.
    pub async fn submit_decision(
        &self,
        user_id: Option<&str>,
        scenario_id: &str,
        decision: &DecisionOption,
    ) -> Result<ScenarioFeedback, SubmitError> {
        let scenario = self
            .catalog
            .scenario(scenario_id)
            .ok_or_else(|| SubmitError::ScenarioNotFound(scenario_id.to_string()))?;
        let ideal = scenario
            .ideal_decision
            .as_ref()
            .ok_or_else(|| SubmitError::ScoringNotConfigured(scenario_id.to_string()))?;

        let score = score_decision(ideal.action, ideal.value, decision.action, decision.value);

        let analysis = self
            .decision_feedback(feedback_request(scenario, decision))
            .await;

        let feedback = ScenarioFeedback {
            scenario_id: scenario.id.clone(),
            user_decision: decision.action.as_str().to_string(),
            user_full_decision_text: decision.text.clone(),
            score,
            ai_recommendation: analysis.recommendation,
            ai_reasoning: analysis.reasoning,
            ai_confidence: analysis.confidence,
            historical_context: scenario.historical_context.clone(),
            submitted_at: Utc::now().to_rfc3339(),
        };

        match user_id {
            Some(user_id) => {
                let record = ScoreRecord {
                    score: feedback.score,
                    user_decision: feedback.user_decision.clone(),
                    user_full_decision_text: feedback.user_full_decision_text.clone(),
                    ai_recommendation: feedback.ai_recommendation.clone(),
                    ai_reasoning: feedback.ai_reasoning.clone(),
                    ai_confidence: feedback.ai_confidence,
                    submitted_at: feedback.submitted_at.clone(),
                    scenario_title: scenario.title.clone(),
                    historical_context: feedback.historical_context.clone(),
                    mastered: false,
                };
                match self
                    .store
                    .record_scenario_score(user_id, scenario_id, record)
                    .await
                {
                    Ok(update) if update.newly_mastered => {
                        tracing::info!(
                            user_id,
                            scenario_id,
                            scenarios_completed = update.scenarios_completed,
                            "scenario newly mastered"
                        );
                    }
                    Ok(_) => {}
                    // Persistence is best-effort; the score still goes back
                    // to the user.
                    Err(e) => {
                        tracing::error!(user_id, scenario_id, error = %e, "progress write failed");
                    }
                }
            }
            None => {
                tracing::debug!(scenario_id, "anonymous submission; progress not saved");
            }
        }

        Ok(feedback)
    }

    /// Dashboard aggregates. Unknown users get an all-zero summary.
    pub async fn progress_summary(&self, user_id: &str) -> Result<ProgressSummary, StoreError> {
        let doc = self.store.user_progress(user_id).await?;
        let (scenarios_completed, tutorials_completed, scores) = match doc {
            Some(doc) => {
                let tutorials_completed =
                    doc.completed_lessons.values().filter(|done| **done).count();
                let mut scores: Vec<ScoredScenario> = doc
                    .scenario_scores
                    .into_iter()
                    .map(|(scenario_id, record)| ScoredScenario {
                        scenario_id,
                        record,
                    })
                    .collect();
                scores.sort_by(|a, b| b.record.submitted_at.cmp(&a.record.submitted_at));
                (doc.scenarios_completed, tutorials_completed, scores)
            }
            None => (0, 0, Vec::new()),
        };

        Ok(ProgressSummary {
            scenarios_completed,
            tutorials_completed,
            total_scenarios: self.catalog.scenarios().len(),
            total_lessons: self.catalog.lesson_count(),
            scores,
        })
    }

    /// Overall coaching report across the user's history. Empty history
    /// short-circuits without consulting the provider.
    pub async fn overall_analysis(&self, user_id: &str) -> Result<String, StoreError> {
        let summary = self.progress_summary(user_id).await?;
        if summary.scores.is_empty() {
            return Ok(NO_HISTORY_ANALYSIS.to_string());
        }

        let samples: Vec<PerformanceSample> = summary
            .scores
            .iter()
            .map(|s| PerformanceSample {
                scenario_title: s.record.scenario_title.clone(),
                score: s.record.score,
                user_full_decision_text: s.record.user_full_decision_text.clone(),
                ai_recommendation: Some(s.record.ai_recommendation.clone()),
                ai_reasoning: Some(s.record.ai_reasoning.clone()),
            })
            .collect();

        let report = match timeout(
            self.feedback_timeout,
            self.feedback.analyze_performance(&samples),
        )
        .await
        {
            Ok(Ok(report)) => report,
            Ok(Err(e)) => {
                tracing::warn!(user_id, error = %e, "performance analysis failed");
                FALLBACK_ANALYSIS.to_string()
            }
            Err(_) => {
                tracing::warn!(user_id, "performance analysis timed out");
                FALLBACK_ANALYSIS.to_string()
            }
        };
        Ok(report)
    }

    async fn decision_feedback(&self, request: DecisionAnalysisRequest) -> DecisionAnalysis {
        match timeout(
            self.feedback_timeout,
            self.feedback.analyze_decision(&request),
        )
        .await
        {
            Ok(Ok(analysis)) => analysis,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "decision feedback failed; substituting placeholders");
                placeholder_analysis()
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.feedback_timeout.as_millis() as u64,
                    "decision feedback timed out; substituting placeholders"
                );
                placeholder_analysis()
            }
        }
    }
}

fn placeholder_analysis() -> DecisionAnalysis {
    DecisionAnalysis {
        recommendation: FALLBACK_RECOMMENDATION.to_string(),
        reasoning: FALLBACK_REASONING.to_string(),
        confidence: 0.0,
    }
}

/// Textual rendering of an (action, value) pair for the feedback prompt,
/// e.g. `RAISE 40` or `RAISE ALL-IN`.
pub fn render_decision(action: ActionFamily, value: Option<DecisionValue>) -> String {
    match value {
        Some(v) => format!("{} {}", action, v),
        None => action.to_string(),
    }
}

fn feedback_request(scenario: &Scenario, decision: &DecisionOption) -> DecisionAnalysisRequest {
    // Catalog validation guarantees these parse; fall back to the raw
    // strings rather than panic if they ever do not.
    let hand = parse_hand(&scenario.player_hand)
        .map(|cards| display_cards(&cards))
        .unwrap_or_else(|_| scenario.player_hand.clone());
    let board = if scenario.board_cards.is_empty() {
        None
    } else {
        Some(
            parse_board(&scenario.board_cards)
                .map(|cards| display_cards(&cards))
                .unwrap_or_else(|_| scenario.board_cards.join(", ")),
        )
    };

    DecisionAnalysisRequest {
        scenario: scenario.description.clone(),
        hand,
        board,
        user_decision: render_decision(decision.action, decision.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_decisions_for_the_prompt() {
        assert_eq!(render_decision(ActionFamily::Fold, None), "FOLD");
        assert_eq!(
            render_decision(ActionFamily::Raise, Some(DecisionValue::Chips(40.0))),
            "RAISE 40"
        );
        assert_eq!(
            render_decision(ActionFamily::Raise, Some(DecisionValue::AllIn)),
            "RAISE ALL-IN"
        );
    }
}
