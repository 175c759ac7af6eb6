//! Per-user progress store: score records, completed lessons, and the
//! "scenarios mastered" counter.
//!
//! The store is a document map keyed by user id. Consistency is last write
//! wins per scenario id; the only cross-field invariant is that
//! `scenariosCompleted` increments exactly once per scenario, the first time
//! its score reaches 100. That increment is performed together with the
//! record upsert inside one locked section, against a sticky per-record
//! `mastered` flag, so racing submissions and 100 → 25 → 100 overwrite
//! cycles can never double-count.
//!
//! Persistence is a best-effort JSON snapshot: a failed write is logged and
//! swallowed, never surfaced to the caller as a scoring failure.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::scoring::SCORE_CORRECT;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("progress store error: {0}")]
    Backend(String),
}

/// Stored result of one scenario submission. Overwritten wholesale on
/// resubmission, except that `mastered` is sticky once set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub score: u32,
    /// Action tag, e.g. `"RAISE"`.
    pub user_decision: String,
    /// The option text the user picked, e.g. `"Raise to $40"`.
    pub user_full_decision_text: String,
    pub ai_recommendation: String,
    pub ai_reasoning: String,
    pub ai_confidence: f64,
    /// RFC 3339 submission time.
    pub submitted_at: String,
    pub scenario_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub historical_context: Option<String>,
    /// True once the scenario has ever been scored 100 by this user.
    #[serde(default)]
    pub mastered: bool,
}

/// One user's document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub scenarios_completed: u32,
    pub completed_lessons: HashMap<String, bool>,
    pub scenario_scores: HashMap<String, ScoreRecord>,
    pub created_at: String,
}

impl UserProgress {
    fn new() -> Self {
        Self {
            scenarios_completed: 0,
            completed_lessons: HashMap::new(),
            scenario_scores: HashMap::new(),
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Outcome of a score upsert.
#[derive(Debug, Clone, Copy)]
pub struct ScoreUpdate {
    /// True when this submission crossed the scenario into mastered for the
    /// first time (and the counter was incremented).
    pub newly_mastered: bool,
    pub scenarios_completed: u32,
}

/// Port for the per-user progress document store.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn user_progress(&self, user_id: &str) -> Result<Option<UserProgress>, StoreError>;

    /// Upsert the record for (user, scenario) and conditionally bump the
    /// mastered counter, as a single logical transaction.
    async fn record_scenario_score(
        &self,
        user_id: &str,
        scenario_id: &str,
        record: ScoreRecord,
    ) -> Result<ScoreUpdate, StoreError>;

    /// Idempotent completion flag.
    async fn mark_lesson_completed(&self, user_id: &str, lesson_id: &str)
        -> Result<(), StoreError>;
}

// ── In-memory implementation ────────────────────────────────────────

/// Mutex-guarded document map, optionally snapshotted to a JSON file after
/// each mutation.
pub struct InMemoryProgressStore {
    users: Mutex<HashMap<String, UserProgress>>,
    snapshot_path: Option<PathBuf>,
}

impl InMemoryProgressStore {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            snapshot_path: None,
        }
    }

    /// Load prior state from `path` if it exists; snapshot there after every
    /// mutation from now on.
    pub fn with_snapshot(path: PathBuf) -> Self {
        let users = match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<HashMap<String, UserProgress>>(&text) {
                Ok(users) => {
                    tracing::info!(path = %path.display(), users = users.len(), "loaded progress snapshot");
                    users
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable progress snapshot");
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };
        Self {
            users: Mutex::new(users),
            snapshot_path: Some(path),
        }
    }

    /// Best-effort snapshot write. Failures are logged, never propagated.
    fn persist(&self, users: &HashMap<String, UserProgress>) {
        let Some(path) = &self.snapshot_path else {
            return;
        };
        let result = serde_json::to_vec_pretty(users)
            .map_err(|e| e.to_string())
            .and_then(|bytes| std::fs::write(path, bytes).map_err(|e| e.to_string()));
        if let Err(e) = result {
            tracing::error!(path = %path.display(), error = %e, "progress snapshot write failed");
        }
    }
}

impl Default for InMemoryProgressStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProgressStore for InMemoryProgressStore {
    async fn user_progress(&self, user_id: &str) -> Result<Option<UserProgress>, StoreError> {
        let users = self.users.lock().await;
        Ok(users.get(user_id).cloned())
    }

    async fn record_scenario_score(
        &self,
        user_id: &str,
        scenario_id: &str,
        mut record: ScoreRecord,
    ) -> Result<ScoreUpdate, StoreError> {
        let mut users = self.users.lock().await;
        let doc = users
            .entry(user_id.to_string())
            .or_insert_with(UserProgress::new);

        let previously_mastered = doc
            .scenario_scores
            .get(scenario_id)
            .map(|r| r.mastered)
            .unwrap_or(false);

        let newly_mastered = record.score == SCORE_CORRECT && !previously_mastered;
        record.mastered = previously_mastered || record.score == SCORE_CORRECT;

        if newly_mastered {
            doc.scenarios_completed += 1;
        }
        doc.scenario_scores
            .insert(scenario_id.to_string(), record);

        let update = ScoreUpdate {
            newly_mastered,
            scenarios_completed: doc.scenarios_completed,
        };
        self.persist(&users);
        Ok(update)
    }

    async fn mark_lesson_completed(
        &self,
        user_id: &str,
        lesson_id: &str,
    ) -> Result<(), StoreError> {
        let mut users = self.users.lock().await;
        let doc = users
            .entry(user_id.to_string())
            .or_insert_with(UserProgress::new);
        doc.completed_lessons.insert(lesson_id.to_string(), true);
        self.persist(&users);
        Ok(())
    }
}
