//! Axum HTTP server: 9 endpoints for the coaching frontend.
//!
//! All state lives in a shared `Arc<CoachContext>`: the immutable content
//! catalog plus the progress-store and feedback-provider ports. Handlers
//! stay thin; orchestration lives in [`crate::submission`].
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/scenarios` | Scenario summaries (`difficulty`, `q` filters) |
//! | GET | `/scenarios/{id}` | Scenario detail (ideal decision withheld) |
//! | POST | `/scenarios/{id}/submit` | Score a decision, return AI feedback |
//! | GET | `/lessons` | Lessons by chapter, with completion/lock state |
//! | GET | `/lessons/{id}` | Lesson content (403 while locked) |
//! | POST | `/lessons/{id}/complete` | Mark a lesson completed |
//! | GET | `/progress/{user_id}` | Dashboard summary |
//! | GET | `/progress/{user_id}/analysis` | AI overall performance report |

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};

use crate::content::{Difficulty, Lesson, CHAPTER_ORDER};
use crate::scoring::{ActionFamily, DecisionValue};
use crate::submission::{CoachContext, SubmitError};

pub type AppState = Arc<CoachContext>;

pub fn create_router(ctx: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health_check))
        .route("/scenarios", get(handle_list_scenarios))
        .route("/scenarios/:scenario_id", get(handle_get_scenario))
        .route("/scenarios/:scenario_id/submit", post(handle_submit_decision))
        .route("/lessons", get(handle_list_lessons))
        .route("/lessons/:lesson_id", get(handle_get_lesson))
        .route("/lessons/:lesson_id/complete", post(handle_complete_lesson))
        .route("/progress/:user_id", get(handle_get_progress))
        .route("/progress/:user_id/analysis", get(handle_get_analysis))
        .layer(cors)
        .with_state(ctx)
}

// ── Request types ───────────────────────────────────────────────────

#[derive(Deserialize)]
struct ScenarioListQuery {
    #[serde(default)]
    difficulty: Option<Difficulty>,
    #[serde(default)]
    q: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserQuery {
    #[serde(default)]
    user_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitRequest {
    /// Absent for anonymous submissions (scored, not persisted).
    #[serde(default)]
    user_id: Option<String>,
    action: ActionFamily,
    #[serde(default)]
    value: Option<DecisionValue>,
    /// The option text the user picked, echoed into the score record.
    text: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompleteLessonRequest {
    user_id: String,
}

fn error_response(status: StatusCode, msg: &str) -> (StatusCode, Json<serde_json::Value>) {
    (status, Json(serde_json::json!({ "error": msg })))
}

// ── GET handlers ────────────────────────────────────────────────────

async fn handle_health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "OK" }))
}

async fn handle_list_scenarios(
    State(ctx): State<AppState>,
    Query(params): Query<ScenarioListQuery>,
) -> Json<serde_json::Value> {
    let scenarios: Vec<serde_json::Value> = ctx
        .catalog()
        .scenarios()
        .iter()
        .filter(|s| s.matches(params.difficulty, params.q.as_deref()))
        .map(|s| {
            serde_json::json!({
                "id": s.id,
                "title": s.title,
                "description": s.description,
                "stage": s.stage,
                "difficulty": s.difficulty,
                "numberOfPlayers": s.number_of_players,
            })
        })
        .collect();

    Json(serde_json::json!({ "scenarios": scenarios }))
}

async fn handle_get_scenario(
    State(ctx): State<AppState>,
    Path(scenario_id): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    let s = ctx
        .catalog()
        .scenario(&scenario_id)
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, "Scenario not found"))?;

    // The ideal decision is scoring configuration; it never leaves the server.
    Ok(Json(serde_json::json!({
        "id": s.id,
        "title": s.title,
        "description": s.description,
        "playerHand": s.player_hand,
        "boardCards": s.board_cards,
        "stage": s.stage,
        "numberOfPlayers": s.number_of_players,
        "difficulty": s.difficulty,
        "options": s.options,
        "historicalContext": s.historical_context,
    })))
}

async fn handle_list_lessons(
    State(ctx): State<AppState>,
    Query(params): Query<UserQuery>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    let completed = completed_lessons(&ctx, params.user_id.as_deref()).await?;

    let mut chapters = Vec::new();
    for chapter in CHAPTER_ORDER {
        let lessons: Vec<serde_json::Value> = ctx
            .catalog()
            .lessons()
            .into_iter()
            .filter(|l| l.chapter == chapter)
            .map(|l| {
                serde_json::json!({
                    "id": l.id,
                    "title": l.title,
                    "order": l.order,
                    "completed": completed.get(&l.id).copied().unwrap_or(false),
                    "locked": !ctx.catalog().is_unlocked(l, &completed),
                })
            })
            .collect();
        chapters.push(serde_json::json!({
            "chapter": chapter,
            "lessons": lessons,
        }));
    }

    Ok(Json(serde_json::json!({ "chapters": chapters })))
}

async fn handle_get_lesson(
    State(ctx): State<AppState>,
    Path(lesson_id): Path<String>,
    Query(params): Query<UserQuery>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    let lesson: &Lesson = ctx
        .catalog()
        .lesson(&lesson_id)
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, "Lesson not found"))?;

    let completed = completed_lessons(&ctx, params.user_id.as_deref()).await?;
    if !ctx.catalog().is_unlocked(lesson, &completed) {
        return Err(error_response(
            StatusCode::FORBIDDEN,
            "Lesson is locked until all Basic Knowledge lessons are completed",
        ));
    }

    Ok(Json(serde_json::json!({
        "id": lesson.id,
        "title": lesson.title,
        "chapter": lesson.chapter,
        "content": lesson.content,
        "order": lesson.order,
        "completed": completed.get(&lesson.id).copied().unwrap_or(false),
    })))
}

async fn handle_get_progress(
    State(ctx): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let summary = ctx
        .progress_summary(&user_id)
        .await
        .map_err(|e| error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()))?;
    Ok(Json(summary))
}

async fn handle_get_analysis(
    State(ctx): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    let report = ctx
        .overall_analysis(&user_id)
        .await
        .map_err(|e| error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()))?;
    Ok(Json(serde_json::json!({ "analysisText": report })))
}

// ── POST handlers ───────────────────────────────────────────────────

async fn handle_submit_decision(
    State(ctx): State<AppState>,
    Path(scenario_id): Path<String>,
    Json(req): Json<SubmitRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let decision = crate::content::DecisionOption {
        text: req.text,
        action: req.action,
        value: req.value,
    };

    let feedback = ctx
        .submit_decision(req.user_id.as_deref(), &scenario_id, &decision)
        .await
        .map_err(|e| match e {
            SubmitError::ScenarioNotFound(_) => {
                error_response(StatusCode::NOT_FOUND, &e.to_string())
            }
            SubmitError::ScoringNotConfigured(_) => {
                error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
            }
        })?;

    Ok(Json(feedback))
}

async fn handle_complete_lesson(
    State(ctx): State<AppState>,
    Path(lesson_id): Path<String>,
    Json(req): Json<CompleteLessonRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    if ctx.catalog().lesson(&lesson_id).is_none() {
        return Err(error_response(StatusCode::NOT_FOUND, "Lesson not found"));
    }

    ctx.store()
        .mark_lesson_completed(&req.user_id, &lesson_id)
        .await
        .map_err(|e| error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "OK",
        "lessonId": lesson_id,
    })))
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Completed-lesson flags for an optional user; anonymous callers get the
/// empty map (only Basic Knowledge unlocked).
async fn completed_lessons(
    ctx: &AppState,
    user_id: Option<&str>,
) -> Result<HashMap<String, bool>, (StatusCode, Json<serde_json::Value>)> {
    match user_id {
        Some(user_id) => ctx
            .store()
            .user_progress(user_id)
            .await
            .map(|doc| doc.map(|d| d.completed_lessons).unwrap_or_default())
            .map_err(|e| error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())),
        None => Ok(HashMap::new()),
    }
}
