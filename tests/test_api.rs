//! Integration tests for the HTTP API endpoints.
//!
//! Uses axum's oneshot pattern (via tower::ServiceExt) — no TCP binding
//! needed. Each test builds a fresh router over its own in-memory store and
//! the canned feedback provider, so tests are independent and deterministic.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use pokercoach::content::{ContentCatalog, Lesson, Scenario};
use pokercoach::feedback::{CannedFeedback, CANNED_CONFIDENCE, CANNED_RECOMMENDATION, NO_HISTORY_ANALYSIS};
use pokercoach::progress::InMemoryProgressStore;
use pokercoach::server::create_router;
use pokercoach::submission::CoachContext;

const SCENARIOS_JSON: &str = r#"[
  {
    "id": "s-fold",
    "title": "Easy fold",
    "description": "Trash hand facing a raise.",
    "playerHand": "7s 2d",
    "boardCards": [],
    "stage": "PREFLOP",
    "numberOfPlayers": 6,
    "difficulty": "EASY",
    "options": [
      {"text": "Fold", "action": "FOLD"},
      {"text": "Call $3", "action": "CALL", "value": 3}
    ],
    "idealDecision": {"action": "FOLD"}
  },
  {
    "id": "s-raise",
    "title": "Sized raise",
    "description": "Set on a wet board.",
    "playerHand": "4h 4c",
    "boardCards": ["Jd", "10d", "4s"],
    "stage": "FLOP",
    "numberOfPlayers": 3,
    "difficulty": "MEDIUM",
    "options": [
      {"text": "Raise to $20", "action": "RAISE", "value": 20},
      {"text": "Raise to $40", "action": "RAISE", "value": 40},
      {"text": "Call", "action": "CALL"},
      {"text": "Fold", "action": "FOLD"}
    ],
    "idealDecision": {"action": "RAISE", "value": 20}
  },
  {
    "id": "s-allin",
    "title": "Shove spot",
    "description": "Combo draw with fold equity.",
    "playerHand": "Ad Qd",
    "boardCards": [],
    "stage": "PREFLOP",
    "numberOfPlayers": 2,
    "difficulty": "HARD",
    "options": [
      {"text": "Shove", "action": "RAISE", "value": "ALL-IN"},
      {"text": "Raise to $200", "action": "RAISE", "value": 200},
      {"text": "Fold", "action": "FOLD"}
    ],
    "idealDecision": {"action": "RAISE", "value": "ALL-IN"},
    "historicalContext": "A classic tournament leverage spot."
  },
  {
    "id": "s-unscored",
    "title": "Draft scenario",
    "description": "Not yet configured for scoring.",
    "playerHand": "As Kh",
    "boardCards": [],
    "stage": "PREFLOP",
    "numberOfPlayers": 6,
    "difficulty": "EASY",
    "options": [{"text": "Fold", "action": "FOLD"}]
  }
]"#;

const LESSONS_JSON: &str = r#"[
  {"id": "b1", "title": "Rankings", "chapter": "Basic Knowledge", "content": "...", "order": 1},
  {"id": "b2", "title": "Positions", "chapter": "Basic Knowledge", "content": "...", "order": 2},
  {"id": "c1", "title": "Pot odds", "chapter": "Core Strategy", "content": "...", "order": 1}
]"#;

fn catalog() -> ContentCatalog {
    let scenarios: Vec<Scenario> = serde_json::from_str(SCENARIOS_JSON).unwrap();
    let lessons: Vec<Lesson> = serde_json::from_str(LESSONS_JSON).unwrap();
    ContentCatalog::new(scenarios, lessons).unwrap()
}

fn app() -> axum::Router {
    let ctx = Arc::new(CoachContext::new(
        catalog(),
        Arc::new(InMemoryProgressStore::new()),
        Arc::new(CannedFeedback),
        Duration::from_secs(1),
    ));
    create_router(ctx)
}

/// Parse response body as JSON.
async fn body_json(body: Body) -> serde_json::Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(path: &str, body: serde_json::Value) -> Request<Body> {
    Request::post(path)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn get(path: &str) -> Request<Body> {
    Request::get(path).body(Body::empty()).unwrap()
}

// ── GET /health ──────────────────────────────────────────────────────

#[tokio::test]
async fn health_returns_200() {
    let resp = app().oneshot(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp.into_body()).await;
    assert_eq!(json["status"], "OK");
}

// ── GET /scenarios ───────────────────────────────────────────────────

#[tokio::test]
async fn scenario_list_returns_all() {
    let resp = app().oneshot(get("/scenarios")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp.into_body()).await;
    assert_eq!(json["scenarios"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn scenario_list_filters_by_difficulty() {
    let resp = app().oneshot(get("/scenarios?difficulty=HARD")).await.unwrap();
    let json = body_json(resp.into_body()).await;
    let scenarios = json["scenarios"].as_array().unwrap();
    assert_eq!(scenarios.len(), 1);
    assert_eq!(scenarios[0]["id"], "s-allin");
}

#[tokio::test]
async fn scenario_list_filters_by_query() {
    let resp = app().oneshot(get("/scenarios?q=wet%20board")).await.unwrap();
    let json = body_json(resp.into_body()).await;
    let scenarios = json["scenarios"].as_array().unwrap();
    assert_eq!(scenarios.len(), 1);
    assert_eq!(scenarios[0]["id"], "s-raise");
}

// ── GET /scenarios/{id} ──────────────────────────────────────────────

#[tokio::test]
async fn scenario_detail_withholds_ideal_decision() {
    let resp = app().oneshot(get("/scenarios/s-raise")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp.into_body()).await;
    assert_eq!(json["id"], "s-raise");
    assert_eq!(json["options"].as_array().unwrap().len(), 4);
    assert!(json.get("idealDecision").is_none());
}

#[tokio::test]
async fn scenario_detail_unknown_is_404() {
    let resp = app().oneshot(get("/scenarios/nope")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ── POST /scenarios/{id}/submit ──────────────────────────────────────

#[tokio::test]
async fn submit_exact_match_scores_100() {
    let resp = app()
        .oneshot(post_json(
            "/scenarios/s-raise/submit",
            serde_json::json!({
                "userId": "u1",
                "action": "RAISE",
                "value": 20,
                "text": "Raise to $20"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp.into_body()).await;
    assert_eq!(json["score"], 100);
    assert_eq!(json["userDecision"], "RAISE");
    assert_eq!(json["userFullDecisionText"], "Raise to $20");
    assert_eq!(json["aiRecommendation"], CANNED_RECOMMENDATION);
    assert_eq!(json["aiConfidence"], CANNED_CONFIDENCE);
}

#[tokio::test]
async fn submit_wrong_size_scores_25() {
    let resp = app()
        .oneshot(post_json(
            "/scenarios/s-raise/submit",
            serde_json::json!({"action": "RAISE", "value": 40, "text": "Raise to $40"}),
        ))
        .await
        .unwrap();
    let json = body_json(resp.into_body()).await;
    assert_eq!(json["score"], 25);
}

#[tokio::test]
async fn submit_wrong_action_scores_0() {
    let resp = app()
        .oneshot(post_json(
            "/scenarios/s-fold/submit",
            serde_json::json!({"action": "CALL", "value": 3, "text": "Call $3"}),
        ))
        .await
        .unwrap();
    let json = body_json(resp.into_body()).await;
    assert_eq!(json["score"], 0);
}

#[tokio::test]
async fn submit_all_in_matches_all_in() {
    let resp = app()
        .oneshot(post_json(
            "/scenarios/s-allin/submit",
            serde_json::json!({"action": "RAISE", "value": "ALL-IN", "text": "Shove"}),
        ))
        .await
        .unwrap();
    let json = body_json(resp.into_body()).await;
    assert_eq!(json["score"], 100);
    assert_eq!(json["historicalContext"], "A classic tournament leverage spot.");
}

#[tokio::test]
async fn submit_unknown_scenario_is_404() {
    let resp = app()
        .oneshot(post_json(
            "/scenarios/nope/submit",
            serde_json::json!({"action": "FOLD", "text": "Fold"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn submit_unscored_scenario_is_500() {
    let resp = app()
        .oneshot(post_json(
            "/scenarios/s-unscored/submit",
            serde_json::json!({"action": "FOLD", "text": "Fold"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(resp.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("ideal decision"));
}

// ── Mastery and progress ─────────────────────────────────────────────

#[tokio::test]
async fn repeat_mastery_counts_once() {
    let app = app();
    let submit = serde_json::json!({
        "userId": "u1", "action": "FOLD", "text": "Fold"
    });

    for _ in 0..2 {
        let resp = app
            .clone()
            .oneshot(post_json("/scenarios/s-fold/submit", submit.clone()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = app.oneshot(get("/progress/u1")).await.unwrap();
    let json = body_json(resp.into_body()).await;
    assert_eq!(json["scenariosCompleted"], 1);
    assert_eq!(json["scores"].as_array().unwrap().len(), 1);
    assert_eq!(json["scores"][0]["score"], 100);
    assert_eq!(json["totalScenarios"], 4);
}

#[tokio::test]
async fn anonymous_submission_persists_nothing() {
    let app = app();
    let resp = app
        .clone()
        .oneshot(post_json(
            "/scenarios/s-fold/submit",
            serde_json::json!({"action": "FOLD", "text": "Fold"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app.oneshot(get("/progress/u1")).await.unwrap();
    let json = body_json(resp.into_body()).await;
    assert_eq!(json["scenariosCompleted"], 0);
    assert!(json["scores"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn progress_for_unknown_user_is_zeroed() {
    let resp = app().oneshot(get("/progress/ghost")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp.into_body()).await;
    assert_eq!(json["scenariosCompleted"], 0);
    assert_eq!(json["tutorialsCompleted"], 0);
    assert_eq!(json["totalLessons"], 3);
}

// ── Lessons ──────────────────────────────────────────────────────────

#[tokio::test]
async fn lesson_list_reports_lock_state() {
    let resp = app().oneshot(get("/lessons")).await.unwrap();
    let json = body_json(resp.into_body()).await;
    let chapters = json["chapters"].as_array().unwrap();
    assert_eq!(chapters[0]["chapter"], "Basic Knowledge");
    assert_eq!(chapters[0]["lessons"][0]["locked"], false);
    assert_eq!(chapters[1]["chapter"], "Core Strategy");
    assert_eq!(chapters[1]["lessons"][0]["locked"], true);
}

#[tokio::test]
async fn advanced_lesson_unlocks_after_basics() {
    let app = app();

    let resp = app.clone().oneshot(get("/lessons/c1?userId=u1")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    for lesson in ["b1", "b2"] {
        let resp = app
            .clone()
            .oneshot(post_json(
                &format!("/lessons/{lesson}/complete"),
                serde_json::json!({"userId": "u1"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = app.clone().oneshot(get("/lessons/c1?userId=u1")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp.into_body()).await;
    assert_eq!(json["id"], "c1");
    assert_eq!(json["completed"], false);

    // Another user still sees the lock.
    let resp = app.oneshot(get("/lessons/c1?userId=u2")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn basic_lesson_is_open_to_anonymous_readers() {
    let resp = app().oneshot(get("/lessons/b1")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp.into_body()).await;
    assert_eq!(json["chapter"], "Basic Knowledge");
}

#[tokio::test]
async fn completing_unknown_lesson_is_404() {
    let resp = app()
        .oneshot(post_json(
            "/lessons/nope/complete",
            serde_json::json!({"userId": "u1"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn completion_reflects_in_progress_summary() {
    let app = app();
    app.clone()
        .oneshot(post_json(
            "/lessons/b1/complete",
            serde_json::json!({"userId": "u1"}),
        ))
        .await
        .unwrap();

    let resp = app.oneshot(get("/progress/u1")).await.unwrap();
    let json = body_json(resp.into_body()).await;
    assert_eq!(json["tutorialsCompleted"], 1);
}

// ── Overall analysis ─────────────────────────────────────────────────

#[tokio::test]
async fn analysis_without_history_returns_notice() {
    let resp = app().oneshot(get("/progress/u1/analysis")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp.into_body()).await;
    assert_eq!(json["analysisText"], NO_HISTORY_ANALYSIS);
}

#[tokio::test]
async fn analysis_with_history_consults_provider() {
    let app = app();
    app.clone()
        .oneshot(post_json(
            "/scenarios/s-fold/submit",
            serde_json::json!({"userId": "u1", "action": "FOLD", "text": "Fold"}),
        ))
        .await
        .unwrap();

    let resp = app.oneshot(get("/progress/u1/analysis")).await.unwrap();
    let json = body_json(resp.into_body()).await;
    let text = json["analysisText"].as_str().unwrap();
    assert!(text.contains("Overall Summary"), "unexpected report: {text}");
}
