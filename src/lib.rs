//! # Pokercoach — Texas Hold'em strategy coaching backend
//!
//! Serves a fixed catalog of tutorial lessons and scenario quizzes, scores
//! submitted decisions against each scenario's precomputed ideal decision,
//! and attaches advisory AI coaching feedback to every result.
//!
//! ## Architecture
//!
//! | Concern | Module | Notes |
//! |---------|--------|-------|
//! | Card parsing/rendering | [`cards`] | `"As Kh"` strings, `T` → `10` |
//! | Decision scoring | [`scoring`] | pure, total; scores ∈ {0, 25, 100} |
//! | Content catalogs | [`content`] | `data/*.json`, validated at load |
//! | AI feedback port | [`feedback`] | Gemini client + canned offline impl |
//! | Progress store port | [`progress`] | per-user documents, mastered counter |
//! | Orchestration | [`submission`] | score → feedback → best-effort persist |
//! | HTTP surface | [`server`] | axum router, 9 endpoints |
//! | Configuration | [`env_config`] | env vars with defaults |
//!
//! ## Degradation policy
//!
//! Scoring is deterministic and never fails for valid catalog content. The
//! two collaborators degrade independently: a feedback failure or timeout
//! substitutes fixed placeholder text (confidence 0), and a progress-store
//! write failure is logged while the score still goes back to the user.
//! The mastered counter (`scenariosCompleted`) increments exactly once per
//! scenario, the first time that scenario is scored 100.

pub mod cards;
pub mod content;
pub mod env_config;
pub mod feedback;
pub mod progress;
pub mod scoring;
pub mod server;
pub mod submission;
