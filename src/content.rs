//! Scenario and lesson catalogs: schema, loading, and load-time validation.
//!
//! Content is build-time data shipped under `data/` (`scenarios.json`,
//! `lessons.json`) and loaded once at startup into a [`ContentCatalog`],
//! which is then shared immutably for the life of the process.
//!
//! Validation happens here so downstream code never sees malformed content:
//! the scorer in particular is total over catalog data that passed
//! [`ContentCatalog::validate`]. A scenario without an `idealDecision` is
//! *valid* content (submitting against it is a runtime configuration error),
//! but a present-and-malformed ideal decision fails the load.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cards::{parse_board, parse_hand, CardError};
use crate::scoring::{ActionFamily, DecisionValue};

// ── Chapters ────────────────────────────────────────────────────────

pub const BASIC_KNOWLEDGE_CHAPTER: &str = "Basic Knowledge";
pub const CORE_STRATEGY_CHAPTER: &str = "Core Strategy";
pub const ADVANCED_STRATEGY_CHAPTER: &str = "Advanced Strategy";
pub const GAME_VARIANTS_CHAPTER: &str = "Game Variants & Advanced Concepts";

/// Canonical chapter order for listings and for the gating rule: chapters
/// after the first unlock only once every Basic Knowledge lesson is done.
pub const CHAPTER_ORDER: [&str; 4] = [
    BASIC_KNOWLEDGE_CHAPTER,
    CORE_STRATEGY_CHAPTER,
    ADVANCED_STRATEGY_CHAPTER,
    GAME_VARIANTS_CHAPTER,
];

fn chapter_rank(chapter: &str) -> usize {
    CHAPTER_ORDER
        .iter()
        .position(|c| *c == chapter)
        .unwrap_or(CHAPTER_ORDER.len())
}

// ── Enumerations ────────────────────────────────────────────────────

/// Game stage at the decision point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Preflop,
    Flop,
    Turn,
    River,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Preflop => "PREFLOP",
            Stage::Flop => "FLOP",
            Stage::Turn => "TURN",
            Stage::River => "RIVER",
        }
    }

    /// Community cards dealt by this stage.
    pub fn board_card_count(&self) -> usize {
        match self {
            Stage::Preflop => 0,
            Stage::Flop => 3,
            Stage::Turn => 4,
            Stage::River => 5,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Scenario schema ─────────────────────────────────────────────────

/// One selectable decision: display text plus the (action, value) pair that
/// gets scored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionOption {
    /// Button text, e.g. `"Raise to $20"`.
    pub text: String,
    pub action: ActionFamily,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<DecisionValue>,
}

/// The precomputed correct decision a submission is scored against.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdealDecision {
    pub action: ActionFamily,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<DecisionValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

/// An immutable quiz scenario. Defined at build time, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: String,
    pub title: String,
    /// Initial game state, stack sizes, opponent action so far.
    pub description: String,
    /// E.g. `"As Kh"`.
    pub player_hand: String,
    /// E.g. `["Ad", "Qd", "Jd"]`.
    pub board_cards: Vec<String>,
    pub stage: Stage,
    pub number_of_players: u32,
    pub difficulty: Difficulty,
    pub options: Vec<DecisionOption>,
    /// Absent means the scenario cannot be scored yet; submissions against
    /// it fail with a configuration error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ideal_decision: Option<IdealDecision>,
    /// Backstory shown for hard scenarios; carried into score records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub historical_context: Option<String>,
}

impl Scenario {
    /// Listing filter: difficulty match plus case-insensitive substring
    /// search over title and description.
    pub fn matches(&self, difficulty: Option<Difficulty>, query: Option<&str>) -> bool {
        if let Some(d) = difficulty {
            if self.difficulty != d {
                return false;
            }
        }
        if let Some(q) = query {
            let q = q.to_lowercase();
            if q.is_empty() {
                return true;
            }
            return self.title.to_lowercase().contains(&q)
                || self.description.to_lowercase().contains(&q);
        }
        true
    }
}

// ── Lesson schema ───────────────────────────────────────────────────

/// A tutorial lesson: markdown content, ordered within its chapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    pub title: String,
    pub chapter: String,
    /// Markdown body.
    pub content: String,
    /// Sort key within the chapter.
    pub order: u32,
}

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("duplicate scenario id {0:?}")]
    DuplicateScenarioId(String),

    #[error("duplicate lesson id {0:?}")]
    DuplicateLessonId(String),

    #[error("scenario {scenario:?}: bad player hand: {source}")]
    InvalidHand {
        scenario: String,
        source: CardError,
    },

    #[error("scenario {scenario:?}: player hand has {count} cards, expected 2")]
    HandSize { scenario: String, count: usize },

    #[error("scenario {scenario:?}: bad board card: {source}")]
    InvalidBoardCard {
        scenario: String,
        source: CardError,
    },

    #[error("scenario {scenario:?}: stage {stage} expects {expected} board cards, found {actual}")]
    BoardStageMismatch {
        scenario: String,
        stage: Stage,
        expected: usize,
        actual: usize,
    },

    #[error("scenario {scenario:?}: numberOfPlayers {count} out of range 2-10")]
    PlayerCount { scenario: String, count: u32 },

    #[error("scenario {scenario:?}: no decision options")]
    NoOptions { scenario: String },

    #[error("lesson {lesson:?}: unknown chapter {chapter:?}")]
    UnknownChapter { lesson: String, chapter: String },
}

// ── Catalog ─────────────────────────────────────────────────────────

/// The loaded, validated content catalogs.
#[derive(Debug)]
pub struct ContentCatalog {
    scenarios: Vec<Scenario>,
    lessons: Vec<Lesson>,
}

impl ContentCatalog {
    /// Load `scenarios.json` and `lessons.json` from a data directory and
    /// validate them.
    pub fn load(data_dir: &Path) -> Result<Self, ContentError> {
        let scenarios = read_json(&data_dir.join("scenarios.json"))?;
        let lessons = read_json(&data_dir.join("lessons.json"))?;
        Self::new(scenarios, lessons)
    }

    /// Build a catalog from already-deserialized content (tests, fixtures).
    pub fn new(scenarios: Vec<Scenario>, lessons: Vec<Lesson>) -> Result<Self, ContentError> {
        let catalog = Self { scenarios, lessons };
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), ContentError> {
        let mut seen = HashMap::new();
        for s in &self.scenarios {
            if seen.insert(s.id.clone(), ()).is_some() {
                return Err(ContentError::DuplicateScenarioId(s.id.clone()));
            }

            let hand = parse_hand(&s.player_hand).map_err(|source| ContentError::InvalidHand {
                scenario: s.id.clone(),
                source,
            })?;
            if hand.len() != 2 {
                return Err(ContentError::HandSize {
                    scenario: s.id.clone(),
                    count: hand.len(),
                });
            }

            parse_board(&s.board_cards).map_err(|source| ContentError::InvalidBoardCard {
                scenario: s.id.clone(),
                source,
            })?;
            let expected = s.stage.board_card_count();
            if s.board_cards.len() != expected {
                return Err(ContentError::BoardStageMismatch {
                    scenario: s.id.clone(),
                    stage: s.stage,
                    expected,
                    actual: s.board_cards.len(),
                });
            }

            if !(2..=10).contains(&s.number_of_players) {
                return Err(ContentError::PlayerCount {
                    scenario: s.id.clone(),
                    count: s.number_of_players,
                });
            }
            if s.options.is_empty() {
                return Err(ContentError::NoOptions {
                    scenario: s.id.clone(),
                });
            }
        }

        let mut seen = HashMap::new();
        for l in &self.lessons {
            if seen.insert(l.id.clone(), ()).is_some() {
                return Err(ContentError::DuplicateLessonId(l.id.clone()));
            }
            if !CHAPTER_ORDER.contains(&l.chapter.as_str()) {
                return Err(ContentError::UnknownChapter {
                    lesson: l.id.clone(),
                    chapter: l.chapter.clone(),
                });
            }
        }

        Ok(())
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn scenario(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }

    /// Lessons sorted by (chapter rank, order, id).
    pub fn lessons(&self) -> Vec<&Lesson> {
        let mut out: Vec<&Lesson> = self.lessons.iter().collect();
        out.sort_by(|a, b| {
            (chapter_rank(&a.chapter), a.order, &a.id).cmp(&(chapter_rank(&b.chapter), b.order, &b.id))
        });
        out
    }

    pub fn lesson(&self, id: &str) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id == id)
    }

    pub fn lesson_count(&self) -> usize {
        self.lessons.len()
    }

    /// A lesson outside Basic Knowledge stays locked until every Basic
    /// Knowledge lesson is completed.
    pub fn is_unlocked(&self, lesson: &Lesson, completed: &HashMap<String, bool>) -> bool {
        if lesson.chapter == BASIC_KNOWLEDGE_CHAPTER {
            return true;
        }
        self.lessons
            .iter()
            .filter(|l| l.chapter == BASIC_KNOWLEDGE_CHAPTER)
            .all(|l| completed.get(&l.id).copied().unwrap_or(false))
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ContentError> {
    let text = std::fs::read_to_string(path).map_err(|source| ContentError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ContentError::Parse {
        path: path.display().to_string(),
        source,
    })
}
