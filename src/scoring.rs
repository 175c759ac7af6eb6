//! Decision scoring: maps a user's chosen action against a scenario's ideal
//! decision to a 0/25/100 score.
//!
//! The scorer is a pure, total function over its input domain. Malformed
//! scenario data is rejected when the catalog loads ([`crate::content`]),
//! never here.
//!
//! ## Scoring policy
//!
//! | Case | Score |
//! |------|-------|
//! | Action differs from ideal | 0 |
//! | Ideal is FOLD or CHECK, action matches | 100 |
//! | Action matches, ideal carries no sizing | 100 |
//! | Sized ideal: both ALL-IN | 100 |
//! | Sized ideal: chip amounts equal | 100 |
//! | Sized ideal: any other shape | 25 |
//!
//! Exact equality is required for full credit. Every sizing mismatch within
//! the correct action family scores 25, never 0 — "right idea, wrong size"
//! always beats "wrong idea". The 25 bucket is deliberately flat; partial
//! credit does not scale with how close the size was.

use std::fmt;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Full credit: the decision matches the ideal exactly.
pub const SCORE_CORRECT: u32 = 100;

/// Partial credit: correct action family, wrong sizing.
pub const SCORE_PARTIAL: u32 = 25;

/// No credit: wrong action family, regardless of sizing.
pub const SCORE_INCORRECT: u32 = 0;

/// Coarse action tag, ignoring sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionFamily {
    Fold,
    Check,
    Call,
    Bet,
    Raise,
}

impl ActionFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionFamily::Fold => "FOLD",
            ActionFamily::Check => "CHECK",
            ActionFamily::Call => "CALL",
            ActionFamily::Bet => "BET",
            ActionFamily::Raise => "RAISE",
        }
    }

    /// FOLD and CHECK carry no size; sizing comparison never applies to them.
    pub fn is_sizeless(&self) -> bool {
        matches!(self, ActionFamily::Fold | ActionFamily::Check)
    }
}

impl fmt::Display for ActionFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sizing attached to a sized action: a chip amount or a shove.
///
/// In catalog JSON this is either a number or the literal string `"ALL-IN"`;
/// any other string fails deserialization, so bad sizings are caught when
/// the catalog loads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecisionValue {
    Chips(f64),
    AllIn,
}

const ALL_IN: &str = "ALL-IN";

impl fmt::Display for DecisionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionValue::Chips(n) => write!(f, "{}", n),
            DecisionValue::AllIn => f.write_str(ALL_IN),
        }
    }
}

impl Serialize for DecisionValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DecisionValue::Chips(n) => serializer.serialize_f64(*n),
            DecisionValue::AllIn => serializer.serialize_str(ALL_IN),
        }
    }
}

impl<'de> Deserialize<'de> for DecisionValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(f64),
            Text(String),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Num(n) => Ok(DecisionValue::Chips(n)),
            Raw::Text(s) if s == ALL_IN => Ok(DecisionValue::AllIn),
            Raw::Text(s) => Err(D::Error::custom(format!(
                "invalid decision value {:?} (expected a number or \"ALL-IN\")",
                s
            ))),
        }
    }
}

/// Score a user's decision against the scenario's ideal decision.
///
/// Total over its domain: every (action, value) combination maps to one of
/// [`SCORE_CORRECT`], [`SCORE_PARTIAL`], [`SCORE_INCORRECT`].
#[allow(clippy::float_cmp)] // sizes match exactly or not at all; no tolerance
pub fn score_decision(
    ideal_action: ActionFamily,
    ideal_value: Option<DecisionValue>,
    user_action: ActionFamily,
    user_value: Option<DecisionValue>,
) -> u32 {
    if user_action != ideal_action {
        return SCORE_INCORRECT;
    }
    if ideal_action.is_sizeless() {
        return SCORE_CORRECT;
    }
    let Some(ideal_value) = ideal_value else {
        // Action matched and the ideal names no specific sizing (a plain CALL,
        // or a RAISE where any size is accepted).
        return SCORE_CORRECT;
    };
    match (ideal_value, user_value) {
        (DecisionValue::AllIn, Some(DecisionValue::AllIn)) => SCORE_CORRECT,
        (DecisionValue::Chips(ideal), Some(DecisionValue::Chips(user))) if user == ideal => {
            SCORE_CORRECT
        }
        // Unequal chips, ALL-IN vs chips (either direction), or a missing
        // user sizing: one flat partial-credit bucket.
        _ => SCORE_PARTIAL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_vs_fold_is_correct() {
        assert_eq!(
            score_decision(ActionFamily::Fold, None, ActionFamily::Fold, None),
            100
        );
    }

    #[test]
    fn matching_raise_with_equal_size_is_correct() {
        assert_eq!(
            score_decision(
                ActionFamily::Raise,
                Some(DecisionValue::Chips(20.0)),
                ActionFamily::Raise,
                Some(DecisionValue::Chips(20.0)),
            ),
            100
        );
    }

    #[test]
    fn matching_raise_with_wrong_size_is_partial() {
        assert_eq!(
            score_decision(
                ActionFamily::Raise,
                Some(DecisionValue::Chips(20.0)),
                ActionFamily::Raise,
                Some(DecisionValue::Chips(40.0)),
            ),
            25
        );
    }

    #[test]
    fn all_in_matches_all_in() {
        assert_eq!(
            score_decision(
                ActionFamily::Raise,
                Some(DecisionValue::AllIn),
                ActionFamily::Raise,
                Some(DecisionValue::AllIn),
            ),
            100
        );
    }

    #[test]
    fn all_in_vs_chips_is_partial() {
        assert_eq!(
            score_decision(
                ActionFamily::Raise,
                Some(DecisionValue::AllIn),
                ActionFamily::Raise,
                Some(DecisionValue::Chips(200.0)),
            ),
            25
        );
        assert_eq!(
            score_decision(
                ActionFamily::Raise,
                Some(DecisionValue::Chips(200.0)),
                ActionFamily::Raise,
                Some(DecisionValue::AllIn),
            ),
            25
        );
    }

    #[test]
    fn missing_user_size_against_sized_ideal_is_partial() {
        assert_eq!(
            score_decision(
                ActionFamily::Bet,
                Some(DecisionValue::Chips(50.0)),
                ActionFamily::Bet,
                None,
            ),
            25
        );
    }

    #[test]
    fn wrong_action_is_zero_regardless_of_value() {
        assert_eq!(
            score_decision(ActionFamily::Call, None, ActionFamily::Fold, None),
            0
        );
        assert_eq!(
            score_decision(
                ActionFamily::Raise,
                Some(DecisionValue::Chips(20.0)),
                ActionFamily::Call,
                Some(DecisionValue::Chips(20.0)),
            ),
            0
        );
    }

    #[test]
    fn unsized_call_accepts_plain_call() {
        assert_eq!(
            score_decision(ActionFamily::Call, None, ActionFamily::Call, None),
            100
        );
    }

    #[test]
    fn sizeless_ideal_ignores_user_value() {
        // A stray value on a CHECK still scores full credit once the action matches.
        assert_eq!(
            score_decision(
                ActionFamily::Check,
                None,
                ActionFamily::Check,
                Some(DecisionValue::Chips(10.0)),
            ),
            100
        );
    }

    #[test]
    fn decision_value_serde_accepts_number_or_all_in() {
        let v: DecisionValue = serde_json::from_str("20").unwrap();
        assert_eq!(v, DecisionValue::Chips(20.0));
        let v: DecisionValue = serde_json::from_str("\"ALL-IN\"").unwrap();
        assert_eq!(v, DecisionValue::AllIn);
        assert!(serde_json::from_str::<DecisionValue>("\"POT\"").is_err());

        assert_eq!(serde_json::to_string(&DecisionValue::AllIn).unwrap(), "\"ALL-IN\"");
        assert_eq!(serde_json::to_string(&DecisionValue::Chips(40.0)).unwrap(), "40.0");
    }
}
