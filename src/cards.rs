//! Card parsing and rendering for scenario content.
//!
//! Scenario definitions spell cards as rank+suit strings: `"As"` (ace of
//! spades), `"Kh"`, `"10d"`. The shorthand rank `T` is accepted on input and
//! normalized to `10`. A player hand is two space-separated cards
//! (`"As Kh"`); a board is a list of 0-5 card strings.
//!
//! Parsing happens once, at catalog load time. Anything that reaches the
//! scorer or the feedback prompt builder is already known-valid.

use thiserror::Error;

/// Ranks in canonical spelling. `T` is not canonical; it normalizes to `10`.
const VALID_RANKS: [&str; 13] = [
    "2", "3", "4", "5", "6", "7", "8", "9", "10", "J", "Q", "K", "A",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CardError {
    #[error("invalid card string {0:?} (expected rank+suit, e.g. \"As\" or \"10d\")")]
    Malformed(String),
    #[error("invalid rank in card string {0:?}")]
    InvalidRank(String),
    #[error("invalid suit in card string {0:?}")]
    InvalidSuit(String),
}

/// A parsed card: canonical rank spelling plus suit letter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    /// `"2"`-`"10"`, `"J"`, `"Q"`, `"K"`, `"A"`.
    pub rank: String,
    /// `'s'`, `'h'`, `'d'`, `'c'`.
    pub suit: char,
}

impl Card {
    /// Parse a single card string. Accepts `T` as an alias for `10`.
    pub fn parse(s: &str) -> Result<Card, CardError> {
        let s = s.trim();
        if !s.is_ascii() || s.len() < 2 || s.len() > 3 {
            return Err(CardError::Malformed(s.to_string()));
        }

        let (rank_part, suit_part) = s.split_at(s.len() - 1);
        let suit = suit_part
            .chars()
            .next()
            .map(|c| c.to_ascii_lowercase())
            .filter(|c| matches!(c, 's' | 'h' | 'd' | 'c'))
            .ok_or_else(|| CardError::InvalidSuit(s.to_string()))?;

        let mut rank = rank_part.to_ascii_uppercase();
        if rank == "T" {
            rank = "10".to_string();
        }
        if !VALID_RANKS.contains(&rank.as_str()) {
            return Err(CardError::InvalidRank(s.to_string()));
        }

        Ok(Card { rank, suit })
    }

    /// Suit glyph for display: `♠`, `♥`, `♦`, `♣`.
    pub fn suit_symbol(&self) -> char {
        match self.suit {
            's' => '♠',
            'h' => '♥',
            'd' => '♦',
            _ => '♣',
        }
    }

    /// Display form, e.g. `A♠` or `10♦`.
    pub fn to_display(&self) -> String {
        format!("{}{}", self.rank, self.suit_symbol())
    }
}

/// Parse a space-separated hand string (`"As Kh"`) into cards.
pub fn parse_hand(hand: &str) -> Result<Vec<Card>, CardError> {
    hand.split_whitespace().map(Card::parse).collect()
}

/// Parse a list of board card strings.
pub fn parse_board(board: &[String]) -> Result<Vec<Card>, CardError> {
    board.iter().map(|s| Card::parse(s)).collect()
}

/// Display form for a list of cards, e.g. `A♦ Q♦ J♦`.
pub fn display_cards(cards: &[Card]) -> String {
    cards
        .iter()
        .map(Card::to_display)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_cards() {
        assert_eq!(
            Card::parse("As").unwrap(),
            Card {
                rank: "A".into(),
                suit: 's'
            }
        );
        assert_eq!(Card::parse("kh").unwrap().rank, "K");
        assert_eq!(Card::parse("2c").unwrap().suit, 'c');
    }

    #[test]
    fn normalizes_ten() {
        assert_eq!(Card::parse("Td").unwrap().rank, "10");
        assert_eq!(Card::parse("10d").unwrap().rank, "10");
    }

    #[test]
    fn rejects_malformed() {
        assert_eq!(Card::parse("A"), Err(CardError::Malformed("A".into())));
        assert_eq!(
            Card::parse("1s"),
            Err(CardError::InvalidRank("1s".into()))
        );
        assert_eq!(
            Card::parse("Ax"),
            Err(CardError::InvalidSuit("Ax".into()))
        );
        assert!(Card::parse("10ds").is_err());
        // Display form is not an input form.
        assert!(Card::parse("A♠").is_err());
    }

    #[test]
    fn hand_and_board_roundtrip_to_display() {
        let hand = parse_hand("As Kh").unwrap();
        assert_eq!(display_cards(&hand), "A♠ K♥");

        let board = parse_board(&["Ad".into(), "Qd".into(), "Jd".into()]).unwrap();
        assert_eq!(display_cards(&board), "A♦ Q♦ J♦");
    }
}
