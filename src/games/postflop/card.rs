//! Card representation for postflop poker.
//!
//! This module provides the fundamental card types used throughout the solver:
//! - `Card`: A single playing card, encoded as `suit * 13 + rank`
//! - `Board`: Community cards (up to 5), stored inline
//! - `Street`: Flop, turn or river

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Rank of a card (0-12: 2-A).
pub const RANK_2: u8 = 0;
pub const RANK_3: u8 = 1;
pub const RANK_4: u8 = 2;
pub const RANK_5: u8 = 3;
pub const RANK_6: u8 = 4;
pub const RANK_7: u8 = 5;
pub const RANK_8: u8 = 6;
pub const RANK_9: u8 = 7;
pub const RANK_T: u8 = 8;
pub const RANK_J: u8 = 9;
pub const RANK_Q: u8 = 10;
pub const RANK_K: u8 = 11;
pub const RANK_A: u8 = 12;

/// Suit of a card (0-3).
pub const SUIT_CLUBS: u8 = 0;
pub const SUIT_DIAMONDS: u8 = 1;
pub const SUIT_HEARTS: u8 = 2;
pub const SUIT_SPADES: u8 = 3;

/// Number of ranks.
pub const NUM_RANKS: u8 = 13;
/// Number of cards in the deck.
pub const NUM_CARDS: u8 = 52;

/// Rank characters for display.
pub const RANK_CHARS: [char; 13] = ['2', '3', '4', '5', '6', '7', '8', '9', 'T', 'J', 'Q', 'K', 'A'];

/// Suit characters for display.
pub const SUIT_CHARS: [char; 4] = ['c', 'd', 'h', 's'];

/// Errors raised when constructing cards, hands or boards.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CardError {
    /// Card index outside `0..52`.
    #[error("card index {0} is out of range 0..52")]
    InvalidIndex(u8),
    /// Text that does not name a card.
    #[error("invalid card text: {0:?}")]
    InvalidText(String),
    /// The same card appears twice.
    #[error("duplicate card {0}")]
    Duplicate(Card),
    /// More cards than the container allows.
    #[error("too many cards: {0}")]
    TooMany(usize),
}

/// Parse a rank character (case-insensitive).
pub fn parse_rank(c: char) -> Option<u8> {
    RANK_CHARS
        .iter()
        .position(|&r| r == c.to_ascii_uppercase())
        .map(|r| r as u8)
}

/// Parse a suit character (case-insensitive).
pub fn parse_suit(c: char) -> Option<u8> {
    SUIT_CHARS
        .iter()
        .position(|&s| s == c.to_ascii_lowercase())
        .map(|s| s as u8)
}

/// A single playing card.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Card(u8);

impl Card {
    /// Create a card from rank (0-12) and suit (0-3).
    #[inline]
    pub fn new(rank: u8, suit: u8) -> Self {
        debug_assert!(rank < NUM_RANKS, "rank must be 0-12");
        debug_assert!(suit < 4, "suit must be 0-3");
        Self(suit * NUM_RANKS + rank)
    }

    /// Create a card from its index (0-51).
    pub fn from_index(index: u8) -> Result<Self, CardError> {
        if index < NUM_CARDS {
            Ok(Self(index))
        } else {
            Err(CardError::InvalidIndex(index))
        }
    }

    /// All 52 cards in index order.
    pub fn all() -> impl Iterator<Item = Card> {
        (0..NUM_CARDS).map(Card)
    }

    /// Card index (0-51).
    #[inline]
    pub fn index(self) -> u8 {
        self.0
    }

    /// Rank (0-12: 2-A).
    #[inline]
    pub fn rank(self) -> u8 {
        self.0 % NUM_RANKS
    }

    /// Suit (0-3).
    #[inline]
    pub fn suit(self) -> u8 {
        self.0 / NUM_RANKS
    }

    /// Single-bit mask of this card.
    #[inline]
    pub fn mask(self) -> u64 {
        1u64 << self.0
    }

    /// Rank character for display.
    pub fn rank_char(self) -> char {
        RANK_CHARS[self.rank() as usize]
    }

    /// Suit character for display.
    pub fn suit_char(self) -> char {
        SUIT_CHARS[self.suit() as usize]
    }
}

impl FromStr for Card {
    type Err = CardError;

    /// Parse a card from text like "As", "kh", "2c".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        let (Some(r), Some(su), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(CardError::InvalidText(s.to_string()));
        };
        match (parse_rank(r), parse_suit(su)) {
            (Some(rank), Some(suit)) => Ok(Card::new(rank, suit)),
            _ => Err(CardError::InvalidText(s.to_string())),
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank_char(), self.suit_char())
    }
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// Parse a run of cards such as "AsKd7c" or "As Kd 7c".
///
/// Duplicates are rejected.
pub fn parse_cards(s: &str) -> Result<Vec<Card>, CardError> {
    let compact: Vec<char> = s.chars().filter(|c| !c.is_whitespace() && *c != ',').collect();
    if compact.len() % 2 != 0 {
        return Err(CardError::InvalidText(s.to_string()));
    }

    let mut cards = Vec::with_capacity(compact.len() / 2);
    let mut seen = 0u64;
    for pair in compact.chunks(2) {
        let text: String = pair.iter().collect();
        let card: Card = text.parse()?;
        if seen & card.mask() != 0 {
            return Err(CardError::Duplicate(card));
        }
        seen |= card.mask();
        cards.push(card);
    }
    Ok(cards)
}

/// Betting street.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Street {
    /// Three board cards.
    Flop,
    /// Four board cards.
    Turn,
    /// Five board cards.
    River,
}

impl Street {
    /// Street for a board of `len` cards, if any.
    pub fn from_board_len(len: usize) -> Option<Street> {
        match len {
            3 => Some(Street::Flop),
            4 => Some(Street::Turn),
            5 => Some(Street::River),
            _ => None,
        }
    }

    /// Get the next street.
    pub fn next(self) -> Option<Street> {
        match self {
            Street::Flop => Some(Street::Turn),
            Street::Turn => Some(Street::River),
            Street::River => None,
        }
    }

    /// Index 0-2.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Street {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Street::Flop => write!(f, "Flop"),
            Street::Turn => write!(f, "Turn"),
            Street::River => write!(f, "River"),
        }
    }
}

/// Community cards, stored inline so that states copy cheaply.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board {
    cards: [Card; 5],
    len: u8,
}

impl Board {
    /// Maximum number of board cards.
    pub const MAX: usize = 5;

    /// Create an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a board from distinct cards.
    pub fn from_cards(cards: &[Card]) -> Result<Self, CardError> {
        let mut board = Self::new();
        for &card in cards {
            board.push(card)?;
        }
        Ok(board)
    }

    /// Add a card, rejecting duplicates and overflow.
    pub fn push(&mut self, card: Card) -> Result<(), CardError> {
        if self.len() >= Self::MAX {
            return Err(CardError::TooMany(self.len() + 1));
        }
        if self.contains(card) {
            return Err(CardError::Duplicate(card));
        }
        self.cards[self.len as usize] = card;
        self.len += 1;
        Ok(())
    }

    /// Number of cards on the board.
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Check if board is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Board cards in deal order.
    pub fn cards(&self) -> &[Card] {
        &self.cards[..self.len as usize]
    }

    /// Check if a card is on the board.
    pub fn contains(&self, card: Card) -> bool {
        self.cards().contains(&card)
    }

    /// Bitmask of board cards.
    pub fn mask(&self) -> u64 {
        self.cards().iter().fold(0, |m, c| m | c.mask())
    }

    /// Street implied by the board size.
    pub fn street(&self) -> Option<Street> {
        Street::from_board_len(self.len())
    }
}

impl FromStr for Board {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_cards(&parse_cards(s)?)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for card in self.cards() {
            write!(f, "{}", card)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self)
    }
}
