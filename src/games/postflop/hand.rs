//! Two-card hands and hand types.
//!
//! - `Hand`: a concrete pair of distinct hole cards, normalized so the higher
//!   rank (then higher suit) comes first
//! - `HandType`: the 169 strategic classes ("AKs", "QQ", "T9o")

use std::fmt;
use std::str::FromStr;

use super::card::{parse_rank, Card, CardError, NUM_RANKS, RANK_CHARS};
use super::range::RangeParseError;

/// A player's two hole cards.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hand {
    high: Card,
    low: Card,
}

impl Hand {
    /// Create a hand, ordering the cards by rank then suit (higher first).
    pub fn new(a: Card, b: Card) -> Result<Self, CardError> {
        if a == b {
            return Err(CardError::Duplicate(a));
        }
        let a_first = (a.rank(), a.suit()) > (b.rank(), b.suit());
        Ok(if a_first {
            Self { high: a, low: b }
        } else {
            Self { high: b, low: a }
        })
    }

    /// The higher card.
    pub fn high(&self) -> Card {
        self.high
    }

    /// The lower card.
    pub fn low(&self) -> Card {
        self.low
    }

    /// Both cards, higher first.
    pub fn cards(&self) -> [Card; 2] {
        [self.high, self.low]
    }

    /// Check if hole cards are a pair.
    pub fn is_pair(&self) -> bool {
        self.high.rank() == self.low.rank()
    }

    /// Check if hole cards are suited.
    pub fn is_suited(&self) -> bool {
        self.high.suit() == self.low.suit()
    }

    /// Ranks one apart (e.g. "T9").
    pub fn is_connector(&self) -> bool {
        self.gap_size() == Some(0)
    }

    /// Number of ranks strictly between the two cards; `None` for pairs.
    pub fn gap_size(&self) -> Option<u8> {
        (self.high.rank() - self.low.rank()).checked_sub(1)
    }

    /// The hand type this hand belongs to.
    pub fn hand_type(&self) -> HandType {
        HandType::new(self.high.rank(), self.low.rank(), self.is_suited())
    }

    /// Canonical name such as "AKs", "QQ" or "T9o".
    pub fn canonical_name(&self) -> String {
        self.hand_type().name()
    }

    /// Check if a card is one of the hole cards.
    pub fn contains(&self, card: Card) -> bool {
        self.high == card || self.low == card
    }

    /// Bitmask of both cards.
    pub fn mask(&self) -> u64 {
        self.high.mask() | self.low.mask()
    }

    /// Whether the hand shares a card with `dead`.
    pub fn conflicts(&self, dead: u64) -> bool {
        self.mask() & dead != 0
    }
}

impl FromStr for Hand {
    type Err = CardError;

    /// Parse hole cards from text like "AhKs" or "Ah Ks".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cards = super::card::parse_cards(s)?;
        match cards.as_slice() {
            [a, b] => Hand::new(*a, *b),
            _ => Err(CardError::InvalidText(s.to_string())),
        }
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.high, self.low)
    }
}

impl fmt::Debug for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// One of the 169 hand classes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandType {
    high: u8,
    low: u8,
    suited: bool,
}

impl HandType {
    /// Number of hand types.
    pub const COUNT: usize = 169;

    /// Create a hand type. Ranks may come in either order; pairs are never suited.
    pub fn new(rank1: u8, rank2: u8, suited: bool) -> Self {
        debug_assert!(rank1 < NUM_RANKS && rank2 < NUM_RANKS);
        let (high, low) = if rank1 >= rank2 { (rank1, rank2) } else { (rank2, rank1) };
        Self {
            high,
            low,
            suited: suited && high != low,
        }
    }

    /// Pocket pair of `rank`.
    pub fn pair(rank: u8) -> Self {
        Self::new(rank, rank, false)
    }

    /// Higher rank.
    pub fn high(&self) -> u8 {
        self.high
    }

    /// Lower rank.
    pub fn low(&self) -> u8 {
        self.low
    }

    /// Whether the type is suited.
    pub fn is_suited(&self) -> bool {
        self.suited
    }

    /// Whether the type is a pocket pair.
    pub fn is_pair(&self) -> bool {
        self.high == self.low
    }

    /// Concrete combinations: 6 for pairs, 4 suited, 12 offsuit.
    pub fn combos(&self) -> u32 {
        if self.is_pair() {
            6
        } else if self.suited {
            4
        } else {
            12
        }
    }

    /// Canonical name such as "AKs", "QQ" or "T9o".
    pub fn name(&self) -> String {
        let h = RANK_CHARS[self.high as usize];
        let l = RANK_CHARS[self.low as usize];
        if self.is_pair() {
            format!("{}{}", h, l)
        } else if self.suited {
            format!("{}{}s", h, l)
        } else {
            format!("{}{}o", h, l)
        }
    }

    /// Position in the 13x13 grid, `(row, col)`.
    ///
    /// Aces are in row/column 0. Pairs sit on the diagonal, suited types
    /// above it and offsuit types below it.
    pub fn grid_position(&self) -> (usize, usize) {
        let hi = (12 - self.high) as usize;
        let lo = (12 - self.low) as usize;
        if self.is_pair() {
            (hi, hi)
        } else if self.suited {
            (hi, lo)
        } else {
            (lo, hi)
        }
    }

    /// Hand type at a grid cell. Returns `None` outside the grid.
    pub fn from_grid(row: usize, col: usize) -> Option<Self> {
        if row > 12 || col > 12 {
            return None;
        }
        let r = 12 - row as u8;
        let c = 12 - col as u8;
        Some(match row.cmp(&col) {
            std::cmp::Ordering::Equal => Self::pair(r),
            std::cmp::Ordering::Less => Self::new(r, c, true),
            std::cmp::Ordering::Greater => Self::new(r, c, false),
        })
    }

    /// Dense index 0..169 (`row * 13 + col`).
    pub fn index(&self) -> u8 {
        let (row, col) = self.grid_position();
        (row * 13 + col) as u8
    }

    /// All 169 hand types in grid order.
    pub fn all() -> impl Iterator<Item = HandType> {
        (0..13).flat_map(|row| (0..13).filter_map(move |col| HandType::from_grid(row, col)))
    }

    /// Every concrete hand of this type.
    pub fn expand(&self) -> Vec<Hand> {
        let mut hands = Vec::with_capacity(self.combos() as usize);
        for s1 in 0..4u8 {
            for s2 in 0..4u8 {
                let keep = if self.is_pair() {
                    s1 < s2
                } else if self.suited {
                    s1 == s2
                } else {
                    s1 != s2
                };
                if keep {
                    let a = Card::new(self.high, s1);
                    let b = Card::new(self.low, s2);
                    if let Ok(hand) = Hand::new(a, b) {
                        hands.push(hand);
                    }
                }
            }
        }
        hands
    }
}

impl FromStr for HandType {
    type Err = RangeParseError;

    /// Parse "AA", "AKs", "t9o". A non-pair without suffix is offsuit.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().collect();
        let rank = |c: char| parse_rank(c).ok_or(RangeParseError::InvalidRank(c));
        let (r1, r2, suited) = match chars.as_slice() {
            [a, b] => (rank(*a)?, rank(*b)?, false),
            [a, b, suffix] => {
                let suited = match suffix {
                    's' | 'S' => true,
                    'o' | 'O' => false,
                    other => return Err(RangeParseError::InvalidSuffix(*other)),
                };
                (rank(*a)?, rank(*b)?, suited)
            }
            _ => return Err(RangeParseError::InvalidHandType(s.to_string())),
        };
        Ok(HandType::new(r1, r2, suited))
    }
}

impl fmt::Display for HandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl fmt::Debug for HandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::postflop::card::{RANK_2, RANK_9, RANK_A, RANK_K, RANK_Q, RANK_T};

    #[test]
    fn test_hand_normalization() {
        let hand: Hand = "KdAs".parse().unwrap();
        assert_eq!(hand.to_string(), "AsKd");

        let pair: Hand = "AcAs".parse().unwrap();
        assert_eq!(pair.to_string(), "AsAc");
        assert_eq!(pair, "AsAc".parse().unwrap());

        assert!("AsAs".parse::<Hand>().is_err());
        assert!("AsKd7c".parse::<Hand>().is_err());
    }

    #[test]
    fn test_hand_properties() {
        let t9: Hand = "Th9h".parse().unwrap();
        assert!(t9.is_suited());
        assert!(t9.is_connector());
        assert_eq!(t9.gap_size(), Some(0));
        assert_eq!(t9.canonical_name(), "T9s");

        let a2: Hand = "Ad2c".parse().unwrap();
        assert!(!a2.is_suited());
        assert_eq!(a2.gap_size(), Some(11));
        assert_eq!(a2.canonical_name(), "A2o");

        let qq: Hand = "QhQd".parse().unwrap();
        assert!(qq.is_pair());
        assert_eq!(qq.gap_size(), None);
        assert_eq!(qq.canonical_name(), "QQ");
    }

    #[test]
    fn test_hand_type_combos_and_expand() {
        let aa = HandType::pair(RANK_A);
        let aks = HandType::new(RANK_A, RANK_K, true);
        let ako = HandType::new(RANK_K, RANK_A, false);
        assert_eq!(aa.expand().len(), 6);
        assert_eq!(aks.expand().len(), 4);
        assert_eq!(ako.expand().len(), 12);
        for ht in [aa, aks, ako] {
            assert_eq!(ht.expand().len() as u32, ht.combos());
            assert!(ht.expand().iter().all(|h| h.hand_type() == ht));
        }
        assert_eq!(ako.name(), "AKo");
        assert!(!HandType::new(RANK_T, RANK_T, true).is_suited());
    }

    #[test]
    fn test_grid_positions() {
        assert_eq!(HandType::pair(RANK_A).grid_position(), (0, 0));
        assert_eq!(HandType::pair(RANK_2).grid_position(), (12, 12));
        assert_eq!(HandType::new(RANK_A, RANK_K, true).grid_position(), (0, 1));
        assert_eq!(HandType::new(RANK_A, RANK_K, false).grid_position(), (1, 0));
        assert_eq!(HandType::new(RANK_T, RANK_9, true).grid_position(), (4, 5));

        for row in 0..13 {
            for col in 0..13 {
                let ht = HandType::from_grid(row, col).unwrap();
                assert_eq!(ht.grid_position(), (row, col));
            }
        }
        assert!(HandType::from_grid(13, 0).is_none());
    }

    #[test]
    fn test_all_hand_types() {
        let all: Vec<HandType> = HandType::all().collect();
        assert_eq!(all.len(), HandType::COUNT);
        let combos: u32 = all.iter().map(|h| h.combos()).sum();
        assert_eq!(combos, 1326);

        let mut indices: Vec<u8> = all.iter().map(|h| h.index()).collect();
        indices.sort_unstable();
        indices.dedup();
        assert_eq!(indices.len(), HandType::COUNT);
    }

    #[test]
    fn test_hand_type_parsing() {
        assert_eq!("AKs".parse::<HandType>().unwrap(), HandType::new(RANK_A, RANK_K, true));
        assert_eq!("ka".parse::<HandType>().unwrap().name(), "AKo");
        assert_eq!("T9o".parse::<HandType>().unwrap().name(), "T9o");
        assert_eq!("QQ".parse::<HandType>().unwrap(), HandType::pair(RANK_Q));
        assert!(matches!("AKx".parse::<HandType>(), Err(RangeParseError::InvalidSuffix('x'))));
        assert!(matches!("ZZ".parse::<HandType>(), Err(RangeParseError::InvalidRank('Z'))));
        assert!(matches!("AKso".parse::<HandType>(), Err(RangeParseError::InvalidHandType(_))));
    }
}
