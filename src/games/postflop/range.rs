//! Weighted hand ranges and range notation.
//!
//! Grammar (comma separated, whitespace ignored):
//! - single type: `AA`, `AKs`, `T9o`
//! - open ended: `77+` (77 through AA), `ATs+` (ATs through AKs)
//! - closed: `22-99`, `AKs-ATs`, `AQo-AJo` (same high card)
//! - weight: `@<percent>` on any token, clamped to `[0, 100]`

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::card::{NUM_RANKS, RANK_A};
use super::hand::{Hand, HandType};

/// Default weight for tokens without `@`.
pub const FULL_WEIGHT: f64 = 100.0;

/// Errors produced while parsing range notation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RangeParseError {
    /// Character that is not a rank.
    #[error("invalid rank character {0:?}")]
    InvalidRank(char),
    /// Suffix other than `s` or `o`.
    #[error("invalid suitedness suffix {0:?}")]
    InvalidSuffix(char),
    /// Text that is not a hand type.
    #[error("invalid hand type {0:?}")]
    InvalidHandType(String),
    /// Range endpoints that do not describe a span.
    #[error("mismatched range endpoints in {0:?}")]
    MismatchedRange(String),
    /// Weight that is not a finite number.
    #[error("invalid weight in {0:?}")]
    InvalidWeight(String),
}

/// Ready-made ranges for a single-raised pot.
pub mod defaults {
    /// Under-the-gun opening range.
    pub const UTG_OPEN: &str = "77+, ATs+, KQs, AJo+, KQo";
    /// Wider under-the-gun opening range.
    pub const UTG_OPEN_WIDE: &str = "66+, A9s+, KTs+, QTs+, JTs, T9s, ATo+, KJo+";
    /// Button flatting range against an under-the-gun open.
    pub const BTN_CALL_VS_UTG: &str = "66-TT, ATs-AQs, KQs, KJs, QJs, JTs, T9s, 98s, 87s, 76s, AQo";
    /// Button 3-betting range against an under-the-gun open.
    pub const BTN_3BET_VS_UTG: &str = "QQ+, AKs, AKo";
}

/// Mapping from hand type to weight in `(0, 100]`.
///
/// Zero weights are never stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Range {
    weights: BTreeMap<HandType, f64>,
}

impl Range {
    /// Create an empty range.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse range notation, collecting rejected tokens.
    ///
    /// Every token that parses is added; the others are returned as errors.
    /// Later tokens overwrite the weight of earlier ones.
    pub fn parse(text: &str) -> (Range, Vec<RangeParseError>) {
        let mut range = Range::new();
        let errors = range.add_notation(text);
        (range, errors)
    }

    /// Parse range notation, dropping bad tokens silently.
    pub fn lenient(text: &str) -> Range {
        Self::parse(text).0
    }

    /// Parse range notation, failing on the first bad token.
    pub fn from_notation(text: &str) -> Result<Range, RangeParseError> {
        let (range, mut errors) = Self::parse(text);
        if errors.is_empty() {
            Ok(range)
        } else {
            Err(errors.remove(0))
        }
    }

    /// Add every token of `text` to this range.
    ///
    /// # Returns
    /// The errors of the tokens that were skipped.
    pub fn add_notation(&mut self, text: &str) -> Vec<RangeParseError> {
        let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        let mut errors = Vec::new();
        for token in cleaned.split(',').filter(|t| !t.is_empty()) {
            match parse_token(token) {
                Ok((types, weight)) => {
                    for ht in types {
                        self.add_hand_type(ht, weight);
                    }
                }
                Err(e) => errors.push(e),
            }
        }
        errors
    }

    /// Set a hand type's weight, clamped to `[0, 100]`. Zero removes it.
    pub fn add_hand_type(&mut self, hand_type: HandType, weight: f64) {
        self.set_weight(hand_type, weight);
    }

    /// Remove a hand type.
    pub fn remove_hand_type(&mut self, hand_type: &HandType) {
        self.weights.remove(hand_type);
    }

    /// Set a hand type's weight. Non-positive weights remove the entry.
    pub fn set_weight(&mut self, hand_type: HandType, weight: f64) {
        if weight > 0.0 {
            self.weights.insert(hand_type, weight.min(FULL_WEIGHT));
        } else {
            self.weights.remove(&hand_type);
        }
    }

    /// Weight of a hand type, 0 if absent.
    pub fn weight(&self, hand_type: &HandType) -> f64 {
        self.weights.get(hand_type).copied().unwrap_or(0.0)
    }

    /// Weight of the type a concrete hand belongs to.
    pub fn weight_of_hand(&self, hand: &Hand) -> f64 {
        self.weight(&hand.hand_type())
    }

    /// Check if a hand type is in the range.
    pub fn contains(&self, hand_type: &HandType) -> bool {
        self.weights.contains_key(hand_type)
    }

    /// Remove every hand type.
    pub fn clear(&mut self) {
        self.weights.clear();
    }

    /// Number of hand types.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Check if range is empty.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Hand types with their weights, in hand type order.
    pub fn iter(&self) -> impl Iterator<Item = (&HandType, f64)> {
        self.weights.iter().map(|(ht, &w)| (ht, w))
    }

    /// Hand types in the range.
    pub fn hand_types(&self) -> impl Iterator<Item = &HandType> {
        self.weights.keys()
    }

    /// Weighted number of concrete combinations.
    pub fn total_combos(&self) -> f64 {
        self.iter()
            .map(|(ht, w)| ht.combos() as f64 * w / FULL_WEIGHT)
            .sum()
    }

    /// Every concrete hand with its weight.
    pub fn weighted_hands(&self) -> Vec<(Hand, f64)> {
        self.available_hands(0)
    }

    /// Concrete hands that share no card with the `dead` bitmask.
    pub fn available_hands(&self, dead: u64) -> Vec<(Hand, f64)> {
        let mut hands = Vec::new();
        for (ht, w) in self.iter() {
            hands.extend(
                ht.expand()
                    .into_iter()
                    .filter(|h| !h.conflicts(dead))
                    .map(|h| (h, w)),
            );
        }
        hands
    }

    /// Weights laid out on the 13x13 grid.
    pub fn grid_weights(&self) -> [[f64; 13]; 13] {
        let mut grid = [[0.0; 13]; 13];
        for (ht, w) in self.iter() {
            let (row, col) = ht.grid_position();
            grid[row][col] = w;
        }
        grid
    }
}

/// Expand one token into hand types and a weight.
fn parse_token(token: &str) -> Result<(Vec<HandType>, f64), RangeParseError> {
    let (hands, weight) = match token.split_once('@') {
        Some((hands, w)) => {
            let weight: f64 = w
                .parse()
                .ok()
                .filter(|w: &f64| w.is_finite())
                .ok_or_else(|| RangeParseError::InvalidWeight(token.to_string()))?;
            (hands, weight.clamp(0.0, FULL_WEIGHT))
        }
        None => (token, FULL_WEIGHT),
    };

    let types = if let Some((start, end)) = hands.split_once('-') {
        let start: HandType = start.parse()?;
        let end: HandType = end.parse()?;
        expand_span(start, end).ok_or_else(|| RangeParseError::MismatchedRange(token.to_string()))?
    } else if let Some(base) = hands.strip_suffix('+') {
        let base: HandType = base.parse()?;
        if base.is_pair() {
            (base.high()..=RANK_A).map(HandType::pair).collect()
        } else {
            (base.low()..base.high())
                .map(|low| HandType::new(base.high(), low, base.is_suited()))
                .collect()
        }
    } else {
        vec![hands.parse::<HandType>()?]
    };

    Ok((types, weight))
}

/// Types between two endpoints, inclusive, or `None` if they do not line up.
fn expand_span(start: HandType, end: HandType) -> Option<Vec<HandType>> {
    if start.is_pair() && end.is_pair() {
        let (lo, hi) = min_max(start.high(), end.high());
        return Some((lo..=hi).map(HandType::pair).collect());
    }
    if start.is_pair() || end.is_pair() {
        return None;
    }
    if start.is_suited() != end.is_suited() || start.high() != end.high() {
        return None;
    }
    let (lo, hi) = min_max(start.low(), end.low());
    debug_assert!(hi < NUM_RANKS);
    Some(
        (lo..=hi)
            .map(|low| HandType::new(start.high(), low, start.is_suited()))
            .collect(),
    )
}

fn min_max(a: u8, b: u8) -> (u8, u8) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl FromStr for Range {
    type Err = RangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_notation(s)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (ht, w)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", ht)?;
            if w < FULL_WEIGHT {
                write!(f, "@{}", w)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::postflop::card::Board;

    fn ht(s: &str) -> HandType {
        s.parse().unwrap()
    }

    #[test]
    fn test_single_types() {
        let range = Range::from_notation("AA, AKs, AKo").unwrap();
        assert_eq!(range.len(), 3);
        assert_eq!(range.total_combos(), 22.0);
        assert_eq!(Range::lenient("AA").weighted_hands().len(), 6);
        assert_eq!(Range::lenient("AKs").weighted_hands().len(), 4);
        assert_eq!(Range::lenient("AKo").weighted_hands().len(), 12);
    }

    #[test]
    fn test_pair_ranges() {
        let range = Range::from_notation("22-99").unwrap();
        assert_eq!(range.len(), 8);
        assert!(range.contains(&ht("22")));
        assert!(range.contains(&ht("99")));
        assert!(!range.contains(&ht("TT")));

        let reversed = Range::from_notation("99-22").unwrap();
        assert_eq!(range, reversed);

        let plus = Range::from_notation("77+").unwrap();
        assert_eq!(plus.len(), 8);
        assert!(plus.contains(&ht("AA")));
    }

    #[test]
    fn test_non_pair_ranges() {
        let suited = Range::from_notation("AKs-ATs").unwrap();
        let names: Vec<String> = suited.hand_types().map(|h| h.name()).collect();
        assert_eq!(names.len(), 4);
        for name in ["ATs", "AJs", "AQs", "AKs"] {
            assert!(names.contains(&name.to_string()));
        }

        let offsuit = Range::from_notation("AQo-AJo").unwrap();
        assert_eq!(offsuit.len(), 2);
        assert_eq!(offsuit.total_combos(), 24.0);

        let plus = Range::from_notation("ATs+").unwrap();
        assert_eq!(plus, suited);
        assert_eq!(Range::from_notation("KQs+").unwrap().len(), 1);
    }

    #[test]
    fn test_weights() {
        let range = Range::from_notation("AKs@50").unwrap();
        assert_eq!(range.total_combos(), 2.0);
        assert_eq!(range.weight(&ht("AKs")), 50.0);

        let clamped = Range::lenient("QQ@250, JJ@-5");
        assert_eq!(clamped.weight(&ht("QQ")), 100.0);
        assert!(!clamped.contains(&ht("JJ")));

        let hand: Hand = "AsKs".parse().unwrap();
        assert_eq!(range.weight_of_hand(&hand), 50.0);
    }

    #[test]
    fn test_rejected_tokens() {
        let (range, errors) = Range::parse("AA, XYs, AKs-QJs, 77-AKs, KQo@abc, JJ");
        assert_eq!(range.len(), 2);
        assert_eq!(errors.len(), 4);
        assert!(matches!(errors[0], RangeParseError::InvalidRank('X')));
        assert!(matches!(errors[1], RangeParseError::MismatchedRange(_)));
        assert!(matches!(errors[2], RangeParseError::MismatchedRange(_)));
        assert!(matches!(errors[3], RangeParseError::InvalidWeight(_)));

        assert!(Range::from_notation("AA, AKx").is_err());
        assert!("22-".parse::<Range>().is_err());
        assert!(Range::from_notation(" , ,").unwrap().is_empty());
    }

    #[test]
    fn test_zero_weight_never_stored() {
        let mut range = Range::lenient("AA@0, KK");
        assert_eq!(range.len(), 1);
        range.set_weight(ht("KK"), 0.0);
        assert!(range.is_empty());

        range.add_hand_type(ht("T9s"), 30.0);
        range.remove_hand_type(&ht("T9s"));
        assert!(range.is_empty());
    }

    #[test]
    fn test_available_hands_exclude_dead_cards() {
        let range = Range::lenient("AA, KQs");
        let board: Board = "As7d2c".parse().unwrap();
        let hands = range.available_hands(board.mask());
        // three aces left -> 3 pair combos, plus 4 KQs
        assert_eq!(hands.len(), 7);
        assert!(hands.iter().all(|(h, _)| !h.conflicts(board.mask())));
    }

    #[test]
    fn test_display_and_grid() {
        let range = Range::lenient("AA, AKs@50");
        assert_eq!(range.to_string(), "AKs@50, AA");
        assert_eq!(Range::from_notation(&range.to_string()).unwrap(), range);

        let grid = range.grid_weights();
        assert_eq!(grid[0][0], 100.0);
        assert_eq!(grid[0][1], 50.0);
        assert_eq!(grid[1][0], 0.0);
    }

    #[test]
    fn test_default_ranges_parse() {
        for text in [
            defaults::UTG_OPEN,
            defaults::UTG_OPEN_WIDE,
            defaults::BTN_CALL_VS_UTG,
            defaults::BTN_3BET_VS_UTG,
        ] {
            let range = Range::from_notation(text).unwrap();
            assert!(range.total_combos() > 0.0);
        }
        let utg = Range::from_notation(defaults::UTG_OPEN).unwrap();
        // 77-AA, ATs-AKs, KQs, AJo-AKo, KQo
        assert_eq!(utg.total_combos(), 48.0 + 16.0 + 4.0 + 36.0 + 12.0);
    }
}
