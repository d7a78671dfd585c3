//! Poker hand evaluation.
//!
//! This module ranks 5-7 card poker hands with precomputed lookup tables:
//! - a flush table and a unique-rank table, both indexed by the 13-bit rank
//!   mask of a hand with five distinct ranks
//! - a rank-count table for hands holding a pair, trips or quads, indexed by
//!   a collision-free hash of the grouped ranks
//!
//! Every hand maps to one of 7462 strength values. Each category occupies a
//! contiguous band above its floor, so a hand of a higher category always
//! beats one of a lower category.

use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

use super::card::{Board, Card, NUM_RANKS};
use super::hand::Hand;

/// High card floor.
pub const HIGH_CARD_FLOOR: u16 = 0;
/// One pair floor.
pub const ONE_PAIR_FLOOR: u16 = 1277;
/// Two pair floor.
pub const TWO_PAIR_FLOOR: u16 = 4137;
/// Three of a kind floor.
pub const THREE_OF_A_KIND_FLOOR: u16 = 4995;
/// Straight floor.
pub const STRAIGHT_FLOOR: u16 = 5853;
/// Flush floor.
pub const FLUSH_FLOOR: u16 = 5863;
/// Full house floor.
pub const FULL_HOUSE_FLOOR: u16 = 7140;
/// Four of a kind floor.
pub const FOUR_OF_A_KIND_FLOOR: u16 = 7296;
/// Straight flush floor.
pub const STRAIGHT_FLUSH_FLOOR: u16 = 7452;

/// Value of a royal flush, the best possible hand.
pub const ROYAL_FLUSH: u16 = 7461;

/// Number of distinct hand values.
pub const NUM_HAND_VALUES: usize = ROYAL_FLUSH as usize + 1;

const RANK_MASK_SIZE: usize = 1 << NUM_RANKS;
const WHEEL_MASK: u16 = 0b1_0000_0000_1111;

// Offsets of each group in the rank-count table.
const PAIR_OFFSET: usize = 0;
const TWO_PAIR_OFFSET: usize = PAIR_OFFSET + 13 * 13 * 13 * 13;
const TRIPS_OFFSET: usize = TWO_PAIR_OFFSET + 13 * 13 * 13;
const FULL_HOUSE_OFFSET: usize = TRIPS_OFFSET + 13 * 13 * 13;
const QUADS_OFFSET: usize = FULL_HOUSE_OFFSET + 13 * 13;
const RANK_COUNT_SIZE: usize = QUADS_OFFSET + 13 * 13;

/// Hand rank categories, ordered from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HandCategory {
    /// No pair.
    HighCard = 0,
    /// One pair.
    OnePair = 1,
    /// Two pair.
    TwoPair = 2,
    /// Trips or a set.
    ThreeOfAKind = 3,
    /// Five consecutive ranks.
    Straight = 4,
    /// Five cards of one suit.
    Flush = 5,
    /// Trips plus a pair.
    FullHouse = 6,
    /// Quads.
    FourOfAKind = 7,
    /// Straight in one suit.
    StraightFlush = 8,
}

impl HandCategory {
    /// All categories, worst first.
    pub const ALL: [HandCategory; 9] = [
        HandCategory::HighCard,
        HandCategory::OnePair,
        HandCategory::TwoPair,
        HandCategory::ThreeOfAKind,
        HandCategory::Straight,
        HandCategory::Flush,
        HandCategory::FullHouse,
        HandCategory::FourOfAKind,
        HandCategory::StraightFlush,
    ];

    /// Get the category name.
    pub fn name(&self) -> &'static str {
        match self {
            HandCategory::HighCard => "High Card",
            HandCategory::OnePair => "One Pair",
            HandCategory::TwoPair => "Two Pair",
            HandCategory::ThreeOfAKind => "Three of a Kind",
            HandCategory::Straight => "Straight",
            HandCategory::Flush => "Flush",
            HandCategory::FullHouse => "Full House",
            HandCategory::FourOfAKind => "Four of a Kind",
            HandCategory::StraightFlush => "Straight Flush",
        }
    }

    /// Lowest strength value in this category.
    pub fn floor(&self) -> u16 {
        match self {
            HandCategory::HighCard => HIGH_CARD_FLOOR,
            HandCategory::OnePair => ONE_PAIR_FLOOR,
            HandCategory::TwoPair => TWO_PAIR_FLOOR,
            HandCategory::ThreeOfAKind => THREE_OF_A_KIND_FLOOR,
            HandCategory::Straight => STRAIGHT_FLOOR,
            HandCategory::Flush => FLUSH_FLOOR,
            HandCategory::FullHouse => FULL_HOUSE_FLOOR,
            HandCategory::FourOfAKind => FOUR_OF_A_KIND_FLOOR,
            HandCategory::StraightFlush => STRAIGHT_FLUSH_FLOOR,
        }
    }
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A hand strength that can be compared.
/// Higher values are better hands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct EvalResult(u16);

impl EvalResult {
    /// Get the raw strength value for comparison.
    pub fn value(&self) -> u16 {
        self.0
    }

    /// Get the hand category.
    pub fn category(&self) -> HandCategory {
        HandCategory::ALL
            .iter()
            .rev()
            .copied()
            .find(|c| self.0 >= c.floor())
            .unwrap_or(HandCategory::HighCard)
    }
}

impl fmt::Display for EvalResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.category(), self.0)
    }
}

/// Table-driven hand evaluator.
///
/// Building the tables takes a few milliseconds; use [`HandEvaluator::shared`]
/// to build them once per process.
pub struct HandEvaluator {
    flush: Box<[u16]>,
    unique: Box<[u16]>,
    rank_counts: Box<[u16]>,
}

static SHARED: OnceLock<HandEvaluator> = OnceLock::new();

impl HandEvaluator {
    /// Build a new evaluator with its own tables.
    pub fn new() -> Self {
        let mut flush = vec![0u16; RANK_MASK_SIZE].into_boxed_slice();
        let mut unique = vec![0u16; RANK_MASK_SIZE].into_boxed_slice();
        let mut rank_counts = vec![0u16; RANK_COUNT_SIZE].into_boxed_slice();

        // Five distinct ranks. Ascending masks are ascending strength once
        // straights are taken out.
        let masks = masks_with_bits(NUM_RANKS, 5);
        let mut next = 0u16;
        for &mask in &masks {
            match straight_index(mask) {
                Some(i) => {
                    flush[mask as usize] = STRAIGHT_FLUSH_FLOOR + i;
                    unique[mask as usize] = STRAIGHT_FLOOR + i;
                }
                None => {
                    flush[mask as usize] = FLUSH_FLOOR + next;
                    unique[mask as usize] = HIGH_CARD_FLOOR + next;
                    next += 1;
                }
            }
        }

        // Pair with three kickers.
        let mut value = ONE_PAIR_FLOOR;
        for pair in 0..NUM_RANKS {
            for kickers in masks_with_bits(NUM_RANKS, 3) {
                if kickers & (1 << pair) != 0 {
                    continue;
                }
                let [k1, k2, k3, ..] = ranks_desc(kickers);
                rank_counts[pair_hash(pair, k1, k2, k3)] = value;
                value += 1;
            }
        }

        // Two pair with a kicker.
        let mut value = TWO_PAIR_FLOOR;
        for high in 0..NUM_RANKS {
            for low in 0..high {
                for kicker in (0..NUM_RANKS).filter(|&k| k != high && k != low) {
                    rank_counts[two_pair_hash(high, low, kicker)] = value;
                    value += 1;
                }
            }
        }

        // Trips with two kickers.
        let mut value = THREE_OF_A_KIND_FLOOR;
        for trips in 0..NUM_RANKS {
            for kickers in masks_with_bits(NUM_RANKS, 2) {
                if kickers & (1 << trips) != 0 {
                    continue;
                }
                let [k1, k2, ..] = ranks_desc(kickers);
                rank_counts[trips_hash(trips, k1, k2)] = value;
                value += 1;
            }
        }

        // Full house and quads: primary rank, then the other rank.
        let mut full_house = FULL_HOUSE_FLOOR;
        let mut quads = FOUR_OF_A_KIND_FLOOR;
        for primary in 0..NUM_RANKS {
            for other in (0..NUM_RANKS).filter(|&r| r != primary) {
                rank_counts[FULL_HOUSE_OFFSET + group_hash(primary, other)] = full_house;
                rank_counts[QUADS_OFFSET + group_hash(primary, other)] = quads;
                full_house += 1;
                quads += 1;
            }
        }

        debug_assert_eq!(next, 1277);
        debug_assert_eq!(quads, STRAIGHT_FLUSH_FLOOR);

        Self {
            flush,
            unique,
            rank_counts,
        }
    }

    /// Process-wide evaluator, built on first use.
    pub fn shared() -> &'static HandEvaluator {
        SHARED.get_or_init(|| {
            log::debug!("building hand evaluator tables");
            HandEvaluator::new()
        })
    }

    /// Evaluate a 5-card hand.
    pub fn evaluate_5(&self, cards: &[Card; 5]) -> EvalResult {
        let mut rank_bits = 0usize;
        let mut suits = 0u8;
        for card in cards {
            rank_bits |= 1 << card.rank();
            suits |= 1 << card.suit();
        }

        if suits.count_ones() == 1 {
            return EvalResult(self.flush[rank_bits]);
        }
        if rank_bits.count_ones() == 5 {
            return EvalResult(self.unique[rank_bits]);
        }

        let mut counts = [0u8; NUM_RANKS as usize];
        for card in cards {
            counts[card.rank() as usize] += 1;
        }

        let mut quads = None;
        let mut trips = None;
        let mut pairs = [0u8; 2];
        let mut num_pairs = 0;
        let mut singles = [0u8; 3];
        let mut num_singles = 0;
        for rank in (0..NUM_RANKS).rev() {
            match counts[rank as usize] {
                4 => quads = Some(rank),
                3 => trips = Some(rank),
                2 => {
                    pairs[num_pairs] = rank;
                    num_pairs += 1;
                }
                1 => {
                    singles[num_singles] = rank;
                    num_singles += 1;
                }
                _ => {}
            }
        }

        let index = match (quads, trips, num_pairs) {
            (Some(q), _, _) => QUADS_OFFSET + group_hash(q, singles[0]),
            (None, Some(t), 1) => FULL_HOUSE_OFFSET + group_hash(t, pairs[0]),
            (None, Some(t), _) => trips_hash(t, singles[0], singles[1]),
            (None, None, 2) => two_pair_hash(pairs[0], pairs[1], singles[0]),
            _ => pair_hash(pairs[0], singles[0], singles[1], singles[2]),
        };
        EvalResult(self.rank_counts[index])
    }

    /// Evaluate a 7-card hand (best 5-card combination).
    pub fn evaluate_7(&self, cards: &[Card; 7]) -> EvalResult {
        self.evaluate(cards)
    }

    /// Evaluate 5 or more cards, keeping the best 5-card combination.
    ///
    /// The result does not depend on the order of `cards`. Fewer than five
    /// cards is a caller error and yields the lowest value.
    pub fn evaluate(&self, cards: &[Card]) -> EvalResult {
        let n = cards.len();
        debug_assert!(n >= 5, "need at least 5 cards, got {}", n);
        if n == 5 {
            return self.evaluate_5(&[cards[0], cards[1], cards[2], cards[3], cards[4]]);
        }

        let mut best = EvalResult::default();
        for i in 0..n {
            for j in (i + 1)..n {
                for k in (j + 1)..n {
                    for l in (k + 1)..n {
                        for m in (l + 1)..n {
                            let hand = [cards[i], cards[j], cards[k], cards[l], cards[m]];
                            let rank = self.evaluate_5(&hand);
                            if rank > best {
                                best = rank;
                            }
                        }
                    }
                }
            }
        }
        best
    }

    /// Evaluate hole cards together with the board.
    pub fn evaluate_hand(&self, hand: &Hand, board: &Board) -> EvalResult {
        let mut cards = [Card::default(); 7];
        cards[0] = hand.high();
        cards[1] = hand.low();
        let n = 2 + board.len();
        cards[2..n].copy_from_slice(board.cards());
        self.evaluate(&cards[..n])
    }

    /// Compare two hands on the same board.
    pub fn compare(&self, hand1: &Hand, hand2: &Hand, board: &Board) -> Ordering {
        self.evaluate_hand(hand1, board)
            .cmp(&self.evaluate_hand(hand2, board))
    }
}

impl Default for HandEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HandEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandEvaluator")
            .field("rank_count_entries", &self.rank_counts.len())
            .finish()
    }
}

/// All masks over `bits` ranks with exactly `ones` bits set, ascending.
fn masks_with_bits(bits: u8, ones: u32) -> Vec<u16> {
    (0u16..(1 << bits)).filter(|m| m.count_ones() == ones).collect()
}

/// Set ranks of a mask, highest first. Unused slots are zero.
fn ranks_desc(mask: u16) -> [u8; 5] {
    let mut out = [0u8; 5];
    let mut n = 0;
    for rank in (0..NUM_RANKS).rev() {
        if mask & (1 << rank) != 0 && n < out.len() {
            out[n] = rank;
            n += 1;
        }
    }
    out
}

/// Straight index 0 (wheel) to 9 (ace high), or `None`.
fn straight_index(mask: u16) -> Option<u16> {
    if mask == WHEEL_MASK {
        return Some(0);
    }
    (4..NUM_RANKS as u16)
        .find(|&top| mask == 0b11111 << (top - 4))
        .map(|top| top - 3)
}

#[inline]
fn pair_hash(pair: u8, k1: u8, k2: u8, k3: u8) -> usize {
    PAIR_OFFSET + ((pair as usize * 13 + k1 as usize) * 13 + k2 as usize) * 13 + k3 as usize
}

#[inline]
fn two_pair_hash(high: u8, low: u8, kicker: u8) -> usize {
    TWO_PAIR_OFFSET + (high as usize * 13 + low as usize) * 13 + kicker as usize
}

#[inline]
fn trips_hash(trips: u8, k1: u8, k2: u8) -> usize {
    TRIPS_OFFSET + (trips as usize * 13 + k1 as usize) * 13 + k2 as usize
}

#[inline]
fn group_hash(primary: u8, other: u8) -> usize {
    primary as usize * 13 + other as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::postflop::card::parse_cards;

    fn eval(s: &str) -> EvalResult {
        HandEvaluator::shared().evaluate(&parse_cards(s).unwrap())
    }

    #[test]
    fn test_categories() {
        assert_eq!(eval("As Kd Qh Jc 9s").category(), HandCategory::HighCard);
        assert_eq!(eval("As Ad Kh Qc Js").category(), HandCategory::OnePair);
        assert_eq!(eval("As Ad Kh Kc Js").category(), HandCategory::TwoPair);
        assert_eq!(eval("As Ad Ah Kc Js").category(), HandCategory::ThreeOfAKind);
        assert_eq!(eval("As Kd Qh Jc Ts").category(), HandCategory::Straight);
        assert_eq!(eval("As 2d 3h 4c 5s").category(), HandCategory::Straight);
        assert_eq!(eval("As Ks Qs Js 9s").category(), HandCategory::Flush);
        assert_eq!(eval("As Ad Ah Kc Ks").category(), HandCategory::FullHouse);
        assert_eq!(eval("As Ad Ah Ac Ks").category(), HandCategory::FourOfAKind);
        assert_eq!(eval("9s Ks Qs Js Ts").category(), HandCategory::StraightFlush);
    }

    #[test]
    fn test_known_comparisons() {
        assert!(eval("7h7d7s2c2d") > eval("AhAsKdKcQh"));
        assert_eq!(eval("AsKsQsJsTs").value(), ROYAL_FLUSH);

        // wheel is the lowest straight
        assert!(eval("As2d3h4c5s") < eval("2s3d4h5c6s"));
        assert_eq!(eval("As2d3h4c5s").value(), STRAIGHT_FLOOR);
        assert_eq!(eval("As2s3s4s5s").value(), STRAIGHT_FLUSH_FLOOR);

        // kickers
        assert!(eval("AsAdKhQcJs") > eval("AsAdKhQc9s"));
        assert!(eval("KsKdQhQc2s") < eval("KsKdQhQc3s"));
        assert!(eval("8s8d8h2c2s") < eval("8s8d8h3c3s"));
        assert!(eval("2s2d2h2cAs") > eval("As Ad Ah Kc Ks"));
    }

    #[test]
    fn test_permutation_invariance() {
        let cards = parse_cards("Jh Jd 4c 4s 9h").unwrap();
        let forward = HandEvaluator::shared().evaluate(&cards);
        let mut reversed = cards.clone();
        reversed.reverse();
        assert_eq!(forward, HandEvaluator::shared().evaluate(&reversed));
        assert_eq!(forward.category(), HandCategory::TwoPair);
    }

    #[test]
    fn test_seven_cards() {
        // board plays a straight, hole cards make a flush
        let r = eval("Ah 2h 9h Th Jd Qc Kh");
        assert_eq!(r.category(), HandCategory::Flush);

        let hand: Hand = "AhKh".parse().unwrap();
        let board: Board = "QhJhTh2c3d".parse().unwrap();
        assert_eq!(HandEvaluator::shared().evaluate_hand(&hand, &board).value(), ROYAL_FLUSH);

        let villain: Hand = "AcAd".parse().unwrap();
        assert_eq!(HandEvaluator::shared().compare(&hand, &villain, &board), Ordering::Greater);

        // split: board plays for both
        let board: Board = "AsKsQsJsTs".parse().unwrap();
        let a: Hand = "2c3d".parse().unwrap();
        let b: Hand = "4c5d".parse().unwrap();
        assert_eq!(HandEvaluator::shared().compare(&a, &b, &board), Ordering::Equal);
    }

    #[test]
    fn test_six_cards() {
        let r = eval("As Ad Ah Ac Ks 2d");
        assert_eq!(r.category(), HandCategory::FourOfAKind);
        assert_eq!(r, eval("As Ad Ah Ac Ks"));
    }

    #[test]
    fn test_exhaustive_five_card_hands() {
        let evaluator = HandEvaluator::shared();
        let deck: Vec<Card> = Card::all().collect();
        let mut counts = [0u32; 9];
        let mut seen = vec![false; NUM_HAND_VALUES];
        let mut min = [u16::MAX; 9];
        let mut max = [0u16; 9];

        for a in 0..52 {
            for b in (a + 1)..52 {
                for c in (b + 1)..52 {
                    for d in (c + 1)..52 {
                        for e in (d + 1)..52 {
                            let r = evaluator.evaluate_5(&[deck[a], deck[b], deck[c], deck[d], deck[e]]);
                            let cat = r.category() as usize;
                            counts[cat] += 1;
                            seen[r.value() as usize] = true;
                            min[cat] = min[cat].min(r.value());
                            max[cat] = max[cat].max(r.value());
                        }
                    }
                }
            }
        }

        assert_eq!(
            counts,
            [1_302_540, 1_098_240, 123_552, 54_912, 10_200, 5_108, 3_744, 624, 40]
        );
        assert!(seen.iter().all(|&s| s));
        for cat in 0..8 {
            assert!(max[cat] < min[cat + 1]);
        }
        assert_eq!(max[8], ROYAL_FLUSH);
    }
}
