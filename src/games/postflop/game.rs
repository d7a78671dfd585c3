//! Postflop game adaptor for the MCCFR engine.
//!
//! `PostflopGame` samples one concrete hand per player from their ranges,
//! plays the betting state machine, deals turn and river cards at chance
//! nodes and scores showdowns with the shared [`HandEvaluator`].

use std::cmp::Ordering;

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use super::action::PokerAction;
use super::card::{Card, NUM_CARDS};
use super::hand::Hand;
use super::hand_eval::HandEvaluator;
use super::info_state::InfoSetKey;
use super::range::Range;
use super::state::{GameState, Player};
use crate::cfr::game::Game;

/// A betting state together with both players' private hands.
#[derive(Debug, Clone)]
pub struct Spot {
    /// Public state.
    pub state: GameState,
    /// Hole cards [OOP, IP].
    pub hands: [Hand; 2],
}

impl Spot {
    /// Hand held by `player`.
    pub fn hand(&self, player: Player) -> &Hand {
        &self.hands[player.index()]
    }

    /// Cards that can no longer be dealt.
    pub fn dead_mask(&self) -> u64 {
        self.state.board().mask() | self.hands[0].mask() | self.hands[1].mask()
    }
}

/// Two-player postflop game starting from a fixed state.
pub struct PostflopGame {
    initial: GameState,
    ranges: [Range; 2],
    /// Board-legal OOP combos with weights.
    oop_hands: Vec<(Hand, f64)>,
    /// Board-legal IP combos with weights; filtered per deal against OOP's hand.
    ip_hands: Vec<(Hand, f64)>,
    oop_dist: Option<WeightedIndex<f64>>,
    evaluator: &'static HandEvaluator,
}

impl PostflopGame {
    /// Create a game from an initial state and the two ranges.
    pub fn new(initial: GameState, oop_range: Range, ip_range: Range) -> Self {
        let dead = initial.board().mask();
        let oop_hands = oop_range.available_hands(dead);
        let ip_hands = ip_range.available_hands(dead);
        let oop_dist = WeightedIndex::new(oop_hands.iter().map(|(_, w)| *w)).ok();
        Self {
            initial,
            ranges: [oop_range, ip_range],
            oop_hands,
            ip_hands,
            oop_dist,
            evaluator: HandEvaluator::shared(),
        }
    }

    /// Initial state every deal starts from.
    pub fn initial_state(&self) -> &GameState {
        &self.initial
    }

    /// Range of a player.
    pub fn range(&self, player: Player) -> &Range {
        &self.ranges[player.index()]
    }

    /// Board-legal combos of a player with their weights.
    pub fn available_hands(&self, player: Player) -> &[(Hand, f64)] {
        match player {
            Player::Oop => &self.oop_hands,
            Player::Ip => &self.ip_hands,
        }
    }

    /// Hand evaluator used for showdowns.
    pub fn evaluator(&self) -> &HandEvaluator {
        self.evaluator
    }

    /// Sample one of `hands` by weight, skipping combos that hit `dead`.
    fn sample_excluding<R: Rng>(hands: &[(Hand, f64)], dead: u64, rng: &mut R) -> Option<Hand> {
        let total: f64 = hands
            .iter()
            .filter(|(h, _)| !h.conflicts(dead))
            .map(|(_, w)| w)
            .sum();
        if total <= 0.0 {
            return None;
        }
        let mut target = rng.gen::<f64>() * total;
        let mut last = None;
        for (hand, weight) in hands.iter().filter(|(h, _)| !h.conflicts(dead)) {
            if target < *weight {
                return Some(*hand);
            }
            target -= weight;
            last = Some(*hand);
        }
        last
    }
}

impl Game for PostflopGame {
    type State = Spot;
    type Action = PokerAction;
    type Key = InfoSetKey;

    fn deal<R: Rng>(&self, rng: &mut R) -> Option<Self::State> {
        let oop = self.oop_hands[self.oop_dist.as_ref()?.sample(rng)].0;
        let dead = self.initial.board().mask() | oop.mask();
        let ip = Self::sample_excluding(&self.ip_hands, dead, rng)?;
        Some(Spot {
            state: self.initial.clone(),
            hands: [oop, ip],
        })
    }

    fn is_terminal(&self, spot: &Self::State) -> bool {
        spot.state.is_terminal() && !spot.state.needs_board_card()
    }

    fn payoff(&self, spot: &Self::State, player: usize) -> f64 {
        let board = spot.state.board();
        let showdown = if spot.state.has_showdown() {
            self.evaluator.compare(&spot.hands[0], &spot.hands[1], board)
        } else {
            Ordering::Equal
        };
        spot.state.payoff(Player::from_index(player), showdown)
    }

    fn current_player(&self, spot: &Self::State) -> Option<usize> {
        spot.state.current_player().map(|p| p.index())
    }

    fn available_actions(&self, spot: &Self::State) -> Vec<Self::Action> {
        spot.state.available_actions()
    }

    fn apply_action(&self, spot: &Self::State, action: &Self::Action) -> Self::State {
        Spot {
            state: spot.state.after_action(*action),
            hands: spot.hands,
        }
    }

    fn info_key(&self, spot: &Self::State) -> Self::Key {
        let player = spot.state.current_player().unwrap_or(Player::Oop);
        InfoSetKey::from_state(&spot.state, player, spot.hand(player))
    }

    fn is_chance(&self, spot: &Self::State) -> bool {
        spot.state.needs_board_card()
    }

    fn sample_chance<R: Rng>(&self, spot: &Self::State, rng: &mut R) -> Self::State {
        let dead = spot.dead_mask();
        let unseen = NUM_CARDS as u32 - dead.count_ones();
        if unseen == 0 {
            return spot.clone();
        }
        let pick = rng.gen_range(0..unseen) as usize;
        match Card::all().filter(|c| dead & c.mask() == 0).nth(pick) {
            Some(card) => Spot {
                state: spot.state.after_card(card),
                hands: spot.hands,
            },
            None => spot.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::postflop::betting::BetSizingConfig;
    use crate::games::postflop::card::Board;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn game(oop: &str, ip: &str) -> PostflopGame {
        let mut state = GameState::with_config(Arc::new(BetSizingConfig::single_size(50.0)));
        state.set_board("Ks8d3c".parse::<Board>().unwrap()).unwrap();
        PostflopGame::new(state, oop.parse().unwrap(), ip.parse().unwrap())
    }

    #[test]
    fn test_deal_respects_dead_cards() {
        let game = game("AA,KQs", "AA,22");
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..500 {
            let spot = game.deal(&mut rng).unwrap();
            let board = spot.state.board().mask();
            assert!(!spot.hands[0].conflicts(board));
            assert!(!spot.hands[1].conflicts(board | spot.hands[0].mask()));
        }
    }

    #[test]
    fn test_deal_fails_without_combos() {
        // Every KK combo except the board's king is blocked for IP by OOP's KK.
        let blocked = game("KK", "KK");
        let mut rng = StdRng::seed_from_u64(1);
        assert!(blocked.deal(&mut rng).is_none());

        let empty = game("", "AA");
        assert!(empty.deal(&mut rng).is_none());
    }

    #[test]
    fn test_deal_follows_weights() {
        let game = game("AA@10,QQ", "22");
        let mut rng = StdRng::seed_from_u64(9);
        let aces = (0..4000)
            .filter_map(|_| game.deal(&mut rng))
            .filter(|spot| spot.hands[0].hand_type().is_pair() && spot.hands[0].high().rank() == 12)
            .count();
        // 6 AA combos at 0.1 against 6 QQ combos at 1.0
        assert!(aces > 150 && aces < 600, "aces dealt {} times", aces);
    }

    #[test]
    fn test_chance_deals_unseen_cards_to_showdown() {
        let game = game("AA", "22");
        let mut rng = StdRng::seed_from_u64(5);
        let mut spot = game.deal(&mut rng).unwrap();
        while !game.is_terminal(&spot) {
            if game.is_chance(&spot) {
                let dead = spot.dead_mask();
                spot = game.sample_chance(&spot, &mut rng);
                let new_card = spot.state.board().cards().last().copied().unwrap();
                assert_eq!(dead & new_card.mask(), 0);
            } else {
                spot = game.apply_action(&spot, &PokerAction::Check);
            }
        }
        assert_eq!(spot.state.board().len(), 5);
        assert!(spot.state.has_showdown());
        let total = game.payoff(&spot, 0) + game.payoff(&spot, 1);
        assert!(total.abs() < 1e-9);
    }

    #[test]
    fn test_fold_payoff_is_zero_sum() {
        let game = game("AA", "22");
        let mut rng = StdRng::seed_from_u64(2);
        let spot = game.deal(&mut rng).unwrap();
        let bet = game.available_actions(&spot)[1];
        let spot = game.apply_action(&spot, &bet);
        let spot = game.apply_action(&spot, &PokerAction::Fold);
        assert!(game.is_terminal(&spot));
        assert_eq!(game.payoff(&spot, 0), 3.5);
        assert_eq!(game.payoff(&spot, 1), -3.5);
    }

    #[test]
    fn test_info_key_tracks_actor() {
        let game = game("AA", "22");
        let mut rng = StdRng::seed_from_u64(4);
        let spot = game.deal(&mut rng).unwrap();
        assert_eq!(game.current_player(&spot), Some(0));
        assert_eq!(game.info_key(&spot).hand_type, spot.hands[0].hand_type().index());

        let spot = game.apply_action(&spot, &PokerAction::Check);
        assert_eq!(game.current_player(&spot), Some(1));
        assert_eq!(game.info_key(&spot).hand_type, spot.hands[1].hand_type().index());
    }
}
