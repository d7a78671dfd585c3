//! Kuhn Poker, the acceptance fixture for the MCCFR engine.
//!
//! Kuhn Poker has a known, closed-form Nash equilibrium, which makes it the
//! reference game for checking that the solver converges.
//!
//! ## Game Rules
//!
//! - 3 cards: Jack (0), Queen (1), King (2)
//! - 2 players, each antes 1 chip
//! - Player 1 acts first: Pass or Bet (1 chip)
//! - Player 2 responds; after pass-bet Player 1 gets to call or fold
//! - Higher card wins at showdown
//!
//! ## Game Tree
//!
//! ```text
//! P1
//! ├── Pass
//! │   └── P2
//! │       ├── Pass → Showdown (pot = 2)
//! │       └── Bet
//! │           └── P1
//! │               ├── Pass → P2 wins (pot = 3)
//! │               └── Bet → Showdown (pot = 4)
//! └── Bet
//!     └── P2
//!         ├── Pass → P1 wins (pot = 3)
//!         └── Bet → Showdown (pot = 4)
//! ```
//!
//! ## Known Nash Equilibrium
//!
//! - **Player 1 with Jack**: Bet with probability α ∈ [0, 1/3]
//! - **Player 1 with Queen**: Always Pass
//! - **Player 1 with King**: Bet with probability 3α
//! - **Player 2 facing Bet with Jack**: Always Fold
//! - **Player 2 facing Bet with Queen**: Call with probability 1/3
//! - **Player 2 facing Bet with King**: Always Call
//!
//! **Expected Value**: Player 1 EV = -1/18 ≈ -0.0556

use rand::Rng;
use std::fmt;

use crate::cfr::game::Game;

/// Actions in Kuhn Poker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KuhnAction {
    /// Pass (check if no bet, fold if facing bet)
    Pass,
    /// Bet (or call if facing bet)
    Bet,
}

impl fmt::Display for KuhnAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KuhnAction::Pass => write!(f, "Pass"),
            KuhnAction::Bet => write!(f, "Bet"),
        }
    }
}

/// Position in the betting sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KuhnNode {
    /// P1 to act.
    Root,
    /// P2 to act after a pass.
    Passed,
    /// P2 facing a bet.
    Bet,
    /// P1 facing a bet after passing.
    PassBet,
    /// Both passed.
    PassPass,
    /// P2 folded to a bet.
    BetFold,
    /// P2 called a bet.
    BetCall,
    /// P1 folded after pass-bet.
    PassBetFold,
    /// P1 called after pass-bet.
    PassBetCall,
}

impl KuhnNode {
    /// Player to act, `None` at terminal nodes.
    pub fn to_act(self) -> Option<usize> {
        match self {
            KuhnNode::Root | KuhnNode::PassBet => Some(0),
            KuhnNode::Passed | KuhnNode::Bet => Some(1),
            _ => None,
        }
    }

    /// Node reached by `action`. Terminal nodes are absorbing.
    pub fn next(self, action: KuhnAction) -> KuhnNode {
        use KuhnAction::*;
        match (self, action) {
            (KuhnNode::Root, Pass) => KuhnNode::Passed,
            (KuhnNode::Root, Bet) => KuhnNode::Bet,
            (KuhnNode::Passed, Pass) => KuhnNode::PassPass,
            (KuhnNode::Passed, Bet) => KuhnNode::PassBet,
            (KuhnNode::Bet, Pass) => KuhnNode::BetFold,
            (KuhnNode::Bet, Bet) => KuhnNode::BetCall,
            (KuhnNode::PassBet, Pass) => KuhnNode::PassBetFold,
            (KuhnNode::PassBet, Bet) => KuhnNode::PassBetCall,
            (terminal, _) => terminal,
        }
    }

    /// Betting history in the classic `p`/`b` notation.
    pub fn history(self) -> &'static str {
        match self {
            KuhnNode::Root => "",
            KuhnNode::Passed => "p",
            KuhnNode::Bet => "b",
            KuhnNode::PassBet => "pb",
            KuhnNode::PassPass => "pp",
            KuhnNode::BetFold => "bp",
            KuhnNode::BetCall => "bb",
            KuhnNode::PassBetFold => "pbp",
            KuhnNode::PassBetCall => "pbb",
        }
    }
}

/// Information-set key: own card plus the betting node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KuhnKey {
    /// Player's card (0=Jack, 1=Queen, 2=King)
    pub card: u8,
    /// Decision node.
    pub node: KuhnNode,
}

impl fmt::Display for KuhnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", KuhnPoker::card_name(self.card), self.node.history())
    }
}

/// Complete game state in Kuhn Poker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KuhnState {
    /// cards[0] is Player 1's card, cards[1] is Player 2's card
    pub cards: [u8; 2],
    /// Betting node
    pub node: KuhnNode,
}

impl KuhnState {
    /// State right after the deal.
    pub fn new(cards: [u8; 2]) -> Self {
        Self { cards, node: KuhnNode::Root }
    }

    /// State after a sequence of actions.
    pub fn after(cards: [u8; 2], actions: &[KuhnAction]) -> Self {
        let node = actions.iter().fold(KuhnNode::Root, |n, &a| n.next(a));
        Self { cards, node }
    }
}

/// Kuhn Poker game.
#[derive(Debug, Clone, Copy, Default)]
pub struct KuhnPoker;

impl KuhnPoker {
    /// Create a new Kuhn Poker game.
    pub fn new() -> Self {
        Self
    }

    /// Get card name for display.
    pub fn card_name(card: u8) -> &'static str {
        match card {
            0 => "J",
            1 => "Q",
            2 => "K",
            _ => "?",
        }
    }
}

impl Game for KuhnPoker {
    type State = KuhnState;
    type Action = KuhnAction;
    type Key = KuhnKey;

    fn deal<R: Rng>(&self, rng: &mut R) -> Option<Self::State> {
        let first = rng.gen_range(0..3u8);
        let second = (first + rng.gen_range(1..3u8)) % 3;
        Some(KuhnState::new([first, second]))
    }

    fn is_terminal(&self, state: &Self::State) -> bool {
        state.node.to_act().is_none()
    }

    fn payoff(&self, state: &Self::State, player: usize) -> f64 {
        let p1_wins_showdown = state.cards[0] > state.cards[1];
        let showdown = |stake: f64| if p1_wins_showdown { stake } else { -stake };

        let p1_payoff = match state.node {
            KuhnNode::PassPass => showdown(1.0),
            KuhnNode::BetFold => 1.0,
            KuhnNode::PassBetFold => -1.0,
            KuhnNode::BetCall | KuhnNode::PassBetCall => showdown(2.0),
            _ => 0.0,
        };

        if player == 0 {
            p1_payoff
        } else {
            -p1_payoff
        }
    }

    fn current_player(&self, state: &Self::State) -> Option<usize> {
        state.node.to_act()
    }

    fn available_actions(&self, state: &Self::State) -> Vec<Self::Action> {
        if self.is_terminal(state) {
            return vec![];
        }
        vec![KuhnAction::Pass, KuhnAction::Bet]
    }

    fn apply_action(&self, state: &Self::State, action: &Self::Action) -> Self::State {
        KuhnState {
            cards: state.cards,
            node: state.node.next(*action),
        }
    }

    fn info_key(&self, state: &Self::State) -> Self::Key {
        let player = state.node.to_act().unwrap_or(0);
        KuhnKey {
            card: state.cards[player],
            node: state.node,
        }
    }
}
