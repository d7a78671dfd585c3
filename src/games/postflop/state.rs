//! Postflop betting state.
//!
//! `GameState` tracks the street, pot, stacks, per-street investments, board
//! and action history of a heads-up hand from the flop on. It does not deal
//! cards: once a non-river betting round closes, the caller supplies the next
//! board card with [`GameState::set_turn`] or [`GameState::set_river`].

use std::cmp::Ordering;
use std::fmt;
use std::hash::Hasher;
use std::sync::Arc;

use rustc_hash::FxHasher;
use thiserror::Error;

use super::action::{centi_to_bb, Chips, PokerAction};
use super::betting::BetSizingConfig;
use super::card::{Board, Card, CardError, Street};
use crate::cfr::config::ConfigError;

/// Marker mixed into the history hash whenever a board card is dealt.
const BOARD_MARKER: u64 = 0xB0A2_D000_0000_0000;

/// Position in a heads-up postflop hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Player {
    /// Out of position, acts first on every street.
    Oop = 0,
    /// In position, acts last.
    Ip = 1,
}

impl Player {
    /// Both players, OOP first.
    pub const BOTH: [Player; 2] = [Player::Oop, Player::Ip];

    /// Get the other player.
    pub fn opponent(&self) -> Self {
        match self {
            Player::Oop => Player::Ip,
            Player::Ip => Player::Oop,
        }
    }

    /// Get player index (0 or 1).
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Get player from index.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Player::Oop,
            _ => Player::Ip,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Oop => write!(f, "OOP"),
            Player::Ip => write!(f, "IP"),
        }
    }
}

/// Errors from invalid state transitions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StateError {
    /// The action is not among the available actions.
    #[error("illegal action {0}")]
    IllegalAction(PokerAction),
    /// The hand is over.
    #[error("the hand is over")]
    HandOver,
    /// A board card must be dealt before anyone can act.
    #[error("waiting for the next board card")]
    AwaitingCard,
    /// A card was dealt while the betting round is still open.
    #[error("the betting round is still open")]
    BettingOpen,
    /// The board has the wrong number of cards for this operation.
    #[error("expected a board of {expected} cards, found {actual}")]
    WrongBoardSize {
        /// Required board size.
        expected: usize,
        /// Actual board size.
        actual: usize,
    },
    /// Bad or duplicate card.
    #[error(transparent)]
    Card(#[from] CardError),
}

/// Snapshot taken when a street starts, used by [`GameState::reset_street`].
#[derive(Debug, Clone, Copy)]
struct StreetStart {
    pot: Chips,
    stacks: [Chips; 2],
    contributed: [Chips; 2],
    history_len: usize,
    history_hash: u64,
}

/// Complete public state of a postflop hand.
#[derive(Clone)]
pub struct GameState {
    config: Arc<BetSizingConfig>,

    /// Current street
    pub(super) street: Street,
    /// Player to act next (meaningful only while betting is open)
    pub(super) to_act: Player,
    /// Current pot, including the initial pot
    pub(super) pot: Chips,
    /// Remaining stacks [OOP, IP]
    pub(super) stacks: [Chips; 2],
    /// Amount invested in the current street [OOP, IP]
    pub(super) invested: [Chips; 2],
    /// Total contribution to the pot [OOP, IP]
    pub(super) contributed: [Chips; 2],
    /// Raises on the current street
    pub(super) raises: u8,

    board: Board,
    history: Vec<PokerAction>,
    history_hash: u64,
    street_actions: u8,
    folded: Option<Player>,
    awaiting_card: bool,
    river_closed: bool,
    street_start: StreetStart,
}

impl GameState {
    /// Create a state from a validated configuration. The board is empty.
    pub fn new(config: BetSizingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_config(Arc::new(config)))
    }

    /// Create a state sharing an already validated configuration.
    pub fn with_config(config: Arc<BetSizingConfig>) -> Self {
        let mut state = Self {
            config,
            street: Street::Flop,
            to_act: Player::Oop,
            pot: 0,
            stacks: [0; 2],
            invested: [0; 2],
            contributed: [0; 2],
            raises: 0,
            board: Board::new(),
            history: Vec::new(),
            history_hash: 0,
            street_actions: 0,
            folded: None,
            awaiting_card: false,
            river_closed: false,
            street_start: StreetStart {
                pot: 0,
                stacks: [0; 2],
                contributed: [0; 2],
                history_len: 0,
                history_hash: 0,
            },
        };
        state.reset_hand();
        state
    }

    /// Put the money back to the configured starting point and clear history.
    fn reset_hand(&mut self) {
        let pot = self.config.initial_pot_chips();
        let stack = self.config.stack_chips();
        self.contributed = [pot / 2, pot - pot / 2];
        self.stacks = [
            stack.saturating_sub(self.contributed[0]),
            stack.saturating_sub(self.contributed[1]),
        ];
        self.pot = pot;
        self.history.clear();
        self.history_hash = 0;
        self.folded = None;
        self.river_closed = false;
        self.start_street();
    }

    /// Reset per-street bookkeeping and snapshot the street start.
    fn start_street(&mut self) {
        self.invested = [0; 2];
        self.to_act = Player::Oop;
        self.raises = 0;
        self.street_actions = 0;
        self.awaiting_card = false;
        self.street_start = StreetStart {
            pot: self.pot,
            stacks: self.stacks,
            contributed: self.contributed,
            history_len: self.history.len(),
            history_hash: self.history_hash,
        };
    }

    /// Start a new hand on the given flop.
    pub fn set_flop(&mut self, cards: [Card; 3]) -> Result<(), StateError> {
        self.set_board(Board::from_cards(&cards)?)
    }

    /// Start a new hand on a board of 3 to 5 cards.
    ///
    /// Pot and stacks go back to the configured values and history is cleared.
    pub fn set_board(&mut self, board: Board) -> Result<(), StateError> {
        let street = board.street().ok_or(StateError::WrongBoardSize {
            expected: 3,
            actual: board.len(),
        })?;
        self.board = board;
        self.street = street;
        self.reset_hand();
        Ok(())
    }

    /// Deal the turn.
    pub fn set_turn(&mut self, card: Card) -> Result<(), StateError> {
        self.deal_card(card, 3)
    }

    /// Deal the river.
    pub fn set_river(&mut self, card: Card) -> Result<(), StateError> {
        self.deal_card(card, 4)
    }

    fn deal_card(&mut self, card: Card, board_len: usize) -> Result<(), StateError> {
        if self.board.len() != board_len {
            return Err(StateError::WrongBoardSize {
                expected: board_len,
                actual: self.board.len(),
            });
        }
        if self.folded.is_some() {
            return Err(StateError::HandOver);
        }
        let can_deal = self.awaiting_card || self.street_actions == 0 || self.runout_pending();
        if !can_deal {
            return Err(StateError::BettingOpen);
        }
        self.board.push(card)?;
        self.deal_unchecked();
        Ok(())
    }

    /// Advance to the next street after a card was pushed on the board.
    fn deal_unchecked(&mut self) {
        if let Some(next) = self.street.next() {
            self.street = next;
        }
        let card = self.board.cards().last().map_or(0, |c| c.index() as u64);
        self.mix_history(BOARD_MARKER | card);
        self.start_street();
    }

    /// Copy of this state with `card` dealt as the next board card.
    ///
    /// The caller guarantees that [`GameState::needs_board_card`] holds and
    /// that `card` is not on the board.
    pub fn after_card(&self, card: Card) -> GameState {
        let mut next = self.clone();
        if next.board.push(card).is_ok() {
            next.deal_unchecked();
        }
        next
    }

    /// Change the starting stack and restart the hand on the current board.
    pub fn set_stack_size(&mut self, bb: f64) {
        Arc::make_mut(&mut self.config).stack_size = bb;
        self.reset_hand();
    }

    /// Change the initial pot and restart the hand on the current board.
    pub fn set_initial_pot(&mut self, bb: f64) {
        Arc::make_mut(&mut self.config).initial_pot = bb;
        self.reset_hand();
    }

    /// Undo every action of the current street.
    pub fn reset_street(&mut self) {
        let start = self.street_start;
        self.pot = start.pot;
        self.stacks = start.stacks;
        self.contributed = start.contributed;
        self.history.truncate(start.history_len);
        self.history_hash = start.history_hash;
        self.folded = None;
        self.river_closed = false;
        self.start_street();
    }

    /// Bet sizing configuration.
    pub fn config(&self) -> &BetSizingConfig {
        &self.config
    }

    /// Current street.
    pub fn street(&self) -> Street {
        self.street
    }

    /// Community cards.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Every action since the flop, in order.
    pub fn action_history(&self) -> &[PokerAction] {
        &self.history
    }

    /// Hash of the whole action sequence, including board-change markers.
    pub fn history_hash(&self) -> u64 {
        self.history_hash
    }

    /// Pot in BB.
    pub fn pot(&self) -> f64 {
        centi_to_bb(self.pot)
    }

    /// Pot in chips.
    pub fn pot_chips(&self) -> Chips {
        self.pot
    }

    /// Stacks in BB [OOP, IP].
    pub fn stacks(&self) -> [f64; 2] {
        self.stacks.map(centi_to_bb)
    }

    /// Street investments in BB [OOP, IP].
    pub fn invested(&self) -> [f64; 2] {
        self.invested.map(centi_to_bb)
    }

    /// Total contributions in BB [OOP, IP].
    pub fn contributed(&self) -> [f64; 2] {
        self.contributed.map(centi_to_bb)
    }

    /// Get effective stack (minimum of both stacks) in BB.
    pub fn effective_stack(&self) -> f64 {
        centi_to_bb(self.stacks[0].min(self.stacks[1]))
    }

    /// Amount the player to act must add to call, in BB.
    pub fn to_call(&self) -> f64 {
        let me = self.to_act.index();
        centi_to_bb(self.invested[1 - me].saturating_sub(self.invested[me]))
    }

    /// Player who folded, if any.
    pub fn folded_player(&self) -> Option<Player> {
        self.folded
    }

    /// Whether a player has no chips behind.
    pub fn is_all_in(&self) -> bool {
        self.stacks[0] == 0 || self.stacks[1] == 0
    }

    /// All-in with matched investments: only board cards remain.
    fn runout_pending(&self) -> bool {
        self.is_all_in() && self.invested[0] == self.invested[1]
    }

    /// Check if the hand is over.
    pub fn is_terminal(&self) -> bool {
        self.folded.is_some() || self.river_closed || self.runout_pending()
    }

    /// Check if the hand ends in a showdown.
    pub fn has_showdown(&self) -> bool {
        self.is_terminal() && self.folded.is_none()
    }

    /// Whether the next board card must be dealt before play continues.
    pub fn needs_board_card(&self) -> bool {
        self.folded.is_none()
            && self.board.len() < Board::MAX
            && (self.awaiting_card || self.runout_pending())
    }

    /// Player to act, `None` when the hand is over or a card is due.
    pub fn current_player(&self) -> Option<Player> {
        if self.is_terminal() || self.needs_board_card() || self.board.is_empty() {
            None
        } else {
            Some(self.to_act)
        }
    }

    /// Get all available actions for the player to act.
    pub fn available_actions(&self) -> Vec<PokerAction> {
        self.config.available_actions(self)
    }

    /// Apply a legal action.
    pub fn apply_action(&mut self, action: PokerAction) -> Result<(), StateError> {
        if self.is_terminal() {
            return Err(StateError::HandOver);
        }
        if self.needs_board_card() {
            return Err(StateError::AwaitingCard);
        }
        if !self.available_actions().contains(&action) {
            return Err(StateError::IllegalAction(action));
        }
        self.apply_unchecked(action);
        Ok(())
    }

    /// Copy of this state after `action`.
    ///
    /// `action` must come from [`GameState::available_actions`].
    pub fn after_action(&self, action: PokerAction) -> GameState {
        let mut next = self.clone();
        next.apply_unchecked(action);
        next
    }

    fn apply_unchecked(&mut self, action: PokerAction) {
        let player = self.to_act;
        let me = player.index();
        let opp = player.opponent().index();
        let to_call = self.invested[opp].saturating_sub(self.invested[me]);

        self.history.push(action);
        self.mix_history(action.code());
        self.street_actions = self.street_actions.saturating_add(1);

        match action {
            PokerAction::Fold => {
                self.folded = Some(player);
            }
            PokerAction::Check => {
                if player == Player::Ip {
                    self.close_round();
                } else {
                    self.to_act = player.opponent();
                }
            }
            PokerAction::Call(amount) => {
                self.commit(me, amount);
                self.close_round();
            }
            PokerAction::AllIn(amount) if amount <= to_call => {
                // all-in for less: return what the caller cannot match
                self.commit(me, amount);
                let excess = self.invested[opp].saturating_sub(self.invested[me]);
                self.stacks[opp] += excess;
                self.invested[opp] -= excess;
                self.contributed[opp] -= excess;
                self.pot -= excess;
                self.close_round();
            }
            PokerAction::Bet { amount, .. } | PokerAction::Raise { amount, .. } | PokerAction::AllIn(amount) => {
                if to_call > 0 {
                    self.raises = self.raises.saturating_add(1);
                }
                self.commit(me, amount);
                self.to_act = player.opponent();
            }
        }
    }

    fn commit(&mut self, idx: usize, amount: Chips) {
        let amount = amount.min(self.stacks[idx]);
        self.stacks[idx] -= amount;
        self.invested[idx] += amount;
        self.contributed[idx] += amount;
        self.pot += amount;
    }

    fn close_round(&mut self) {
        self.invested = [0; 2];
        self.to_act = Player::Oop;
        if self.street == Street::River {
            self.river_closed = true;
        } else {
            self.awaiting_card = true;
        }
    }

    fn mix_history(&mut self, value: u64) {
        let mut hasher = FxHasher::default();
        hasher.write_u64(self.history_hash);
        hasher.write_u64(value);
        self.history_hash = hasher.finish();
    }

    /// Net payoff in BB for `player` at a terminal state.
    ///
    /// `oop_vs_ip` is the showdown comparison of OOP's hand against IP's and
    /// is ignored after a fold. The loser forfeits their whole contribution.
    pub fn payoff(&self, player: Player, oop_vs_ip: Ordering) -> f64 {
        let oop_wins = match self.folded {
            Some(Player::Oop) => Ordering::Less,
            Some(Player::Ip) => Ordering::Greater,
            None => oop_vs_ip,
        };
        let oop = match oop_wins {
            Ordering::Greater => centi_to_bb(self.contributed[Player::Ip.index()]),
            Ordering::Less => -centi_to_bb(self.contributed[Player::Oop.index()]),
            Ordering::Equal => 0.0,
        };
        match player {
            Player::Oop => oop,
            Player::Ip => -oop,
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::with_config(Arc::new(BetSizingConfig::default()))
    }
}

impl fmt::Debug for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameState")
            .field("street", &self.street)
            .field("board", &self.board)
            .field("pot", &self.pot)
            .field("stacks", &self.stacks)
            .field("invested", &self.invested)
            .field("to_act", &self.to_act)
            .field("history", &self.history)
            .finish()
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Street: {}", self.street)?;
        writeln!(f, "Pot: {:.2}bb", self.pot())?;
        let [oop, ip] = self.stacks();
        let [oop_inv, ip_inv] = self.invested();
        writeln!(f, "OOP Stack: {:.2}bb (invested: {:.2})", oop, oop_inv)?;
        writeln!(f, "IP Stack: {:.2}bb (invested: {:.2})", ip, ip_inv)?;
        match self.current_player() {
            Some(p) => writeln!(f, "To act: {}", p)?,
            None if self.is_terminal() => writeln!(f, "To act: - (hand over)")?,
            None => writeln!(f, "To act: - (deal next card)")?,
        }
        write!(f, "Board: {}", self.board)
    }
}
