//! Game trait definition for the MCCFR engine.
//!
//! Any two-player zero-sum game that implements the `Game` trait can be solved
//! by [`MccfrSolver`](crate::cfr::MccfrSolver). The trait keeps the algorithm
//! ignorant of cards, bets and boards.

use std::fmt::Debug;
use std::hash::Hash;

use rand::Rng;

/// Number of players supported by the engine.
pub const NUM_PLAYERS: usize = 2;

/// Trait for actions that can be taken in a game.
pub trait Action: Clone + Debug + PartialEq {}

impl<T: Clone + Debug + PartialEq> Action for T {}

/// Trait for information-set keys.
///
/// Two states that look identical to the acting player must produce equal
/// keys. Keys are small `Copy` values so that table lookups never allocate.
pub trait InfoKey: Copy + Eq + Hash + Debug {}

impl<T: Copy + Eq + Hash + Debug> InfoKey for T {}

/// The main Game trait.
///
/// # Example
/// ```ignore
/// impl Game for MyGame {
///     type State = MyState;
///     type Action = MyAction;
///     type Key = MyKey;
///
///     // ... implement required methods
/// }
/// ```
pub trait Game {
    /// Complete game state, including private information.
    type State: Clone + Debug;

    /// An action a player can take.
    type Action: Action;

    /// Information-set key of the acting player.
    type Key: InfoKey;

    /// Deal the private information for one iteration.
    ///
    /// Returns `None` when no deal is possible (for example an empty range),
    /// in which case the iteration is skipped.
    fn deal<R: Rng>(&self, rng: &mut R) -> Option<Self::State>;

    /// Check if the given state is terminal.
    fn is_terminal(&self, state: &Self::State) -> bool;

    /// Net payoff for `player` at a terminal state.
    ///
    /// Payoffs are zero-sum: `payoff(s, 0) == -payoff(s, 1)`.
    fn payoff(&self, state: &Self::State, player: usize) -> f64;

    /// Index of the player to act, `None` at terminal and chance states.
    fn current_player(&self, state: &Self::State) -> Option<usize>;

    /// Legal actions for the player to act.
    fn available_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Apply an action and return the resulting state.
    ///
    /// `action` must come from [`Game::available_actions`] for `state`.
    fn apply_action(&self, state: &Self::State, action: &Self::Action) -> Self::State;

    /// Information-set key for the player to act.
    fn info_key(&self, state: &Self::State) -> Self::Key;

    /// Check if the state is a chance node.
    fn is_chance(&self, _state: &Self::State) -> bool {
        false
    }

    /// Sample a chance outcome.
    fn sample_chance<R: Rng>(&self, state: &Self::State, _rng: &mut R) -> Self::State {
        state.clone()
    }
}
