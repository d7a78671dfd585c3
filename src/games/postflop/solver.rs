//! Public postflop solver.
//!
//! `PostflopSolver` owns an [`MccfrSolver`] over a [`PostflopGame`] and
//! answers strategy queries at each player's first decision of the initial
//! street.
//!
//! # Example
//!
//! ```
//! use postflop_mccfr::cfr::SolverConfig;
//! use postflop_mccfr::games::postflop::{
//!     Board, BetSizingConfig, GameState, Player, PostflopSolver, Range,
//! };
//!
//! let mut state = GameState::new(BetSizingConfig::single_size(50.0)).unwrap();
//! state.set_board("Ks8d3c".parse::<Board>().unwrap()).unwrap();
//!
//! let mut solver = PostflopSolver::new(SolverConfig::fast().with_seed(7)).unwrap();
//! solver.initialize(state, "AA".parse().unwrap(), "22".parse().unwrap()).unwrap();
//! solver.train(50);
//!
//! let aggregated = solver.aggregated_strategy(Player::Oop);
//! assert!((aggregated.iter().sum::<f64>() - 1.0).abs() < 1e-9);
//! ```

use crate::cfr::config::{ConfigError, SolveProgress, SolveStats, SolverConfig};
use crate::cfr::solver::{MccfrSolver, StopHandle};

use super::action::PokerAction;
use super::hand::{Hand, HandType};
use super::info_state::InfoSetKey;
use super::game::PostflopGame;
use super::range::Range;
use super::state::{GameState, Player, StateError};
use super::tree::GameTree;

/// Boxed progress callback.
pub type ProgressCallback = Box<dyn FnMut(&SolveProgress)>;

/// Strategy of one hand at a player's first decision.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeStrategy {
    /// Hand type of the queried hand.
    pub hand_type: HandType,
    /// Actions at the decision point.
    pub actions: Vec<PokerAction>,
    /// Display names of `actions`.
    pub action_names: Vec<String>,
    /// Average-strategy probabilities, aligned with `actions`.
    pub probabilities: Vec<f64>,
    /// False when the info set was never visited and the probabilities are
    /// the uniform fallback.
    pub visited: bool,
}

impl NodeStrategy {
    /// Probability mass on bets, raises and all-ins.
    pub fn aggressive_frequency(&self) -> f64 {
        self.actions
            .iter()
            .zip(&self.probabilities)
            .filter(|(a, _)| a.is_aggressive())
            .map(|(_, p)| p)
            .sum()
    }
}

/// One cell of the 13x13 strategy grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    /// Hand type at this position.
    pub hand_type: HandType,
    /// Range weight, 0 when the type is not in the range.
    pub weight: f64,
    /// Strategy, empty when the type has no board-legal combo in the range.
    pub probabilities: Vec<f64>,
}

/// Heads-up postflop MCCFR solver.
pub struct PostflopSolver {
    engine: MccfrSolver<PostflopGame>,
    tree: Option<GameTree>,
    callback: Option<ProgressCallback>,
}

impl PostflopSolver {
    /// Create a solver with a validated configuration.
    ///
    /// Nothing can be solved before [`PostflopSolver::initialize`].
    pub fn new(config: SolverConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: SolverConfig) -> Self {
        let empty = PostflopGame::new(GameState::default(), Range::new(), Range::new());
        Self {
            engine: MccfrSolver::new(empty, config),
            tree: None,
            callback: None,
        }
    }

    /// Set the spot to solve. Clears every info set and the iteration count.
    ///
    /// The state must have a board; betting may already be under way.
    pub fn initialize(&mut self, state: GameState, oop_range: Range, ip_range: Range) -> Result<(), StateError> {
        if state.board().is_empty() {
            return Err(StateError::WrongBoardSize { expected: 3, actual: 0 });
        }
        let dead = state.board().mask();
        let tree = GameTree::build(&state);
        log::info!(
            "initialized on {} ({}): OOP {} types / {} combos, IP {} types / {} combos, {}",
            state.board(),
            state.street(),
            oop_range.len(),
            oop_range.available_hands(dead).len(),
            ip_range.len(),
            ip_range.available_hands(dead).len(),
            tree
        );
        self.engine.set_game(PostflopGame::new(state, oop_range, ip_range));
        self.tree = Some(tree);
        Ok(())
    }

    /// Install a callback invoked during [`PostflopSolver::solve`].
    pub fn set_progress_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&SolveProgress) + 'static,
    {
        self.callback = Some(Box::new(callback));
    }

    /// Remove the progress callback.
    pub fn clear_progress_callback(&mut self) {
        self.callback = None;
    }

    /// One MCCFR iteration. `false` when no deal was possible.
    pub fn run_iteration(&mut self) -> bool {
        self.engine.run_iteration()
    }

    /// Run a fixed number of iterations, ignoring the stop flag.
    pub fn train(&mut self, iterations: u64) -> &SolveStats {
        self.engine.train(iterations)
    }

    /// Run the configured number of iterations or until stopped.
    pub fn solve(&mut self) -> &SolveStats {
        match self.callback.as_mut() {
            Some(cb) => self.engine.solve(Some(|p: &SolveProgress| cb(p))),
            None => self.engine.solve(None::<fn(&SolveProgress)>),
        }
    }

    /// Request the solve loop to stop.
    pub fn stop(&self) {
        self.engine.stop();
    }

    /// Clonable stop flag, usable from a progress callback.
    pub fn stop_handle(&self) -> StopHandle {
        self.engine.stop_handle()
    }

    /// Whether a stop was requested.
    pub fn is_stopped(&self) -> bool {
        self.engine.is_stopped()
    }

    /// Clear learned strategies and counters, keeping the spot.
    pub fn reset(&mut self) {
        self.engine.reset();
    }

    /// Completed iterations.
    pub fn current_iteration(&self) -> u64 {
        self.engine.iteration()
    }

    /// Progress proxy, `100 / sqrt(iterations)`. Not a best-response value.
    pub fn exploitability(&self) -> f64 {
        self.engine.exploitability()
    }

    /// Solver configuration.
    pub fn config(&self) -> &SolverConfig {
        self.engine.config()
    }

    /// Statistics of the last batch.
    pub fn stats(&self) -> &SolveStats {
        self.engine.stats()
    }

    /// Number of info sets discovered.
    pub fn num_info_sets(&self) -> usize {
        self.engine.num_info_sets()
    }

    /// Tree of the initial betting round, once initialized.
    pub fn tree(&self) -> Option<&GameTree> {
        self.tree.as_ref()
    }

    /// The spot being solved.
    pub fn initial_state(&self) -> &GameState {
        self.engine.game().initial_state()
    }

    /// Range of a player.
    pub fn range(&self, player: Player) -> &Range {
        self.engine.game().range(player)
    }

    /// First decision of `player` on the initial street.
    ///
    /// This is the initial state when `player` acts first, or the state after
    /// the first player checks otherwise.
    pub fn decision_point(&self, player: Player) -> Option<GameState> {
        let initial = self.initial_state();
        match initial.current_player()? {
            p if p == player => Some(initial.clone()),
            _ => {
                if !initial.available_actions().contains(&PokerAction::Check) {
                    return None;
                }
                let checked = initial.after_action(PokerAction::Check);
                (checked.current_player() == Some(player)).then_some(checked)
            }
        }
    }

    /// Actions of `player` at their decision point.
    pub fn actions(&self, player: Player) -> Vec<PokerAction> {
        self.decision_point(player)
            .map(|s| s.available_actions())
            .unwrap_or_default()
    }

    /// Average strategy of a concrete hand at its decision point.
    ///
    /// Unvisited info sets fall back to uniform.
    pub fn strategy(&self, player: Player, hand: &Hand) -> NodeStrategy {
        let hand_type = hand.hand_type();
        let Some(state) = self.decision_point(player) else {
            return NodeStrategy {
                hand_type,
                actions: vec![],
                action_names: vec![],
                probabilities: vec![],
                visited: false,
            };
        };
        let actions = state.available_actions();
        let key = InfoSetKey::from_state(&state, player, hand);
        NodeStrategy {
            hand_type,
            action_names: actions.iter().map(|a| a.to_string()).collect(),
            probabilities: self.engine.average_strategy(&key, actions.len()),
            visited: self.engine.info_set(&key).is_some(),
            actions,
        }
    }

    /// One strategy per hand type of the range that has a board-legal combo.
    pub fn all_strategies(&self, player: Player) -> Vec<NodeStrategy> {
        let dead = self.initial_state().board().mask();
        self.range(player)
            .hand_types()
            .filter_map(|ht| ht.expand().into_iter().find(|h| !h.conflicts(dead)))
            .map(|hand| self.strategy(player, &hand))
            .collect()
    }

    /// Range-weighted average of every board-legal combo's strategy.
    pub fn aggregated_strategy(&self, player: Player) -> Vec<f64> {
        let num_actions = self.actions(player).len();
        let mut aggregated = vec![0.0; num_actions];
        let mut total = 0.0;
        for (hand, weight) in self.engine.game().available_hands(player) {
            let strategy = self.strategy(player, hand);
            for (acc, p) in aggregated.iter_mut().zip(&strategy.probabilities) {
                *acc += weight * p;
            }
            total += weight;
        }
        if total > 0.0 {
            aggregated.iter_mut().for_each(|v| *v /= total);
        }
        aggregated
    }

    /// Strategies laid out on the 13x13 hand grid.
    pub fn strategy_grid(&self, player: Player) -> Vec<Vec<GridCell>> {
        let range = self.range(player);
        let dead = self.initial_state().board().mask();
        (0..13)
            .map(|row| {
                (0..13)
                    .filter_map(|col| HandType::from_grid(row, col))
                    .map(|hand_type| {
                        let weight = range.weight(&hand_type);
                        let representative = if weight > 0.0 {
                            hand_type.expand().into_iter().find(|h| !h.conflicts(dead))
                        } else {
                            None
                        };
                        GridCell {
                            hand_type,
                            weight,
                            probabilities: representative
                                .map(|h| self.strategy(player, &h).probabilities)
                                .unwrap_or_default(),
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

impl Default for PostflopSolver {
    fn default() -> Self {
        Self::with_valid_config(SolverConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::postflop::betting::BetSizingConfig;
    use crate::games::postflop::card::Board;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn flop(config: BetSizingConfig) -> GameState {
        let mut state = GameState::new(config).unwrap();
        state.set_board("Ks8d3c".parse::<Board>().unwrap()).unwrap();
        state
    }

    fn trimmed_sizing() -> BetSizingConfig {
        BetSizingConfig {
            oop_flop_bets: vec![50.0],
            oop_turn_bets: vec![75.0],
            oop_river_bets: vec![75.0],
            ip_flop_bets: vec![50.0],
            ip_turn_bets: vec![75.0],
            ip_river_bets: vec![75.0],
            max_raises_per_street: Some(1),
            ..Default::default()
        }
    }

    fn solver_with(sizing: BetSizingConfig, oop: &str, ip: &str, seed: u64) -> PostflopSolver {
        let config = SolverConfig::default().with_seed(seed);
        let mut solver = PostflopSolver::new(config).unwrap();
        solver
            .initialize(flop(sizing), oop.parse().unwrap(), ip.parse().unwrap())
            .unwrap();
        solver
    }

    fn solver(oop: &str, ip: &str, seed: u64) -> PostflopSolver {
        solver_with(trimmed_sizing(), oop, ip, seed)
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SolverConfig::default().with_exploration(2.0);
        assert!(PostflopSolver::new(config).is_err());
    }

    #[test]
    fn test_initialize_requires_board() {
        let mut solver = PostflopSolver::default();
        let state = GameState::default();
        let result = solver.initialize(state, "AA".parse().unwrap(), "KK".parse().unwrap());
        assert!(matches!(result, Err(StateError::WrongBoardSize { .. })));
        assert!(!solver.run_iteration());
    }

    #[test]
    fn test_unvisited_strategy_is_uniform() {
        let solver = solver("AA", "22", 1);
        let hand: Hand = "AhAd".parse().unwrap();
        let strategy = solver.strategy(Player::Oop, &hand);
        assert!(!strategy.visited);
        assert_eq!(strategy.actions.len(), 2);
        assert_eq!(strategy.action_names, vec!["Check", "Bet 3.50bb (50%)"]);
        assert!(strategy.probabilities.iter().all(|&p| (p - 0.5).abs() < 1e-12));
    }

    #[test]
    fn test_decision_points() {
        let solver = solver("AA", "22", 1);
        let oop = solver.decision_point(Player::Oop).unwrap();
        assert!(oop.action_history().is_empty());
        let ip = solver.decision_point(Player::Ip).unwrap();
        assert_eq!(ip.action_history(), &[PokerAction::Check]);
        assert_eq!(ip.current_player(), Some(Player::Ip));
    }

    #[test]
    fn test_initialize_resets() {
        let mut solver = solver("AA", "22", 2);
        solver.train(20);
        assert!(solver.num_info_sets() > 0);
        solver
            .initialize(flop(trimmed_sizing()), "QQ".parse().unwrap(), "JJ".parse().unwrap())
            .unwrap();
        assert_eq!(solver.current_iteration(), 0);
        assert_eq!(solver.num_info_sets(), 0);
        assert!(solver.tree().is_some());
    }

    #[test]
    fn test_empty_range_iterations_are_noops() {
        let mut solver = solver("KK", "KK", 3);
        assert!(!solver.run_iteration());
        assert_eq!(solver.current_iteration(), 0);
    }

    #[test]
    fn test_progress_callback_and_stop() {
        let config = SolverConfig::default()
            .with_seed(4)
            .with_iterations(500)
            .with_progress_interval(50);
        let mut solver = PostflopSolver::new(config).unwrap();
        solver
            .initialize(flop(trimmed_sizing()), "AA".parse().unwrap(), "22".parse().unwrap())
            .unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let handle = solver.stop_handle();
        let sink = Rc::clone(&seen);
        solver.set_progress_callback(move |p| {
            sink.borrow_mut().push(p.clone());
            if p.iteration >= 100 {
                handle.stop();
            }
        });
        solver.solve();

        assert_eq!(solver.current_iteration(), 100);
        assert!(solver.is_stopped());
        let reports = seen.borrow();
        assert!(reports.last().unwrap().complete);
        assert!(reports[0].exploitability > reports.last().unwrap().exploitability);

        solver.reset();
        assert!(!solver.is_stopped());
        assert_eq!(solver.current_iteration(), 0);
    }

    #[test]
    fn test_grid_and_all_strategies() {
        let mut solver = solver("AA,KK,AKs", "22", 5);
        solver.train(50);

        // KK and AKs each keep three legal combos on Ks8d3c
        let all = solver.all_strategies(Player::Oop);
        assert_eq!(all.len(), 3);

        let grid = solver.strategy_grid(Player::Oop);
        assert_eq!(grid.len(), 13);
        assert!(grid.iter().all(|row| row.len() == 13));
        let filled = grid.iter().flatten().filter(|c| !c.probabilities.is_empty()).count();
        assert_eq!(filled, 3);
        let (row, col) = "AKs".parse::<HandType>().unwrap().grid_position();
        assert_eq!(grid[row][col].weight, 100.0);
    }

    /// Flop-only betting: turn and river are checked down, so every decision
    /// of either player sits on the flop and is visited on most iterations.
    fn flop_only_shove_sizing() -> BetSizingConfig {
        BetSizingConfig {
            oop_turn_bets: vec![],
            oop_river_bets: vec![],
            ip_turn_bets: vec![],
            ip_river_bets: vec![],
            ..BetSizingConfig::single_size(50.0).with_stack_size(20.0)
        }
    }

    #[test]
    fn test_flop_only_sizing_checks_down_later_streets() {
        let solver = solver_with(flop_only_shove_sizing(), "AA", "22", 1);
        let ip = solver.decision_point(Player::Ip).unwrap();
        let closed = ip.after_action(PokerAction::Check);
        assert!(closed.needs_board_card());

        let turn = closed.after_card("2h".parse().unwrap());
        assert_eq!(turn.available_actions(), vec![PokerAction::Check]);
        let river = turn
            .after_action(PokerAction::Check)
            .after_action(PokerAction::Check)
            .after_card("7s".parse().unwrap());
        assert_eq!(river.available_actions(), vec![PokerAction::Check]);
    }

    #[test]
    fn test_strong_pair_bets_more_than_weak_pair() {
        // 20bb stacks make every flop bet a shove. Shoving wins the 3.5bb
        // IP put in; checking down gives 22 two free cards at its set.
        let mut solver = solver_with(flop_only_shove_sizing(), "AA", "22", 42);
        assert_eq!(solver.actions(Player::Oop), vec![PokerAction::Check, PokerAction::AllIn(1650)]);
        assert_eq!(solver.actions(Player::Ip), vec![PokerAction::Check, PokerAction::AllIn(1650)]);
        solver.train(3_000);

        let oop = solver.aggregated_strategy(Player::Oop);
        let ip = solver.aggregated_strategy(Player::Ip);
        assert!((oop.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!((ip.iter().sum::<f64>() - 1.0).abs() < 1e-9);

        let bet_mass = |player: Player, probs: &[f64]| -> f64 {
            solver
                .actions(player)
                .iter()
                .zip(probs)
                .filter(|(a, _)| a.is_aggressive())
                .map(|(_, p)| p)
                .sum()
        };
        let oop_bets = bet_mass(Player::Oop, &oop);
        let ip_bets = bet_mass(Player::Ip, &ip);
        assert!(oop_bets > ip_bets + 0.2, "OOP bets {:.3}, IP bets {:.3}", oop_bets, ip_bets);

        for player in Player::BOTH {
            for strategy in solver.all_strategies(player) {
                assert!(strategy.visited);
                let sum: f64 = strategy.probabilities.iter().sum();
                assert!((sum - 1.0).abs() < 1e-9);
                assert!(strategy.aggressive_frequency() <= 1.0 + 1e-9);
            }
        }
    }
}
