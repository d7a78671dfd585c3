//! Monte Carlo Counterfactual Regret Minimization (MCCFR) Solver.
//!
//! External sampling: every iteration deals once, then walks the game twice,
//! once per traversing player. The traverser's decisions are expanded fully
//! while opponent and chance decisions are sampled.
//!
//! The solver is generic over any game that implements the `Game` trait.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cfr::config::{SolveProgress, SolveStats, SolverConfig};
use crate::cfr::game::{Game, NUM_PLAYERS};
use crate::cfr::storage::{InfoSetTable, InfoSet};

/// Progress proxy reported as "exploitability".
///
/// This is `100 / sqrt(iterations)` (and `1.0` before the first iteration).
/// It only depends on the iteration count and is not a best-response
/// distance, so it must not be read as a convergence certificate.
pub fn progress_proxy(iterations: u64) -> f64 {
    if iterations == 0 {
        1.0
    } else {
        100.0 / (iterations as f64).sqrt()
    }
}

/// Clonable advisory stop flag.
///
/// The flag is checked between iterations; a traversal in flight always
/// completes first.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// Request the solve loop to stop.
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether a stop has been requested.
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    fn clear(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// The MCCFR solver.
///
/// # Type Parameters
/// - `G`: The game type implementing the `Game` trait
///
/// # Example
/// ```
/// use postflop_mccfr::cfr::{MccfrSolver, SolverConfig};
/// use postflop_mccfr::games::kuhn::KuhnPoker;
///
/// let mut solver = MccfrSolver::new(KuhnPoker::new(), SolverConfig::default().with_seed(1));
/// solver.train(100);
/// assert_eq!(solver.iteration(), 100);
/// ```
pub struct MccfrSolver<G: Game> {
    /// The game being solved.
    game: G,

    /// Configuration for the solver.
    config: SolverConfig,

    /// Regrets and strategy sums.
    table: InfoSetTable<G::Key>,

    /// Completed iterations.
    iteration: u64,

    /// Statistics tracking.
    stats: SolveStats,

    /// Random number generator.
    rng: StdRng,

    /// Advisory cancellation flag.
    stop: StopHandle,
}

impl<G: Game> MccfrSolver<G> {
    /// Create a new solver for the given game.
    pub fn new(game: G, config: SolverConfig) -> Self {
        let rng = Self::make_rng(&config);
        Self {
            game,
            config,
            table: InfoSetTable::new(),
            iteration: 0,
            stats: SolveStats::default(),
            rng,
            stop: StopHandle::default(),
        }
    }

    fn make_rng(config: &SolverConfig) -> StdRng {
        match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Replace the game and clear all learned state.
    pub fn set_game(&mut self, game: G) {
        self.game = game;
        self.reset();
    }

    /// Run a single iteration.
    ///
    /// # Returns
    /// `false` if no deal was possible; the iteration is then a no-op and the
    /// counter is not advanced.
    pub fn run_iteration(&mut self) -> bool {
        let root = match self.game.deal(&mut self.rng) {
            Some(state) => state,
            None => {
                self.stats.skipped_deals += 1;
                return false;
            }
        };

        for traverser in 0..NUM_PLAYERS {
            self.traverse(&root, traverser, [1.0; NUM_PLAYERS]);
        }

        self.iteration += 1;

        if let Some(discount) = self.config.discount {
            if self.iteration % discount.interval == 0 {
                let (pos, neg, strat) = discount.factors(self.iteration);
                log::debug!(
                    "discounting at iteration {}: positive {:.4}, negative {:.4}, strategy {:.4}",
                    self.iteration,
                    pos,
                    neg,
                    strat
                );
                self.table.discount(pos, neg, strat);
            }
        }
        true
    }

    /// Train the solver for a number of iterations, ignoring the stop flag.
    pub fn train(&mut self, iterations: u64) -> &SolveStats {
        let start = Instant::now();
        for _ in 0..iterations {
            self.run_iteration();
        }
        self.finish_stats(start, iterations);
        &self.stats
    }

    /// Run `config.iterations` iterations, honoring the stop flag.
    ///
    /// The callback is invoked every `config.progress_interval` attempted
    /// iterations and once more when the loop ends.
    pub fn solve<F>(&mut self, mut callback: Option<F>) -> &SolveStats
    where
        F: FnMut(&SolveProgress),
    {
        let total = self.config.iterations;
        let interval = self.config.progress_interval.max(1);
        let start = Instant::now();
        let skipped_before = self.stats.skipped_deals;
        let mut attempted = 0u64;

        log::info!("solve started: {} iterations", total);

        while attempted < total && !self.stop.is_stopped() {
            self.run_iteration();
            attempted += 1;

            if attempted % interval == 0 && attempted < total {
                let progress = self.progress(total, false);
                log::debug!("{}", progress.status);
                if let Some(cb) = callback.as_mut() {
                    cb(&progress);
                }
            }
        }

        self.finish_stats(start, attempted);

        let skipped = self.stats.skipped_deals - skipped_before;
        if attempted > 0 && skipped == attempted {
            log::warn!("no iteration could deal private information; nothing was learned");
        }
        log::info!(
            "solve finished: {} iterations, {} info sets, {:.0} it/s{}",
            self.iteration,
            self.table.len(),
            self.stats.iterations_per_second,
            if self.stop.is_stopped() { " (stopped)" } else { "" }
        );

        let progress = self.progress(total, true);
        if let Some(cb) = callback.as_mut() {
            cb(&progress);
        }
        &self.stats
    }

    fn progress(&self, total: u64, complete: bool) -> SolveProgress {
        let exploitability = progress_proxy(self.iteration);
        let status = if complete {
            if self.stop.is_stopped() {
                format!("stopped after {} iterations", self.iteration)
            } else {
                format!("complete: {} iterations", self.iteration)
            }
        } else {
            format!(
                "iteration {}/{} ({} info sets, proxy {:.3})",
                self.iteration,
                total,
                self.table.len(),
                exploitability
            )
        };
        SolveProgress {
            iteration: self.iteration,
            total,
            exploitability,
            complete,
            status,
        }
    }

    fn finish_stats(&mut self, start: Instant, batch: u64) {
        self.stats.iterations = self.iteration;
        self.stats.info_sets = self.table.len();
        self.stats.elapsed_seconds = start.elapsed().as_secs_f64();
        self.stats.update_rate(batch);
    }

    /// Core external-sampling traversal.
    ///
    /// Returns the value of `state` for `traverser`.
    fn traverse(&mut self, state: &G::State, traverser: usize, reach: [f64; NUM_PLAYERS]) -> f64 {
        if self.game.is_chance(state) {
            let next = self.game.sample_chance(state, &mut self.rng);
            return self.traverse(&next, traverser, reach);
        }

        if self.game.is_terminal(state) {
            return self.game.payoff(state, traverser);
        }

        let player = match self.game.current_player(state) {
            Some(p) => p,
            None => return self.game.payoff(state, traverser),
        };

        let actions = self.game.available_actions(state);
        if actions.is_empty() {
            return self.game.payoff(state, traverser);
        }

        let key = self.game.info_key(state);

        if player == traverser {
            self.traverse_player(state, traverser, reach, &actions, key)
        } else {
            self.traverse_opponent(state, traverser, reach, &actions, key, player)
        }
    }

    /// Traverser's decision: expand every action and update regrets.
    fn traverse_player(
        &mut self,
        state: &G::State,
        traverser: usize,
        reach: [f64; NUM_PLAYERS],
        actions: &[G::Action],
        key: G::Key,
    ) -> f64 {
        let strategy = self.table.entry(key, actions.len()).strategy().to_vec();

        let mut action_values = vec![0.0; actions.len()];
        for (i, action) in actions.iter().enumerate() {
            let next = self.game.apply_action(state, action);
            let mut next_reach = reach;
            next_reach[traverser] *= strategy[i];
            action_values[i] = self.traverse(&next, traverser, next_reach);
        }

        let node_value: f64 = strategy
            .iter()
            .zip(&action_values)
            .map(|(&s, &v)| s * v)
            .sum();

        let opponent_reach = reach[1 - traverser];
        let regret_weight = if self.config.weight_regrets_by_opponent_reach {
            opponent_reach
        } else {
            1.0
        };
        let deltas: Vec<f64> = action_values
            .iter()
            .map(|&v| regret_weight * (v - node_value))
            .collect();

        let avg_weight = if self.config.use_linear_averaging {
            reach[traverser] * (self.iteration + 1) as f64
        } else {
            reach[traverser]
        };

        let set = self.table.entry(key, actions.len());
        set.add_regrets(&deltas, self.config.use_cfr_plus);
        set.update_strategy();
        set.accumulate_strategy(avg_weight);

        node_value
    }

    /// Opponent's decision: sample one action and recurse into it.
    fn traverse_opponent(
        &mut self,
        state: &G::State,
        traverser: usize,
        mut reach: [f64; NUM_PLAYERS],
        actions: &[G::Action],
        key: G::Key,
        player: usize,
    ) -> f64 {
        let strategy = self.table.current_strategy(&key, actions.len());

        let idx = if self.config.exploration > 0.0 && self.rng.gen::<f64>() < self.config.exploration {
            self.rng.gen_range(0..actions.len())
        } else {
            self.sample_action(&strategy)
        };

        let next = self.game.apply_action(state, &actions[idx]);
        reach[player] *= strategy[idx];
        self.traverse(&next, traverser, reach)
    }

    /// Sample an action index according to a probability distribution.
    fn sample_action(&mut self, strategy: &[f64]) -> usize {
        let r: f64 = self.rng.gen();
        let mut cumsum = 0.0;

        for (i, &prob) in strategy.iter().enumerate() {
            cumsum += prob;
            if r < cumsum {
                return i;
            }
        }

        // floating point slack
        strategy.len() - 1
    }

    /// Current (regret-matched) strategy for an info set.
    pub fn current_strategy(&self, key: &G::Key, num_actions: usize) -> Vec<f64> {
        self.table.current_strategy(key, num_actions)
    }

    /// Time-averaged strategy for an info set, uniform if unseen.
    pub fn average_strategy(&self, key: &G::Key, num_actions: usize) -> Vec<f64> {
        self.table.average_strategy(key, num_actions)
    }

    /// Raw info set, `None` if never visited by a traverser.
    pub fn info_set(&self, key: &G::Key) -> Option<&InfoSet> {
        self.table.get(key)
    }

    /// Progress proxy for the current iteration count.
    pub fn exploitability(&self) -> f64 {
        progress_proxy(self.iteration)
    }

    /// Completed iterations.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Number of information sets discovered.
    pub fn num_info_sets(&self) -> usize {
        self.table.len()
    }

    /// Statistics of the last training batch.
    pub fn stats(&self) -> &SolveStats {
        &self.stats
    }

    /// Info set table, for analysis.
    pub fn table(&self) -> &InfoSetTable<G::Key> {
        &self.table
    }

    /// The game being solved.
    pub fn game(&self) -> &G {
        &self.game
    }

    /// Solver configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Replace the configuration; the RNG is reseeded.
    pub fn set_config(&mut self, config: SolverConfig) {
        self.rng = Self::make_rng(&config);
        self.config = config;
    }

    /// Handle that can stop a running `solve` from a callback or elsewhere.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Request the solve loop to stop at the next iteration boundary.
    pub fn stop(&self) {
        self.stop.stop();
    }

    /// Whether a stop has been requested.
    pub fn is_stopped(&self) -> bool {
        self.stop.is_stopped()
    }

    /// Clear info sets, counters and the stop flag. The RNG is reseeded.
    pub fn reset(&mut self) {
        self.table.clear();
        self.iteration = 0;
        self.stats = SolveStats::default();
        self.rng = Self::make_rng(&self.config);
        self.stop.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::kuhn::{KuhnPoker, KuhnNode, KuhnKey};

    #[test]
    fn test_progress_proxy_decreases() {
        assert_eq!(progress_proxy(0), 1.0);
        assert_eq!(progress_proxy(100), 10.0);
        assert!(progress_proxy(10_000) < progress_proxy(100));
    }

    #[test]
    fn test_iteration_counter_and_reset() {
        let mut solver = MccfrSolver::new(KuhnPoker::new(), SolverConfig::default().with_seed(3));
        solver.train(10);
        assert_eq!(solver.iteration(), 10);
        assert!(solver.num_info_sets() > 0);

        solver.reset();
        assert_eq!(solver.iteration(), 0);
        assert_eq!(solver.num_info_sets(), 0);
        assert_eq!(solver.exploitability(), 1.0);
    }

    #[test]
    fn test_solve_reports_progress_and_stops() {
        let config = SolverConfig::default()
            .with_seed(5)
            .with_iterations(1_000)
            .with_progress_interval(100);
        let mut solver = MccfrSolver::new(KuhnPoker::new(), config);
        let handle = solver.stop_handle();

        let mut reports = Vec::new();
        solver.solve(Some(|p: &SolveProgress| {
            reports.push(p.clone());
            if p.iteration >= 300 {
                handle.stop();
            }
        }));

        assert_eq!(solver.iteration(), 300);
        let last = reports.last().unwrap();
        assert!(last.complete);
        assert_eq!(last.total, 1_000);
        assert!(reports[..reports.len() - 1].iter().all(|p| !p.complete));

        // stop flag is honored at the top of the loop
        solver.solve(None::<fn(&SolveProgress)>);
        assert_eq!(solver.iteration(), 300);

        solver.reset();
        assert!(!solver.is_stopped());
    }

    #[test]
    fn test_strategies_are_distributions() {
        let mut solver = MccfrSolver::new(KuhnPoker::new(), SolverConfig::default().with_seed(11));
        solver.train(2_000);
        for (_, set) in solver.table().iter() {
            let avg = set.average_strategy();
            let sum: f64 = avg.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9);
            assert!(avg.iter().all(|&p| p >= 0.0));
            let cur: f64 = set.strategy().iter().sum();
            assert!((cur - 1.0).abs() < 1e-9);
        }
        let unseen = KuhnKey { card: 0, node: KuhnNode::Root };
        assert_eq!(solver.average_strategy(&unseen, 2).len(), 2);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let config = SolverConfig::default().with_seed(99);
        let mut a = MccfrSolver::new(KuhnPoker::new(), config.clone());
        let mut b = MccfrSolver::new(KuhnPoker::new(), config);
        a.train(500);
        b.train(500);
        let key = KuhnKey { card: 1, node: KuhnNode::Bet };
        assert_eq!(a.average_strategy(&key, 2), b.average_strategy(&key, 2));
    }
}
