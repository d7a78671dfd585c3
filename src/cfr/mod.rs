//! MCCFR (Monte Carlo Counterfactual Regret Minimization) engine.
//!
//! This module provides a generic external-sampling MCCFR solver for
//! two-player zero-sum extensive-form games.
//!
//! # Overview
//!
//! Each iteration:
//! 1. Deals private information once (a chance event handled by the game)
//! 2. Walks the game once per player, expanding that player's actions fully
//!    and sampling the opponent's and chance's actions
//! 3. Updates regrets and the reach-weighted strategy sum at every visited
//!    decision of the traversing player
//!
//! # Supported Variants
//!
//! - **External-sampling MCCFR**: the default traversal
//! - **Discounted CFR**: periodic regret and strategy-sum decay
//! - **CFR+**: floors cumulative regrets at zero
//! - **Linear averaging**: weights later iterations more heavily
//!
//! # Example
//!
//! ```
//! use postflop_mccfr::cfr::{MccfrSolver, SolverConfig};
//! use postflop_mccfr::games::kuhn::{KuhnKey, KuhnNode, KuhnPoker};
//!
//! let mut solver = MccfrSolver::new(KuhnPoker::new(), SolverConfig::vanilla().with_seed(1));
//! let stats = solver.train(1_000);
//! assert_eq!(stats.iterations, 1_000);
//!
//! let king_facing_bet = KuhnKey { card: 2, node: KuhnNode::Bet };
//! let strategy = solver.average_strategy(&king_facing_bet, 2);
//! assert!((strategy.iter().sum::<f64>() - 1.0).abs() < 1e-9);
//! ```
//!
//! # Theory
//!
//! **Regret**: The difference between the value of an action and the value of the current strategy.
//! ```text
//! Regret(a) = Value(a) - Value(current_strategy)
//! ```
//!
//! **Regret Matching**: Set strategy proportional to positive regrets.
//! ```text
//! Strategy(a) = max(0, Regret(a)) / sum(max(0, Regret(a')))
//! ```
//!
//! # References
//!
//! - Zinkevich, M., et al. "Regret Minimization in Games with Incomplete Information" (2007)
//! - Lanctot, M., et al. "Monte Carlo Sampling for Regret Minimization in Extensive Games" (2009)
//! - Brown, N., Sandholm, T. "Solving Imperfect-Information Games via Discounted Regret Minimization" (2019)

pub mod config;
pub mod game;
pub mod solver;
pub mod storage;

pub use config::{ConfigError, DiscountConfig, SolveProgress, SolveStats, SolverConfig};
pub use game::{Action, Game, InfoKey, NUM_PLAYERS};
pub use solver::{progress_proxy, MccfrSolver, StopHandle};
pub use storage::{regret_matching, InfoSet, InfoSetTable};
