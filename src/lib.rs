//! # Postflop MCCFR
//!
//! A heads-up postflop poker solver built on a generic Monte Carlo
//! Counterfactual Regret Minimization (MCCFR) engine.
//!
//! ## Features
//!
//! - **Generic MCCFR Engine**: Works with any game implementing the `Game` trait
//! - **Variants**: External sampling with optional DCFR discounting, CFR+ and linear averaging
//! - **Table-Driven Evaluator**: 5 to 7 card hands ranked into 7462 classes
//! - **Ranges**: Weighted range notation ("22+, AKs@50, KQo")
//! - **Betting Menus**: Per-street pot-fraction sizes, raise multiplier and all-in collapsing
//!
//! ## Quick Start
//!
//! ```
//! use postflop_mccfr::cfr::SolverConfig;
//! use postflop_mccfr::games::postflop::{Board, BetSizingConfig, GameState, Player, PostflopSolver};
//!
//! // 1. Describe the spot
//! let mut state = GameState::new(BetSizingConfig::single_size(50.0)).unwrap();
//! state.set_board("Ks8d3c".parse::<Board>().unwrap()).unwrap();
//!
//! // 2. Create a solver and set the ranges
//! let mut solver = PostflopSolver::new(SolverConfig::default().with_seed(1)).unwrap();
//! solver.initialize(state, "AA,KK".parse().unwrap(), "QQ-22".parse().unwrap()).unwrap();
//!
//! // 3. Train
//! solver.train(100);
//!
//! // 4. Get strategies
//! let hand = "AhAd".parse().unwrap();
//! let strategy = solver.strategy(Player::Oop, &hand);
//! assert_eq!(strategy.probabilities.len(), strategy.actions.len());
//! ```
//!
//! ## Modules
//!
//! - [`cfr`]: Core MCCFR algorithm and solver
//! - [`games`]: Game implementations (Kuhn Poker, postflop hold'em)
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    MCCFR Solver (Generic)                       │
//! │  - Regret accumulation    - Strategy averaging                  │
//! │  - External sampling      - Discounting                         │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               │ implements Game trait
//!                               ▼
//!               ┌───────────────┴───────────────┐
//!               │                               │
//!               ▼                               ▼
//!          ┌─────────┐                 ┌─────────────────┐
//!          │  Kuhn   │                 │    Postflop     │
//!          │  Poker  │                 │ ranges, betting │
//!          └─────────┘                 │  evaluator      │
//!                                      └─────────────────┘
//! ```

#![warn(missing_docs)]

/// MCCFR (Monte Carlo Counterfactual Regret Minimization) solver module.
///
/// This is the core module containing the generic algorithm.
pub mod cfr;

/// Game implementations module.
///
/// Contains Kuhn Poker for validation and the postflop game.
pub mod games;

// Re-export commonly used types at crate root for convenience
pub use cfr::{Action, Game, MccfrSolver, SolveProgress, SolveStats, SolverConfig};
pub use games::postflop::{GameState, PostflopSolver, Range};
