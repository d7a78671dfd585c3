//! Heads-up postflop poker.
//!
//! This module provides everything needed to solve a two-player hand from
//! the flop on with MCCFR, starting from a board, two ranges and a bet
//! sizing menu.
//!
//! ## Modules
//!
//! - `card`: Cards, streets and boards
//! - `hand`: Two-card hands and the 169 hand types
//! - `range`: Weighted ranges and range notation
//! - `hand_eval`: Table-driven hand evaluation
//! - `action`: Betting actions and chip amounts
//! - `betting`: Bet sizing menus and legal action generation
//! - `state`: Betting state machine
//! - `info_state`: Information-set keys
//! - `tree`: Arena tree of one betting round
//! - `game`: `Game` adaptor with range sampling and board dealing
//! - `solver`: Public solver and strategy queries
//! - `report`: Serializable strategy reports

pub mod card;
pub mod hand;
pub mod range;
pub mod hand_eval;
pub mod action;
pub mod betting;
pub mod state;
pub mod info_state;
pub mod tree;
pub mod game;
pub mod solver;
pub mod report;

// Re-export commonly used types
pub use card::{Board, Card, CardError, Street};
pub use hand::{Hand, HandType};
pub use range::{Range, RangeParseError};
pub use hand_eval::{EvalResult, HandCategory, HandEvaluator};
pub use action::{bb_to_centi, centi_to_bb, Chips, PokerAction};
pub use betting::BetSizingConfig;
pub use state::{GameState, Player, StateError};
pub use info_state::InfoSetKey;
pub use tree::{GameTree, NodeKind, TreeNode};
pub use game::{PostflopGame, Spot};
pub use solver::{GridCell, NodeStrategy, PostflopSolver};
pub use report::SolveReport;
