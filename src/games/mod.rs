//! Game implementations for the MCCFR solver.
//!
//! ## Available Games
//!
//! - [`kuhn`]: Kuhn Poker, a 3-card toy game with a known Nash equilibrium.
//!   It validates the engine.
//! - [`postflop`]: Heads-up no-limit hold'em from the flop on, with ranges,
//!   bet sizing menus and turn/river dealing.
//!
//! ## Adding New Games
//!
//! To add a new game:
//!
//! 1. Create a new module under `src/games/`
//! 2. Define state, action, and info key types
//! 3. Implement the `Game` trait
//! 4. Add tests that verify expected behavior
//!
//! See the [`kuhn`] module for a complete example.

pub mod kuhn;
pub mod postflop;
