//! Information-set keys for postflop play.
//!
//! A decision point is identified by the acting player, their hand type, the
//! board and the full public action sequence. The key is a fixed-width `Copy`
//! value so that table lookups never allocate.

use std::fmt;

use super::hand::{Hand, HandType};
use super::state::{GameState, Player};

/// Information-set key for a postflop player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InfoSetKey {
    /// Player position (OOP=0, IP=1)
    pub player: u8,
    /// Hand type index (0-168)
    pub hand_type: u8,
    /// Board bitmask
    pub board: u64,
    /// Hash of the action history, with board changes mixed in
    pub history: u64,
}

impl InfoSetKey {
    /// Create a new key.
    pub fn new(player: Player, hand_type: HandType, board: u64, history: u64) -> Self {
        Self {
            player: player.index() as u8,
            hand_type: hand_type.index(),
            board,
            history,
        }
    }

    /// Key of `player` holding `hand` at `state`.
    pub fn from_state(state: &GameState, player: Player, hand: &Hand) -> Self {
        Self::new(player, hand.hand_type(), state.board().mask(), state.history_hash())
    }

    /// Get the player.
    pub fn player(&self) -> Player {
        Player::from_index(self.player as usize)
    }
}

impl fmt::Display for InfoSetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (row, col) = (self.hand_type / 13, self.hand_type % 13);
        let name = HandType::from_grid(row as usize, col as usize)
            .map(|h| h.name())
            .unwrap_or_else(|| "??".to_string());
        write!(
            f,
            "{}:{}|{:013x}|{:016x}",
            self.player(),
            name,
            self.board,
            self.history
        )
    }
}
