//! Postflop betting actions.
//!
//! Amounts are integer centi-big-blinds (100 = 1bb) so that investments
//! compare exactly. Every amount is the number of chips the actor adds to
//! the pot with this action.

use std::fmt;

/// Chip amount in centi-BB.
pub type Chips = u32;

/// A poker betting action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PokerAction {
    /// Fold the hand, forfeiting any money invested.
    Fold,
    /// Check (pass action when no bet to call).
    Check,
    /// Call the current bet.
    Call(Chips),
    /// Open the betting with a pot-fraction sized bet.
    Bet {
        /// Chips added.
        amount: Chips,
        /// Size as a percentage of the pot before the bet.
        pot_pct: u16,
    },
    /// Raise facing a bet.
    Raise {
        /// Chips added, including the call part.
        amount: Chips,
        /// Chips added as a percentage of the pot before the raise.
        pot_pct: u16,
    },
    /// Go all-in for all remaining chips.
    AllIn(Chips),
}

impl PokerAction {
    /// Check if this is a voluntary money-putting action.
    ///
    /// Every all-in counts, including an all-in for less than a call. The
    /// first decision of each player never faces a bet, so there an all-in
    /// is always a shove.
    pub fn is_aggressive(&self) -> bool {
        matches!(self, PokerAction::Bet { .. } | PokerAction::Raise { .. } | PokerAction::AllIn(_))
    }

    /// Chips the actor adds to the pot.
    pub fn amount(&self) -> Chips {
        match *self {
            PokerAction::Fold | PokerAction::Check => 0,
            PokerAction::Call(amount) | PokerAction::AllIn(amount) => amount,
            PokerAction::Bet { amount, .. } | PokerAction::Raise { amount, .. } => amount,
        }
    }

    /// Get a short code for this action (for reports and logs).
    pub fn short_code(&self) -> String {
        match self {
            PokerAction::Fold => "F".to_string(),
            PokerAction::Check => "X".to_string(),
            PokerAction::Call(amt) => format!("C{}", amt),
            PokerAction::Bet { amount, .. } => format!("B{}", amount),
            PokerAction::Raise { amount, .. } => format!("R{}", amount),
            PokerAction::AllIn(amt) => format!("A{}", amt),
        }
    }

    /// Compact numeric code used for history hashing.
    pub fn code(&self) -> u64 {
        let tag: u64 = match self {
            PokerAction::Fold => 1,
            PokerAction::Check => 2,
            PokerAction::Call(_) => 3,
            PokerAction::Bet { .. } => 4,
            PokerAction::Raise { .. } => 5,
            PokerAction::AllIn(_) => 6,
        };
        (tag << 32) | self.amount() as u64
    }
}

impl fmt::Display for PokerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PokerAction::Fold => write!(f, "Fold"),
            PokerAction::Check => write!(f, "Check"),
            PokerAction::Call(amt) => write!(f, "Call {:.2}bb", centi_to_bb(*amt)),
            PokerAction::Bet { amount, pot_pct } => {
                write!(f, "Bet {:.2}bb ({}%)", centi_to_bb(*amount), pot_pct)
            }
            PokerAction::Raise { amount, .. } => write!(f, "Raise {:.2}bb", centi_to_bb(*amount)),
            PokerAction::AllIn(amt) => write!(f, "All-In {:.2}bb", centi_to_bb(*amt)),
        }
    }
}

/// Convert a bet size in BB to centi-BB (integer representation).
#[inline]
pub fn bb_to_centi(bb: f64) -> Chips {
    (bb * 100.0).round().max(0.0) as Chips
}

/// Convert centi-BB to BB.
#[inline]
pub fn centi_to_bb(centi: Chips) -> f64 {
    centi as f64 / 100.0
}
