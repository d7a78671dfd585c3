//! Bet sizing configuration and action generation.
//!
//! Opening bets come from a per-player, per-street list of pot percentages.
//! Facing a bet, a single raise size is offered. Any size that leaves the
//! actor with a stack at or below `all_in_threshold` percent of the resulting
//! pot collapses into one all-in action.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::action::{bb_to_centi, Chips, PokerAction};
use super::card::Street;
use super::state::{GameState, Player};
use crate::cfr::config::ConfigError;

/// Configuration for bet sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BetSizingConfig {
    /// OOP flop bet sizes, percent of pot.
    pub oop_flop_bets: Vec<f64>,
    /// OOP turn bet sizes, percent of pot.
    pub oop_turn_bets: Vec<f64>,
    /// OOP river bet sizes, percent of pot.
    pub oop_river_bets: Vec<f64>,
    /// IP flop bet sizes, percent of pot.
    pub ip_flop_bets: Vec<f64>,
    /// IP turn bet sizes, percent of pot.
    pub ip_turn_bets: Vec<f64>,
    /// IP river bet sizes, percent of pot.
    pub ip_river_bets: Vec<f64>,
    /// Raise to this multiple of the opponent's street investment.
    pub raise_multiplier: f64,
    /// Shove instead when the stack left would be at most this percent of the pot.
    pub all_in_threshold: f64,
    /// Starting stack in BB, including the half of the initial pot.
    pub stack_size: f64,
    /// Pot at the start of the flop in BB.
    pub initial_pot: f64,
    /// Cap on raises per street. `None` lets stacks bound the ladder.
    pub max_raises_per_street: Option<u8>,
}

impl Default for BetSizingConfig {
    fn default() -> Self {
        Self {
            oop_flop_bets: vec![25.0, 40.0, 80.0, 120.0],
            oop_turn_bets: vec![25.0, 40.0, 80.0, 120.0],
            oop_river_bets: vec![50.0, 80.0, 120.0],
            ip_flop_bets: vec![50.0, 80.0, 120.0],
            ip_turn_bets: vec![50.0, 80.0, 120.0],
            ip_river_bets: vec![80.0, 120.0],
            raise_multiplier: 2.5,
            all_in_threshold: 125.0,
            stack_size: 100.0,
            initial_pot: 7.0,
            max_raises_per_street: None,
        }
    }
}

impl BetSizingConfig {
    /// Create with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// One bet size for every player and street.
    pub fn single_size(pot_pct: f64) -> Self {
        Self {
            oop_flop_bets: vec![pot_pct],
            oop_turn_bets: vec![pot_pct],
            oop_river_bets: vec![pot_pct],
            ip_flop_bets: vec![pot_pct],
            ip_turn_bets: vec![pot_pct],
            ip_river_bets: vec![pot_pct],
            ..Default::default()
        }
    }

    /// Builder method: set the starting stack in BB.
    pub fn with_stack_size(mut self, bb: f64) -> Self {
        self.stack_size = bb;
        self
    }

    /// Builder method: set the initial pot in BB.
    pub fn with_initial_pot(mut self, bb: f64) -> Self {
        self.initial_pot = bb;
        self
    }

    /// Builder method: cap raises per street.
    pub fn with_max_raises(mut self, max: Option<u8>) -> Self {
        self.max_raises_per_street = max;
        self
    }

    /// Bet sizes for a player on a street.
    pub fn bet_sizes(&self, player: Player, street: Street) -> &[f64] {
        match (player, street) {
            (Player::Oop, Street::Flop) => &self.oop_flop_bets,
            (Player::Oop, Street::Turn) => &self.oop_turn_bets,
            (Player::Oop, Street::River) => &self.oop_river_bets,
            (Player::Ip, Street::Flop) => &self.ip_flop_bets,
            (Player::Ip, Street::Turn) => &self.ip_turn_bets,
            (Player::Ip, Street::River) => &self.ip_river_bets,
        }
    }

    /// Starting stack in chips.
    pub fn stack_chips(&self) -> Chips {
        bb_to_centi(self.stack_size)
    }

    /// Initial pot in chips.
    pub fn initial_pot_chips(&self) -> Chips {
        bb_to_centi(self.initial_pot)
    }

    /// Load a config from a JSON string and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a JSON file and validate it.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Validate the configuration.
    ///
    /// A multiplier above 1 makes every raise grow the investment, so raise
    /// ladders always end in an all-in.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for player in [Player::Oop, Player::Ip] {
            for street in [Street::Flop, Street::Turn, Street::River] {
                let sizes = self.bet_sizes(player, street);
                if sizes.iter().any(|&s| !s.is_finite() || s <= 0.0) {
                    return Err(ConfigError::Invalid(format!(
                        "{} {} bet sizes must be positive",
                        player, street
                    )));
                }
                if sizes.windows(2).any(|w| w[0] >= w[1]) {
                    return Err(ConfigError::Invalid(format!(
                        "{} {} bet sizes must be sorted ascending",
                        player, street
                    )));
                }
            }
        }
        if !self.raise_multiplier.is_finite() || self.raise_multiplier <= 1.0 {
            return Err(ConfigError::Invalid(format!(
                "raise multiplier {} must be greater than 1",
                self.raise_multiplier
            )));
        }
        if !self.all_in_threshold.is_finite() || self.all_in_threshold < 0.0 {
            return Err(ConfigError::Invalid("all-in threshold must be non-negative".into()));
        }
        if !self.initial_pot.is_finite() || self.initial_pot <= 0.0 {
            return Err(ConfigError::Invalid("initial pot must be positive".into()));
        }
        if !self.stack_size.is_finite() || self.stack_size <= self.initial_pot / 2.0 {
            return Err(ConfigError::Invalid(format!(
                "stack {}bb must exceed half the initial pot",
                self.stack_size
            )));
        }
        Ok(())
    }

    /// Whether `remaining` chips are close enough to the pot to shove.
    fn collapses_to_all_in(&self, remaining: Chips, pot_after: Chips) -> bool {
        remaining as f64 <= pot_after as f64 * self.all_in_threshold / 100.0
    }

    /// Get all available actions for the player to act.
    pub fn available_actions(&self, state: &GameState) -> Vec<PokerAction> {
        let Some(player) = state.current_player() else {
            return vec![];
        };
        let me = player.index();
        let opp = player.opponent().index();
        let stack = state.stacks[me];
        let to_call = state.invested[opp].saturating_sub(state.invested[me]);

        let mut actions = Vec::with_capacity(6);

        if to_call > 0 {
            actions.push(PokerAction::Fold);
            if stack >= to_call {
                actions.push(PokerAction::Call(to_call));
            } else if stack > 0 {
                actions.push(PokerAction::AllIn(stack));
            }
            actions.extend(self.raise_action(state, me, opp, to_call));
        } else {
            actions.push(PokerAction::Check);
            actions.extend(self.bet_actions(state, player));
        }

        actions
    }

    /// Get available bet actions (when no bet to call).
    fn bet_actions(&self, state: &GameState, player: Player) -> Vec<PokerAction> {
        let stack = state.stacks[player.index()];
        let pot = state.pot;
        let mut actions = Vec::new();
        if stack == 0 {
            return actions;
        }

        for &pct in self.bet_sizes(player, state.street) {
            let amount = (pot as f64 * pct / 100.0).round() as Chips;
            if amount == 0 {
                continue;
            }
            // larger sizes would all be the same shove
            if amount >= stack || self.collapses_to_all_in(stack - amount, pot + amount) {
                actions.push(PokerAction::AllIn(stack));
                break;
            }
            actions.push(PokerAction::Bet {
                amount,
                pot_pct: pct.round() as u16,
            });
        }
        actions
    }

    /// Get the raise action (when facing a bet), if any.
    fn raise_action(&self, state: &GameState, me: usize, opp: usize, to_call: Chips) -> Option<PokerAction> {
        let stack = state.stacks[me];
        if state.stacks[opp] == 0 {
            return None;
        }
        if let Some(max) = self.max_raises_per_street {
            if state.raises >= max {
                return None;
            }
        }

        let opp_invested = state.invested[opp];
        let raise_to = (opp_invested as f64 * self.raise_multiplier).round() as Chips;
        let added = raise_to.saturating_sub(state.invested[me]);

        if added > to_call && added < stack {
            let pot_after = state.pot + added + (raise_to - opp_invested);
            if self.collapses_to_all_in(stack - added, pot_after) {
                Some(PokerAction::AllIn(stack))
            } else {
                let pot_pct = (added as f64 * 100.0 / state.pot.max(1) as f64).round() as u16;
                Some(PokerAction::Raise { amount: added, pot_pct })
            }
        } else if stack > to_call {
            Some(PokerAction::AllIn(stack))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::postflop::card::Board;

    fn flop_state(config: BetSizingConfig) -> GameState {
        let mut state = GameState::new(config).unwrap();
        state.set_board("Qs7h2d".parse::<Board>().unwrap()).unwrap();
        state
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = BetSizingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.stack_chips(), 10_000);
        assert_eq!(config.initial_pot_chips(), 700);
        assert_eq!(config.bet_sizes(Player::Ip, Street::River), &[80.0, 120.0]);
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let config = BetSizingConfig { raise_multiplier: 1.0, ..Default::default() };
        assert!(config.validate().is_err());

        let config = BetSizingConfig { ip_flop_bets: vec![80.0, 50.0], ..Default::default() };
        assert!(config.validate().is_err());

        let config = BetSizingConfig { oop_river_bets: vec![0.0], ..Default::default() };
        assert!(config.validate().is_err());

        let config = BetSizingConfig::default().with_stack_size(3.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_loading() {
        let config = BetSizingConfig::from_json_str(r#"{"stack_size": 50, "ip_river_bets": [100]}"#).unwrap();
        assert_eq!(config.stack_size, 50.0);
        assert_eq!(config.ip_river_bets, vec![100.0]);
        assert_eq!(config.oop_flop_bets, BetSizingConfig::default().oop_flop_bets);
        assert!(BetSizingConfig::from_json_str(r#"{"raise_multiplier": 0.5}"#).is_err());
    }

    #[test]
    fn test_opening_actions() {
        let state = flop_state(BetSizingConfig::default());
        let actions = state.available_actions();
        // pot 7bb: 25% = 1.75bb, 40% = 2.8bb, 80% = 5.6bb, 120% = 8.4bb
        assert_eq!(
            actions,
            vec![
                PokerAction::Check,
                PokerAction::Bet { amount: 175, pot_pct: 25 },
                PokerAction::Bet { amount: 280, pot_pct: 40 },
                PokerAction::Bet { amount: 560, pot_pct: 80 },
                PokerAction::Bet { amount: 840, pot_pct: 120 },
            ]
        );
        assert!(!actions.contains(&PokerAction::Fold));
    }

    #[test]
    fn test_shallow_stacks_collapse_to_all_in() {
        // 6.5bb behind: 25% of 7 = 1.75 leaves 4.75 <= 8.75 * 1.25
        let state = flop_state(BetSizingConfig::default().with_stack_size(10.0));
        let actions = state.available_actions();
        assert_eq!(actions[0], PokerAction::Check);
        assert_eq!(actions.last(), Some(&PokerAction::AllIn(650)));
        assert_eq!(actions.iter().filter(|a| matches!(a, PokerAction::AllIn(_))).count(), 1);
    }

    #[test]
    fn test_facing_bet_offers_one_raise() {
        let mut state = flop_state(BetSizingConfig::default());
        state.apply_action(PokerAction::Bet { amount: 175, pot_pct: 25 }).unwrap();
        let actions = state.available_actions();
        // raise to 2.5 x 1.75 = 4.375 -> 438 chips
        assert_eq!(
            actions,
            vec![
                PokerAction::Fold,
                PokerAction::Call(175),
                PokerAction::Raise { amount: 438, pot_pct: 50 },
            ]
        );
    }

    #[test]
    fn test_short_stack_facing_bet_can_only_call_all_in() {
        let config = BetSizingConfig::single_size(120.0)
            .with_stack_size(8.0)
            .with_initial_pot(7.0);
        let mut state = flop_state(config);
        // 120% of 7bb = 8.4bb >= 4.5bb stack -> shove
        let shove = state.available_actions()[1];
        assert_eq!(shove, PokerAction::AllIn(450));
        state.apply_action(shove).unwrap();

        let actions = state.available_actions();
        assert_eq!(actions, vec![PokerAction::Fold, PokerAction::Call(450)]);
    }

    #[test]
    fn test_raise_cap() {
        let config = BetSizingConfig::single_size(25.0).with_max_raises(Some(1));
        let mut state = flop_state(config);
        state.apply_action(PokerAction::Bet { amount: 175, pot_pct: 25 }).unwrap();
        let raise = state.available_actions()[2];
        assert!(matches!(raise, PokerAction::Raise { .. }));
        state.apply_action(raise).unwrap();

        let actions = state.available_actions();
        assert_eq!(actions.len(), 2);
        assert!(actions.iter().all(|a| !a.is_aggressive()));
    }

    #[test]
    fn test_raise_ladder_terminates() {
        let mut state = flop_state(BetSizingConfig::default());
        let mut steps = 0;
        // keep raising while possible
        while let Some(action) = state
            .available_actions()
            .into_iter()
            .find(|a| a.is_aggressive())
        {
            state.apply_action(action).unwrap();
            steps += 1;
            assert!(steps < 20, "raise ladder did not terminate");
        }
        // the last aggressive action was a shove, so only fold/call remain
        let actions = state.available_actions();
        assert_eq!(actions[0], PokerAction::Fold);
        assert_eq!(actions.len(), 2);
    }
}
