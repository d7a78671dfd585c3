//! Serializable strategy reports.
//!
//! A [`SolveReport`] is a plain snapshot of a solve: the spot, the solve
//! statistics and, per player, the aggregated strategy and one strategy per
//! hand type. It is meant for printing or handing to another program as JSON.

use serde::{Deserialize, Serialize};

use super::solver::PostflopSolver;
use super::state::Player;

/// Strategy of one hand type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandStrategyEntry {
    /// Hand type name ("AKs")
    pub hand_type: String,
    /// Range weight (0-100)
    pub weight: f64,
    /// Probabilities aligned with the player's actions
    pub strategy: Vec<f64>,
    /// False if the strategy is the uniform fallback
    pub visited: bool,
}

/// Strategies of one player at their first decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerReport {
    /// "OOP" or "IP"
    pub player: String,
    /// Action names
    pub actions: Vec<String>,
    /// Range-weighted strategy
    pub aggregated: Vec<f64>,
    /// Per hand type strategies
    pub hands: Vec<HandStrategyEntry>,
}

/// Solve metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Board text
    pub board: String,
    /// Pot in BB at the start
    pub pot: f64,
    /// Effective stack in BB at the start
    pub effective_stack: f64,
    /// OOP range notation
    pub oop_range: String,
    /// IP range notation
    pub ip_range: String,
    /// Completed iterations
    pub iterations: u64,
    /// Info sets discovered
    pub num_info_sets: usize,
    /// Progress proxy at the end
    pub exploitability: f64,
}

/// Complete solve report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveReport {
    /// Solve metadata
    pub metadata: ReportMetadata,
    /// OOP first, then IP
    pub players: Vec<PlayerReport>,
}

impl SolveReport {
    /// Snapshot the solver's current strategies.
    pub fn from_solver(solver: &PostflopSolver) -> Self {
        let state = solver.initial_state();
        let metadata = ReportMetadata {
            board: state.board().to_string(),
            pot: state.pot(),
            effective_stack: state.effective_stack(),
            oop_range: solver.range(Player::Oop).to_string(),
            ip_range: solver.range(Player::Ip).to_string(),
            iterations: solver.current_iteration(),
            num_info_sets: solver.num_info_sets(),
            exploitability: solver.exploitability(),
        };

        let players = Player::BOTH
            .iter()
            .map(|&player| {
                let range = solver.range(player);
                let hands = solver
                    .all_strategies(player)
                    .into_iter()
                    .map(|s| HandStrategyEntry {
                        hand_type: s.hand_type.name(),
                        weight: range.weight(&s.hand_type),
                        strategy: s.probabilities,
                        visited: s.visited,
                    })
                    .collect();
                PlayerReport {
                    player: player.to_string(),
                    actions: solver.actions(player).iter().map(|a| a.to_string()).collect(),
                    aggregated: solver.aggregated_strategy(player),
                    hands,
                }
            })
            .collect();

        Self { metadata, players }
    }

    /// Report of one player.
    pub fn player(&self, player: Player) -> Option<&PlayerReport> {
        let name = player.to_string();
        self.players.iter().find(|p| p.player == name)
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a report from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfr::SolverConfig;
    use crate::games::postflop::betting::BetSizingConfig;
    use crate::games::postflop::card::Board;
    use crate::games::postflop::state::GameState;

    #[test]
    fn test_report_snapshot() {
        let mut state = GameState::new(BetSizingConfig::single_size(50.0)).unwrap();
        state.set_board("Ks8d3c".parse::<Board>().unwrap()).unwrap();
        let mut solver = PostflopSolver::new(SolverConfig::default().with_seed(8)).unwrap();
        solver
            .initialize(state, "AA,QQ@50".parse().unwrap(), "22".parse().unwrap())
            .unwrap();
        solver.train(30);

        let report = SolveReport::from_solver(&solver);
        assert_eq!(report.metadata.board, "Ks8d3c");
        assert_eq!(report.metadata.pot, 7.0);
        assert_eq!(report.metadata.iterations, 30);
        assert_eq!(report.metadata.oop_range, "QQ@50, AA");

        let oop = report.player(Player::Oop).unwrap();
        assert_eq!(oop.actions, vec!["Check", "Bet 3.50bb (50%)"]);
        assert_eq!(oop.hands.len(), 2);
        assert_eq!(oop.aggregated.len(), 2);
        let qq = oop.hands.iter().find(|h| h.hand_type == "QQ").unwrap();
        assert_eq!(qq.weight, 50.0);

        let json = report.to_json().unwrap();
        assert!(json.contains("\"board\": \"Ks8d3c\""));
        let parsed = SolveReport::from_json(&json).unwrap();
        assert_eq!(parsed.metadata.oop_range, report.metadata.oop_range);
        assert_eq!(parsed.players.len(), 2);
    }
}
