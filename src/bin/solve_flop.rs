//! Flop solve demo.
//!
//! Usage:
//!   cargo run --release --bin solve_flop
//!
//! Solves a fixed single-raised-pot flop, prints both players' aggregated
//! strategies and a per-hand breakdown, then the JSON report.
//! Set `RUST_LOG=debug` for progress logging.

use std::error::Error;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};

use postflop_mccfr::cfr::{SolveProgress, SolverConfig};
use postflop_mccfr::games::postflop::range::defaults;
use postflop_mccfr::games::postflop::{
    BetSizingConfig, Board, GameState, Player, PostflopSolver, Range, SolveReport,
};

const BOARD: &str = "Ks8d3c";
const ITERATIONS: u64 = 20_000;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("=================================================");
    println!("  Heads-Up Flop Solver");
    println!("=================================================");
    println!();

    let mut state = GameState::new(BetSizingConfig::default())?;
    state.set_board(BOARD.parse::<Board>()?)?;

    let oop_range = Range::from_notation(defaults::UTG_OPEN)?;
    let ip_range = Range::from_notation(defaults::BTN_CALL_VS_UTG)?;

    println!("{}", state);
    println!("OOP range: {} ({:.0} combos)", oop_range, oop_range.total_combos());
    println!("IP range:  {} ({:.0} combos)", ip_range, ip_range.total_combos());
    println!();

    let config = SolverConfig::default()
        .with_iterations(ITERATIONS)
        .with_progress_interval(ITERATIONS / 100);
    let mut solver = PostflopSolver::new(config)?;
    solver.initialize(state, oop_range, ip_range)?;

    let pb = ProgressBar::new(ITERATIONS);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Solving [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
            .progress_chars("#>-"),
    );
    let bar = pb.clone();
    solver.set_progress_callback(move |p: &SolveProgress| {
        bar.set_position(p.iteration);
        bar.set_message(format!("proxy {:.3}", p.exploitability));
    });

    let start = Instant::now();
    let stats = solver.solve().clone();
    pb.finish_with_message("done");

    println!();
    println!(
        "Solved {} iterations in {:.1?} ({:.0} it/s, {} info sets)",
        stats.iterations,
        start.elapsed(),
        stats.iterations_per_second,
        stats.info_sets
    );

    for player in Player::BOTH {
        print_player(&solver, player);
    }

    let report = SolveReport::from_solver(&solver);
    println!("{}", report.to_json()?);
    Ok(())
}

fn print_player(solver: &PostflopSolver, player: Player) {
    let actions = solver.actions(player);
    println!();
    println!("--- {} first decision ---", player);

    let aggregated = solver.aggregated_strategy(player);
    for (action, prob) in actions.iter().zip(&aggregated) {
        println!("  {:<20} {:>6.1}%", action.to_string(), prob * 100.0);
    }

    println!();
    let header: Vec<String> = actions.iter().map(|a| format!("{:>9}", a.short_code())).collect();
    println!("  {:<6}{}", "Hand", header.join(""));
    for strategy in solver.all_strategies(player) {
        let cells: Vec<String> = strategy
            .probabilities
            .iter()
            .map(|p| format!("{:>8.1}%", p * 100.0))
            .collect();
        let marker = if strategy.visited { "" } else { "  (unvisited)" };
        println!("  {:<6}{}{}", strategy.hand_type.name(), cells.join(""), marker);
    }
}
