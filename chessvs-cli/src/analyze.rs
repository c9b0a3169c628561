//! Analysis commands - one-shot search and evaluation of a position
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run_bestmove(), run_eval() - orchestration
//! - Level 2: load_position(), search_position(), evaluate_position()
//! - Level 3: (delegated to chessvs-core)
//! - Level 4: text/JSON formatting

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use chessvs_core::{
    evaluate, ChessRules, Decision, GameStatus, MinimaxAI, RulesEngine, DEFAULT_SEARCH_DEPTH,
    START_FEN,
};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct BestMoveArgs {
    /// Position to search
    #[arg(long, default_value = START_FEN)]
    pub fen: String,

    /// Search depth
    #[arg(long, default_value_t = DEFAULT_SEARCH_DEPTH)]
    pub depth: u32,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct EvalArgs {
    /// Position to evaluate
    #[arg(long, default_value = START_FEN)]
    pub fen: String,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Outcome of a bestmove search
#[derive(Debug, Serialize)]
struct SearchReport {
    fen: String,
    depth: u32,
    decision: Decision,
    nodes: u64,
    elapsed_ms: u128,
}

/// Static view of a position
#[derive(Debug, Serialize)]
struct EvalReport {
    fen: String,
    evaluation: i32,
    status: GameStatus,
    legal_moves: usize,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run bestmove command
pub fn run_bestmove(args: BestMoveArgs) -> Result<()> {
    let mut rules = load_position(&args.fen)?;
    let depth = args.depth;

    let report = search_position(&mut rules, depth);
    tracing::info!(
        depth,
        nodes = report.nodes,
        elapsed_ms = report.elapsed_ms as u64,
        "search complete"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", format_search(&report));
    }
    Ok(())
}

/// Run eval command
pub fn run_eval(args: EvalArgs) -> Result<()> {
    let rules = load_position(&args.fen)?;
    let report = evaluate_position(&rules);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", rules.board_snapshot());
        println!("{}", format_eval(&report));
    }
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn load_position(fen: &str) -> Result<ChessRules> {
    ChessRules::from_fen(fen).with_context(|| format!("Failed to load position: {fen}"))
}

/// Search without changing the position
fn search_position(rules: &mut ChessRules, depth: u32) -> SearchReport {
    let mut ai = MinimaxAI::new(depth);
    let start = Instant::now();
    let decision = ai.select_move(rules);

    SearchReport {
        fen: rules.fen(),
        depth,
        decision,
        nodes: ai.nodes(),
        elapsed_ms: start.elapsed().as_millis(),
    }
}

fn evaluate_position(rules: &ChessRules) -> EvalReport {
    EvalReport {
        fen: rules.fen(),
        evaluation: evaluate(rules),
        status: rules.status(),
        legal_moves: rules.legal_moves().len(),
    }
}

// ============================================================================
// LEVEL 4 - FORMATTING
// ============================================================================

fn format_search(report: &SearchReport) -> String {
    match report.decision {
        Decision::Move { mv, score } => format!(
            "bestmove {mv} score {score} depth {} nodes {} time {}ms",
            report.depth, report.nodes, report.elapsed_ms
        ),
        Decision::GameOver { status } => format!("bestmove (none) {status}"),
    }
}

fn format_eval(report: &EvalReport) -> String {
    format!(
        "evaluation {} ({} legal moves, {})",
        report.evaluation, report.legal_moves, report.status
    )
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chessvs_core::Color;

    #[test]
    fn test_load_position_rejects_garbage() {
        assert!(load_position("definitely not chess").is_err());
        // kingless boards never reach the move generator
        assert!(load_position("8/8/8/8/8/8/8/8 w - - 0 1").is_err());
        assert!(load_position("4k3/8/8/8/8/8/8/8 w - - 0 1").is_err());
    }

    #[test]
    fn test_search_leaves_position() {
        let mut rules = load_position(START_FEN).unwrap();
        let report = search_position(&mut rules, 1);

        assert_eq!(report.fen, START_FEN);
        assert_eq!(rules.fen(), START_FEN);
        assert!(matches!(report.decision, Decision::Move { .. }));
        assert!(report.nodes > 0);
    }

    #[test]
    fn test_search_finds_capture() {
        let mut rules = load_position("3rk3/8/8/8/8/8/8/3Q3K b - - 0 1").unwrap();
        let report = search_position(&mut rules, 1);
        assert_eq!(report.decision.mv().map(|m| m.to_string()), Some("d8d1".to_string()));
        assert!(format_search(&report).starts_with("bestmove d8d1"));
    }

    #[test]
    fn test_search_reports_game_over() {
        let mut rules = load_position("7k/6Q1/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let report = search_position(&mut rules, 2);

        assert_eq!(
            report.decision,
            Decision::GameOver {
                status: GameStatus::Checkmate { winner: Color::Light }
            }
        );
        assert!(format_search(&report).contains("(none)"));
    }

    #[test]
    fn test_eval_report() {
        let rules = load_position("q3k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let report = evaluate_position(&rules);

        assert_eq!(report.evaluation, 90);
        assert_eq!(report.status, GameStatus::Ongoing);
        assert!(format_eval(&report).starts_with("evaluation 90"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"]["kind"], "ongoing");
    }
}
