//! Play command - a game against the computer in the terminal
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: create_session(), play_loop()
//! - Level 3: human_turn(), computer_turn()
//! - Level 4: command parsing and board rendering
//!
//! Input is either a single square (the two-click protocol, one click per
//! line) or a whole move in coordinate notation such as `e2e4`.

use std::io::{self, BufRead, Write};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use chessvs_core::{
    evaluate, ChessRules, ClickOutcome, Color, GameConfig, GameSession, GameStatus, Move, Phase,
    RulesEngine, Square,
};

use crate::config::AppConfig;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// Colour you play: light or dark
    #[arg(long)]
    pub human: Option<Color>,

    /// Start from this FEN instead of the initial position
    #[arg(long)]
    pub fen: Option<String>,
}

/// One line of player input
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    Click(Square),
    Move(Move),
    Undo,
    Reset,
    Help,
    Quit,
}

const HELP: &str = "\
Commands:
  e2        click a square (select a piece, then its destination)
  e2e4      play a move directly (pawns promote to a queen)
  undo      take back your last move
  reset     start a new game
  help      show this message
  quit      leave the game";

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// 1. Build the session from config and flags
/// 2. Alternate human input and computer replies until the game ends
pub fn run(args: PlayArgs, app: AppConfig) -> Result<()> {
    let mut session = create_session(&args, app.game)?;

    tracing::info!(
        human = %session.config().human_color,
        "Starting terminal game"
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    let delay = Duration::from_millis(session.config().computer_delay_ms);

    match play_loop(&mut session, stdin.lock(), stdout.lock(), delay)? {
        Some(status) => tracing::info!(%status, "Game finished"),
        None => tracing::info!("Game abandoned"),
    }

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Session from the config with command-line overrides applied
fn create_session(args: &PlayArgs, mut config: GameConfig) -> Result<GameSession> {
    if let Some(color) = args.human {
        config.human_color = color;
    }

    let rules = match &args.fen {
        Some(fen) => ChessRules::from_fen(fen).with_context(|| format!("Bad --fen: {fen}"))?,
        None => ChessRules::new(),
    };

    Ok(GameSession::from_rules(rules, config))
}

/// Drive the game until it ends or the input runs out.
///
/// Returns the final status, or `None` when the player quit.
fn play_loop<R: BufRead, W: Write>(
    session: &mut GameSession,
    mut input: R,
    mut out: W,
    delay: Duration,
) -> Result<Option<GameStatus>> {
    writeln!(out, "{HELP}")?;
    render(session, &mut out)?;

    loop {
        match session.phase() {
            Phase::GameOver { status } => {
                writeln!(out, "Game over: {status}")?;
                return Ok(Some(status));
            }
            Phase::AwaitingComputer => {
                computer_turn(session, &mut out, delay)?;
                continue;
            }
            Phase::AwaitingHuman => {}
        }

        write!(out, "{} > ", session.rules().side_to_move())?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                writeln!(out, "{e}")?;
                continue;
            }
        };

        if command == Command::Quit {
            return Ok(None);
        }
        human_turn(session, command, &mut out)?;
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn human_turn<W: Write>(session: &mut GameSession, command: Command, out: &mut W) -> Result<()> {
    match command {
        Command::Click(square) => match session.click(square) {
            ClickOutcome::Moved { mv } => {
                writeln!(out, "You play {mv}")?;
                render(session, out)?;
            }
            ClickOutcome::Selected { square, destinations }
            | ClickOutcome::Reselected { square, destinations } => {
                if destinations.is_empty() {
                    writeln!(out, "{square} selected, no legal moves")?;
                } else {
                    writeln!(out, "{square} selected, moves: {}", join_squares(&destinations))?;
                }
            }
            ClickOutcome::Ignored => writeln!(out, "Not your turn")?,
        },
        Command::Move(mv) => {
            session.deselect();
            session.click(mv.from);
            match session.click(mv.to) {
                ClickOutcome::Moved { mv } => {
                    writeln!(out, "You play {mv}")?;
                    render(session, out)?;
                }
                _ => {
                    session.deselect();
                    writeln!(out, "Illegal move: {mv}")?;
                }
            }
        }
        Command::Undo => take_back(session, out)?,
        Command::Reset => {
            session.reset();
            render(session, out)?;
        }
        Command::Help => writeln!(out, "{HELP}")?,
        Command::Quit => {}
    }
    Ok(())
}

fn computer_turn<W: Write>(session: &mut GameSession, out: &mut W, delay: Duration) -> Result<()> {
    if !delay.is_zero() {
        thread::sleep(delay);
    }

    let decision = session.computer_move()?;
    if let Some(mv) = decision.mv() {
        writeln!(out, "Computer plays {mv}")?;
        render(session, out)?;
    }
    Ok(())
}

/// Undo back to the human's previous turn
fn take_back<W: Write>(session: &mut GameSession, out: &mut W) -> Result<()> {
    if let Err(e) = session.undo() {
        writeln!(out, "{e}")?;
        return Ok(());
    }
    while session.phase() == Phase::AwaitingComputer && session.rules().history_len() > 0 {
        session.undo()?;
    }
    render(session, out)?;
    Ok(())
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn parse_command(line: &str) -> chessvs_core::Result<Command> {
    let text = line.trim().to_ascii_lowercase();
    match text.as_str() {
        "undo" | "u" => Ok(Command::Undo),
        "reset" | "new" => Ok(Command::Reset),
        "help" | "?" => Ok(Command::Help),
        "quit" | "q" | "exit" => Ok(Command::Quit),
        _ if text.len() == 2 => text.parse().map(Command::Click),
        _ => text.parse().map(Command::Move),
    }
}

fn render<W: Write>(session: &GameSession, out: &mut W) -> io::Result<()> {
    let rules = session.rules();
    writeln!(out, "{}", rules.board_snapshot())?;
    writeln!(
        out,
        "{} to move, evaluation {}",
        rules.side_to_move(),
        evaluate(rules)
    )
}

fn join_squares(squares: &[Square]) -> String {
    squares
        .iter()
        .map(Square::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// TESTS
// ============================================================================
