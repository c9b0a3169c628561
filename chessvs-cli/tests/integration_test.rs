//! Integration tests for the CHESSVS game stack
//!
//! Drives the core session and search together the way the front ends do.

use chessvs_core::{
    ChessRules, ClickOutcome, Color, Decision, GameConfig, GameSession, MinimaxAI, Phase,
    RulesEngine,
};

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn quick_config() -> GameConfig {
    GameConfig::default().with_delay_ms(0)
}

/// Human input: the first legal move, entered as two clicks
fn click_first_legal(session: &mut GameSession) -> ClickOutcome {
    let mv = session.rules().legal_moves()[0];
    session.click(mv.from);
    session.click(mv.to)
}

// ============================================================================
// SELF-PLAY
// ============================================================================

#[test]
fn test_self_play_only_plays_legal_moves() {
    let mut rules = ChessRules::new();
    let mut ai = MinimaxAI::new(1);

    for ply in 0..60 {
        let legal = rules.legal_moves();
        match ai.play_move(&mut rules).unwrap() {
            Decision::Move { mv, .. } => {
                assert!(legal.contains(&mv), "ply {ply}: {mv} was not legal");
                assert_eq!(rules.history_len(), ply + 1);
            }
            Decision::GameOver { status } => {
                assert!(status.is_over());
                assert!(legal.is_empty() || rules.is_draw());
                return;
            }
        }
    }
}

#[test]
fn test_self_play_is_deterministic() {
    let play = || {
        let mut rules = ChessRules::new();
        let mut ai = MinimaxAI::new(1);
        for _ in 0..12 {
            ai.play_move(&mut rules).unwrap();
        }
        rules.fen()
    };
    assert_eq!(play(), play());
}

// ============================================================================
// SESSION FLOW
// ============================================================================

#[test]
fn test_human_and_computer_alternate() {
    let mut session = GameSession::new(quick_config());

    for round in 0..8 {
        if session.phase() != Phase::AwaitingHuman {
            break;
        }
        assert!(matches!(click_first_legal(&mut session), ClickOutcome::Moved { .. }));

        if session.phase() != Phase::AwaitingComputer {
            break;
        }
        let decision = session.computer_move().unwrap();
        assert!(decision.mv().is_some());
        assert_eq!(session.view().history.len(), 2 * (round + 1));
    }

    let view = session.view();
    assert_eq!(view.last_move, session.rules().history().last().copied());
}

#[test]
fn test_session_as_dark() {
    let config = quick_config().with_human_color(Color::Dark);
    let mut session = GameSession::new(config);

    assert_eq!(session.phase(), Phase::AwaitingComputer);
    session.computer_move().unwrap();
    assert_eq!(session.rules().side_to_move(), Color::Dark);

    assert!(matches!(click_first_legal(&mut session), ClickOutcome::Moved { .. }));
    assert_eq!(session.phase(), Phase::AwaitingComputer);
    assert_eq!(session.rules().history_len(), 2);
}

#[test]
fn test_undo_all_the_way_back() {
    let mut session = GameSession::new(quick_config());
    click_first_legal(&mut session);
    session.computer_move().unwrap();
    click_first_legal(&mut session);

    while session.undo().is_ok() {}

    assert_eq!(session.rules().history_len(), 0);
    assert_eq!(session.rules().fen(), ChessRules::new().fen());
    assert_eq!(session.phase(), Phase::AwaitingHuman);
}
