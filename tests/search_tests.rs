//! End-to-end search scenarios: forced mates, stalemate, repetition, and
//! stability across thread counts.

use ebbtide::position::types::Move;
use ebbtide::position::Position;
use ebbtide::search::{search_position, SearchLimits, SearchReport, ThreadPool, MATE};
use ebbtide::sync::StopFlag;
use ebbtide::tt::TranspositionTable;

fn run_search(pos: &Position, limits: SearchLimits, threads: usize) -> SearchReport {
    let mut pool = ThreadPool::new(threads);
    let tt = TranspositionTable::new(16);
    let abort = StopFlag::new();
    let stopped = StopFlag::new();
    let report = search_position(&mut pool, pos, limits, &tt, &abort, &stopped, 0);
    assert!(stopped.is_set());
    assert!(!abort.is_set());
    report
}

fn depth(d: i32) -> SearchLimits {
    SearchLimits {
        depth: Some(d),
        ..SearchLimits::default()
    }
}

#[test]
fn depth_one_from_startpos_returns_an_opening_move() {
    let pos = Position::startpos();
    let report = run_search(&pos, depth(1), 1);
    let expected = [
        "a2a3", "a2a4", "b2b3", "b2b4", "c2c3", "c2c4", "d2d3", "d2d4", "e2e3", "e2e4", "f2f3",
        "f2f4", "g2g3", "g2g4", "h2h3", "h2h4", "b1a3", "b1c3", "g1f3", "g1h3",
    ];
    let text = report.best_move.to_string();
    assert!(
        expected.contains(&text.as_str()),
        "unexpected opening move {text}"
    );
}

#[test]
fn finds_back_rank_mate_in_one() {
    let pos = Position::from_fen("6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1").unwrap();
    let report = run_search(&pos, depth(4), 1);
    assert_eq!(report.best_move.to_string(), "a1a8");
    assert_eq!(report.score, MATE - 1, "expected `score mate 1`");
}

#[test]
fn stalemate_yields_no_move_and_zero_score() {
    let mut pos = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
    assert!(pos.generate_legal().is_empty());
    assert!(!pos.in_check());

    let report = run_search(&pos, depth(4), 1);
    assert_eq!(report.best_move, Move::NONE);
    assert_eq!(report.score, 0);
}

#[test]
fn threefold_repetition_scores_zero_immediately() {
    let mut pos = Position::startpos();
    for mv in ["g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8"] {
        let parsed = pos.parse_uci_move(mv).unwrap();
        assert!(pos.make(parsed));
    }
    for d in [1, 4] {
        let report = run_search(&pos, depth(d), 1);
        assert_eq!(report.score, 0, "repeated position must score 0 at depth {d}");
        assert!(!report.best_move.is_none());
    }
}

#[test]
fn fifty_move_rule_scores_zero() {
    let pos = Position::from_fen("8/8/4k3/8/8/8/R3K3/8 w - - 100 80").unwrap();
    let report = run_search(&pos, depth(3), 1);
    assert_eq!(report.score, 0);
}

#[test]
fn mate_in_two_is_stable_across_thread_counts() {
    // Rook ladder: Ra7 boxes the king in, Rb8 mates next move.
    let pos = Position::from_fen("7k/8/8/8/8/8/R7/1R5K w - - 0 1").unwrap();
    for threads in [1, 2, 4] {
        let report = run_search(&pos, depth(6), threads);
        assert_eq!(
            report.score,
            MATE - 3,
            "thread count {threads} failed to prove mate in 2"
        );
    }
}

#[test]
fn searchmoves_restricts_the_root() {
    let pos = Position::startpos();
    let mut probe = pos.clone();
    let only = probe.parse_uci_move("a2a3").unwrap();
    let limits = SearchLimits {
        depth: Some(3),
        searchmoves: vec![only],
        ..SearchLimits::default()
    };
    let report = run_search(&pos, limits, 1);
    assert_eq!(report.best_move, only);
}

#[test]
fn node_limit_terminates_the_search() {
    let pos = Position::startpos();
    let limits = SearchLimits {
        nodes: Some(20_000),
        ..SearchLimits::default()
    };
    let report = run_search(&pos, limits, 1);
    assert!(!report.best_move.is_none());
}

#[test]
fn mate_limit_stops_once_proven() {
    let pos = Position::from_fen("6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1").unwrap();
    let limits = SearchLimits {
        mate: Some(1),
        depth: Some(16),
        ..SearchLimits::default()
    };
    let report = run_search(&pos, limits, 1);
    assert_eq!(report.score, MATE - 1);
}
