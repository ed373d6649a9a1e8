//! Position-level invariant tests: make/take symmetry, key consistency,
//! bitboard/mailbox agreement, repetition detection.

use proptest::prelude::*;

use super::types::{Color, MoveList, PieceType, Square};
use super::{Position, RecomputedKeys};

/// Everything `take` must restore, captured for later comparison.
#[derive(Debug, PartialEq, Eq)]
struct Snapshot {
    board: Vec<super::types::Piece>,
    side: Color,
    castling_rights: u8,
    ep_square: Option<Square>,
    rule50: u32,
    keys: RecomputedKeys,
    material: crate::eval::score::Score,
    phase_value: i32,
    phase: i32,
    non_pawn_count: [i32; 2],
    checkers: super::types::Bitboard,
    hist_ply: usize,
}

fn snapshot(pos: &Position) -> Snapshot {
    Snapshot {
        board: (0..64).map(|i| pos.piece_on(Square::from_index(i))).collect(),
        side: pos.side_to_move(),
        castling_rights: pos.castling_rights(),
        ep_square: pos.ep_square(),
        rule50: pos.rule50(),
        keys: pos.current_keys(),
        material: pos.material(),
        phase_value: pos.phase_value(),
        phase: pos.phase(),
        non_pawn_count: [
            pos.non_pawn_count(Color::White),
            pos.non_pawn_count(Color::Black),
        ],
        checkers: pos.checkers(),
        hist_ply: pos.hist_ply(),
    }
}

fn assert_consistent(pos: &Position) {
    assert_eq!(pos.recompute_keys(), pos.current_keys());
    let mut union = super::types::Bitboard::EMPTY;
    for pt in PieceType::ALL {
        union |= pos.pieces(pt);
    }
    assert_eq!(union, pos.all());
    assert_eq!(
        pos.color_pieces(Color::White) | pos.color_pieces(Color::Black),
        pos.all()
    );
    for i in 0..64 {
        let sq = Square::from_index(i);
        let pc = pos.piece_on(sq);
        if pc.is_empty() {
            assert!(!pos.all().contains(sq));
        } else {
            assert!(pos.piece_bb(pc.color(), pc.piece_type()).contains(sq));
        }
    }
    assert_eq!(pos.checkers(), pos.compute_checkers());
}

const TRICKY_FENS: &[&str] = &[
    super::START_FEN,
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3",
    "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
];

#[test]
fn make_take_round_trips_every_legal_move() {
    for fen in TRICKY_FENS {
        let mut pos = Position::from_fen(fen).unwrap();
        let before = snapshot(&pos);
        let mut list = MoveList::new();
        pos.generate_all(&mut list);
        for &mv in list.iter() {
            if pos.make(mv) {
                assert_consistent(&pos);
                pos.take();
            }
            assert_eq!(snapshot(&pos), before, "round trip of {mv} on {fen}");
        }
    }
}

#[test]
fn en_passant_round_trip_is_exact() {
    let fen = "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3";
    let mut pos = Position::from_fen(fen).unwrap();
    assert_eq!(pos.ep_square(), Some("d6".parse().unwrap()));
    let before = snapshot(&pos);
    let pawn_key_before = pos.pawn_key();

    let mv = pos.parse_uci_move("e5d6").unwrap();
    assert!(mv.is_en_passant());
    assert!(pos.make(mv));
    assert_ne!(pos.pawn_key(), pawn_key_before);
    pos.take();

    assert_eq!(snapshot(&pos), before);
    assert_eq!(pos.pawn_key(), pawn_key_before);
}

#[test]
fn chess960_castle_moves_rook_and_round_trips() {
    let mut pos = Position::from_fen("7k/8/8/8/8/8/8/RK6 w A - 0 1").unwrap();
    let before = snapshot(&pos);
    let mv = pos.parse_uci_move("b1a1").unwrap();
    assert!(mv.is_castle());

    assert!(pos.make(mv));
    let white_king = super::types::Piece::new(Color::White, PieceType::King);
    let white_rook = super::types::Piece::new(Color::White, PieceType::Rook);
    assert_eq!(pos.piece_on(Square::C1), white_king);
    assert_eq!(pos.piece_on(Square::D1), white_rook);
    assert!(pos.piece_on(Square::A1).is_empty());
    assert!(pos.piece_on(Square::B1).is_empty());
    assert_consistent(&pos);

    pos.take();
    assert_eq!(snapshot(&pos), before);
    assert_eq!(pos.piece_on(Square::B1), white_king);
    assert_eq!(pos.piece_on(Square::A1), white_rook);
}

#[test]
fn null_move_round_trip_restores_everything() {
    let fen = "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3";
    let mut pos = Position::from_fen(fen).unwrap();
    let before = snapshot(&pos);
    pos.make_null();
    assert_eq!(pos.ep_square(), None);
    assert_eq!(pos.rule50(), 0);
    assert_eq!(pos.side_to_move(), Color::Black);
    pos.take_null();
    assert_eq!(snapshot(&pos), before);
}

#[test]
fn repetition_detected_after_shuffling() {
    let mut pos = Position::startpos();
    // Knights out and back, twice: the start position occurs three times.
    for mv in ["g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8"] {
        let parsed = pos.parse_uci_move(mv).unwrap();
        assert!(pos.make(parsed));
    }
    assert!(pos.is_repetition(pos.hist_ply()));
    // From inside a search rooted before the shuffling, one prior visit
    // already counts.
    assert!(pos.is_repetition(0));
}

#[test]
fn fifty_move_counter_resets_on_pawn_moves_and_captures() {
    let mut pos = Position::startpos();
    let mv = pos.parse_uci_move("g1f3").unwrap();
    pos.make(mv);
    assert_eq!(pos.rule50(), 1);
    let mv = pos.parse_uci_move("e7e5").unwrap();
    pos.make(mv);
    assert_eq!(pos.rule50(), 0);
    let mv = pos.parse_uci_move("f3e5").unwrap();
    pos.make(mv);
    assert_eq!(pos.rule50(), 0);
}

#[test]
fn material_draw_positions() {
    assert!(Position::from_fen("8/8/4k3/8/8/3K4/8/8 w - - 0 1")
        .unwrap()
        .material_draw());
    assert!(Position::from_fen("8/8/4k3/8/8/3KN3/8/8 w - - 0 1")
        .unwrap()
        .material_draw());
    assert!(!Position::from_fen("8/8/4k3/8/8/3KP3/8/8 w - - 0 1")
        .unwrap()
        .material_draw());
    assert!(!Position::from_fen("8/8/4k3/8/8/3KR3/8/8 w - - 0 1")
        .unwrap()
        .material_draw());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Random playouts keep every incremental field consistent, and a full
    /// unwind restores the exact start state.
    #[test]
    fn random_playouts_stay_consistent(choices in prop::collection::vec(any::<u16>(), 1..60)) {
        let mut pos = Position::startpos();
        let start = snapshot(&pos);
        let mut made = 0usize;

        for pick in choices {
            let mut list = MoveList::new();
            pos.generate_all(&mut list);
            if list.is_empty() {
                break;
            }
            let mut made_one = false;
            // Probe from a pseudo-random starting index until a legal move
            // sticks; positions with no legal move end the playout.
            for offset in 0..list.len() {
                let mv = list[(pick as usize + offset) % list.len()];
                if pos.make(mv) {
                    made += 1;
                    made_one = true;
                    break;
                }
            }
            if !made_one {
                break;
            }
            assert_consistent(&pos);
        }

        for _ in 0..made {
            pos.take();
        }
        prop_assert_eq!(snapshot(&pos), start);
    }
}
