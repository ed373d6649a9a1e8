//! Evaluation properties: mirror symmetry, pawn cache faithfulness and
//! taper bounds over real positions.

use ebbtide::eval::pawns::{compute_pawn_terms, PawnCache};
use ebbtide::eval::score::MID_GAME;
use ebbtide::eval::{evaluate, evaluate_white_pov};
use ebbtide::position::Position;

/// Flip a FEN across the horizontal axis with colors swapped.
fn mirror_fen(fen: &str) -> String {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    let board: Vec<String> = fields[0]
        .split('/')
        .rev()
        .map(|rank| {
            rank.chars()
                .map(|c| {
                    if c.is_ascii_alphabetic() {
                        if c.is_ascii_uppercase() {
                            c.to_ascii_lowercase()
                        } else {
                            c.to_ascii_uppercase()
                        }
                    } else {
                        c
                    }
                })
                .collect()
        })
        .collect();
    let side = if fields[1] == "w" { "b" } else { "w" };
    let castling: String = if fields[2] == "-" {
        "-".to_string()
    } else {
        // Swap case, then keep FEN's conventional upper-first order.
        let mut swapped: Vec<char> = fields[2]
            .chars()
            .map(|c| {
                if c.is_ascii_uppercase() {
                    c.to_ascii_lowercase()
                } else {
                    c.to_ascii_uppercase()
                }
            })
            .collect();
        swapped.sort_by_key(|c| (c.is_ascii_lowercase(), *c));
        swapped.into_iter().collect()
    };
    let ep = if fields[3] == "-" {
        "-".to_string()
    } else {
        let mut chars = fields[3].chars();
        let file = chars.next().unwrap();
        let rank = chars.next().unwrap();
        let flipped = (b'1' + b'8' - rank as u8) as char;
        format!("{file}{flipped}")
    };
    format!(
        "{} {side} {castling} {ep} {} {}",
        board.join("/"),
        fields.get(4).unwrap_or(&"0"),
        fields.get(5).unwrap_or(&"1"),
    )
}

const POSITIONS: &[&str] = &[
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
    "4k3/8/8/3P4/8/8/6p1/4K3 w - - 0 1",
    "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
    "8/8/4k3/8/8/3KN3/8/8 b - - 0 1",
];

#[test]
fn eval_is_mirror_symmetric() {
    let mut cache = PawnCache::new();
    for fen in POSITIONS {
        let pos = Position::from_fen(fen).unwrap();
        let mirrored = Position::from_fen(&mirror_fen(fen)).unwrap();
        assert_eq!(
            evaluate(&pos, &mut cache),
            evaluate(&mirrored, &mut cache),
            "mirror asymmetry for {fen}"
        );
    }
}

#[test]
fn white_pov_flips_with_side_to_move() {
    let mut cache = PawnCache::new();
    for fen in POSITIONS {
        let pos = Position::from_fen(fen).unwrap();
        let stm = evaluate(&pos, &mut cache);
        let white = evaluate_white_pov(&pos, &mut cache);
        match pos.side_to_move() {
            ebbtide::position::types::Color::White => assert_eq!(stm, white),
            ebbtide::position::types::Color::Black => assert_eq!(stm, -white),
        }
    }
}

#[test]
fn pawn_cache_entries_match_recomputation() {
    let mut cache = PawnCache::new();
    for fen in POSITIONS {
        let pos = Position::from_fen(fen).unwrap();
        let entry = cache.probe(&pos);
        let (eval, passed) = compute_pawn_terms(&pos);
        assert_eq!(entry.eval, eval, "stale cache eval for {fen}");
        assert_eq!(entry.passed_pawns, passed, "stale cache passers for {fen}");
        assert_eq!(entry.key, pos.pawn_key());
    }
}

#[test]
fn material_taper_is_bounded_by_its_halves() {
    for fen in POSITIONS {
        let pos = Position::from_fen(fen).unwrap();
        let material = pos.material();
        let (mg, eg) = (material.mg(), material.eg());
        for phase in 0..=MID_GAME {
            let tapered = material.taper(phase);
            assert!(
                tapered >= mg.min(eg) - 1 && tapered <= mg.max(eg) + 1,
                "taper {tapered} outside [{}, {}] at phase {phase} for {fen}",
                mg.min(eg),
                mg.max(eg)
            );
        }
    }
}

#[test]
fn phase_tracks_material() {
    let full = Position::startpos();
    assert_eq!(full.phase(), MID_GAME);
    let pawns_only = Position::from_fen("4k3/pppppppp/8/8/8/8/PPPPPPPP/4K3 w - - 0 1").unwrap();
    assert_eq!(pawns_only.phase(), 0);
}
