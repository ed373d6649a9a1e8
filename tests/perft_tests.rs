//! Perft reference suite: the move generator must reproduce the published
//! node counts exactly.

use ebbtide::position::{perft, perft_divide, Position};

struct TestPosition {
    name: &'static str,
    fen: &'static str,
    depths: &'static [(u32, u64)],
}

const TEST_POSITIONS: &[TestPosition] = &[
    TestPosition {
        name: "Initial Position",
        fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        depths: &[(1, 20), (2, 400), (3, 8902), (4, 197_281), (5, 4_865_609)],
    },
    TestPosition {
        name: "Kiwipete",
        fen: "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        depths: &[(1, 48), (2, 2039), (3, 97_862), (4, 4_085_603)],
    },
    TestPosition {
        name: "Position 3",
        fen: "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        depths: &[(1, 14), (2, 191), (3, 2812), (4, 43_238), (5, 674_624)],
    },
    TestPosition {
        name: "Position 4",
        fen: "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        depths: &[(1, 6), (2, 264), (3, 9467), (4, 422_333)],
    },
    TestPosition {
        name: "Position 5",
        fen: "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        depths: &[(1, 44), (2, 1486), (3, 62_379), (4, 2_103_487)],
    },
    TestPosition {
        name: "Position 6",
        fen: "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
        depths: &[(1, 46), (2, 2079), (3, 89_890)],
    },
    TestPosition {
        name: "En Passant Capture",
        fen: "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
        depths: &[(1, 31), (2, 707), (3, 21_637)],
    },
    TestPosition {
        name: "Promotion",
        fen: "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1",
        depths: &[(1, 24), (2, 496), (3, 9483)],
    },
    TestPosition {
        name: "Castling",
        fen: "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1",
        depths: &[(1, 26), (2, 568), (3, 13_744)],
    },
];

#[test]
fn perft_reference_positions() {
    for position in TEST_POSITIONS {
        let mut pos = Position::from_fen(position.fen).unwrap();
        for &(depth, expected) in position.depths {
            let nodes = perft(&mut pos, depth);
            assert_eq!(
                nodes, expected,
                "perft({depth}) mismatch for {}: expected {expected}, got {nodes}",
                position.name
            );
        }
    }
}

// Slow; run with `cargo test -- --ignored` when touching the generator.
#[test]
#[ignore]
fn perft_startpos_depth_6() {
    let mut pos = Position::startpos();
    assert_eq!(perft(&mut pos, 6), 119_060_324);
}

#[test]
fn perft_divide_sums_to_total() {
    let mut pos = Position::startpos();
    let divide = perft_divide(&mut pos, 3);
    assert_eq!(divide.len(), 20);
    let total: u64 = divide.iter().map(|(_, n)| n).sum();
    assert_eq!(total, 8902);
}

#[test]
fn perft_chess960_castling_position() {
    // King b1 and rook a1; the queenside castle (king to c1, rook to d1)
    // must be generated and counted.
    let mut pos = Position::from_fen("7k/8/8/8/8/8/8/RK6 w A - 0 1").unwrap();
    let divide = perft_divide(&mut pos, 1);
    assert!(divide.iter().any(|(mv, _)| mv == "b1a1"));
}
