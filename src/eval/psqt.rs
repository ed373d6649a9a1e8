//! Piece values, piece-square tables and game phase.
//!
//! The per-type tables are written from Black's point of view so they read
//! the way a diagram does. At startup they are combined with the material
//! values into `PSQT[piece][square]`, which is what make/take adds and
//! subtracts when maintaining the position's material accumulator.

use once_cell::sync::Lazy;

use super::score::{s, Score, MID_GAME};
use crate::position::types::{Piece, PieceType};

/// Material value per piece type.
pub const PIECE_TYPE_VALUE: [Score; 6] = [
    s(105, 145),   // pawn
    s(420, 462),   // knight
    s(440, 485),   // bishop
    s(600, 780),   // rook
    s(1350, 1500), // queen
    s(0, 0),       // king
];

/// Scalar piece values for exchange evaluation and move ordering.
pub const SEE_VALUE: [i32; 6] = [105, 420, 440, 600, 1350, 0];

/// Phase contribution of each piece type; 24 in total at the start.
const PHASE_WEIGHT: [i32; 6] = [0, 1, 1, 2, 4, 0];

#[inline]
#[must_use]
pub fn phase_weight(pt: PieceType) -> i32 {
    PHASE_WEIGHT[pt.index()]
}

/// Scale the summed phase weights into [0, `MID_GAME`].
#[inline]
#[must_use]
pub fn update_phase(phase_value: i32) -> i32 {
    ((phase_value * MID_GAME + 12) / 24).min(MID_GAME)
}

/// Per-square bonuses from Black's point of view.
#[rustfmt::skip]
const PIECE_SQ_VALUE: [[Score; 64]; 6] = [
    // Pawn
    [
        s(0,0), s(0,0), s(0,0), s(0,0), s(0,0), s(0,0), s(0,0), s(0,0),
        s(57,1), s(49,22), s(34,65), s(74,31), s(76,36), s(85,27), s(-34,91), s(-49,63),
        s(15,77), s(14,84), s(42,43), s(47,17), s(64,21), s(125,22), s(98,68), s(43,76),
        s(-15,43), s(-13,20), s(-8,2), s(-1,-22), s(21,-15), s(29,-14), s(5,13), s(8,18),
        s(-27,15), s(-32,10), s(-17,-8), s(-8,-18), s(-2,-15), s(3,-15), s(-15,-5), s(-10,-7),
        s(-34,4), s(-35,-2), s(-27,-5), s(-24,-7), s(-14,0), s(-13,-1), s(2,-16), s(-12,-14),
        s(-19,12), s(-9,13), s(-11,8), s(-11,16), s(-4,31), s(15,9), s(31,-2), s(-6,-13),
        s(0,0), s(0,0), s(0,0), s(0,0), s(0,0), s(0,0), s(0,0), s(0,0),
    ],
    // Knight
    [
        s(-201,-70), s(-116,-15), s(-145,31), s(-58,1), s(-7,9), s(-133,34), s(-83,-15), s(-153,-115),
        s(-9,-24), s(-6,3), s(38,-11), s(46,16), s(52,-2), s(69,-34), s(-12,0), s(8,-47),
        s(-15,-7), s(23,7), s(24,46), s(43,45), s(84,20), s(69,23), s(33,-15), s(-3,-25),
        s(13,6), s(23,23), s(45,50), s(52,62), s(40,57), s(72,39), s(25,17), s(39,-7),
        s(10,12), s(22,14), s(27,52), s(36,49), s(35,54), s(44,41), s(48,11), s(30,14),
        s(-13,-31), s(-5,6), s(9,22), s(12,44), s(24,40), s(17,16), s(21,4), s(11,-8),
        s(-32,-29), s(-30,1), s(-13,-5), s(0,16), s(0,9), s(-10,-5), s(-15,-10), s(-1,0),
        s(-82,-53), s(-18,-37), s(-30,-9), s(-1,12), s(5,14), s(5,-16), s(-14,-12), s(-45,-30),
    ],
    // Bishop
    [
        s(-35,47), s(-57,38), s(-128,54), s(-126,56), s(-128,52), s(-143,43), s(-28,21), s(-44,18),
        s(-14,15), s(10,18), s(1,19), s(-25,30), s(-2,13), s(-15,25), s(-28,27), s(-56,23),
        s(2,26), s(28,17), s(43,12), s(32,9), s(37,12), s(52,24), s(19,24), s(19,12),
        s(-7,16), s(29,14), s(27,15), s(49,40), s(39,25), s(31,19), s(33,7), s(-5,17),
        s(13,0), s(10,5), s(23,23), s(39,29), s(29,25), s(34,11), s(16,7), s(41,-11),
        s(9,-3), s(43,21), s(28,18), s(18,27), s(27,32), s(33,20), s(47,9), s(37,-9),
        s(30,-6), s(24,-23), s(29,-12), s(5,12), s(14,12), s(16,-3), s(36,-19), s(35,-44),
        s(26,-16), s(41,4), s(25,17), s(6,15), s(21,14), s(15,13), s(29,-2), s(39,-27),
    ],
    // Rook
    [
        s(24,56), s(24,67), s(-12,88), s(-8,76), s(3,75), s(7,77), s(25,73), s(40,64),
        s(-13,63), s(-26,81), s(-1,83), s(7,76), s(-4,72), s(8,52), s(-3,56), s(19,42),
        s(-13,62), s(39,47), s(15,58), s(39,35), s(57,24), s(52,32), s(81,17), s(23,35),
        s(-13,67), s(8,59), s(14,59), s(32,37), s(27,31), s(33,25), s(35,27), s(16,34),
        s(-22,51), s(-26,58), s(-23,55), s(-16,47), s(-18,41), s(-30,38), s(-1,29), s(-15,26),
        s(-25,32), s(-23,36), s(-21,35), s(-18,30), s(-13,26), s(-11,11), s(14,-3), s(-8,5),
        s(-35,33), s(-16,31), s(-5,33), s(-4,25), s(2,17), s(-14,11), s(5,4), s(-31,21),
        s(-11,38), s(-13,35), s(-11,39), s(-1,21), s(4,14), s(2,21), s(5,20), s(-11,20),
    ],
    // Queen
    [
        s(-42,81), s(-21,93), s(-12,125), s(4,130), s(-3,148), s(35,138), s(33,125), s(18,115),
        s(-9,54), s(-48,103), s(-28,113), s(-84,202), s(-88,236), s(-28,170), s(-43,163), s(11,146),
        s(-3,50), s(5,40), s(1,89), s(-10,128), s(-3,159), s(29,157), s(49,114), s(13,140),
        s(6,25), s(13,65), s(-1,79), s(-11,130), s(-14,162), s(-9,171), s(27,155), s(9,123),
        s(20,5), s(5,50), s(5,57), s(0,99), s(-1,104), s(6,82), s(26,70), s(29,69),
        s(10,-21), s(18,10), s(7,37), s(7,32), s(13,35), s(18,32), s(43,1), s(31,-7),
        s(13,-31), s(16,-22), s(22,-26), s(23,8), s(26,-1), s(22,-83), s(40,-115), s(33,-73),
        s(-2,-39), s(-9,-38), s(1,-31), s(11,-35), s(7,-37), s(-9,-44), s(7,-77), s(14,-55),
    ],
    // King
    [
        s(-24,-68), s(23,15), s(10,45), s(7,82), s(1,62), s(26,76), s(45,91), s(16,-57),
        s(-7,34), s(52,112), s(53,118), s(81,107), s(85,108), s(94,125), s(98,139), s(47,54),
        s(31,63), s(129,112), s(114,133), s(91,148), s(133,144), s(165,148), s(150,133), s(49,72),
        s(33,59), s(102,93), s(95,135), s(58,164), s(71,164), s(123,139), s(114,111), s(0,79),
        s(25,31), s(114,68), s(119,107), s(36,146), s(79,134), s(114,108), s(111,74), s(-41,68),
        s(32,25), s(117,55), s(86,83), s(63,103), s(81,99), s(69,90), s(86,67), s(-3,52),
        s(85,25), s(84,50), s(72,66), s(19,86), s(31,86), s(47,75), s(84,50), s(60,25),
        s(37,-41), s(89,-1), s(64,30), s(-39,43), s(33,17), s(-18,50), s(66,3), s(36,-41),
    ],
];

/// Material plus square bonus per colored piece, signed so that White
/// accumulates positively and Black negatively.
pub static PSQT: Lazy<[[Score; 64]; Piece::NB]> = Lazy::new(|| {
    let mut table = [[Score::ZERO; 64]; Piece::NB];
    for pt in PieceType::ALL {
        for sq in 0..64 {
            let value = PIECE_TYPE_VALUE[pt.index()] + PIECE_SQ_VALUE[pt.index()][sq];
            let white = Piece::new(crate::position::types::Color::White, pt);
            let black = Piece::new(crate::position::types::Color::Black, pt);
            table[white.index()][sq ^ 56] = value;
            table[black.index()][sq] = -value;
        }
    }
    table
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::types::{Color, Square};

    #[test]
    fn phase_scaling() {
        assert_eq!(update_phase(24), MID_GAME);
        assert_eq!(update_phase(0), 0);
        // Promotions cannot push the phase past the middlegame cap.
        assert_eq!(update_phase(30), MID_GAME);
        assert!(update_phase(12) > 0 && update_phase(12) < MID_GAME);
    }

    #[test]
    fn psqt_is_antisymmetric() {
        for pt in PieceType::ALL {
            let white = Piece::new(Color::White, pt);
            let black = Piece::new(Color::Black, pt);
            for idx in 0..64 {
                let sq = Square::from_index(idx);
                assert_eq!(
                    PSQT[white.index()][idx],
                    -PSQT[black.index()][sq.flip_rank().index()],
                );
            }
        }
    }

    #[test]
    fn pawn_home_ranks_are_zero_bonus() {
        let white = Piece::new(Color::White, PieceType::Pawn);
        // Rank 1 and 8 entries hold no pawn bonus, only the material value.
        for file in 0..8 {
            let sq = Square::new(file, 0);
            assert_eq!(PSQT[white.index()][sq.index()], PIECE_TYPE_VALUE[0]);
        }
    }
}
