//! Tapered position evaluation.
//!
//! Every term is a packed mg/eg pair accumulated from White's point of
//! view; the final value is blended by phase and returned from the side to
//! move's perspective with a small tempo bonus.

pub mod pawns;
pub mod psqt;
pub mod score;

use crate::position::attacks::{
    bishop_attacks, forward_file, king_attacks, knight_attacks, queen_attacks, rook_attacks,
};
use crate::position::types::{Bitboard, Color, PieceType, Square};
use crate::position::Position;

use pawns::PawnCache;
use score::{s, Score};

/// Bonus for having the move.
pub const TEMPO: i32 = 15;

const BISHOP_PAIR: Score = s(30, 80);
const NB_BEHIND_PAWN: Score = s(6, 20);
const BISHOP_BAD_PAWN: Score = s(-5, -7);
const ROOK_OPEN_FILE: Score = s(30, 12);
const ROOK_SEMI_OPEN_FILE: Score = s(14, 10);
const SHELTER: Score = s(9, -3);
const KING_ATK_PAWN: Score = s(-10, 40);
const PAWN_THREAT: Score = s(55, 75);
const PUSH_THREAT: Score = s(20, 15);

const PASSED_BLOCKED: [Score; 4] = [s(0, -8), s(-6, -18), s(-14, -45), s(-30, -95)];
const PASSED_FREE_ADVANCE: [Score; 4] = [s(0, 12), s(4, 28), s(10, 65), s(22, 130)];
const PASSED_DIST_US: [Score; 4] = [s(0, -2), s(-1, -5), s(-2, -9), s(-4, -14)];
const PASSED_DIST_THEM: Score = s(0, 5);
const PASSED_ROOK_BACK: Score = s(10, 25);
const PASSED_SQUARE_RULE: Score = s(0, 200);

/// Indexed by the attacked piece's type.
const THREAT_BY_MINOR: [Score; 6] = [
    s(5, 18),
    s(28, 36),
    s(32, 42),
    s(56, 36),
    s(46, 26),
    s(0, 0),
];
const THREAT_BY_ROOK: [Score; 6] = [
    s(2, 22),
    s(32, 40),
    s(32, 36),
    s(0, 0),
    s(52, 18),
    s(0, 0),
];

/// Penalty by the number of line squares reaching the king.
#[rustfmt::skip]
const KING_LINE_DANGER: [Score; 28] = [
    s(0, 0),    s(0, 0),    s(8, 2),    s(4, 4),
    s(-6, 2),   s(-12, 4),  s(-16, 2),  s(-22, 4),
    s(-28, 2),  s(-38, 4),  s(-44, 2),  s(-50, 4),
    s(-56, 2),  s(-66, 2),  s(-74, 0),  s(-82, 0),
    s(-90, -2), s(-98, -2), s(-106, -4), s(-114, -6),
    s(-122, -8), s(-130, -10), s(-138, -12), s(-146, -14),
    s(-154, -16), s(-162, -18), s(-170, -20), s(-180, -22),
];

#[rustfmt::skip]
const MOBILITY_KNIGHT: [Score; 9] = [
    s(-50, -80), s(-28, -42), s(-8, -12), s(2, 8), s(12, 20),
    s(18, 32), s(26, 36), s(34, 38), s(42, 34),
];

#[rustfmt::skip]
const MOBILITY_BISHOP: [Score; 14] = [
    s(-44, -90), s(-24, -50), s(-8, -18), s(2, 0), s(10, 14), s(18, 28),
    s(22, 38), s(26, 44), s(28, 50), s(32, 52), s(36, 52), s(52, 46),
    s(54, 48), s(66, 38),
];

#[rustfmt::skip]
const MOBILITY_ROOK: [Score; 15] = [
    s(-60, -70), s(-28, -38), s(-12, -14), s(-8, 4), s(-4, 20), s(-2, 32),
    s(0, 42), s(4, 48), s(10, 52), s(16, 58), s(20, 62), s(24, 66),
    s(28, 70), s(36, 68), s(44, 62),
];

#[rustfmt::skip]
const MOBILITY_QUEEN: [Score; 28] = [
    s(-60, -80), s(-40, -60), s(-22, -40), s(-14, -24), s(-8, -10),
    s(-4, 2), s(-2, 14), s(0, 26), s(2, 36), s(4, 44),
    s(6, 50), s(8, 56), s(10, 60), s(12, 64), s(14, 66),
    s(16, 68), s(18, 70), s(20, 70), s(22, 70), s(26, 68),
    s(30, 66), s(36, 62), s(42, 58), s(48, 54), s(54, 50),
    s(60, 46), s(66, 42), s(72, 38),
];

/// Static evaluation from the side to move's perspective.
#[must_use]
pub fn evaluate(pos: &Position, cache: &mut PawnCache) -> i32 {
    let mut eval = pos.material();

    let pawn_entry = cache.probe(pos);
    eval += pawn_entry.eval;
    eval += evaluate_pieces(pos);
    eval += evaluate_passed(pos, pawn_entry.passed_pawns);

    let tapered = eval.taper(pos.phase());
    let stm = match pos.side_to_move() {
        Color::White => tapered,
        Color::Black => -tapered,
    };
    stm + TEMPO
}

/// Static evaluation from White's perspective.
#[must_use]
pub fn evaluate_white_pov(pos: &Position, cache: &mut PawnCache) -> i32 {
    let v = evaluate(pos, cache);
    match pos.side_to_move() {
        Color::White => v,
        Color::Black => -v,
    }
}

fn pawn_attack_span(pawns: Bitboard, color: Color) -> Bitboard {
    match color {
        Color::White => pawns.north().east() | pawns.north().west(),
        Color::Black => pawns.south().east() | pawns.south().west(),
    }
}

fn evaluate_pieces(pos: &Position) -> Score {
    let mut total = Score::ZERO;
    let occ = pos.all();

    for color in Color::BOTH {
        let us = color;
        let them = !color;
        let mut score = Score::ZERO;

        let us_pawns = pos.piece_bb(us, PieceType::Pawn);
        let them_pawns = pos.piece_bb(them, PieceType::Pawn);
        let them_pieces = pos.color_pieces(them);
        let them_attackable = them_pieces & !pos.piece_bb(them, PieceType::King);
        let them_pawn_attacks = pawn_attack_span(them_pawns, them);
        let mobility_area = !(us_pawns | them_pawn_attacks);
        let behind_own_pawn = match us {
            Color::White => us_pawns.south(),
            Color::Black => us_pawns.north(),
        };

        for from in pos.piece_bb(us, PieceType::Knight) {
            let attacks = knight_attacks(from);
            score += MOBILITY_KNIGHT[(attacks & mobility_area).popcount() as usize];
            if behind_own_pawn.contains(from) {
                score += NB_BEHIND_PAWN;
            }
            for target in attacks & them_attackable {
                score += THREAT_BY_MINOR[pos.piece_on(target).piece_type().index()];
            }
        }

        let bishops = pos.piece_bb(us, PieceType::Bishop);
        if bishops.popcount() >= 2 {
            score += BISHOP_PAIR;
        }
        for from in bishops {
            let attacks = bishop_attacks(from, occ);
            score += MOBILITY_BISHOP[(attacks & mobility_area).popcount() as usize];
            if behind_own_pawn.contains(from) {
                score += NB_BEHIND_PAWN;
            }
            let own_complex = if Bitboard::LIGHT_SQUARES.contains(from) {
                Bitboard::LIGHT_SQUARES
            } else {
                Bitboard::DARK_SQUARES
            };
            score += BISHOP_BAD_PAWN * (us_pawns & own_complex).popcount() as i32;
            for target in attacks & them_attackable {
                score += THREAT_BY_MINOR[pos.piece_on(target).piece_type().index()];
            }
        }

        for from in pos.piece_bb(us, PieceType::Rook) {
            let attacks = rook_attacks(from, occ);
            score += MOBILITY_ROOK[(attacks & mobility_area).popcount() as usize];
            let file = Bitboard::file(from.file());
            if ((us_pawns | them_pawns) & file).is_empty() {
                score += ROOK_OPEN_FILE;
            } else if (us_pawns & file).is_empty() {
                score += ROOK_SEMI_OPEN_FILE;
            }
            for target in attacks & them_attackable {
                score += THREAT_BY_ROOK[pos.piece_on(target).piece_type().index()];
            }
        }

        for from in pos.piece_bb(us, PieceType::Queen) {
            let attacks = queen_attacks(from, occ);
            score += MOBILITY_QUEEN[(attacks & mobility_area).popcount() as usize];
        }

        // King placement terms.
        let ksq = pos.king_sq(us);
        let shield = king_attacks(ksq) & us_pawns & forward_ranks(us, ksq.rank());
        score += SHELTER * shield.popcount() as i32;
        if (king_attacks(ksq) & them_pawns).any() {
            score += KING_ATK_PAWN;
        }
        let open_lines = (queen_attacks(ksq, occ) & !pos.color_pieces(us))
            .popcount()
            .min(27) as usize;
        score += KING_LINE_DANGER[open_lines];

        // Threats by pawns, present and imminent.
        let our_pawn_attacks = pawn_attack_span(us_pawns, us);
        score += PAWN_THREAT
            * (our_pawn_attacks & them_attackable & !them_pawns).popcount() as i32;
        let pushes = match us {
            Color::White => us_pawns.north() & !occ,
            Color::Black => us_pawns.south() & !occ,
        };
        score += PUSH_THREAT
            * (pawn_attack_span(pushes, us) & them_attackable & !them_pawns).popcount() as i32;

        total += if us == Color::White { score } else { -score };
    }

    total
}

fn evaluate_passed(pos: &Position, passed: Bitboard) -> Score {
    let mut total = Score::ZERO;

    for color in Color::BOTH {
        let us = color;
        let them = !color;
        let mut score = Score::ZERO;
        let our_passed = passed & pos.color_pieces(us);
        let us_king = pos.king_sq(us);
        let them_king = pos.king_sq(them);

        for sq in our_passed {
            let relr = sq.relative_rank(us);
            if relr < 3 {
                continue;
            }
            let bucket = relr - 3;
            let front = front_square(us, sq);

            if !pos.piece_on(front).is_empty() {
                score += PASSED_BLOCKED[bucket];
            } else if !pos.square_attacked(front, them) {
                score += PASSED_FREE_ADVANCE[bucket];
            }

            score += PASSED_DIST_US[bucket] * us_king.distance(front);
            score += PASSED_DIST_THEM * them_king.distance(front);

            if (forward_file(them, sq) & pos.piece_bb(us, PieceType::Rook)).any() {
                score += PASSED_ROOK_BACK;
            }

            if pos.non_pawn_count(them) == 0 {
                let promo = Square::new(sq.file(), if us == Color::White { 7 } else { 0 });
                let to_go = (7 - relr) as i32 + i32::from(pos.side_to_move() == them);
                if them_king.distance(promo) > to_go {
                    score += PASSED_SQUARE_RULE;
                }
            }
        }

        total += if us == Color::White { score } else { -score };
    }

    total
}

#[inline]
fn front_square(color: Color, sq: Square) -> Square {
    let up: i32 = if color == Color::White { 8 } else { -8 };
    Square::from_index((sq.index() as i32 + up) as usize)
}

/// Ranks strictly ahead of `rank` from `color`'s point of view.
#[inline]
fn forward_ranks(color: Color, rank: usize) -> Bitboard {
    match color {
        Color::White => {
            if rank == 7 {
                Bitboard::EMPTY
            } else {
                Bitboard(!0u64 << (8 * (rank + 1)))
            }
        }
        Color::Black => {
            if rank == 0 {
                Bitboard::EMPTY
            } else {
                Bitboard(!0u64 >> (8 * (8 - rank)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_eval_is_tempo_symmetric() {
        let mut cache = PawnCache::new();
        let white = evaluate(&Position::startpos(), &mut cache);
        let black = {
            let pos = Position::from_fen(
                "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq - 0 1",
            )
            .unwrap();
            evaluate(&pos, &mut cache)
        };
        assert_eq!(white, black);
    }

    #[test]
    fn extra_queen_wins_the_eval() {
        let mut cache = PawnCache::new();
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/3QK3 w - - 0 1").unwrap();
        assert!(evaluate(&pos, &mut cache) > 500);
        assert!(evaluate_white_pov(&pos, &mut cache) > 500);

        let pos = Position::from_fen("4k3/8/8/8/8/8/8/3QK3 b - - 0 1").unwrap();
        assert!(evaluate(&pos, &mut cache) < -500);
        assert!(evaluate_white_pov(&pos, &mut cache) > 500);
    }
}
