//! Static exchange evaluation.
//!
//! Swap-off with x-ray updates: after each capture the hidden slider behind
//! the moved piece joins the attacker set. Threshold form: answers "does
//! this move win at least `threshold` material", which is all the search
//! and move picker ever ask.

use crate::eval::psqt::SEE_VALUE;
use crate::position::attacks::{bishop_attacks, rook_attacks};
use crate::position::types::{Bitboard, Move, PieceType};
use crate::position::Position;

#[inline]
#[must_use]
pub fn see_value(pt: PieceType) -> i32 {
    SEE_VALUE[pt.index()]
}

/// Material swing of the move before any recapture.
#[must_use]
pub fn move_estimated_value(mv: Move) -> i32 {
    let mut value = if mv.is_en_passant() {
        see_value(PieceType::Pawn)
    } else if mv.captured().is_empty() {
        0
    } else {
        see_value(mv.captured().piece_type())
    };
    if !mv.promotion().is_empty() {
        value += see_value(mv.promotion().piece_type()) - see_value(PieceType::Pawn);
    }
    value
}

/// Does `mv` win at least `threshold` material once every profitable
/// recapture has been played out?
#[must_use]
pub fn see(pos: &Position, mv: Move, threshold: i32) -> bool {
    // Castling can neither win nor lose material.
    if mv.is_castle() {
        return threshold <= 0;
    }

    let from = mv.from();
    let to = mv.to();

    let mut next_victim = if mv.promotion().is_empty() {
        mv.piece().piece_type()
    } else {
        mv.promotion().piece_type()
    };

    let mut balance = move_estimated_value(mv) - threshold;
    if balance < 0 {
        return false;
    }
    // Even losing the moved piece outright keeps us above the bar.
    balance -= see_value(next_victim);
    if balance >= 0 {
        return true;
    }

    let bishops = pos.pieces(PieceType::Bishop) | pos.pieces(PieceType::Queen);
    let rooks = pos.pieces(PieceType::Rook) | pos.pieces(PieceType::Queen);

    let mut occupied = (pos.all() ^ Bitboard::from_square(from)) | Bitboard::from_square(to);
    if mv.is_en_passant() {
        occupied ^= Bitboard::from_square(to.ep_pair());
    }

    let mut attackers = pos.attackers_to(to, occupied) & occupied;
    let mut color = !mv.piece().color();

    loop {
        let my_attackers = attackers & pos.color_pieces(color);
        if my_attackers.is_empty() {
            break;
        }

        // Recapture with the least valuable attacker.
        for pt in PieceType::ALL {
            next_victim = pt;
            if (my_attackers & pos.pieces(pt)).any() {
                break;
            }
        }

        occupied ^= Bitboard::from_square((my_attackers & pos.pieces(next_victim)).lsb());

        // Lifting a pawn, bishop or queen may uncover a diagonal x-ray;
        // lifting a rook or queen a straight one.
        if matches!(
            next_victim,
            PieceType::Pawn | PieceType::Bishop | PieceType::Queen
        ) {
            attackers |= bishop_attacks(to, occupied) & bishops;
        }
        if matches!(next_victim, PieceType::Rook | PieceType::Queen) {
            attackers |= rook_attacks(to, occupied) & rooks;
        }
        attackers &= occupied;

        color = !color;
        balance = -balance - 1 - see_value(next_victim);

        if balance >= 0 {
            // A king "capture" only stands if the other side cannot answer.
            if next_victim == PieceType::King && (attackers & pos.color_pieces(color)).any() {
                color = !color;
            }
            break;
        }
    }

    // The side left to move has no profitable continuation and loses the
    // exchange; the mover wins it if that side is not the mover.
    mv.piece().color() != color
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(pos: &mut Position, text: &str) -> Move {
        pos.parse_uci_move(text).expect("move exists")
    }

    #[test]
    fn winning_capture_passes() {
        // Pawn takes an undefended knight.
        let mut pos = Position::from_fen("4k3/8/8/3n4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let mv = find(&mut pos, "e4d5");
        assert!(see(&pos, mv, 0));
        assert!(see(&pos, mv, 300));
        assert!(!see(&pos, mv, 500));
    }

    #[test]
    fn defended_pawn_refutes_queen_grab() {
        // Queen takes a pawn defended by a pawn: loses queen for pawn.
        let mut pos = Position::from_fen("4k3/2p5/3p4/8/3Q4/8/8/4K3 w - - 0 1").unwrap();
        let mv = find(&mut pos, "d4d6");
        assert!(!see(&pos, mv, 0));
    }

    #[test]
    fn recapture_chain_counts_xrays() {
        // Doubled rooks against a defended rook: RxR, pxR, RxP through the
        // x-ray leaves White a pawn up after the dust settles.
        let mut pos =
            Position::from_fen("4k3/8/3p4/4r3/8/8/4R3/4R2K w - - 0 1").unwrap();
        let mv = find(&mut pos, "e2e5");
        assert!(see(&pos, mv, 0));
        assert!(see(&pos, mv, 100));
        assert!(!see(&pos, mv, 300));
    }

    #[test]
    fn quiet_move_into_attack_fails_threshold() {
        // Rook steps onto a square attacked by a pawn for nothing.
        let mut pos = Position::from_fen("4k3/8/2p5/8/3R4/8/8/4K3 w - - 0 1").unwrap();
        let mv = find(&mut pos, "d4d5");
        assert!(!see(&pos, mv, 0));
        let safe = find(&mut pos, "d4d1");
        assert!(see(&pos, safe, 0));
    }
}
