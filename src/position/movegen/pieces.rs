//! Knight, bishop, rook, queen and king move emission.

use crate::position::attacks::{bishop_attacks, king_attacks, knight_attacks, rook_attacks};
use crate::position::types::{Bitboard, Move, MoveList, Piece, PieceType, Square};
use crate::position::Position;

impl Position {
    /// Emit moves of every non-pawn piece into squares of `targets`.
    pub(crate) fn gen_piece_moves(&self, list: &mut MoveList, targets: Bitboard) {
        let us = self.side_to_move();
        let occ = self.all();

        for pt in [
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Rook,
            PieceType::Queen,
            PieceType::King,
        ] {
            let pc = Piece::new(us, pt);
            for from in self.piece_bb(us, pt) {
                let attacks = match pt {
                    PieceType::Knight => knight_attacks(from),
                    PieceType::Bishop => bishop_attacks(from, occ),
                    PieceType::Rook => rook_attacks(from, occ),
                    PieceType::Queen => bishop_attacks(from, occ) | rook_attacks(from, occ),
                    PieceType::King => king_attacks(from),
                    PieceType::Pawn => unreachable!(),
                };
                for to in attacks & targets {
                    self.push_piece_move(list, pc, from, to);
                }
            }
        }
    }

    #[inline]
    fn push_piece_move(&self, list: &mut MoveList, pc: Piece, from: Square, to: Square) {
        list.push(Move::new(
            from,
            to,
            pc,
            self.piece_on(to),
            Piece::EMPTY,
            0,
        ));
    }
}
