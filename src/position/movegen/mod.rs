//! Move generation.
//!
//! Pseudo-legal moves obey piece motion and occupancy; the legality filter
//! runs each one through make, an attack test and take. Quiescence pulls
//! only the noisy subset.

mod pawns;
mod pieces;

use super::attacks::{
    bishop_attacks, king_attacks, knight_attacks, pawn_attacks, queen_attacks, rook_attacks,
};
use super::castling::{right_for_king_to, right_index, KING_TO};
use super::types::{Bitboard, Color, Move, MoveList, Piece, PieceType, FLAG_CASTLE};
use super::Position;

/// Which subset of moves to emit.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum GenType {
    Noisy,
    Quiet,
}

impl Position {
    /// All pseudo-legal moves.
    pub fn generate_all(&self, list: &mut MoveList) {
        self.generate_noisy(list);
        self.generate_quiets(list);
    }

    /// Captures, promotions and en passant.
    pub fn generate_noisy(&self, list: &mut MoveList) {
        self.gen_pawn_moves(list, GenType::Noisy);
        self.gen_piece_moves(list, self.color_pieces(!self.side_to_move()));
    }

    /// Non-capturing, non-promoting moves, castling included.
    pub fn generate_quiets(&self, list: &mut MoveList) {
        self.gen_pawn_moves(list, GenType::Quiet);
        self.gen_piece_moves(list, !self.all());
        self.gen_castling(list);
    }

    /// Pseudo-legal moves filtered through make + attack test + take.
    pub fn generate_legal(&mut self) -> MoveList {
        let mut pseudo = MoveList::new();
        self.generate_all(&mut pseudo);
        let mut legal = MoveList::new();
        for &mv in pseudo.iter() {
            if self.make(mv) {
                self.take();
                legal.push(mv);
            }
        }
        legal
    }

    /// Castling legality for one right: the right is present, the king is
    /// not in check, the path between king and rook is empty, no square the
    /// king crosses is attacked, and (Chess960) lifting the rook does not
    /// uncover a new attacker on the king's destination.
    #[must_use]
    pub fn castle_legal(&self, right: usize) -> bool {
        let us = self.side_to_move();
        let castling = self.castling();

        if self.castling_rights() & (1u8 << right) == 0 || self.in_check() {
            return false;
        }
        let rook_from = match castling.rook_from(right) {
            Some(sq) => sq,
            None => return false,
        };
        if (self.all() & castling.empty_path(right)).any() {
            return false;
        }
        for sq in castling.king_path(right) {
            if self.square_attacked(sq, !us) {
                return false;
            }
        }
        if self.is_chess960() {
            let occ = self.all() ^ Bitboard::from_square(rook_from);
            let to = KING_TO[right];
            if (self.attackers_to(to, occ) & self.color_pieces(!us)).any() {
                return false;
            }
        }
        true
    }

    fn gen_castling(&self, list: &mut MoveList) {
        let us = self.side_to_move();
        let king = Piece::new(us, PieceType::King);
        for kingside in [true, false] {
            let right = right_index(us, kingside);
            if self.castle_legal(right) {
                list.push(Move::new(
                    self.castling().king_from(us),
                    KING_TO[right],
                    king,
                    Piece::EMPTY,
                    Piece::EMPTY,
                    FLAG_CASTLE,
                ));
            }
        }
    }

    /// Validate an arbitrary move word (from the hash table or the UCI
    /// layer) against the position.
    #[must_use]
    pub fn move_is_pseudo_legal(&self, mv: Move) -> bool {
        if mv.is_none() {
            return false;
        }
        let us = self.side_to_move();
        let from = mv.from();
        let to = mv.to();
        let pc = mv.piece();
        let captured = mv.captured();
        let promo = mv.promotion();

        if pc.is_empty() || self.piece_on(from) != pc || pc.color() != us {
            return false;
        }

        if mv.is_castle() {
            if pc.piece_type() != PieceType::King || !promo.is_empty() || !captured.is_empty() {
                return false;
            }
            let right_rank = if us == Color::White { 0 } else { 7 };
            if to.rank() != right_rank || (to.file() != 2 && to.file() != 6) {
                return false;
            }
            return from == self.castling().king_from(us)
                && self.castle_legal(right_for_king_to(to));
        }

        // Flags and promotions only make sense on pawn moves.
        if pc.piece_type() != PieceType::Pawn
            && (mv.is_en_passant() || mv.is_double_push() || !promo.is_empty())
        {
            return false;
        }
        if !captured.is_empty()
            && (captured.color() == us || captured.piece_type() == PieceType::King)
        {
            return false;
        }

        if mv.is_en_passant() {
            return self.ep_square() == Some(to)
                && captured.is_empty()
                && pawn_attacks(us, from).contains(to);
        }
        if self.piece_on(to) != captured {
            return false;
        }

        match pc.piece_type() {
            PieceType::Pawn => {
                let on_last = to.relative_rank(us) == 7;
                if on_last {
                    if promo.is_empty()
                        || promo.color() != us
                        || matches!(promo.piece_type(), PieceType::Pawn | PieceType::King)
                    {
                        return false;
                    }
                } else if !promo.is_empty() {
                    return false;
                }

                let up: i32 = if us == Color::White { 8 } else { -8 };
                if mv.is_double_push() {
                    let mid = (from.index() as i32 + up) as usize;
                    from.relative_rank(us) == 1
                        && to.index() as i32 == from.index() as i32 + 2 * up
                        && self.piece_on(super::types::Square::from_index(mid)).is_empty()
                        && captured.is_empty()
                        && self.piece_on(to).is_empty()
                } else if captured.is_empty() {
                    to.index() as i32 == from.index() as i32 + up
                } else {
                    pawn_attacks(us, from).contains(to)
                }
            }
            PieceType::Knight => knight_attacks(from).contains(to),
            PieceType::Bishop => bishop_attacks(from, self.all()).contains(to),
            PieceType::Rook => rook_attacks(from, self.all()).contains(to),
            PieceType::Queen => queen_attacks(from, self.all()).contains(to),
            PieceType::King => king_attacks(from).contains(to),
        }
    }

    /// Expand a 16-bit hash-table move back into a full move word, or
    /// `Move::NONE` when nothing generated here matches it.
    #[must_use]
    pub fn find_move_by_compact(&self, compact: u16) -> Move {
        if compact == 0 {
            return Move::NONE;
        }
        let mut list = MoveList::new();
        self.generate_all(&mut list);
        for &mv in list.iter() {
            if mv.compact() == compact {
                return mv;
            }
        }
        Move::NONE
    }

    /// Full legality: pseudo-legal and the king survives.
    #[must_use]
    pub fn move_is_legal(&mut self, mv: Move) -> bool {
        if !self.move_is_pseudo_legal(mv) {
            return false;
        }
        if self.make(mv) {
            self.take();
            true
        } else {
            false
        }
    }

    /// Does the side to move have any legal move?
    #[must_use]
    pub fn has_legal_move(&mut self) -> bool {
        let mut pseudo = MoveList::new();
        self.generate_all(&mut pseudo);
        for &mv in pseudo.iter() {
            if self.make(mv) {
                self.take();
                return true;
            }
        }
        false
    }
}
