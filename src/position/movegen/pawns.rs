//! Pawn move emission: pushes, captures, promotions, en passant.

use super::GenType;
use crate::position::attacks::pawn_attacks;
use crate::position::types::{
    Bitboard, Color, Move, MoveList, Piece, PieceType, Square, FLAG_DOUBLE_PUSH, FLAG_EN_PASSANT,
};
use crate::position::Position;

const PROMO_TYPES: [PieceType; 4] = [
    PieceType::Queen,
    PieceType::Rook,
    PieceType::Bishop,
    PieceType::Knight,
];

impl Position {
    pub(crate) fn gen_pawn_moves(&self, list: &mut MoveList, gen: GenType) {
        let us = self.side_to_move();
        let pawn = Piece::new(us, PieceType::Pawn);
        let pawns = self.piece_bb(us, PieceType::Pawn);
        let empty = !self.all();
        let enemies = self.color_pieces(!us);

        let up: i32 = if us == Color::White { 8 } else { -8 };
        let last_rank = if us == Color::White {
            Bitboard::RANK_8
        } else {
            Bitboard::RANK_1
        };
        let third_rank = if us == Color::White {
            Bitboard(Bitboard::RANK_1.0 << 16)
        } else {
            Bitboard(Bitboard::RANK_8.0 >> 16)
        };

        let shift = |bb: Bitboard| -> Bitboard {
            if us == Color::White {
                bb.north()
            } else {
                bb.south()
            }
        };

        let single = shift(pawns) & empty;

        match gen {
            GenType::Quiet => {
                for to in single & !last_rank {
                    let from = Square::from_index((to.index() as i32 - up) as usize);
                    list.push(Move::new(from, to, pawn, Piece::EMPTY, Piece::EMPTY, 0));
                }
                for to in shift(single & third_rank) & empty {
                    let from = Square::from_index((to.index() as i32 - 2 * up) as usize);
                    list.push(Move::new(
                        from,
                        to,
                        pawn,
                        Piece::EMPTY,
                        Piece::EMPTY,
                        FLAG_DOUBLE_PUSH,
                    ));
                }
            }
            GenType::Noisy => {
                for to in single & last_rank {
                    let from = Square::from_index((to.index() as i32 - up) as usize);
                    self.push_promotions(list, from, to, Piece::EMPTY);
                }

                let (east, west) = if us == Color::White {
                    (pawns.north().east(), pawns.north().west())
                } else {
                    (pawns.south().east(), pawns.south().west())
                };
                for (targets, delta) in [(east & enemies, up + 1), (west & enemies, up - 1)] {
                    for to in targets {
                        let from = Square::from_index((to.index() as i32 - delta) as usize);
                        let captured = self.piece_on(to);
                        if last_rank.contains(to) {
                            self.push_promotions(list, from, to, captured);
                        } else {
                            list.push(Move::new(from, to, pawn, captured, Piece::EMPTY, 0));
                        }
                    }
                }

                if let Some(ep) = self.ep_square() {
                    for from in pawn_attacks(!us, ep) & pawns {
                        list.push(Move::new(
                            from,
                            ep,
                            pawn,
                            Piece::EMPTY,
                            Piece::EMPTY,
                            FLAG_EN_PASSANT,
                        ));
                    }
                }
            }
        }
    }

    fn push_promotions(&self, list: &mut MoveList, from: Square, to: Square, captured: Piece) {
        let us = self.side_to_move();
        let pawn = Piece::new(us, PieceType::Pawn);
        for pt in PROMO_TYPES {
            list.push(Move::new(from, to, pawn, captured, Piece::new(us, pt), 0));
        }
    }
}
