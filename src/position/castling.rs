//! Castling rights and geometry.
//!
//! Rook start squares are stored per right rather than assumed, so Chess960
//! back ranks work through the same code path. The per-square permission
//! masks let make clear rights with two array lookups.

use super::attacks::between;
use super::types::{Bitboard, Color, Square};

pub const WHITE_OO: u8 = 1;
pub const WHITE_OOO: u8 = 2;
pub const BLACK_OO: u8 = 4;
pub const BLACK_OOO: u8 = 8;
pub const ALL_RIGHTS: u8 = 15;

/// Right indices: 0 = white kingside, 1 = white queenside, 2 = black
/// kingside, 3 = black queenside. `1 << index` is the rights bit.
pub const RIGHT_NB: usize = 4;

pub const KING_TO: [Square; RIGHT_NB] = [Square::G1, Square::C1, Square::G8, Square::C8];
pub const ROOK_TO: [Square; RIGHT_NB] = [Square::F1, Square::D1, Square::F8, Square::D8];

#[inline]
#[must_use]
pub const fn right_index(color: Color, kingside: bool) -> usize {
    (color as usize) * 2 + if kingside { 0 } else { 1 }
}

/// Right index for a king destination square (C1/G1/C8/G8).
#[inline]
#[must_use]
pub fn right_for_king_to(to: Square) -> usize {
    let color = if to.rank() == 0 {
        Color::White
    } else {
        Color::Black
    };
    right_index(color, to.file() == 6)
}

/// Castling geometry of the current game, fixed at position setup.
#[derive(Clone, Debug)]
pub struct Castling {
    /// Rook start square per right, for rights present in the start position.
    rook_from: [Option<Square>; RIGHT_NB],
    /// King start square per color.
    king_from: [Square; 2],
    /// Rights that survive a move touching each square.
    perm: [u8; 64],
    /// Squares that must be empty for each right (king and rook excluded).
    empty_path: [Bitboard; RIGHT_NB],
    /// Squares the king crosses, destination included, start excluded.
    king_path: [Bitboard; RIGHT_NB],
}

impl Castling {
    #[must_use]
    pub fn new() -> Self {
        Castling {
            rook_from: [None; RIGHT_NB],
            king_from: [Square::E1, Square::E8],
            perm: [ALL_RIGHTS; 64],
            empty_path: [Bitboard::EMPTY; RIGHT_NB],
            king_path: [Bitboard::EMPTY; RIGHT_NB],
        }
    }

    pub fn set_king(&mut self, color: Color, sq: Square) {
        self.king_from[color.index()] = sq;
    }

    pub fn add_right(&mut self, color: Color, rook_sq: Square) {
        let king_sq = self.king_from[color.index()];
        let kingside = rook_sq.file() > king_sq.file();
        let right = right_index(color, kingside);
        self.rook_from[right] = Some(rook_sq);

        let king_to = KING_TO[right];
        let rook_to = ROOK_TO[right];
        let movers = Bitboard::from_square(king_sq) | Bitboard::from_square(rook_sq);
        self.empty_path[right] = (between(king_sq, king_to)
            | Bitboard::from_square(king_to)
            | between(rook_sq, rook_to)
            | Bitboard::from_square(rook_to))
            & !movers;
        self.king_path[right] = between(king_sq, king_to) | Bitboard::from_square(king_to);
    }

    /// Rebuild the per-square permission masks after all rights are added.
    pub fn finish(&mut self, rights: u8) {
        self.perm = [ALL_RIGHTS; 64];
        for color in Color::BOTH {
            let own = if color == Color::White {
                WHITE_OO | WHITE_OOO
            } else {
                BLACK_OO | BLACK_OOO
            };
            self.perm[self.king_from[color.index()].index()] &= !own;
        }
        for right in 0..RIGHT_NB {
            if rights & (1 << right) != 0 {
                if let Some(rook) = self.rook_from[right] {
                    self.perm[rook.index()] &= !(1u8 << right);
                }
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn perm_mask(&self, sq: Square) -> u8 {
        self.perm[sq.index()]
    }

    #[inline]
    #[must_use]
    pub fn rook_from(&self, right: usize) -> Option<Square> {
        self.rook_from[right]
    }

    #[inline]
    #[must_use]
    pub fn king_from(&self, color: Color) -> Square {
        self.king_from[color.index()]
    }

    #[inline]
    #[must_use]
    pub fn empty_path(&self, right: usize) -> Bitboard {
        self.empty_path[right]
    }

    #[inline]
    #[must_use]
    pub fn king_path(&self, right: usize) -> Bitboard {
        self.king_path[right]
    }
}

impl Default for Castling {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_geometry() {
        let mut c = Castling::new();
        c.set_king(Color::White, Square::E1);
        c.add_right(Color::White, Square::H1);
        c.add_right(Color::White, Square::A1);
        c.finish(WHITE_OO | WHITE_OOO);

        let oo = right_index(Color::White, true);
        assert_eq!(c.rook_from(oo), Some(Square::H1));
        assert_eq!(
            c.empty_path(oo),
            Bitboard::from_square(Square::F1) | Bitboard::from_square(Square::G1)
        );
        assert_eq!(
            c.king_path(oo),
            Bitboard::from_square(Square::F1) | Bitboard::from_square(Square::G1)
        );

        let ooo = right_index(Color::White, false);
        assert!(c.empty_path(ooo).contains(Square::B1));
        assert!(!c.king_path(ooo).contains(Square::B1));

        assert_eq!(c.perm_mask(Square::E1), ALL_RIGHTS & !(WHITE_OO | WHITE_OOO));
        assert_eq!(c.perm_mask(Square::H1), ALL_RIGHTS & !WHITE_OO);
        assert_eq!(c.perm_mask(Square::E8), ALL_RIGHTS);
    }

    #[test]
    fn chess960_king_already_on_target_file() {
        // King b1, rook a1: queenside castle to c1, rook to d1.
        let mut c = Castling::new();
        c.set_king(Color::White, Square::B1);
        c.add_right(Color::White, Square::A1);
        c.finish(WHITE_OOO);

        let ooo = right_index(Color::White, false);
        assert_eq!(c.rook_from(ooo), Some(Square::A1));
        assert_eq!(
            c.empty_path(ooo),
            Bitboard::from_square(Square::C1) | Bitboard::from_square(Square::D1)
        );
        assert_eq!(c.king_path(ooo), Bitboard::from_square(Square::C1));
    }
}
