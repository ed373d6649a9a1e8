//! Zobrist key material.
//!
//! One process-wide table built from a fixed-seed generator so that keys are
//! reproducible across runs. The EMPTY piece row doubles as the en passant
//! keys, and `piece[pc][count]` entries double as the material key material.

use once_cell::sync::Lazy;
use rand::prelude::*;

use super::types::{Piece, Square};

pub struct ZobristKeys {
    pub piece: [[u64; 64]; Piece::NB],
    pub castle: [u64; 16],
    pub side: u64,
}

static KEYS: Lazy<ZobristKeys> = Lazy::new(|| {
    let mut rng = StdRng::seed_from_u64(0x0070_1d1e_5ea5_1de5);
    let mut piece = [[0u64; 64]; Piece::NB];
    for row in &mut piece {
        for key in row.iter_mut() {
            *key = rng.gen();
        }
    }
    let mut castle = [0u64; 16];
    for key in &mut castle {
        *key = rng.gen();
    }
    ZobristKeys {
        piece,
        castle,
        side: rng.gen(),
    }
});

#[inline]
#[must_use]
pub fn piece_key(pc: Piece, sq: Square) -> u64 {
    KEYS.piece[pc.index()][sq.index()]
}

/// En passant contribution, XORed only while an ep square is set.
#[inline]
#[must_use]
pub fn ep_key(sq: Square) -> u64 {
    KEYS.piece[Piece::EMPTY.index()][sq.index()]
}

#[inline]
#[must_use]
pub fn castle_key(rights: u8) -> u64 {
    KEYS.castle[rights as usize]
}

#[inline]
#[must_use]
pub fn side_key() -> u64 {
    KEYS.side
}

/// Material key contribution for the `count`-th piece of a kind. Both adding
/// and removing XOR the entry at the lower of the two counts involved, so the
/// key depends only on the final multiset of piece counts.
#[inline]
#[must_use]
pub fn material_key(pc: Piece, count: u32) -> u64 {
    KEYS.piece[pc.index()][count as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::types::{Color, PieceType};

    #[test]
    fn keys_are_stable_and_distinct() {
        let wp = Piece::new(Color::White, PieceType::Pawn);
        let bp = Piece::new(Color::Black, PieceType::Pawn);
        assert_eq!(piece_key(wp, Square::E1), piece_key(wp, Square::E1));
        assert_ne!(piece_key(wp, Square::E1), piece_key(bp, Square::E1));
        assert_ne!(piece_key(wp, Square::E1), piece_key(wp, Square::E8));
        assert_ne!(side_key(), 0);
        assert_ne!(castle_key(0), castle_key(15));
    }
}
