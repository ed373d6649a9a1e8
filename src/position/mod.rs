//! Board state and game rules.
//!
//! The `Position` is the authoritative game state: mailbox plus bitboards,
//! incrementally maintained hash keys, tapered material accumulator and an
//! internal history stack that `take` rewinds move by move.

pub mod attacks;
mod castling;
mod error;
mod fen;
mod make_unmake;
mod movegen;
mod parse;
mod perft;
pub mod types;
pub mod zobrist;

#[cfg(test)]
mod tests;

pub use castling::{
    right_for_king_to, right_index, Castling, ALL_RIGHTS, BLACK_OO, BLACK_OOO, KING_TO, RIGHT_NB,
    ROOK_TO, WHITE_OO, WHITE_OOO,
};
pub use error::FenError;
pub use fen::START_FEN;
pub use perft::{perft, perft_divide};

use crate::eval::psqt::{self, PSQT};
use crate::eval::score::Score;
use attacks::{bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks};
use types::{Bitboard, Color, Move, Piece, PieceType, Square};

/// One history stack entry: exactly the state `take` cannot recompute.
#[derive(Clone, Copy, Debug)]
pub struct Undo {
    pub key: u64,
    pub material_key: u64,
    pub mv: Move,
    pub checkers: Bitboard,
    pub ep_square: Option<Square>,
    pub rule50: u32,
    pub castling_rights: u8,
}

#[derive(Clone, Debug)]
pub struct Position {
    board: [Piece; 64],
    type_bb: [Bitboard; 6],
    color_bb: [Bitboard; 2],
    all_bb: Bitboard,

    side: Color,
    castling_rights: u8,
    ep_square: Option<Square>,
    rule50: u32,

    key: u64,
    pawn_key: u64,
    non_pawn_key: [u64; 2],
    minor_key: u64,
    major_key: u64,
    material_key: u64,

    material: Score,
    phase_value: i32,
    phase: i32,
    non_pawn_count: [i32; 2],

    checkers: Bitboard,

    /// Nodes visited through this position copy; bumped by `make`.
    pub nodes: u64,

    history: Vec<Undo>,
    castling: Castling,
    chess960: bool,
}

/// Keys recomputed from scratch, for consistency checks.
#[derive(Debug, PartialEq, Eq)]
pub struct RecomputedKeys {
    pub key: u64,
    pub pawn_key: u64,
    pub non_pawn_key: [u64; 2],
    pub minor_key: u64,
    pub major_key: u64,
    pub material_key: u64,
}

impl Position {
    pub(crate) fn empty() -> Self {
        Position {
            board: [Piece::EMPTY; 64],
            type_bb: [Bitboard::EMPTY; 6],
            color_bb: [Bitboard::EMPTY; 2],
            all_bb: Bitboard::EMPTY,
            side: Color::White,
            castling_rights: 0,
            ep_square: None,
            rule50: 0,
            key: 0,
            pawn_key: 0,
            non_pawn_key: [0; 2],
            minor_key: 0,
            major_key: 0,
            material_key: 0,
            material: Score::ZERO,
            phase_value: 0,
            phase: 0,
            non_pawn_count: [0; 2],
            checkers: Bitboard::EMPTY,
            nodes: 0,
            history: Vec::with_capacity(256),
            castling: Castling::new(),
            chess960: false,
        }
    }

    #[must_use]
    pub fn startpos() -> Self {
        Self::from_fen(START_FEN).expect("start position FEN is valid")
    }

    // -- accessors ---------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn side_to_move(&self) -> Color {
        self.side
    }

    #[inline]
    #[must_use]
    pub fn piece_on(&self, sq: Square) -> Piece {
        self.board[sq.index()]
    }

    #[inline]
    #[must_use]
    pub fn pieces(&self, pt: PieceType) -> Bitboard {
        self.type_bb[pt.index()]
    }

    #[inline]
    #[must_use]
    pub fn color_pieces(&self, color: Color) -> Bitboard {
        self.color_bb[color.index()]
    }

    #[inline]
    #[must_use]
    pub fn piece_bb(&self, color: Color, pt: PieceType) -> Bitboard {
        self.type_bb[pt.index()] & self.color_bb[color.index()]
    }

    #[inline]
    #[must_use]
    pub fn all(&self) -> Bitboard {
        self.all_bb
    }

    #[inline]
    #[must_use]
    pub fn king_sq(&self, color: Color) -> Square {
        self.piece_bb(color, PieceType::King).lsb()
    }

    #[inline]
    #[must_use]
    pub fn key(&self) -> u64 {
        self.key
    }

    #[inline]
    #[must_use]
    pub fn pawn_key(&self) -> u64 {
        self.pawn_key
    }

    #[inline]
    #[must_use]
    pub fn non_pawn_key(&self, color: Color) -> u64 {
        self.non_pawn_key[color.index()]
    }

    #[inline]
    #[must_use]
    pub fn minor_key(&self) -> u64 {
        self.minor_key
    }

    #[inline]
    #[must_use]
    pub fn major_key(&self) -> u64 {
        self.major_key
    }

    #[inline]
    #[must_use]
    pub fn material_key(&self) -> u64 {
        self.material_key
    }

    #[inline]
    #[must_use]
    pub fn material(&self) -> Score {
        self.material
    }

    #[inline]
    #[must_use]
    pub fn phase(&self) -> i32 {
        self.phase
    }

    #[inline]
    #[must_use]
    pub fn phase_value(&self) -> i32 {
        self.phase_value
    }

    #[inline]
    #[must_use]
    pub fn checkers(&self) -> Bitboard {
        self.checkers
    }

    #[inline]
    #[must_use]
    pub fn in_check(&self) -> bool {
        self.checkers.any()
    }

    #[inline]
    #[must_use]
    pub fn ep_square(&self) -> Option<Square> {
        self.ep_square
    }

    #[inline]
    #[must_use]
    pub fn rule50(&self) -> u32 {
        self.rule50
    }

    #[inline]
    #[must_use]
    pub fn castling_rights(&self) -> u8 {
        self.castling_rights
    }

    #[inline]
    #[must_use]
    pub fn castling(&self) -> &Castling {
        &self.castling
    }

    #[inline]
    #[must_use]
    pub fn hist_ply(&self) -> usize {
        self.history.len()
    }

    #[inline]
    #[must_use]
    pub fn last_move(&self) -> Move {
        self.history.last().map_or(Move::NONE, |u| u.mv)
    }

    #[inline]
    #[must_use]
    pub fn has_non_pawn_material(&self, color: Color) -> bool {
        self.non_pawn_count[color.index()] > 0
    }

    #[inline]
    #[must_use]
    pub fn non_pawn_count(&self, color: Color) -> i32 {
        self.non_pawn_count[color.index()]
    }

    #[inline]
    #[must_use]
    pub fn is_chess960(&self) -> bool {
        self.chess960
    }

    pub fn set_chess960(&mut self, value: bool) {
        self.chess960 = value;
    }

    // -- attack queries ----------------------------------------------------

    /// All pieces of either color attacking `sq` under occupancy `occ`.
    #[must_use]
    pub fn attackers_to(&self, sq: Square, occ: Bitboard) -> Bitboard {
        let bishops = self.pieces(PieceType::Bishop) | self.pieces(PieceType::Queen);
        let rooks = self.pieces(PieceType::Rook) | self.pieces(PieceType::Queen);
        (pawn_attacks(Color::Black, sq) & self.piece_bb(Color::White, PieceType::Pawn))
            | (pawn_attacks(Color::White, sq) & self.piece_bb(Color::Black, PieceType::Pawn))
            | (knight_attacks(sq) & self.pieces(PieceType::Knight))
            | (king_attacks(sq) & self.pieces(PieceType::King))
            | (bishop_attacks(sq, occ) & bishops)
            | (rook_attacks(sq, occ) & rooks)
    }

    /// Is `sq` attacked by any piece of `by`?
    #[must_use]
    pub fn square_attacked(&self, sq: Square, by: Color) -> bool {
        let occ = self.all_bb;
        (pawn_attacks(!by, sq) & self.piece_bb(by, PieceType::Pawn)).any()
            || (knight_attacks(sq) & self.piece_bb(by, PieceType::Knight)).any()
            || (king_attacks(sq) & self.piece_bb(by, PieceType::King)).any()
            || (bishop_attacks(sq, occ)
                & (self.piece_bb(by, PieceType::Bishop) | self.piece_bb(by, PieceType::Queen)))
            .any()
            || (rook_attacks(sq, occ)
                & (self.piece_bb(by, PieceType::Rook) | self.piece_bb(by, PieceType::Queen)))
            .any()
    }

    /// Enemy pieces giving check to the side to move.
    #[must_use]
    pub(crate) fn compute_checkers(&self) -> Bitboard {
        let king = self.king_sq(self.side);
        self.attackers_to(king, self.all_bb) & self.color_pieces(!self.side)
    }

    // -- draw detection ----------------------------------------------------

    /// Repetition: twofold when the earlier occurrence lies inside the
    /// current search (at or past `root_ply`), threefold across the game.
    #[must_use]
    pub fn is_repetition(&self, root_ply: usize) -> bool {
        let hist_len = self.history.len();
        let mut repeats = 0;
        let mut back = 2;
        while back <= self.rule50 as usize && back <= hist_len {
            let idx = hist_len - back;
            if self.history[idx].key == self.key {
                if idx >= root_ply {
                    return true;
                }
                repeats += 1;
                if repeats >= 2 {
                    return true;
                }
            }
            back += 2;
        }
        false
    }

    /// Draws neither side can win: no pawns or majors, at most a minor each.
    #[must_use]
    pub fn material_draw(&self) -> bool {
        if self.pieces(PieceType::Pawn).any()
            || self.pieces(PieceType::Rook).any()
            || self.pieces(PieceType::Queen).any()
        {
            return false;
        }
        let minors = self.pieces(PieceType::Knight) | self.pieces(PieceType::Bishop);
        (minors & self.color_pieces(Color::White)).popcount() <= 1
            && (minors & self.color_pieces(Color::Black)).popcount() <= 1
    }

    // -- consistency -------------------------------------------------------

    /// Rebuild every key from the board, for checks against the
    /// incrementally maintained values.
    #[must_use]
    pub fn recompute_keys(&self) -> RecomputedKeys {
        let mut keys = RecomputedKeys {
            key: 0,
            pawn_key: 0,
            non_pawn_key: [0; 2],
            minor_key: 0,
            major_key: 0,
            material_key: 0,
        };
        for idx in 0..64 {
            let sq = Square::from_index(idx);
            let pc = self.board[idx];
            if pc.is_empty() {
                continue;
            }
            let entry = zobrist::piece_key(pc, sq);
            keys.key ^= entry;
            let pt = pc.piece_type();
            if pt == PieceType::Pawn {
                keys.pawn_key ^= entry;
            } else {
                keys.non_pawn_key[pc.color().index()] ^= entry;
                if pt == PieceType::King {
                    keys.minor_key ^= entry;
                    keys.major_key ^= entry;
                } else if pt.is_major() {
                    keys.major_key ^= entry;
                } else {
                    keys.minor_key ^= entry;
                }
            }
        }
        if self.side == Color::Black {
            keys.key ^= zobrist::side_key();
        }
        keys.key ^= zobrist::castle_key(self.castling_rights);
        if let Some(ep) = self.ep_square {
            keys.key ^= zobrist::ep_key(ep);
        }
        for color in Color::BOTH {
            for pt in PieceType::ALL {
                let pc = Piece::new(color, pt);
                for count in 0..self.piece_bb(color, pt).popcount() {
                    keys.material_key ^= zobrist::material_key(pc, count);
                }
            }
        }
        keys
    }

    #[must_use]
    pub(crate) fn current_keys(&self) -> RecomputedKeys {
        RecomputedKeys {
            key: self.key,
            pawn_key: self.pawn_key,
            non_pawn_key: self.non_pawn_key,
            minor_key: self.minor_key,
            major_key: self.major_key,
            material_key: self.material_key,
        }
    }

    /// Debug-build invariant check; compiled out in release.
    pub(crate) fn assert_ok(&self) {
        #[cfg(debug_assertions)]
        {
            let mut union = Bitboard::EMPTY;
            for pt in PieceType::ALL {
                union |= self.pieces(pt);
            }
            debug_assert_eq!(union, self.all_bb);
            debug_assert_eq!(
                self.color_bb[0] | self.color_bb[1],
                self.all_bb,
                "color boards disagree with occupancy"
            );
            debug_assert!((self.color_bb[0] & self.color_bb[1]).is_empty());
            for color in Color::BOTH {
                debug_assert_eq!(self.piece_bb(color, PieceType::King).popcount(), 1);
            }
            for idx in 0..64 {
                let sq = Square::from_index(idx);
                let pc = self.board[idx];
                if pc.is_empty() {
                    debug_assert!(!self.all_bb.contains(sq));
                } else {
                    debug_assert!(self.piece_bb(pc.color(), pc.piece_type()).contains(sq));
                }
            }
            debug_assert_eq!(self.recompute_keys(), self.current_keys());
            debug_assert_eq!(self.phase, psqt::update_phase(self.phase_value));
            debug_assert_eq!(self.checkers, self.compute_checkers());
        }
    }

    // -- setup plumbing (used by the FEN parser) ---------------------------

    pub(crate) fn put_piece(&mut self, sq: Square, pc: Piece) {
        debug_assert!(self.board[sq.index()].is_empty());
        self.board[sq.index()] = pc;
        let bb = Bitboard::from_square(sq);
        self.type_bb[pc.piece_type().index()] |= bb;
        self.color_bb[pc.color().index()] |= bb;
        self.all_bb |= bb;
    }

    /// Rebuild every derived field from the mailbox; for position setup.
    pub(crate) fn rebuild(&mut self) {
        self.material = Score::ZERO;
        self.phase_value = 0;
        self.non_pawn_count = [0; 2];
        for idx in 0..64 {
            let pc = self.board[idx];
            if pc.is_empty() {
                continue;
            }
            self.material += PSQT[pc.index()][idx];
            self.phase_value += psqt::phase_weight(pc.piece_type());
            if pc.piece_type() != PieceType::Pawn && pc.piece_type() != PieceType::King {
                self.non_pawn_count[pc.color().index()] += 1;
            }
        }
        self.phase = psqt::update_phase(self.phase_value);
        let keys = self.recompute_keys();
        self.key = keys.key;
        self.pawn_key = keys.pawn_key;
        self.non_pawn_key = keys.non_pawn_key;
        self.minor_key = keys.minor_key;
        self.major_key = keys.major_key;
        self.material_key = keys.material_key;
        self.checkers = self.compute_checkers();
        self.assert_ok();
    }

    pub(crate) fn set_castling(&mut self, castling: Castling, rights: u8) {
        self.castling = castling;
        self.castling_rights = rights;
    }

    pub(crate) fn set_side(&mut self, side: Color) {
        self.side = side;
    }

    pub(crate) fn set_ep_square(&mut self, ep: Option<Square>) {
        self.ep_square = ep;
    }

    pub(crate) fn set_rule50(&mut self, value: u32) {
        self.rule50 = value;
    }
}
