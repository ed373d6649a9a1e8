//! Symmetric application and retraction of moves.
//!
//! `make` pushes a history entry before mutating, applies the move by
//! category, flips the side and recomputes checkers. `take` reverses the
//! board surgery and restores the saved fields, leaving every incrementally
//! maintained value bit-identical to what it was.

use crate::eval::psqt::{self, PSQT};

use super::attacks::pawn_attacks;
use super::castling::{right_for_king_to, ROOK_TO};
use super::types::{Bitboard, Move, Piece, PieceType, Square};
use super::zobrist::{castle_key, ep_key, material_key, piece_key, side_key};
use super::{Position, Undo};

impl Position {
    #[inline]
    fn piece_count(&self, pc: Piece) -> u32 {
        self.piece_bb(pc.color(), pc.piece_type()).popcount()
    }

    /// Remove the piece on `sq`, maintaining every incremental field. The
    /// full key is only touched when `hash` is set; the partial keys always
    /// follow the board.
    fn clear_piece(&mut self, sq: Square, hash: bool) {
        let pc = self.board[sq.index()];
        debug_assert!(!pc.is_empty());
        let color = pc.color();
        let pt = pc.piece_type();
        let entry = piece_key(pc, sq);

        if hash {
            self.key ^= entry;
        }
        if pt == PieceType::Pawn {
            self.pawn_key ^= entry;
        } else {
            self.non_pawn_key[color.index()] ^= entry;
            if pt == PieceType::King {
                self.minor_key ^= entry;
                self.major_key ^= entry;
            } else if pt.is_major() {
                self.major_key ^= entry;
            } else {
                self.minor_key ^= entry;
            }
        }

        self.board[sq.index()] = Piece::EMPTY;
        self.material -= PSQT[pc.index()][sq.index()];
        self.phase_value -= psqt::phase_weight(pt);
        self.phase = psqt::update_phase(self.phase_value);
        if pt != PieceType::Pawn && pt != PieceType::King {
            self.non_pawn_count[color.index()] -= 1;
        }

        let bb = Bitboard::from_square(sq);
        self.all_bb ^= bb;
        self.type_bb[pt.index()] ^= bb;
        self.color_bb[color.index()] ^= bb;

        // After the count dropped: the same index an add at this count XORs.
        self.material_key ^= material_key(pc, self.piece_count(pc));
    }

    /// Put `pc` on the empty square `sq`.
    fn add_piece(&mut self, sq: Square, pc: Piece, hash: bool) {
        debug_assert!(self.board[sq.index()].is_empty());
        let color = pc.color();
        let pt = pc.piece_type();
        let entry = piece_key(pc, sq);

        if hash {
            self.key ^= entry;
        }
        self.material_key ^= material_key(pc, self.piece_count(pc));

        if pt == PieceType::Pawn {
            self.pawn_key ^= entry;
        } else {
            self.non_pawn_key[color.index()] ^= entry;
            if pt == PieceType::King {
                self.minor_key ^= entry;
                self.major_key ^= entry;
            } else if pt.is_major() {
                self.major_key ^= entry;
            } else {
                self.minor_key ^= entry;
            }
        }

        self.board[sq.index()] = pc;
        self.material += PSQT[pc.index()][sq.index()];
        self.phase_value += psqt::phase_weight(pt);
        self.phase = psqt::update_phase(self.phase_value);
        if pt != PieceType::Pawn && pt != PieceType::King {
            self.non_pawn_count[color.index()] += 1;
        }

        let bb = Bitboard::from_square(sq);
        self.all_bb |= bb;
        self.type_bb[pt.index()] |= bb;
        self.color_bb[color.index()] |= bb;
    }

    /// Slide the piece on `from` to the empty square `to`. A Chess960
    /// castling rook may already stand on its destination; the update is a
    /// no-op then.
    fn move_piece(&mut self, from: Square, to: Square, hash: bool) {
        let pc = self.board[from.index()];
        debug_assert!(!pc.is_empty());
        debug_assert!(self.board[to.index()].is_empty() || from == to);
        let color = pc.color();
        let pt = pc.piece_type();
        let entry = piece_key(pc, from) ^ piece_key(pc, to);

        if hash {
            self.key ^= entry;
        }
        if pt == PieceType::Pawn {
            self.pawn_key ^= entry;
        } else {
            self.non_pawn_key[color.index()] ^= entry;
            if pt == PieceType::King {
                self.minor_key ^= entry;
                self.major_key ^= entry;
            } else if pt.is_major() {
                self.major_key ^= entry;
            } else {
                self.minor_key ^= entry;
            }
        }

        self.board[from.index()] = Piece::EMPTY;
        self.board[to.index()] = pc;
        self.material += PSQT[pc.index()][to.index()] - PSQT[pc.index()][from.index()];

        let bb = Bitboard::from_square(from) ^ Bitboard::from_square(to);
        self.all_bb ^= bb;
        self.type_bb[pt.index()] ^= bb;
        self.color_bb[color.index()] ^= bb;
    }

    /// Resulting full key of `mv`, cheap and exact for normal moves; the
    /// approximation for castling and promotion is fine for a prefetch.
    #[must_use]
    pub fn key_after(&self, mv: Move) -> u64 {
        let mut key = self.key ^ side_key();
        if mv.is_none() {
            return key;
        }
        let pc = mv.piece();
        key ^= piece_key(pc, mv.from()) ^ piece_key(pc, mv.to());
        if !mv.captured().is_empty() {
            key ^= piece_key(mv.captured(), mv.to());
        }
        key
    }

    /// Apply a pseudo-legal move. Returns `false` (with the position already
    /// restored) when the move leaves the mover's king attacked.
    pub fn make(&mut self, mv: Move) -> bool {
        debug_assert!(!mv.is_none());
        self.history.push(Undo {
            key: self.key,
            material_key: self.material_key,
            mv,
            checkers: self.checkers,
            ep_square: self.ep_square,
            rule50: self.rule50,
            castling_rights: self.castling_rights,
        });

        self.rule50 += 1;
        if let Some(ep) = self.ep_square.take() {
            self.key ^= ep_key(ep);
        }

        let from = mv.from();
        let to = mv.to();

        self.key ^= castle_key(self.castling_rights);
        self.castling_rights &= self.castling.perm_mask(from) & self.castling.perm_mask(to);
        self.key ^= castle_key(self.castling_rights);

        if mv.is_castle() {
            // `to` is the king's destination; the rook comes from its
            // configured start square, which in Chess960 can be anywhere on
            // the back rank. Clearing the king first keeps the two pieces
            // from colliding mid-update.
            let right = right_for_king_to(to);
            let rook_from = self
                .castling
                .rook_from(right)
                .expect("castle move without a configured rook");
            self.clear_piece(from, true);
            self.move_piece(rook_from, ROOK_TO[right], true);
            self.add_piece(to, Piece::new(self.side, PieceType::King), true);
        } else {
            let captured = mv.captured();
            if !captured.is_empty() {
                self.clear_piece(to, true);
                self.rule50 = 0;
            }

            self.move_piece(from, to, true);

            if self.board[to.index()].piece_type() == PieceType::Pawn {
                self.rule50 = 0;

                if mv.is_double_push() {
                    // Only record an ep target an enemy pawn can actually
                    // take; dead targets would split the hash space.
                    let ep = to.ep_pair();
                    if (pawn_attacks(self.side, ep)
                        & self.piece_bb(!self.side, PieceType::Pawn))
                    .any()
                    {
                        self.ep_square = Some(ep);
                        self.key ^= ep_key(ep);
                    }
                } else if mv.is_en_passant() {
                    self.clear_piece(to.ep_pair(), true);
                } else {
                    let promo = mv.promotion();
                    if !promo.is_empty() {
                        self.clear_piece(to, true);
                        self.add_piece(to, promo, true);
                    }
                }
            }
        }

        self.side = !self.side;
        self.key ^= side_key();
        self.checkers = self.compute_checkers();
        self.nodes += 1;

        let mover = !self.side;
        if self.square_attacked(self.king_sq(mover), self.side) {
            self.take();
            return false;
        }
        self.assert_ok();
        true
    }

    /// Retract the last move made.
    pub fn take(&mut self) {
        let undo = self.history.pop().expect("take without a prior make");
        self.side = !self.side;

        let mv = undo.mv;
        let from = mv.from();
        let to = mv.to();

        if mv.is_castle() {
            let right = right_for_king_to(to);
            let rook_from = self
                .castling
                .rook_from(right)
                .expect("castle move without a configured rook");
            self.clear_piece(to, false);
            self.move_piece(ROOK_TO[right], rook_from, false);
            self.add_piece(from, Piece::new(self.side, PieceType::King), false);
        } else {
            if mv.is_en_passant() {
                self.add_piece(
                    to.ep_pair(),
                    Piece::new(!self.side, PieceType::Pawn),
                    false,
                );
            }

            self.move_piece(to, from, false);

            let captured = mv.captured();
            if !captured.is_empty() {
                self.add_piece(to, captured, false);
            }

            if !mv.promotion().is_empty() {
                self.clear_piece(from, false);
                self.add_piece(from, Piece::new(self.side, PieceType::Pawn), false);
            }
        }

        self.key = undo.key;
        self.material_key = undo.material_key;
        self.checkers = undo.checkers;
        self.ep_square = undo.ep_square;
        self.rule50 = undo.rule50;
        self.castling_rights = undo.castling_rights;
        self.assert_ok();
    }

    /// Pass the turn. Only called when not in check, which also means the
    /// stale checkers board stays correct for the new side.
    pub fn make_null(&mut self) {
        debug_assert!(!self.in_check());
        self.history.push(Undo {
            key: self.key,
            material_key: self.material_key,
            mv: Move::NONE,
            checkers: self.checkers,
            ep_square: self.ep_square,
            rule50: self.rule50,
            castling_rights: self.castling_rights,
        });

        self.rule50 = 0;
        self.side = !self.side;
        self.key ^= side_key();
        if let Some(ep) = self.ep_square.take() {
            self.key ^= ep_key(ep);
        }
        self.assert_ok();
    }

    /// Retract a null move, restoring every saved field.
    pub fn take_null(&mut self) {
        let undo = self.history.pop().expect("take_null without a prior make_null");
        debug_assert!(undo.mv.is_none());
        self.side = !self.side;
        self.key = undo.key;
        self.material_key = undo.material_key;
        self.checkers = undo.checkers;
        self.ep_square = undo.ep_square;
        self.rule50 = undo.rule50;
        self.castling_rights = undo.castling_rights;
        self.assert_ok();
    }
}
