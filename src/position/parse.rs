//! UCI move text, both directions.
//!
//! Parsing never panics: malformed or illegal text yields `None` and the
//! protocol layer reports it. Castling is the king's destination in
//! standard chess and king-takes-own-rook in Chess960.

use super::castling::{right_index, KING_TO};
use super::types::{Move, MoveList, PieceType, Square};
use super::Position;

impl Position {
    /// Parse a move in coordinate notation against this position. Returns
    /// `None` for malformed text and for moves that are not legal here.
    pub fn parse_uci_move(&mut self, text: &str) -> Option<Move> {
        let bytes = text.as_bytes();
        if bytes.len() < 4 || bytes.len() > 5 {
            return None;
        }
        let from: Square = text.get(0..2)?.parse().ok()?;
        let to: Square = text.get(2..4)?.parse().ok()?;
        let promo = match bytes.get(4) {
            None => None,
            Some(b'q') => Some(PieceType::Queen),
            Some(b'r') => Some(PieceType::Rook),
            Some(b'b') => Some(PieceType::Bishop),
            Some(b'n') => Some(PieceType::Knight),
            Some(_) => return None,
        };

        // Chess960 castling arrives as king-takes-own-rook.
        let us = self.side_to_move();
        let castle_to = if self.is_chess960()
            && self.piece_on(from) == super::types::Piece::new(us, PieceType::King)
            && self.piece_on(to) == super::types::Piece::new(us, PieceType::Rook)
        {
            let kingside = to.file() > from.file();
            Some(KING_TO[right_index(us, kingside)])
        } else {
            None
        };

        let mut list = MoveList::new();
        self.generate_all(&mut list);
        for &mv in list.iter() {
            let matches = if let Some(kt) = castle_to {
                mv.is_castle() && mv.from() == from && mv.to() == kt
            } else {
                mv.from() == from
                    && mv.to() == to
                    && promo
                        == (!mv.promotion().is_empty()).then(|| mv.promotion().piece_type())
            };
            if matches && self.move_is_legal(mv) {
                return Some(mv);
            }
        }
        None
    }

    /// Coordinate text for a move, honoring the Chess960 castling
    /// convention when active.
    #[must_use]
    pub fn move_to_uci(&self, mv: Move) -> String {
        if mv.is_castle() && self.is_chess960() {
            let right = super::castling::right_for_king_to(mv.to());
            if let Some(rook) = self.castling().rook_from(right) {
                return format!("{}{}", mv.from(), rook);
            }
        }
        mv.to_string()
    }
}
