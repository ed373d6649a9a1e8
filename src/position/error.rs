//! Error types for position setup.

use std::error::Error;
use std::fmt;

/// Reasons a FEN record can be rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FenError {
    WrongFieldCount(usize),
    BadBoard(String),
    BadSideToMove(String),
    BadCastling(String),
    BadEnPassant(String),
    BadCounter(String),
    MissingKing,
}

impl fmt::Display for FenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FenError::WrongFieldCount(n) => write!(f, "expected at least 4 FEN fields, got {n}"),
            FenError::BadBoard(s) => write!(f, "invalid board field: {s}"),
            FenError::BadSideToMove(s) => write!(f, "invalid side to move: {s}"),
            FenError::BadCastling(s) => write!(f, "invalid castling field: {s}"),
            FenError::BadEnPassant(s) => write!(f, "invalid en passant field: {s}"),
            FenError::BadCounter(s) => write!(f, "invalid move counter: {s}"),
            FenError::MissingKing => write!(f, "each side needs exactly one king"),
        }
    }
}

impl Error for FenError {}
