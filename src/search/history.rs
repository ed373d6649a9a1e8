//! Per-thread history heuristics.
//!
//! Quiet and capture history order moves, continuation history folds in the
//! previous moves' context, and the correction histories nudge the static
//! evaluation toward what searches of similar structures returned. The
//! correction tables are indexed by the pawn/minor/major partial keys, which
//! is what those finer-grained hashes exist for.

use crate::position::types::{Color, Move};
use crate::position::Position;

/// History values saturate toward this magnitude.
pub const HISTORY_MAX: i32 = 16_384;

const CORR_SIZE: usize = 16_384;
const CORR_LIMIT: i32 = 64 * 256;

/// Dense piece index and destination square of an already-made move, used
/// to address continuation history from deeper plies.
pub type PieceTo = Option<(usize, usize)>;

pub struct Histories {
    /// [color][from][to]
    quiet: Vec<i16>,
    /// [dense piece][to][captured type]
    capture: Vec<i16>,
    /// [prev dense piece][prev to][dense piece][to]
    continuation: Vec<i16>,
    corr_pawn: Vec<i32>,
    corr_minor: Vec<i32>,
    corr_major: Vec<i32>,
}

#[inline]
fn gravity(entry: &mut i16, bonus: i32) {
    let current = i32::from(*entry);
    let updated = current + bonus - current * bonus.abs() / HISTORY_MAX;
    *entry = updated.clamp(-HISTORY_MAX, HISTORY_MAX) as i16;
}

#[inline]
fn bonus_for_depth(depth: i32) -> i32 {
    (depth * depth + 4 * depth).min(2_000)
}

impl Histories {
    #[must_use]
    pub fn new() -> Self {
        Histories {
            quiet: vec![0; 2 * 64 * 64],
            capture: vec![0; 12 * 64 * 6],
            continuation: vec![0; 12 * 64 * 12 * 64],
            corr_pawn: vec![0; 2 * CORR_SIZE],
            corr_minor: vec![0; 2 * CORR_SIZE],
            corr_major: vec![0; 2 * CORR_SIZE],
        }
    }

    pub fn clear(&mut self) {
        self.quiet.fill(0);
        self.capture.fill(0);
        self.continuation.fill(0);
        self.corr_pawn.fill(0);
        self.corr_minor.fill(0);
        self.corr_major.fill(0);
    }

    #[inline]
    fn quiet_idx(color: Color, mv: Move) -> usize {
        (color.index() * 64 + mv.from().index()) * 64 + mv.to().index()
    }

    #[inline]
    fn capture_idx(mv: Move) -> usize {
        let victim = if mv.is_en_passant() {
            0
        } else {
            mv.captured().piece_type().index()
        };
        (mv.piece().dense_index() * 64 + mv.to().index()) * 6 + victim
    }

    #[inline]
    fn cont_idx(prev: (usize, usize), mv: Move) -> usize {
        ((prev.0 * 64 + prev.1) * 12 + mv.piece().dense_index()) * 64 + mv.to().index()
    }

    #[inline]
    #[must_use]
    pub fn quiet_score(&self, color: Color, mv: Move, cont1: PieceTo, cont2: PieceTo) -> i32 {
        let mut score = i32::from(self.quiet[Self::quiet_idx(color, mv)]);
        if let Some(prev) = cont1 {
            score += i32::from(self.continuation[Self::cont_idx(prev, mv)]);
        }
        if let Some(prev) = cont2 {
            score += i32::from(self.continuation[Self::cont_idx(prev, mv)]);
        }
        score
    }

    #[inline]
    #[must_use]
    pub fn capture_score(&self, mv: Move) -> i32 {
        i32::from(self.capture[Self::capture_idx(mv)])
    }

    /// Reward the cutoff move, punish the quiets tried before it.
    pub fn update_quiet(
        &mut self,
        color: Color,
        depth: i32,
        best: Move,
        tried: &[Move],
        cont1: PieceTo,
        cont2: PieceTo,
    ) {
        let bonus = bonus_for_depth(depth);
        for &mv in tried.iter().chain(std::iter::once(&best)) {
            let delta = if mv == best { bonus } else { -bonus };
            gravity(&mut self.quiet[Self::quiet_idx(color, mv)], delta);
            if let Some(prev) = cont1 {
                gravity(&mut self.continuation[Self::cont_idx(prev, mv)], delta);
            }
            if let Some(prev) = cont2 {
                gravity(&mut self.continuation[Self::cont_idx(prev, mv)], delta);
            }
        }
    }

    pub fn update_capture(&mut self, depth: i32, mv: Move, good: bool) {
        let bonus = bonus_for_depth(depth);
        gravity(
            &mut self.capture[Self::capture_idx(mv)],
            if good { bonus } else { -bonus },
        );
    }

    #[inline]
    fn corr_indices(pos: &Position) -> (usize, usize, usize, usize) {
        let stm = pos.side_to_move().index();
        (
            stm,
            (pos.pawn_key() as usize) & (CORR_SIZE - 1),
            (pos.minor_key() as usize) & (CORR_SIZE - 1),
            (pos.major_key() as usize) & (CORR_SIZE - 1),
        )
    }

    /// Adjustment added to the raw static evaluation.
    #[must_use]
    pub fn correction(&self, pos: &Position) -> i32 {
        let (stm, p, mi, ma) = Self::corr_indices(pos);
        let sum = self.corr_pawn[stm * CORR_SIZE + p]
            + self.corr_minor[stm * CORR_SIZE + mi]
            + self.corr_major[stm * CORR_SIZE + ma];
        sum / (3 * 256)
    }

    /// Blend the observed search-vs-eval difference into the tables.
    pub fn update_correction(&mut self, pos: &Position, depth: i32, diff: i32) {
        let (stm, p, mi, ma) = Self::corr_indices(pos);
        let scaled = (diff * 256).clamp(-CORR_LIMIT, CORR_LIMIT);
        let weight = (depth + 1).min(16);
        for entry in [
            &mut self.corr_pawn[stm * CORR_SIZE + p],
            &mut self.corr_minor[stm * CORR_SIZE + mi],
            &mut self.corr_major[stm * CORR_SIZE + ma],
        ] {
            *entry = ((*entry * (256 - weight) + scaled * weight) / 256)
                .clamp(-CORR_LIMIT, CORR_LIMIT);
        }
    }
}

impl Default for Histories {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::types::{Piece, PieceType, Square};

    fn quiet_move() -> Move {
        Move::new(
            Square::G1,
            Square::F1,
            Piece::new(Color::White, PieceType::King),
            Piece::EMPTY,
            Piece::EMPTY,
            0,
        )
    }

    #[test]
    fn cutoff_rewards_best_and_punishes_rest() {
        let mut hist = Histories::new();
        let best = quiet_move();
        let other = Move::new(
            Square::A1,
            Square::A8,
            Piece::new(Color::White, PieceType::Rook),
            Piece::EMPTY,
            Piece::EMPTY,
            0,
        );
        hist.update_quiet(Color::White, 8, best, &[other], None, None);
        assert!(hist.quiet_score(Color::White, best, None, None) > 0);
        assert!(hist.quiet_score(Color::White, other, None, None) < 0);
    }

    #[test]
    fn history_saturates() {
        let mut hist = Histories::new();
        let best = quiet_move();
        for _ in 0..500 {
            hist.update_quiet(Color::White, 12, best, &[], None, None);
        }
        assert!(hist.quiet_score(Color::White, best, None, None) <= HISTORY_MAX);
    }

    #[test]
    fn correction_tracks_eval_error() {
        let mut hist = Histories::new();
        let pos = Position::startpos();
        for _ in 0..32 {
            hist.update_correction(&pos, 10, 80);
        }
        let corr = hist.correction(&pos);
        assert!(corr > 0 && corr <= 80);
    }
}
