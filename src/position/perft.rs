//! Perft: exhaustive legal move counting, the move generator's oracle.

use super::types::MoveList;
use super::Position;

/// Count leaf nodes of the legal move tree to `depth`.
#[must_use]
pub fn perft(pos: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut list = MoveList::new();
    pos.generate_all(&mut list);
    let mut nodes = 0;
    for &mv in list.iter() {
        if pos.make(mv) {
            nodes += if depth == 1 { 1 } else { perft(pos, depth - 1) };
            pos.take();
        }
    }
    nodes
}

/// Per-root-move breakdown, for diffing against another engine.
#[must_use]
pub fn perft_divide(pos: &mut Position, depth: u32) -> Vec<(String, u64)> {
    let mut list = MoveList::new();
    pos.generate_all(&mut list);
    let mut out = Vec::new();
    for &mv in list.iter() {
        if pos.make(mv) {
            let nodes = if depth <= 1 { 1 } else { perft(pos, depth - 1) };
            pos.take();
            out.push((pos.move_to_uci(mv), nodes));
        }
    }
    out
}
