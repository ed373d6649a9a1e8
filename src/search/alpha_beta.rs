//! The alpha-beta tree walk and quiescence.

use once_cell::sync::Lazy;

use crate::eval::evaluate;
use crate::position::types::Move;
use crate::tt::{Bound, TtProbe};

use super::movepick::MovePicker;
use super::see::see;
use super::{
    mate_in, mated_in, SearchContext, ThreadData, INFINITE, MATED_IN_MAX, MATE_IN_MAX, MAX_PLY,
};

/// Log-log late move reductions, indexed by depth and move number.
static LMR: Lazy<[[i32; 64]; 64]> = Lazy::new(|| {
    let mut table = [[0i32; 64]; 64];
    for (depth, row) in table.iter_mut().enumerate().skip(1) {
        for (moves, r) in row.iter_mut().enumerate().skip(1) {
            *r = (0.25 + (depth as f64).ln() * (moves as f64).ln() / 2.25) as i32;
        }
    }
    table
});

#[inline]
fn lmr_reduction(depth: i32, move_count: usize) -> i32 {
    LMR[depth.clamp(0, 63) as usize][move_count.min(63)]
}

/// Poll the clock and the shared abort flag. The main thread is the only
/// one that turns time or node exhaustion into an abort; helpers just
/// observe the flag.
fn check_abort(td: &mut ThreadData, ctx: &SearchContext) -> bool {
    if td.pos.nodes % 4096 == 0 {
        td.publish_counters();
        if td.is_main() && out_of_time(ctx) {
            ctx.abort.set();
        }
    }
    ctx.abort.is_set()
}

fn out_of_time(ctx: &SearchContext) -> bool {
    if ctx.tm.hard_exceeded() {
        return true;
    }
    let node_limit = ctx.limits.nodes.or(ctx.limits.node_time);
    node_limit.is_some_and(|n| ctx.total_nodes() >= n)
}

/// Corrected static evaluation of the current position.
fn static_eval(td: &mut ThreadData) -> i32 {
    let raw = evaluate(&td.pos, &mut td.pawn_cache);
    raw + td.hist.correction(&td.pos)
}

#[allow(clippy::too_many_lines)]
pub(crate) fn alpha_beta(
    td: &mut ThreadData,
    ctx: &SearchContext,
    mut alpha: i32,
    mut beta: i32,
    mut depth: i32,
    ply: usize,
    pv_idx: usize,
) -> i32 {
    let pv_node = beta - alpha > 1;
    let root = ply == 0;

    if depth <= 0 {
        return quiescence(td, ctx, alpha, beta, ply);
    }

    td.pv.reset(ply);
    if check_abort(td, ctx) {
        return 0;
    }
    td.seldepth = td.seldepth.max(ply);

    let in_check = td.pos.in_check();

    if !root {
        if td.pos.is_repetition(td.root_ply) || td.pos.material_draw() {
            return 0;
        }
        if td.pos.rule50() >= 100 && (!in_check || td.pos.has_legal_move()) {
            return 0;
        }
        if ply >= MAX_PLY - 1 {
            return if in_check { 0 } else { static_eval(td) };
        }

        // Mate distance pruning: even a forced mate from here cannot beat
        // a shorter one already found.
        alpha = alpha.max(mated_in(ply));
        beta = beta.min(mate_in(ply + 1));
        if alpha >= beta {
            return alpha;
        }
    }

    let key = td.pos.key();
    let tt_hit: Option<TtProbe> = ctx.tt.probe(key, ply);
    let mut tt_move = Move::NONE;
    if let Some(entry) = tt_hit {
        if entry.mv != 0 {
            tt_move = td.pos.find_move_by_compact(entry.mv);
        }
        let cutoff = !pv_node
            && entry.depth >= depth
            && match entry.bound {
                Bound::Exact => true,
                Bound::Lower => entry.score >= beta,
                Bound::Upper => entry.score <= alpha,
            };
        if cutoff {
            return entry.score;
        }
    }

    let eval = if in_check { -INFINITE } else { static_eval(td) };
    td.stack[ply].static_eval = eval;
    let improving = !in_check && ply >= 2 && eval > td.stack[ply - 2].static_eval;

    if !pv_node && !in_check {
        // Reverse futility: hopelessly far above beta at low depth.
        if depth <= 7 && eval - 70 * depth + 60 * i32::from(improving) >= beta && eval < MATE_IN_MAX
        {
            return eval;
        }

        // Razoring: hopelessly far below alpha, verify with quiescence.
        if depth <= 2 && eval + 250 * depth <= alpha {
            let value = quiescence(td, ctx, alpha, beta, ply);
            if value <= alpha {
                return value;
            }
        }

        // Null move: hand over the turn; a reduced search still failing
        // high means the position is safely above beta.
        if depth >= 3
            && eval >= beta
            && td.pos.has_non_pawn_material(td.pos.side_to_move())
            && ply >= 1
            && !td.stack[ply - 1].mv.is_none()
        {
            let r = 4 + depth / 5 + ((eval - beta) / 200).min(3);
            td.stack[ply].mv = Move::NONE;
            td.stack[ply].piece_to = None;
            td.pos.make_null();
            ctx.tt.prefetch(td.pos.key());
            let value = -alpha_beta(td, ctx, -beta, -beta + 1, depth - r, ply + 1, pv_idx);
            td.pos.take_null();
            if ctx.abort.is_set() {
                return 0;
            }
            if value >= beta {
                return if value >= MATE_IN_MAX { beta } else { value };
            }
        }
    }

    // Without a hash move a deep search spends most of its time on move
    // ordering; shrink instead and let the re-search use the stored move.
    if depth >= 4 && tt_move.is_none() && !in_check {
        depth -= 1;
    }

    let cont1 = if ply >= 1 { td.stack[ply - 1].piece_to } else { None };
    let cont2 = if ply >= 2 { td.stack[ply - 2].piece_to } else { None };

    let mut picker = MovePicker::new(tt_move, td.killers[ply], [cont1, cont2]);
    let mut best_score = -INFINITE;
    let mut best_move = Move::NONE;
    let mut move_count = 0usize;
    let mut quiets_tried: Vec<Move> = Vec::with_capacity(16);
    let mut noisy_tried: Vec<Move> = Vec::with_capacity(8);

    while let Some(mv) = picker.next(&td.pos, &td.hist) {
        if root && !td.root_moves[pv_idx..].iter().any(|rm| rm.mv == mv) {
            continue;
        }
        let quiet = mv.is_quiet();
        let hist_score = if quiet {
            td.hist
                .quiet_score(td.pos.side_to_move(), mv, cont1, cont2)
        } else {
            0
        };

        if !root && best_score > MATED_IN_MAX {
            if quiet {
                let lmp_limit = (3 + depth * depth) / if improving { 1 } else { 2 };
                if depth <= 5 && move_count as i32 > lmp_limit {
                    picker.skip_quiets();
                    continue;
                }
                if depth <= 6 && !in_check && eval + 110 + 75 * depth <= alpha {
                    picker.skip_quiets();
                    continue;
                }
                if depth <= 7 && !see(&td.pos, mv, -60 * depth) {
                    continue;
                }
            } else if depth <= 6 && !see(&td.pos, mv, -110 * depth) {
                continue;
            }
        }

        ctx.tt.prefetch(td.pos.key_after(mv));
        if !td.pos.make(mv) {
            continue;
        }
        move_count += 1;
        td.stack[ply].mv = mv;
        td.stack[ply].piece_to = Some((mv.piece().dense_index(), mv.to().index()));

        let gives_check = td.pos.in_check();
        let new_depth = depth - 1 + i32::from(gives_check);

        let score = if move_count == 1 {
            -alpha_beta(td, ctx, -beta, -alpha, new_depth, ply + 1, pv_idx)
        } else {
            let mut r = 0;
            if depth >= 3 && move_count > 2 + usize::from(root) && quiet && !gives_check {
                r = lmr_reduction(depth, move_count);
                r += i32::from(!pv_node);
                r -= i32::from(improving);
                r -= hist_score / 8000;
                r = r.clamp(0, new_depth - 1);
            }

            let mut value =
                -alpha_beta(td, ctx, -alpha - 1, -alpha, new_depth - r, ply + 1, pv_idx);
            if value > alpha && r > 0 {
                value = -alpha_beta(td, ctx, -alpha - 1, -alpha, new_depth, ply + 1, pv_idx);
            }
            if value > alpha && pv_node {
                value = -alpha_beta(td, ctx, -beta, -alpha, new_depth, ply + 1, pv_idx);
            }
            value
        };

        td.pos.take();
        if ctx.abort.is_set() {
            return 0;
        }

        if root {
            let rm = td
                .root_moves
                .iter_mut()
                .find(|rm| rm.mv == mv)
                .expect("searched move is a root move");
            if move_count == 1 || score > alpha {
                rm.score = score;
            } else {
                rm.score = -INFINITE;
            }
        }

        if score > best_score {
            best_score = score;
            if score > alpha {
                best_move = mv;
                alpha = score;
                td.pv.update(ply, mv);
                if root {
                    let line = td.pv.line(0).to_vec();
                    let rm = td
                        .root_moves
                        .iter_mut()
                        .find(|rm| rm.mv == mv)
                        .expect("searched move is a root move");
                    rm.pv = line;
                }
                if score >= beta {
                    break;
                }
            }
        }

        if quiet {
            if quiets_tried.len() < 48 {
                quiets_tried.push(mv);
            }
        } else if noisy_tried.len() < 32 {
            noisy_tried.push(mv);
        }
    }

    if move_count == 0 {
        return if in_check { mated_in(ply) } else { 0 };
    }

    let bound = if best_score >= beta {
        Bound::Lower
    } else if pv_node && !best_move.is_none() {
        Bound::Exact
    } else {
        Bound::Upper
    };

    if bound == Bound::Lower {
        update_cutoff_histories(td, ply, depth, best_move, &quiets_tried, &noisy_tried);
    }

    // Teach the correction history how far the eval missed, but only when
    // the node resolved quietly enough for the comparison to mean much.
    if !in_check
        && (best_move.is_none() || best_move.is_quiet())
        && !(bound == Bound::Lower && best_score <= eval)
        && !(bound == Bound::Upper && best_score >= eval)
    {
        td.hist.update_correction(&td.pos, depth, best_score - eval);
    }

    ctx.tt
        .store(key, best_move.compact(), best_score, eval, depth, bound, ply);

    best_score
}

fn update_cutoff_histories(
    td: &mut ThreadData,
    ply: usize,
    depth: i32,
    best: Move,
    quiets_tried: &[Move],
    noisy_tried: &[Move],
) {
    let cont1 = if ply >= 1 { td.stack[ply - 1].piece_to } else { None };
    let cont2 = if ply >= 2 { td.stack[ply - 2].piece_to } else { None };

    if best.is_quiet() {
        let killers = &mut td.killers[ply];
        if killers[0] != best {
            killers[1] = killers[0];
            killers[0] = best;
        }
        let tried: Vec<Move> = quiets_tried.iter().copied().filter(|&m| m != best).collect();
        td.hist
            .update_quiet(td.pos.side_to_move(), depth, best, &tried, cont1, cont2);
    } else if best.is_capture() || best.is_en_passant() {
        td.hist.update_capture(depth, best, true);
    }
    for &mv in noisy_tried {
        if mv != best && (mv.is_capture() || mv.is_en_passant()) {
            td.hist.update_capture(depth, mv, false);
        }
    }
}

pub(crate) fn quiescence(
    td: &mut ThreadData,
    ctx: &SearchContext,
    mut alpha: i32,
    beta: i32,
    ply: usize,
) -> i32 {
    let pv_node = beta - alpha > 1;

    td.pv.reset(ply);
    if check_abort(td, ctx) {
        return 0;
    }
    td.seldepth = td.seldepth.max(ply);

    if td.pos.is_repetition(td.root_ply) || td.pos.material_draw() {
        return 0;
    }
    let in_check = td.pos.in_check();
    if td.pos.rule50() >= 100 && !in_check {
        return 0;
    }
    if ply >= MAX_PLY - 1 {
        return if in_check { 0 } else { static_eval(td) };
    }

    let key = td.pos.key();
    if let Some(entry) = ctx.tt.probe(key, ply) {
        let cutoff = !pv_node
            && match entry.bound {
                Bound::Exact => true,
                Bound::Lower => entry.score >= beta,
                Bound::Upper => entry.score <= alpha,
            };
        if cutoff {
            return entry.score;
        }
    }

    let mut best_score;
    let eval;
    if in_check {
        best_score = -INFINITE;
        eval = -INFINITE;
    } else {
        eval = static_eval(td);
        best_score = eval;
        if best_score >= beta {
            return best_score;
        }
        alpha = alpha.max(best_score);
    }

    let mut picker = MovePicker::quiescence(in_check);
    let mut best_move = Move::NONE;
    let mut move_count = 0usize;

    while let Some(mv) = picker.next(&td.pos, &td.hist) {
        if !in_check {
            // Losing captures and captures that cannot close the gap to
            // alpha are not worth resolving.
            if !see(&td.pos, mv, 0) {
                continue;
            }
            let gain = super::see::move_estimated_value(mv);
            if eval + gain + 150 <= alpha {
                continue;
            }
        }

        ctx.tt.prefetch(td.pos.key_after(mv));
        if !td.pos.make(mv) {
            continue;
        }
        move_count += 1;
        td.stack[ply].mv = mv;
        td.stack[ply].piece_to = Some((mv.piece().dense_index(), mv.to().index()));

        let score = -quiescence(td, ctx, -beta, -alpha, ply + 1);
        td.pos.take();
        if ctx.abort.is_set() {
            return 0;
        }

        if score > best_score {
            best_score = score;
            if score > alpha {
                best_move = mv;
                alpha = score;
                td.pv.update(ply, mv);
                if score >= beta {
                    break;
                }
            }
        }
    }

    if in_check && move_count == 0 {
        return mated_in(ply);
    }

    let bound = if best_score >= beta {
        Bound::Lower
    } else {
        Bound::Upper
    };
    ctx.tt
        .store(key, best_move.compact(), best_score, eval, 0, bound, ply);

    best_score
}
