//! Thread pool and the search entry point.
//!
//! Per-thread state is allocated once and reused across searches; each
//! search copies the position in, fans helper threads out under a scope,
//! and collects the best line from the main thread when the scope joins.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;

use crate::position::types::Move;
use crate::position::Position;
use crate::sync::StopFlag;
use crate::tt::TranspositionTable;

use super::time::init_time_management;
use super::{iterative_deepening, mated_in, RootMove, SearchContext, SearchLimits, ThreadData};

/// Deep recursion plus per-ply scratch wants a roomy stack.
const SEARCH_STACK_SIZE: usize = 32 * 1024 * 1024;

/// The searching threads, allocated by `new` and reused between searches.
pub struct ThreadPool {
    pub threads: Vec<ThreadData>,
}

impl ThreadPool {
    #[must_use]
    pub fn new(count: usize) -> Self {
        let mut pool = ThreadPool {
            threads: Vec::new(),
        };
        pool.set_count(count);
        pool
    }

    /// Resize the pool; existing heuristics are discarded.
    pub fn set_count(&mut self, count: usize) {
        let count = count.max(1);
        self.threads = (0..count).map(|i| ThreadData::new(i, count)).collect();
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.threads.len()
    }

    /// Zero everything that outlives a single search; for `ucinewgame`.
    pub fn reset(&mut self) {
        for td in &mut self.threads {
            td.hist.clear();
            td.pawn_cache.clear();
            td.completed_depth = 0;
        }
    }

    #[must_use]
    pub fn main(&self) -> &ThreadData {
        &self.threads[0]
    }

    /// Copy the position into every thread and build the root move lists:
    /// the legal intersection of `searchmoves` in the order the user gave
    /// them, or all legal moves when none were supplied.
    fn prepare(&mut self, pos: &Position, limits: &SearchLimits) {
        let mut root_pos = pos.clone();
        let legal = root_pos.generate_legal();
        root_pos.nodes = 0;
        let mut root_moves: Vec<RootMove> = Vec::new();
        for &wanted in &limits.searchmoves {
            if legal.contains(wanted) {
                root_moves.push(RootMove::new(wanted));
            }
        }
        if root_moves.is_empty() {
            for &mv in legal.iter() {
                root_moves.push(RootMove::new(mv));
            }
        }

        for td in &mut self.threads {
            td.pos = root_pos.clone();
            td.root_moves = root_moves.clone();
            td.root_ply = root_pos.hist_ply();
            td.depth = 0;
            td.seldepth = 0;
            td.completed_depth = 0;
            for entry in &mut td.stack {
                *entry = super::StackEntry::default();
            }
            for killer in &mut td.killers {
                *killer = [Move::NONE; 2];
            }
            td.nodes.store(0, Ordering::Relaxed);
            td.tb_hits.store(0, Ordering::Relaxed);
        }
    }
}

/// What the driver needs to answer the GUI.
#[derive(Clone, Debug)]
pub struct SearchReport {
    pub best_move: Move,
    pub ponder_move: Move,
    pub score: i32,
}

/// Run a full search: prepare per-thread state, fan out helpers, deepen on
/// the main thread, then signal the abort, join, and report. On return the
/// abort flag is cleared and the stopped flag set.
pub fn search_position(
    pool: &mut ThreadPool,
    pos: &Position,
    mut limits: SearchLimits,
    tt: &TranspositionTable,
    abort: &StopFlag,
    stopped: &StopFlag,
    move_overhead: u64,
) -> SearchReport {
    let tm = init_time_management(&mut limits, move_overhead);
    stopped.clear();
    tt.new_search();
    pool.prepare(pos, &limits);

    if pool.main().root_moves.is_empty() {
        // No legal move: mate or stalemate. Still report a sane score.
        let score = if pos.in_check() { mated_in(0) } else { 0 };
        abort.clear();
        stopped.set();
        return SearchReport {
            best_move: Move::NONE,
            ponder_move: Move::NONE,
            score,
        };
    }

    // The game is already drawn where it stands; any move keeps the score.
    let root = &pool.main().pos;
    if root.is_repetition(root.hist_ply()) || root.rule50() >= 100 || root.material_draw() {
        let best_move = pool.main().root_moves[0].mv;
        abort.clear();
        stopped.set();
        return SearchReport {
            best_move,
            ponder_move: Move::NONE,
            score: 0,
        };
    }

    #[cfg(feature = "logging")]
    log::debug!(
        "search: {} root moves, {} threads, optimal {} ms, max {} ms",
        pool.main().root_moves.len(),
        pool.count(),
        tm.optimal,
        tm.max
    );

    let ctx = SearchContext {
        tt,
        abort,
        limits: &limits,
        tm,
        node_counters: pool.threads.iter().map(|t| Arc::clone(&t.nodes)).collect(),
        tb_counters: pool
            .threads
            .iter()
            .map(|t| Arc::clone(&t.tb_hits))
            .collect(),
    };

    thread::scope(|scope| {
        let (main, helpers) = pool.threads.split_first_mut().expect("pool is never empty");
        let ctx = &ctx;
        for td in helpers {
            thread::Builder::new()
                .name(format!("search-{}", td.index))
                .stack_size(SEARCH_STACK_SIZE)
                .spawn_scoped(scope, move || iterative_deepening(td, ctx))
                .expect("failed to spawn search worker");
        }

        iterative_deepening(main, ctx);

        // Main is done (or out of time): everyone else stops at their next
        // poll, and the scope join below waits for them.
        ctx.abort.set();
    });

    abort.clear();
    stopped.set();

    let main = pool.main();
    let best = &main.root_moves[0];
    SearchReport {
        best_move: best.mv,
        ponder_move: best.pv.get(1).copied().unwrap_or(Move::NONE),
        score: best.score.max(best.previous_score),
    }
}
