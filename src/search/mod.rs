//! Parallel iterative-deepening alpha-beta search.
//!
//! The main thread deepens with aspiration windows and polls the clock;
//! helper threads run the same loop with slightly perturbed parameters and
//! stop when the shared abort flag is raised. All threads share the
//! transposition table; everything else is thread-private.

mod alpha_beta;
pub mod history;
pub mod movepick;
pub mod see;
pub mod threads;
pub mod time;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::eval::pawns::PawnCache;
use crate::position::types::Move;
use crate::position::Position;
use crate::sync::StopFlag;
use crate::tt::TranspositionTable;

use history::{Histories, PieceTo};
use time::TimeManager;

pub use threads::{search_position, SearchReport, ThreadPool};

/// Hard ceiling on search depth and ply.
pub const MAX_PLY: usize = 128;

pub const INFINITE: i32 = 32_000;
pub const MATE: i32 = 31_000;
/// Scores at or above this are "mating in at most MAX_PLY".
pub const MATE_IN_MAX: i32 = MATE - MAX_PLY as i32;
pub const MATED_IN_MAX: i32 = -MATE_IN_MAX;

#[inline]
#[must_use]
pub const fn mate_in(ply: usize) -> i32 {
    MATE - ply as i32
}

#[inline]
#[must_use]
pub const fn mated_in(ply: usize) -> i32 {
    ply as i32 - MATE
}

#[inline]
#[must_use]
pub const fn is_mate_score(score: i32) -> bool {
    score >= MATE_IN_MAX || score <= MATED_IN_MAX
}

/// Everything the `go` command carries into the search.
#[derive(Clone, Debug)]
pub struct SearchLimits {
    /// Remaining clock time for the side to move, milliseconds.
    pub time: Option<u64>,
    pub inc: u64,
    pub movestogo: Option<u32>,
    pub movetime: Option<u64>,
    pub depth: Option<i32>,
    pub nodes: Option<u64>,
    pub mate: Option<i32>,
    pub infinite: bool,
    /// Derived: is any clock constraint active?
    pub timelimit: bool,
    pub node_time: Option<u64>,
    pub multi_pv: u32,
    pub searchmoves: Vec<Move>,
}

impl Default for SearchLimits {
    fn default() -> Self {
        SearchLimits {
            time: None,
            inc: 0,
            movestogo: None,
            movetime: None,
            depth: None,
            nodes: None,
            mate: None,
            infinite: false,
            timelimit: false,
            node_time: None,
            multi_pv: 1,
            searchmoves: Vec::new(),
        }
    }
}

/// One candidate move at the root with its running scores and line.
#[derive(Clone, Debug)]
pub struct RootMove {
    pub mv: Move,
    pub score: i32,
    pub previous_score: i32,
    pub pv: Vec<Move>,
}

impl RootMove {
    fn new(mv: Move) -> Self {
        RootMove {
            mv,
            score: -INFINITE,
            previous_score: -INFINITE,
            pv: vec![mv],
        }
    }
}

/// Insertion sort by descending score from `begin`, stable for equal
/// scores so user-supplied searchmoves keep their relative order.
pub fn sort_root_moves(moves: &mut [RootMove], begin: usize) {
    for i in begin + 1..moves.len() {
        let mut j = i;
        while j > begin && moves[j - 1].score < moves[j].score {
            moves.swap(j, j - 1);
            j -= 1;
        }
    }
}

/// Per-ply scratch the search reads back from shallower frames.
#[derive(Clone, Copy, Default)]
pub struct StackEntry {
    pub static_eval: i32,
    pub mv: Move,
    pub piece_to: PieceTo,
}

/// Triangular principal variation table.
pub struct PvTable {
    len: [usize; MAX_PLY + 1],
    moves: [[Move; MAX_PLY + 1]; MAX_PLY + 1],
}

impl PvTable {
    fn new() -> Box<Self> {
        Box::new(PvTable {
            len: [0; MAX_PLY + 1],
            moves: [[Move::NONE; MAX_PLY + 1]; MAX_PLY + 1],
        })
    }

    #[inline]
    pub fn reset(&mut self, ply: usize) {
        self.len[ply] = 0;
    }

    /// Set `mv` as the head of this ply's line and append the child line.
    pub fn update(&mut self, ply: usize, mv: Move) {
        let child_len = self.len[ply + 1];
        let (head, tail) = self.moves.split_at_mut(ply + 1);
        head[ply][0] = mv;
        head[ply][1..=child_len].copy_from_slice(&tail[0][..child_len]);
        self.len[ply] = child_len + 1;
    }

    #[inline]
    #[must_use]
    pub fn line(&self, ply: usize) -> &[Move] {
        &self.moves[ply][..self.len[ply]]
    }
}

/// All state one search thread owns.
pub struct ThreadData {
    pub index: usize,
    pub count: usize,
    pub pos: Position,
    pub root_moves: Vec<RootMove>,
    /// History length at the search root; repetition inside the tree is
    /// judged against this.
    pub root_ply: usize,
    pub depth: i32,
    pub seldepth: usize,
    pub completed_depth: i32,
    pub pv: Box<PvTable>,
    pub stack: Vec<StackEntry>,
    pub killers: Vec<[Move; 2]>,
    pub hist: Histories,
    pub pawn_cache: PawnCache,
    /// Published node count, summed with relaxed ordering for reporting.
    pub nodes: Arc<AtomicU64>,
    pub tb_hits: Arc<AtomicU64>,
}

impl ThreadData {
    #[must_use]
    pub fn new(index: usize, count: usize) -> Self {
        ThreadData {
            index,
            count,
            pos: Position::startpos(),
            root_moves: Vec::new(),
            root_ply: 0,
            depth: 0,
            seldepth: 0,
            completed_depth: 0,
            pv: PvTable::new(),
            stack: vec![StackEntry::default(); MAX_PLY + 4],
            killers: vec![[Move::NONE; 2]; MAX_PLY + 2],
            hist: Histories::new(),
            pawn_cache: PawnCache::new(),
            nodes: Arc::new(AtomicU64::new(0)),
            tb_hits: Arc::new(AtomicU64::new(0)),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_main(&self) -> bool {
        self.index == 0
    }

    #[inline]
    pub fn publish_counters(&self) {
        self.nodes.store(self.pos.nodes, Ordering::Relaxed);
    }
}

/// Shared, read-only view handed to every search thread.
pub struct SearchContext<'a> {
    pub tt: &'a TranspositionTable,
    pub abort: &'a StopFlag,
    pub limits: &'a SearchLimits,
    pub tm: TimeManager,
    pub node_counters: Vec<Arc<AtomicU64>>,
    pub tb_counters: Vec<Arc<AtomicU64>>,
}

impl SearchContext<'_> {
    /// Advisory sum of every thread's published node counter.
    #[must_use]
    pub fn total_nodes(&self) -> u64 {
        self.node_counters
            .iter()
            .map(|c| c.load(Ordering::Relaxed))
            .sum()
    }

    #[must_use]
    pub fn total_tb_hits(&self) -> u64 {
        self.tb_counters
            .iter()
            .map(|c| c.load(Ordering::Relaxed))
            .sum()
    }
}

/// One thread's iterative deepening loop.
pub(crate) fn iterative_deepening(td: &mut ThreadData, ctx: &SearchContext) {
    let max_depth = ctx
        .limits
        .depth
        .unwrap_or(MAX_PLY as i32 - 1)
        .clamp(1, MAX_PLY as i32 - 1);
    let multi_pv = (ctx.limits.multi_pv.max(1) as usize).min(td.root_moves.len());

    for depth in 1..=max_depth {
        td.depth = depth;
        for rm in &mut td.root_moves {
            rm.previous_score = rm.score;
        }

        for pv_idx in 0..multi_pv {
            td.seldepth = 0;
            aspiration_window(td, ctx, depth, pv_idx);
            if ctx.abort.is_set() {
                break;
            }
            sort_root_moves(&mut td.root_moves, pv_idx);
        }
        if ctx.abort.is_set() {
            break;
        }
        td.completed_depth = depth;

        if td.is_main() {
            report_depth(td, ctx, depth, multi_pv);
            if search_satisfied(td, ctx) {
                break;
            }
        }
    }

    // An infinite search reports nothing until the GUI says stop.
    if td.is_main() && ctx.limits.infinite {
        while !ctx.abort.is_set() {
            std::thread::yield_now();
        }
    }
}

/// Main-thread termination checks between iterations.
fn search_satisfied(td: &ThreadData, ctx: &SearchContext) -> bool {
    if ctx.limits.infinite {
        return false;
    }
    if let Some(mate) = ctx.limits.mate {
        let score = td.root_moves[0].score;
        if score >= MATE - 2 * mate || score <= -MATE + 2 * mate {
            return true;
        }
    }
    if let Some(max_nodes) = ctx.limits.nodes {
        if ctx.total_nodes() >= max_nodes {
            return true;
        }
    }
    ctx.tm.soft_exceeded()
}

fn aspiration_window(td: &mut ThreadData, ctx: &SearchContext, depth: i32, pv_idx: usize) {
    // Helpers deepen half a step ahead and run slightly wider windows, so
    // the threads do not all explore the identical tree.
    let search_depth = if td.is_main() {
        depth
    } else {
        (depth + (td.index & 1) as i32).min(MAX_PLY as i32 - 1)
    };
    let mut delta = 16 + 5 * (td.index % 3) as i32;

    let prev = td.root_moves[pv_idx].previous_score;
    let (mut alpha, mut beta) = if depth >= 5 && prev.abs() < MATE_IN_MAX {
        ((prev - delta).max(-INFINITE), (prev + delta).min(INFINITE))
    } else {
        (-INFINITE, INFINITE)
    };

    loop {
        let score = alpha_beta::alpha_beta(td, ctx, alpha, beta, search_depth, 0, pv_idx);
        if ctx.abort.is_set() {
            return;
        }
        if score <= alpha {
            // Fail low: pull beta in and re-search wider below.
            beta = (alpha + beta) / 2;
            alpha = (alpha - delta).max(-INFINITE);
        } else if score >= beta {
            beta = (beta + delta).min(INFINITE);
        } else {
            return;
        }
        delta += delta / 2;
    }
}

fn format_score(score: i32) -> String {
    if score >= MATE_IN_MAX {
        format!("mate {}", (MATE - score + 1) / 2)
    } else if score <= MATED_IN_MAX {
        format!("mate -{}", (MATE + score + 1) / 2)
    } else {
        format!("cp {score}")
    }
}

/// One `info` line per PV after a completed depth.
fn report_depth(td: &ThreadData, ctx: &SearchContext, depth: i32, multi_pv: usize) {
    let time = ctx.tm.elapsed_ms();
    let nodes = ctx.total_nodes();
    let nps = nodes * 1000 / time.max(1);
    let hashfull = ctx.tt.hashfull();
    let tbhits = ctx.total_tb_hits();

    for idx in 0..multi_pv {
        let rm = &td.root_moves[idx];
        let score = format_score(rm.score.max(rm.previous_score));
        let pv: Vec<String> = rm.pv.iter().map(|&mv| td.pos.move_to_uci(mv)).collect();
        let multipv_field = if multi_pv > 1 {
            format!(" multipv {}", idx + 1)
        } else {
            String::new()
        };
        println!(
            "info depth {depth} seldepth {}{multipv_field} score {score} nodes {nodes} \
             nps {nps} time {time} hashfull {hashfull} tbhits {tbhits} pv {}",
            td.seldepth,
            pv.join(" ")
        );
    }
}
