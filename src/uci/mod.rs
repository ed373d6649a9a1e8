//! UCI protocol front-end.
//!
//! A reader thread turns stdin lines into command values and hands them to
//! the driver over a channel; `stop` and `quit` additionally raise the
//! abort flag directly so a running search winds down without waiting for
//! the driver. Searches run on their own thread under a lock on the engine
//! state, keeping the driver responsive.

pub mod command;
pub mod options;

use std::io::BufRead;
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;

use crate::position::Position;
use crate::search::{search_position, SearchLimits, ThreadPool};
use crate::sync::StopFlag;
use crate::tt::TranspositionTable;

use command::{Command, GoParams};
use options::EngineOptions;

/// The main search recursion runs on the job thread; give it the same
/// roomy stack the helper threads get.
const SEARCH_STACK_SIZE: usize = 32 * 1024 * 1024;

/// State a search borrows for its whole run.
struct EngineState {
    pos: Position,
    pool: ThreadPool,
    tt: TranspositionTable,
}

struct Engine {
    state: Arc<Mutex<EngineState>>,
    options: EngineOptions,
    abort: StopFlag,
    stopped: StopFlag,
    job: Option<JoinHandle<()>>,
}

/// Read stdin, drive the engine, block until `quit`.
pub fn run() {
    let (tx, rx) = mpsc::channel();
    let abort = StopFlag::new();

    let reader_abort = abort.clone();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let Some(cmd) = command::parse(&line) else {
                continue;
            };
            let quit = matches!(cmd, Command::Quit);
            if matches!(cmd, Command::Stop | Command::Quit) {
                reader_abort.set();
            }
            if tx.send(cmd).is_err() || quit {
                return;
            }
        }
        // stdin closed: treat as quit.
        reader_abort.set();
        let _ = tx.send(Command::Quit);
    });

    let options = EngineOptions::default();
    let engine = Engine {
        state: Arc::new(Mutex::new(EngineState {
            pos: Position::startpos(),
            pool: ThreadPool::new(options.threads),
            tt: TranspositionTable::new(options.hash_mb),
        })),
        options,
        abort,
        stopped: StopFlag::new(),
        job: None,
    };
    engine.run(&rx);
}

impl Engine {
    fn run(mut self, rx: &Receiver<Command>) {
        while let Ok(cmd) = rx.recv() {
            match cmd {
                Command::Uci => {
                    println!("id name Ebbtide {}", env!("CARGO_PKG_VERSION"));
                    println!("id author the Ebbtide developers");
                    self.options.print();
                    println!("uciok");
                }
                Command::IsReady => println!("readyok"),
                Command::NewGame => {
                    self.finish_job();
                    let mut state = self.state.lock();
                    state.pool.reset();
                    state.tt.clear();
                }
                Command::Position { fen, moves } => {
                    self.finish_job();
                    self.set_position(fen.as_deref(), &moves);
                }
                Command::SetOption { name, value } => {
                    self.finish_job();
                    self.set_option(&name, &value);
                }
                Command::Go(params) => {
                    self.finish_job();
                    self.go(params);
                }
                Command::Stop => self.abort.set(),
                Command::Quit => {
                    self.abort.set();
                    self.finish_job();
                    return;
                }
                Command::Unknown(line) => {
                    println!("info string unknown command: {line}");
                }
            }
        }
    }

    /// Wait for a running search to deliver its bestmove.
    fn finish_job(&mut self) {
        if let Some(handle) = self.job.take() {
            let _ = handle.join();
        }
    }

    fn set_position(&mut self, fen: Option<&str>, moves: &[String]) {
        let parsed = match fen {
            None => Ok(Position::startpos()),
            Some(f) => Position::from_fen(f),
        };
        let mut pos = match parsed {
            Ok(pos) => pos,
            Err(err) => {
                println!("info string invalid fen: {err}");
                return;
            }
        };
        if self.options.chess960 {
            pos.set_chess960(true);
        }
        for text in moves {
            match pos.parse_uci_move(text) {
                Some(mv) => {
                    pos.make(mv);
                }
                None => {
                    println!("info string illegal move ignored: {text}");
                    break;
                }
            }
        }
        self.state.lock().pos = pos;
    }

    fn set_option(&mut self, name: &str, value: &str) {
        match name {
            "Threads" => {
                if let Ok(count) = value.parse::<usize>() {
                    self.options.threads = count.clamp(1, 512);
                    self.state.lock().pool.set_count(self.options.threads);
                }
            }
            "Hash" => {
                if let Ok(mb) = value.parse::<usize>() {
                    self.options.hash_mb = mb.clamp(1, 65_536);
                    if let Err(err) = self.state.lock().tt.resize(self.options.hash_mb) {
                        println!("info string hash resize failed: {err}");
                    }
                }
            }
            "MultiPV" => {
                if let Ok(n) = value.parse::<u32>() {
                    self.options.multi_pv = n.clamp(1, 64);
                }
            }
            "UCI_Chess960" => {
                self.options.chess960 = value.eq_ignore_ascii_case("true");
                self.state.lock().pos.set_chess960(self.options.chess960);
            }
            "MoveOverhead" => {
                if let Ok(ms) = value.parse::<u64>() {
                    self.options.move_overhead = ms.min(10_000);
                }
            }
            _ => println!("info string unknown option: {name}"),
        }
    }

    fn go(&mut self, params: GoParams) {
        // A stale stop (sent with no search running) must not kill this one.
        self.abort.clear();

        let state = Arc::clone(&self.state);
        let abort = self.abort.clone();
        let stopped = self.stopped.clone();
        let multi_pv = self.options.multi_pv;
        let move_overhead = self.options.move_overhead;

        let job = thread::Builder::new()
            .name("search-driver".to_string())
            .stack_size(SEARCH_STACK_SIZE);
        let handle = job.spawn(move || {
            let mut state = state.lock();
            let state = &mut *state;
            let pos = state.pos.clone();
            let limits = build_limits(&params, &mut state.pos, multi_pv);

            let report = search_position(
                &mut state.pool,
                &pos,
                limits,
                &state.tt,
                &abort,
                &stopped,
                move_overhead,
            );

            if report.best_move.is_none() {
                let score = if report.score == 0 { "cp 0" } else { "mate 0" };
                println!("info depth 0 score {score}");
                println!("bestmove 0000");
            } else {
                let best = state.pos.move_to_uci(report.best_move);
                if report.ponder_move.is_none() {
                    println!("bestmove {best}");
                } else {
                    // The ponder move is meant from the position after the
                    // best move; plain coordinate text is correct there.
                    println!("bestmove {best} ponder {}", report.ponder_move);
                }
            }
        });
        self.job = Some(handle.expect("failed to spawn search thread"));
    }
}

fn build_limits(params: &GoParams, pos: &mut Position, multi_pv: u32) -> SearchLimits {
    let white = pos.side_to_move() == crate::position::types::Color::White;
    let mut limits = SearchLimits {
        time: if white { params.wtime } else { params.btime },
        inc: if white { params.winc } else { params.binc },
        movestogo: params.movestogo,
        movetime: params.movetime,
        depth: params.depth,
        nodes: params.nodes,
        mate: params.mate,
        infinite: params.infinite,
        multi_pv,
        ..SearchLimits::default()
    };
    for text in params.searchmoves.iter().take(64) {
        if let Some(mv) = pos.parse_uci_move(text) {
            limits.searchmoves.push(mv);
        }
    }
    limits
}
