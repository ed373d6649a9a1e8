//! Engine options mutable through `setoption`.

use crate::tt::DEFAULT_HASH_MB;

#[derive(Clone, Debug)]
pub struct EngineOptions {
    pub threads: usize,
    pub hash_mb: usize,
    pub multi_pv: u32,
    pub chess960: bool,
    pub move_overhead: u64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            threads: 1,
            hash_mb: DEFAULT_HASH_MB,
            multi_pv: 1,
            chess960: false,
            move_overhead: 10,
        }
    }
}

impl EngineOptions {
    /// The `option` lines advertised in response to `uci`.
    pub fn print(&self) {
        println!(
            "option name Threads type spin default {} min 1 max 512",
            self.threads
        );
        println!(
            "option name Hash type spin default {} min 1 max 65536",
            self.hash_mb
        );
        println!(
            "option name MultiPV type spin default {} min 1 max 64",
            self.multi_pv
        );
        println!(
            "option name UCI_Chess960 type check default {}",
            self.chess960
        );
        println!(
            "option name MoveOverhead type spin default {} min 0 max 10000",
            self.move_overhead
        );
    }
}
