//! Time management.
//!
//! Derives a soft (optimal) and hard (maximum) budget from the clock
//! fields. The soft budget gates starting another iteration; the hard
//! budget is what the main thread polls against inside the tree. All
//! arithmetic is on a monotonic clock and saturating, so a time reading can
//! never go negative.

use std::time::Instant;

use super::SearchLimits;

#[derive(Clone, Copy, Debug)]
pub struct TimeManager {
    start: Instant,
    pub optimal: u64,
    pub max: u64,
    pub timelimit: bool,
}

/// Derive the budgets for this search. Also records on the limits whether a
/// clock is running at all.
#[must_use]
pub fn init_time_management(limits: &mut SearchLimits, overhead: u64) -> TimeManager {
    let start = Instant::now();

    let (optimal, max, timelimit) = if let Some(movetime) = limits.movetime {
        let budget = movetime.saturating_sub(overhead).max(1);
        (budget, budget, true)
    } else if let Some(time) = limits.time {
        // Sudden death defaults to planning for 30 more moves.
        let mtg = u64::from(limits.movestogo.filter(|&m| m > 0).unwrap_or(30));
        let usable = time.saturating_sub(overhead).max(1);
        let base = (usable / mtg + limits.inc * 3 / 4).max(1);
        let max = (base * 6).min(usable * 4 / 5).max(1);
        (base.min(max), max, true)
    } else {
        (u64::MAX, u64::MAX, false)
    };

    limits.timelimit = timelimit;
    TimeManager {
        start,
        optimal,
        max,
        timelimit,
    }
}

impl TimeManager {
    #[inline]
    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Not worth starting another iteration past this point.
    #[inline]
    #[must_use]
    pub fn soft_exceeded(&self) -> bool {
        self.timelimit && self.elapsed_ms() >= self.optimal
    }

    /// The in-tree deadline.
    #[inline]
    #[must_use]
    pub fn hard_exceeded(&self) -> bool {
        self.timelimit && self.elapsed_ms() >= self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movetime_pins_both_budgets() {
        let mut limits = SearchLimits {
            movetime: Some(500),
            ..SearchLimits::default()
        };
        let tm = init_time_management(&mut limits, 10);
        assert_eq!(tm.optimal, 490);
        assert_eq!(tm.max, 490);
        assert!(limits.timelimit);
    }

    #[test]
    fn clock_budget_is_a_fraction_of_remaining() {
        let mut limits = SearchLimits {
            time: Some(60_000),
            inc: 1_000,
            ..SearchLimits::default()
        };
        let tm = init_time_management(&mut limits, 10);
        assert!(tm.optimal <= tm.max);
        assert!(tm.max < 60_000);
        assert!(tm.optimal >= 1_000);
    }

    #[test]
    fn no_clock_means_no_limit() {
        let mut limits = SearchLimits::default();
        let tm = init_time_management(&mut limits, 10);
        assert!(!limits.timelimit);
        assert!(!tm.soft_exceeded());
        assert!(!tm.hard_exceeded());
    }

    #[test]
    fn movestogo_zero_is_sudden_death() {
        let mut limits = SearchLimits {
            time: Some(30_000),
            movestogo: Some(0),
            ..SearchLimits::default()
        };
        let tm = init_time_management(&mut limits, 0);
        assert!(tm.max < 30_000);
    }
}
