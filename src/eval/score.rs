//! Packed middlegame/endgame score pairs.
//!
//! Both halves of a tapered term live in one `i32`: mg in the low 16 bits,
//! eg in the high 16. Sums of packed values are plain integer additions; the
//! `+0x8000` in the eg extraction corrects for borrow out of the mg half.

use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// Phase of a position with all material on the board.
pub const MID_GAME: i32 = 256;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Score(i32);

/// Construct a packed score pair.
#[inline]
#[must_use]
pub const fn s(mg: i32, eg: i32) -> Score {
    Score((((eg as u32) << 16) as i32).wrapping_add(mg))
}

impl Score {
    pub const ZERO: Score = Score(0);

    #[inline]
    #[must_use]
    pub const fn mg(self) -> i32 {
        self.0 as i16 as i32
    }

    #[inline]
    #[must_use]
    pub const fn eg(self) -> i32 {
        ((self.0 as u32).wrapping_add(0x8000) >> 16) as u16 as i16 as i32
    }

    /// Blend the two halves by phase (0 = endgame, `MID_GAME` = middlegame).
    #[inline]
    #[must_use]
    pub const fn taper(self, phase: i32) -> i32 {
        (self.mg() * phase + self.eg() * (MID_GAME - phase)) / MID_GAME
    }
}

impl Add for Score {
    type Output = Score;
    #[inline]
    fn add(self, rhs: Score) -> Score {
        Score(self.0.wrapping_add(rhs.0))
    }
}

impl Sub for Score {
    type Output = Score;
    #[inline]
    fn sub(self, rhs: Score) -> Score {
        Score(self.0.wrapping_sub(rhs.0))
    }
}

impl AddAssign for Score {
    #[inline]
    fn add_assign(&mut self, rhs: Score) {
        self.0 = self.0.wrapping_add(rhs.0);
    }
}

impl SubAssign for Score {
    #[inline]
    fn sub_assign(&mut self, rhs: Score) {
        self.0 = self.0.wrapping_sub(rhs.0);
    }
}

impl Neg for Score {
    type Output = Score;
    #[inline]
    fn neg(self) -> Score {
        Score(self.0.wrapping_neg())
    }
}

impl Mul<i32> for Score {
    type Output = Score;
    #[inline]
    fn mul(self, rhs: i32) -> Score {
        Score(self.0.wrapping_mul(rhs))
    }
}
