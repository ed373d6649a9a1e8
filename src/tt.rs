//! Shared transposition table.
//!
//! A power-of-two array of four-slot buckets. Each slot is two atomic
//! words: the data word packs move/score/eval/depth/bound/generation, and
//! the key word stores `key ^ data`. Probes validate by XOR, so a torn
//! write from another thread simply fails validation instead of being
//! trusted. No locks anywhere on the search path.

use std::collections::TryReserveError;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

use crate::search::{MATE_IN_MAX, MATED_IN_MAX};

/// Default table size in megabytes.
pub const DEFAULT_HASH_MB: usize = 32;

const BUCKET_SIZE: usize = 4;
const GEN_MASK: u8 = 0x3F;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Bound {
    Upper = 1,
    Lower = 2,
    Exact = 3,
}

impl Bound {
    #[inline]
    fn from_bits(bits: u8) -> Option<Bound> {
        match bits {
            1 => Some(Bound::Upper),
            2 => Some(Bound::Lower),
            3 => Some(Bound::Exact),
            _ => None,
        }
    }
}

/// Decoded probe result. The move is the 16-bit compact form; the caller
/// matches it against generated moves before trusting it.
#[derive(Clone, Copy, Debug)]
pub struct TtProbe {
    pub mv: u16,
    pub score: i32,
    pub eval: i32,
    pub depth: i32,
    pub bound: Bound,
}

#[derive(Default)]
struct Slot {
    key_xor: AtomicU64,
    data: AtomicU64,
}

impl Slot {
    #[inline]
    fn load(&self, key: u64) -> Option<u64> {
        let data = self.data.load(Ordering::Relaxed);
        let key_xor = self.key_xor.load(Ordering::Relaxed);
        (data != 0 && key_xor ^ data == key).then_some(data)
    }

    #[inline]
    fn store(&self, key: u64, data: u64) {
        self.data.store(data, Ordering::Relaxed);
        self.key_xor.store(key ^ data, Ordering::Relaxed);
    }

    #[inline]
    fn raw(&self) -> u64 {
        self.data.load(Ordering::Relaxed)
    }
}

#[inline]
fn pack(mv: u16, score: i32, eval: i32, depth: i32, bound: Bound, generation: u8) -> u64 {
    debug_assert!((0..=255).contains(&depth));
    u64::from(mv)
        | (u64::from(score as i16 as u16) << 16)
        | (u64::from(eval as i16 as u16) << 32)
        | (u64::from(depth as u8) << 48)
        | (u64::from((generation << 2) | bound as u8) << 56)
}

#[inline]
fn unpack_depth(data: u64) -> i32 {
    ((data >> 48) & 0xFF) as i32
}

#[inline]
fn unpack_gen(data: u64) -> u8 {
    ((data >> 56) as u8) >> 2
}

pub struct TranspositionTable {
    slots: Vec<Slot>,
    bucket_mask: usize,
    generation: AtomicU8,
}

impl TranspositionTable {
    /// Allocate a table of roughly `mb` megabytes.
    #[must_use]
    pub fn new(mb: usize) -> Self {
        let mut tt = TranspositionTable {
            slots: Vec::new(),
            bucket_mask: 0,
            generation: AtomicU8::new(0),
        };
        tt.resize(mb).expect("initial hash allocation");
        tt
    }

    /// Replace the table with one of `mb` megabytes. Either the new table
    /// is live afterwards or the old one is untouched; never a partial
    /// state. Must not run while a search holds the table.
    pub fn resize(&mut self, mb: usize) -> Result<(), TryReserveError> {
        let bytes = mb.max(1) * 1024 * 1024;
        let slot_count = (bytes / std::mem::size_of::<Slot>())
            .next_power_of_two()
            .max(BUCKET_SIZE * 2);
        let slot_count = if slot_count * std::mem::size_of::<Slot>() > bytes {
            slot_count / 2
        } else {
            slot_count
        };

        let mut slots: Vec<Slot> = Vec::new();
        slots.try_reserve_exact(slot_count)?;
        slots.resize_with(slot_count, Slot::default);

        self.slots = slots;
        self.bucket_mask = slot_count / BUCKET_SIZE - 1;
        self.generation.store(0, Ordering::Relaxed);
        #[cfg(feature = "logging")]
        log::debug!("hash table resized to {mb} MB ({slot_count} slots)");
        Ok(())
    }

    /// Forget everything; used on `ucinewgame`.
    pub fn clear(&self) {
        for slot in &self.slots {
            slot.data.store(0, Ordering::Relaxed);
            slot.key_xor.store(0, Ordering::Relaxed);
        }
        self.generation.store(0, Ordering::Relaxed);
    }

    /// Age the table by one search.
    pub fn new_search(&self) {
        let gen = self.generation.load(Ordering::Relaxed);
        self.generation
            .store(gen.wrapping_add(1) & GEN_MASK, Ordering::Relaxed);
    }

    #[inline]
    fn bucket(&self, key: u64) -> &[Slot] {
        let idx = (key as usize & self.bucket_mask) * BUCKET_SIZE;
        &self.slots[idx..idx + BUCKET_SIZE]
    }

    /// Hint the cache that this key's bucket is about to be probed.
    #[inline]
    pub fn prefetch(&self, key: u64) {
        #[cfg(target_arch = "x86_64")]
        unsafe {
            use std::arch::x86_64::{_mm_prefetch, _MM_HINT_T0};
            let idx = (key as usize & self.bucket_mask) * BUCKET_SIZE;
            _mm_prefetch(self.slots.as_ptr().add(idx).cast::<i8>(), _MM_HINT_T0);
        }
        #[cfg(not(target_arch = "x86_64"))]
        let _ = key;
    }

    /// Look up `key`. Mate scores come back normalized to distance from the
    /// probing node.
    #[must_use]
    pub fn probe(&self, key: u64, ply: usize) -> Option<TtProbe> {
        for slot in self.bucket(key) {
            if let Some(data) = slot.load(key) {
                let bound = Bound::from_bits((data >> 56) as u8 & 3)?;
                return Some(TtProbe {
                    mv: data as u16,
                    score: score_from_tt(((data >> 16) as u16 as i16).into(), ply),
                    eval: ((data >> 32) as u16 as i16).into(),
                    depth: unpack_depth(data),
                    bound,
                });
            }
        }
        None
    }

    /// Store a search result. Replacement prefers empty slots, then stale
    /// generations, then the shallowest entry in the bucket.
    pub fn store(
        &self,
        key: u64,
        mv: u16,
        score: i32,
        eval: i32,
        depth: i32,
        bound: Bound,
        ply: usize,
    ) {
        let generation = self.generation.load(Ordering::Relaxed);
        let bucket = self.bucket(key);

        let mut victim = &bucket[0];
        let mut victim_quality = i32::MAX;
        let mut mv = mv;

        for slot in bucket {
            let data = slot.raw();
            if data == 0 {
                victim = slot;
                break;
            }
            if slot.load(key).is_some() {
                // Same position: refresh, but never erase a known move with
                // an empty one.
                if mv == 0 {
                    mv = data as u16;
                }
                victim = slot;
                break;
            }
            let age = i32::from((generation.wrapping_sub(unpack_gen(data))) & GEN_MASK);
            let quality = unpack_depth(data) - 8 * age;
            if quality < victim_quality {
                victim_quality = quality;
                victim = slot;
            }
        }

        let data = pack(mv, score_to_tt(score, ply), eval, depth, bound, generation);
        victim.store(key, data);
    }

    /// Per-mille estimate of fresh entries, for `info hashfull`.
    #[must_use]
    pub fn hashfull(&self) -> usize {
        let generation = self.generation.load(Ordering::Relaxed);
        let sample = self.slots.len().min(4000);
        let mut used = 0;
        for slot in &self.slots[..sample] {
            let data = slot.raw();
            if data != 0 && unpack_gen(data) == generation {
                used += 1;
            }
        }
        used * 1000 / sample
    }
}

/// Mate scores are stored relative to the node so a hit at another ply
/// stays meaningful: distance-to-mate from here, not from the root.
#[inline]
#[must_use]
pub fn score_to_tt(score: i32, ply: usize) -> i32 {
    if score >= MATE_IN_MAX {
        score + ply as i32
    } else if score <= MATED_IN_MAX {
        score - ply as i32
    } else {
        score
    }
}

#[inline]
#[must_use]
pub fn score_from_tt(score: i32, ply: usize) -> i32 {
    if score >= MATE_IN_MAX {
        score - ply as i32
    } else if score <= MATED_IN_MAX {
        score + ply as i32
    } else {
        score
    }
}
