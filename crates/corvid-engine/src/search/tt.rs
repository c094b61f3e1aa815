//! Lockless transposition table with XOR-checked entries.
//!
//! Each slot is two `AtomicU64` words: `key = hash ^ data` and `data`.
//! A reader recomputes `key ^ data` and compares it with the probed hash;
//! a torn write from another thread, an index collision, or an empty slot
//! all fail that comparison and read as a miss.
//!
//! ## Data word layout
//!
//! ```text
//!   bits  0-15  move        (Move::raw)
//!   bits 16-31  score       (i16, mate scores stored node-relative)
//!   bits 32-47  depth       (i16, ply units)
//!   bits 48-55  generation
//!   bits 56-57  bound
//! ```
//!
//! Every access is `Relaxed`; the XOR check is the only consistency guard.

use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};

use corvid_core::Move;
use tracing::warn;

use crate::error::TtError;
use crate::search::ONE_PLY;
use crate::search::score::MIN_MATE;

/// Size used when the requested table cannot be allocated.
pub const FALLBACK_MB: usize = 1;

/// What a stored score says about the true value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Bound {
    None = 0,
    Exact = 1,
    /// Failed high: true score >= stored score.
    LowerBound = 2,
    /// Failed low: true score <= stored score.
    UpperBound = 3,
}

impl Bound {
    const fn from_bits(bits: u64) -> Bound {
        match bits & 0b11 {
            1 => Bound::Exact,
            2 => Bound::LowerBound,
            3 => Bound::UpperBound,
            _ => Bound::None,
        }
    }
}

/// Convert a root-relative mate score to node-relative before storing.
#[inline]
pub fn score_to_tt(score: i32, ply: usize) -> i16 {
    let ply = ply as i32;
    let stored = if score >= MIN_MATE {
        score + ply
    } else if score <= -MIN_MATE {
        score - ply
    } else {
        score
    };
    stored as i16
}

/// Inverse of [`score_to_tt`] for the node at `ply`.
#[inline]
pub fn score_from_tt(stored: i16, ply: usize) -> i32 {
    let score = stored as i32;
    let ply = ply as i32;
    if score >= MIN_MATE {
        score - ply
    } else if score <= -MIN_MATE {
        score + ply
    } else {
        score
    }
}

/// A decoded, hash-verified entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtEntry {
    pub mv: Move,
    /// Node-relative; see [`score_from_tt`].
    pub score: i16,
    pub depth: i32,
    pub generation: u8,
    pub bound: Bound,
}

impl TtEntry {
    fn pack(self) -> u64 {
        self.mv.raw() as u64
            | ((self.score as u16 as u64) << 16)
            | ((self.depth as i16 as u16 as u64) << 32)
            | ((self.generation as u64) << 48)
            | ((self.bound as u64) << 56)
    }

    fn unpack(data: u64) -> TtEntry {
        TtEntry {
            mv: Move::from_raw(data as u16),
            score: (data >> 16) as u16 as i16,
            depth: (data >> 32) as u16 as i16 as i32,
            generation: (data >> 48) as u8,
            bound: Bound::from_bits(data >> 56),
        }
    }
}

/// Outcome of [`TranspositionTable::probe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtProbe {
    /// Set when the entry is deep enough and its bound decides the window.
    pub score: Option<i32>,
    /// Stored best move, `Move::NONE` on a miss.
    pub mv: Move,
    /// False when a stored fail-low makes a null-move search pointless.
    pub allow_null: bool,
}

impl TtProbe {
    const MISS: TtProbe = TtProbe {
        score: None,
        mv: Move::NONE,
        allow_null: true,
    };
}

struct Slot {
    key: AtomicU64,
    data: AtomicU64,
}

impl Slot {
    const fn new() -> Slot {
        Slot {
            key: AtomicU64::new(0),
            data: AtomicU64::new(0),
        }
    }
}

/// Shared single-slot, always-replace score cache.
pub struct TranspositionTable {
    slots: Box<[Slot]>,
    mask: u64,
    generation: AtomicU8,
}

impl TranspositionTable {
    /// Allocate roughly `mb` megabytes (rounded down to a power-of-two slot count).
    pub fn try_new(mb: usize) -> Result<TranspositionTable, TtError> {
        let count = slot_count::<Slot>(mb)?;
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(count)
            .map_err(|_| TtError::Allocation { mb })?;
        slots.extend((0..count).map(|_| Slot::new()));
        Ok(TranspositionTable {
            slots: slots.into_boxed_slice(),
            mask: count as u64 - 1,
            generation: AtomicU8::new(0),
        })
    }

    /// Like [`try_new`](Self::try_new), falling back to [`FALLBACK_MB`] on failure.
    pub fn new(mb: usize) -> TranspositionTable {
        match TranspositionTable::try_new(mb) {
            Ok(tt) => tt,
            Err(e) => {
                warn!(error = %e, fallback_mb = FALLBACK_MB, "using fallback hash size");
                TranspositionTable::fallback()
            }
        }
    }

    fn fallback() -> TranspositionTable {
        let count = (FALLBACK_MB << 20) / std::mem::size_of::<Slot>();
        TranspositionTable {
            slots: (0..count).map(|_| Slot::new()).collect(),
            mask: count as u64 - 1,
            generation: AtomicU8::new(0),
        }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn clear(&self) {
        for slot in self.slots.iter() {
            slot.key.store(0, Ordering::Relaxed);
            slot.data.store(0, Ordering::Relaxed);
        }
        self.generation.store(0, Ordering::Relaxed);
    }

    /// Bump the generation. Called once per root search.
    pub fn new_search(&self) {
        let next = self.generation.load(Ordering::Relaxed).wrapping_add(1);
        self.generation.store(next, Ordering::Relaxed);
    }

    pub fn generation(&self) -> u8 {
        self.generation.load(Ordering::Relaxed)
    }

    #[inline]
    fn slot(&self, hash: u64) -> &Slot {
        &self.slots[(hash & self.mask) as usize]
    }

    /// Raw verified entry for `hash`, without any window logic.
    pub fn entry(&self, hash: u64) -> Option<TtEntry> {
        let slot = self.slot(hash);
        let key = slot.key.load(Ordering::Relaxed);
        let data = slot.data.load(Ordering::Relaxed);
        if key ^ data != hash {
            return None;
        }
        let entry = TtEntry::unpack(data);
        (entry.bound != Bound::None).then_some(entry)
    }

    /// Look up `hash` for a node at `ply` searching `depth` (ply units)
    /// with window `(alpha, beta)`.
    pub fn probe(&self, hash: u64, ply: usize, depth: i32, alpha: i32, beta: i32) -> TtProbe {
        let Some(entry) = self.entry(hash) else {
            return TtProbe::MISS;
        };
        let score = score_from_tt(entry.score, ply);

        let null_depth = depth - ONE_PLY - null_reduction(depth);
        let allow_null = !(matches!(entry.bound, Bound::UpperBound | Bound::Exact)
            && entry.depth >= null_depth
            && score < beta);

        let usable = entry.depth >= depth
            && match entry.bound {
                Bound::Exact => true,
                Bound::LowerBound => score >= beta,
                Bound::UpperBound => score <= alpha,
                Bound::None => false,
            };

        TtProbe {
            score: usable.then_some(score),
            mv: entry.mv,
            allow_null,
        }
    }

    /// Overwrite the slot for `hash`.
    pub fn save(&self, hash: u64, depth: i32, ply: usize, score: i32, bound: Bound, mv: Move) {
        let data = TtEntry {
            mv,
            score: score_to_tt(score, ply),
            depth,
            generation: self.generation(),
            bound,
        }
        .pack();
        let slot = self.slot(hash);
        slot.key.store(hash ^ data, Ordering::Relaxed);
        slot.data.store(data, Ordering::Relaxed);
    }
}

impl std::fmt::Debug for TranspositionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranspositionTable")
            .field("slots", &self.slots.len())
            .field("generation", &self.generation())
            .finish()
    }
}

/// Depth taken off a null-move search at `depth`, in ply units.
#[inline]
pub fn null_reduction(depth: i32) -> i32 {
    if depth > 6 * ONE_PLY { 3 * ONE_PLY } else { 2 * ONE_PLY }
}

/// Power-of-two number of `T`-sized slots fitting in `mb` megabytes.
pub(crate) fn slot_count<T>(mb: usize) -> Result<usize, TtError> {
    if mb == 0 {
        return Err(TtError::ZeroSize(mb));
    }
    let bytes = mb.checked_mul(1 << 20).ok_or(TtError::Allocation { mb })?;
    let count = bytes / std::mem::size_of::<T>();
    // Round down to a power of two.
    Ok(1usize << (usize::BITS - 1 - count.leading_zeros()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::score::MATE;
    use corvid_core::Square;

    const HASH: u64 = 0x9E37_79B9_7F4A_7C15;

    fn e2e4() -> Move {
        Move::new(Square::E2, Square::E4)
    }

    #[test]
    fn slot_is_two_words() {
        assert_eq!(std::mem::size_of::<Slot>(), 16);
    }

    #[test]
    fn exact_entry_round_trips() {
        let tt = TranspositionTable::new(1);
        tt.save(HASH, 6, 3, 42, Bound::Exact, e2e4());
        let hit = tt.probe(HASH, 3, 6, -100, 100);
        assert_eq!(hit.score, Some(42));
        assert_eq!(hit.mv, e2e4());
    }

    #[test]
    fn colliding_hash_misses() {
        let tt = TranspositionTable::new(1);
        tt.save(HASH, 6, 0, 42, Bound::Exact, e2e4());
        let other = HASH.wrapping_add(tt.len() as u64);
        let probe = tt.probe(other, 0, 6, -100, 100);
        assert_eq!(probe, TtProbe::MISS);
    }

    #[test]
    fn shallow_entry_gives_move_but_no_score() {
        let tt = TranspositionTable::new(1);
        tt.save(HASH, 2, 0, 42, Bound::Exact, e2e4());
        let probe = tt.probe(HASH, 0, 8, -100, 100);
        assert_eq!(probe.score, None);
        assert_eq!(probe.mv, e2e4());
    }

    #[test]
    fn bounds_respect_the_window() {
        let tt = TranspositionTable::new(1);
        tt.save(HASH, 4, 0, 150, Bound::LowerBound, e2e4());
        assert_eq!(tt.probe(HASH, 0, 4, 0, 100).score, Some(150));
        assert_eq!(tt.probe(HASH, 0, 4, 0, 200).score, None);

        tt.save(HASH, 4, 0, -150, Bound::UpperBound, e2e4());
        assert_eq!(tt.probe(HASH, 0, 4, -100, 0).score, Some(-150));
        assert_eq!(tt.probe(HASH, 0, 4, -200, 0).score, None);
    }

    #[test]
    fn fail_low_entry_disables_null_move() {
        let tt = TranspositionTable::new(1);
        tt.save(HASH, 8, 0, -50, Bound::UpperBound, Move::NONE);
        assert!(!tt.probe(HASH, 0, 8, 0, 10).allow_null);

        tt.save(HASH, 8, 0, 50, Bound::LowerBound, Move::NONE);
        assert!(tt.probe(HASH, 0, 8, 0, 10).allow_null);
    }

    #[test]
    fn mate_scores_are_stored_node_relative() {
        // Mate found at ply 5, three plies below the node at ply 2.
        let score = MATE - 5;
        assert_eq!(score_from_tt(score_to_tt(score, 2), 2), score);
        // Reached again at ply 4 the same mate is two plies further away.
        assert_eq!(score_from_tt(score_to_tt(score, 2), 4), score - 2);
        assert_eq!(score_from_tt(score_to_tt(-score, 2), 4), -score + 2);
        assert_eq!(score_from_tt(score_to_tt(123, 9), 1), 123);
    }

    #[test]
    fn negative_depth_round_trips() {
        let entry = TtEntry {
            mv: e2e4(),
            score: -7,
            depth: -2,
            generation: 200,
            bound: Bound::UpperBound,
        };
        assert_eq!(TtEntry::unpack(entry.pack()), entry);
    }

    #[test]
    fn torn_write_reads_as_miss() {
        let tt = TranspositionTable::new(1);
        tt.save(HASH, 6, 0, 42, Bound::Exact, e2e4());
        let slot = tt.slot(HASH);
        let data = slot.data.load(Ordering::Relaxed);
        slot.data.store(data ^ (1 << 20), Ordering::Relaxed);
        assert!(tt.entry(HASH).is_none());
    }

    #[test]
    fn clear_and_generation() {
        let tt = TranspositionTable::new(1);
        tt.new_search();
        tt.save(HASH, 6, 0, 42, Bound::Exact, e2e4());
        assert_eq!(tt.entry(HASH).map(|e| e.generation), Some(1));
        tt.clear();
        assert!(tt.entry(HASH).is_none());
        assert_eq!(tt.generation(), 0);
    }

    #[test]
    fn zero_size_is_rejected() {
        assert_eq!(TranspositionTable::try_new(0).unwrap_err(), TtError::ZeroSize(0));
        assert_eq!(TranspositionTable::new(0).len(), (FALLBACK_MB << 20) / 16);
    }

    #[test]
    fn concurrent_writers_never_yield_foreign_entries() {
        use std::sync::Arc;
        let tt = Arc::new(TranspositionTable::new(1));
        std::thread::scope(|s| {
            for t in 0..4u64 {
                let tt = Arc::clone(&tt);
                s.spawn(move || {
                    for i in 0..20_000u64 {
                        let hash = (t << 56) | (i % 512);
                        tt.save(hash, t as i32, 0, t as i32, Bound::Exact, Move::NONE);
                        if let Some(e) = tt.entry(hash) {
                            assert_eq!(e.depth, t as i32);
                        }
                    }
                });
            }
        });
    }
}
