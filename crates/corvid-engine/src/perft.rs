//! Hashed perft: node counting memoized in a counting table.
//!
//! The table uses the same XOR check as the scored table: a slot stores
//! `key = hash ^ data` next to `data = count << 8 | depth`.

use std::sync::atomic::{AtomicU64, Ordering};

use corvid_core::{MoveList, Position, generate_evasions, generate_moves};
use tracing::warn;

use crate::error::TtError;
use crate::search::tt::{FALLBACK_MB, slot_count};

const DEPTH_MASK: u64 = 0xFF;

struct CountSlot {
    key: AtomicU64,
    data: AtomicU64,
}

/// Leaf counts keyed by position hash and remaining depth.
pub struct PerftTable {
    slots: Box<[CountSlot]>,
    mask: u64,
}

impl PerftTable {
    pub fn try_new(mb: usize) -> Result<PerftTable, TtError> {
        let count = slot_count::<CountSlot>(mb)?;
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(count)
            .map_err(|_| TtError::Allocation { mb })?;
        slots.extend((0..count).map(|_| CountSlot {
            key: AtomicU64::new(0),
            data: AtomicU64::new(0),
        }));
        Ok(PerftTable {
            slots: slots.into_boxed_slice(),
            mask: count as u64 - 1,
        })
    }

    pub fn new(mb: usize) -> PerftTable {
        PerftTable::try_new(mb).unwrap_or_else(|e| {
            warn!(error = %e, fallback_mb = FALLBACK_MB, "using fallback perft table size");
            // One megabyte always fits.
            PerftTable::try_new(FALLBACK_MB).unwrap_or_else(|_| PerftTable {
                slots: Box::new([]),
                mask: 0,
            })
        })
    }

    pub fn clear(&self) {
        for slot in self.slots.iter() {
            slot.key.store(0, Ordering::Relaxed);
            slot.data.store(0, Ordering::Relaxed);
        }
    }

    #[inline]
    fn slot(&self, hash: u64, depth: u32) -> Option<&CountSlot> {
        // Spread depths of the same position over different slots.
        let mixed = hash ^ (depth as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        self.slots.get((mixed & self.mask) as usize)
    }

    pub fn probe(&self, hash: u64, depth: u32) -> Option<u64> {
        let slot = self.slot(hash, depth)?;
        let key = slot.key.load(Ordering::Relaxed);
        let data = slot.data.load(Ordering::Relaxed);
        (key ^ data == hash && data & DEPTH_MASK == depth as u64 && data != 0).then_some(data >> 8)
    }

    pub fn save(&self, hash: u64, depth: u32, count: u64) {
        let Some(slot) = self.slot(hash, depth) else {
            return;
        };
        let data = (count << 8) | (depth as u64 & DEPTH_MASK);
        slot.key.store(hash ^ data, Ordering::Relaxed);
        slot.data.store(data, Ordering::Relaxed);
    }
}

impl std::fmt::Debug for PerftTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerftTable").field("slots", &self.slots.len()).finish()
    }
}

/// Same counts as [`corvid_core::perft::perft`], memoized in `table`.
pub fn perft_hashed(pos: &mut Position, depth: u32, table: &PerftTable) -> u64 {
    if depth == 0 {
        return 1;
    }
    if let Some(count) = table.probe(pos.hash(), depth) {
        return count;
    }

    let mut list = MoveList::new();
    if pos.in_check(pos.side_to_move()) {
        generate_evasions(pos, &mut list);
    } else {
        generate_moves(pos, &mut list);
    }

    let mut nodes = 0;
    for sm in list.iter() {
        if pos.make_move(sm.mv) {
            nodes += perft_hashed(pos, depth - 1, table);
            pos.unmake_move(sm.mv);
        }
    }
    table.save(pos.hash(), depth, nodes);
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use corvid_core::perft::perft;

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

    #[test]
    fn startpos_counts() {
        let table = PerftTable::new(1);
        let mut pos = Position::startpos();
        let counts: Vec<u64> = (1..=4).map(|d| perft_hashed(&mut pos, d, &table)).collect();
        assert_eq!(counts, vec![20, 400, 8902, 197_281]);
    }

    #[test]
    fn matches_plain_perft() {
        let table = PerftTable::new(1);
        let mut pos: Position = KIWIPETE.parse().unwrap();
        assert_eq!(perft_hashed(&mut pos, 3, &table), perft(&mut pos, 3));
        // Second run is served from the table.
        assert_eq!(perft_hashed(&mut pos, 3, &table), 97_862);
    }

    #[test]
    fn probe_checks_depth_and_hash() {
        let table = PerftTable::new(1);
        table.save(0xABCD, 3, 8902);
        assert_eq!(table.probe(0xABCD, 3), Some(8902));
        assert_eq!(table.probe(0xABCD, 4), None);
        assert_eq!(table.probe(0xABCE, 3), None);
        table.clear();
        assert_eq!(table.probe(0xABCD, 3), None);
    }
}
