//! Killer moves and the butterfly history table.

use corvid_core::{Color, Move, MoveKind, Position};

use crate::search::MAX_PLY;

/// Ceiling on history scores; keeps quiet moves below every killer.
pub const HISTORY_MAX: i32 = 1 << 29;

/// Two quiet cutoff moves per ply, most recent first.
pub struct KillerTable {
    slots: [[Move; 2]; MAX_PLY],
}

impl KillerTable {
    pub fn new() -> KillerTable {
        KillerTable {
            slots: [[Move::NONE; 2]; MAX_PLY],
        }
    }

    /// Record a cutoff. A repeat of the primary killer leaves both slots alone.
    pub fn store(&mut self, ply: usize, mv: Move) {
        let Some(slot) = self.slots.get_mut(ply) else {
            return;
        };
        if slot[0] != mv {
            slot[1] = slot[0];
            slot[0] = mv;
        }
    }

    /// Killer slots at `ply`, or two `NONE`s past the table.
    pub fn at(&self, ply: usize) -> [Move; 2] {
        self.slots.get(ply).copied().unwrap_or([Move::NONE; 2])
    }
}

impl Default for KillerTable {
    fn default() -> Self {
        KillerTable::new()
    }
}

/// History scores indexed by `[side][from][to]`.
pub struct HistoryTable {
    table: Box<[[[i32; 64]; 64]; 2]>,
}

impl HistoryTable {
    pub fn new() -> HistoryTable {
        HistoryTable {
            table: Box::new([[[0; 64]; 64]; 2]),
        }
    }

    /// Reward a quiet move that raised alpha with `plies` of depth left.
    pub fn reward(&mut self, side: Color, mv: Move, plies: i32) {
        let bonus = plies.saturating_mul(plies);
        let entry = &mut self.table[side.index()][mv.from().index()][mv.to().index()];
        *entry = entry.saturating_add(bonus).min(HISTORY_MAX);
    }

    pub fn score(&self, side: Color, mv: Move) -> i32 {
        self.table[side.index()][mv.from().index()][mv.to().index()]
    }
}

impl Default for HistoryTable {
    fn default() -> Self {
        HistoryTable::new()
    }
}

/// Non-capturing, non-promoting moves: the ones killers and history track.
#[inline]
pub fn is_quiet(pos: &Position, mv: Move) -> bool {
    matches!(mv.kind(), MoveKind::Normal | MoveKind::Castling) && pos.piece_on(mv.to()).is_none()
}
