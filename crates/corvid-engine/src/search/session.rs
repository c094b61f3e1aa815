//! Per-search mutable state.

use corvid_core::Move;

use crate::search::control::SearchControl;
use crate::search::heuristics::{HistoryTable, KillerTable};
use crate::search::tt::TranspositionTable;

/// Nodes between two polls of the clock and input.
pub const POLL_INTERVAL: u32 = 4096;

/// Everything one search mutates, passed by reference down the recursion.
///
/// A fresh session is built for every `go`, so killers and history never
/// leak from one search into the next.
pub struct SearchSession<'a> {
    pub(crate) tt: &'a TranspositionTable,
    pub(crate) control: &'a SearchControl,
    pub(crate) killers: KillerTable,
    pub(crate) history: HistoryTable,
    pub(crate) nodes: u64,
    pub(crate) draw_score: i32,
    /// Best root move of the current iteration.
    pub(crate) root_best: Move,
    countdown: u32,
}

impl<'a> SearchSession<'a> {
    pub fn new(tt: &'a TranspositionTable, control: &'a SearchControl, draw_score: i32) -> SearchSession<'a> {
        SearchSession {
            tt,
            control,
            killers: KillerTable::new(),
            history: HistoryTable::new(),
            nodes: 0,
            draw_score,
            root_best: Move::NONE,
            countdown: POLL_INTERVAL,
        }
    }

    /// Count down one call; poll the control when the countdown expires.
    /// Returns whether the search must unwind.
    #[inline]
    pub(crate) fn checkpoint(&mut self) -> bool {
        self.countdown -= 1;
        if self.countdown == 0 {
            self.countdown = POLL_INTERVAL;
            return self.control.poll(self.nodes);
        }
        self.control.is_stopped()
    }

    #[inline]
    pub(crate) fn stopped(&self) -> bool {
        self.control.is_stopped()
    }

    pub fn nodes(&self) -> u64 {
        self.nodes
    }
}
