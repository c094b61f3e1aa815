//! Move ordering scores and the selection-sort picker.
//!
//! Score bands, highest first:
//! - TT move: `i32::MAX`
//! - captures and promotions with SEE >= 0: `GOOD_CAPTURE + see`
//! - killers at this ply, then killers from two plies up
//! - quiet moves: history score, at most `HISTORY_MAX`
//! - losing captures: their raw (negative) SEE

use corvid_core::{Move, MoveKind, MoveList, Position, ScoredMove};

use crate::search::heuristics::{HistoryTable, KillerTable};

pub const TT_MOVE: i32 = i32::MAX;
pub const GOOD_CAPTURE: i32 = 1 << 30;
const KILLER: [i32; 2] = [GOOD_CAPTURE - 1, GOOD_CAPTURE - 2];
const GRANDPARENT_KILLER: [i32; 2] = [GOOD_CAPTURE - 3, GOOD_CAPTURE - 4];

/// Captures, en passant, and promotions.
#[inline]
fn is_tactical(pos: &Position, mv: Move) -> bool {
    matches!(mv.kind(), MoveKind::Promotion | MoveKind::EnPassant) || pos.piece_on(mv.to()).is_some()
}

/// Assign main-search ordering scores to every move in `list`.
pub fn order_moves(
    pos: &Position,
    list: &mut MoveList,
    tt_move: Move,
    ply: usize,
    killers: &KillerTable,
    history: &HistoryTable,
) {
    let side = pos.side_to_move();
    let current = killers.at(ply);
    let grandparent = match ply.checked_sub(2) {
        Some(p) => killers.at(p),
        None => [Move::NONE; 2],
    };

    for sm in list.as_mut_slice() {
        let mv = sm.mv;
        sm.score = if mv == tt_move {
            TT_MOVE
        } else if is_tactical(pos, mv) {
            let see = pos.see(mv);
            if see >= 0 { GOOD_CAPTURE.saturating_add(see) } else { see }
        } else if let Some(i) = current.iter().position(|&k| k == mv) {
            KILLER[i]
        } else if let Some(i) = grandparent.iter().position(|&k| k == mv) {
            GRANDPARENT_KILLER[i]
        } else {
            history.score(side, mv)
        };
    }
}

/// Quiescence ordering: SEE only.
pub fn order_captures(pos: &Position, list: &mut MoveList) {
    for sm in list.as_mut_slice() {
        sm.score = pos.see(sm.mv);
    }
}

/// Swap the best-scored move of `list[index..]` into `index` and return it.
pub fn pick_next(list: &mut MoveList, index: usize) -> ScoredMove {
    let moves = list.as_mut_slice();
    let mut best = index;
    for j in index + 1..moves.len() {
        if moves[j].score > moves[best].score {
            best = j;
        }
    }
    moves.swap(index, best);
    moves[index]
}
