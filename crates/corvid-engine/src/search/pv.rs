//! Principal variation read back from the transposition table.

use corvid_core::{Move, MoveList, Position, generate_moves};

use crate::search::tt::{Bound, TranspositionTable};

/// Longest line ever reconstructed.
pub const MAX_PV_LEN: usize = 63;

/// Follow stored best moves from `root`.
///
/// Past the first two plies only exact entries are trusted and the walk
/// stops at a repetition. Every move is checked against the generator and
/// for legality, so a corrupted or colliding entry only truncates the line.
/// If the line does not start with `root_best`, `[root_best]` is returned.
pub fn reconstruct_pv(tt: &TranspositionTable, root: &Position, root_best: Move) -> Vec<Move> {
    let mut pos = root.clone();
    let mut pv = Vec::new();
    let mut list = MoveList::new();

    while pv.len() < MAX_PV_LEN {
        let ply = pv.len();
        let Some(entry) = tt.entry(pos.hash()) else {
            break;
        };
        if ply >= 2 && (entry.bound != Bound::Exact || pos.repetition_draw()) {
            break;
        }
        if entry.mv.is_none() {
            break;
        }
        list.clear();
        generate_moves(&pos, &mut list);
        if !list.contains(entry.mv) || !pos.make_move(entry.mv) {
            break;
        }
        pv.push(entry.mv);
    }

    if !root_best.is_none() && pv.first() != Some(&root_best) {
        return vec![root_best];
    }
    pv
}

#[cfg(test)]
mod tests {
    use super::*;
    use corvid_core::Square;

    fn play(pos: &mut Position, text: &str) -> Move {
        let mv = Move::parse(text, pos).unwrap();
        assert!(pos.make_move(mv));
        mv
    }

    #[test]
    fn follows_exact_entries() {
        let tt = TranspositionTable::new(1);
        let root = Position::startpos();
        let mut pos = root.clone();
        let mut line = Vec::new();
        for text in ["e2e4", "e7e5", "g1f3", "b8c6"] {
            let before = pos.hash();
            let mv = play(&mut pos, text);
            tt.save(before, 4, line.len(), 10, Bound::Exact, mv);
            line.push(mv);
        }
        assert_eq!(reconstruct_pv(&tt, &root, line[0]), line);
    }

    #[test]
    fn stops_at_inexact_entry_after_two_plies() {
        let tt = TranspositionTable::new(1);
        let root = Position::startpos();
        let mut pos = root.clone();
        let bounds = [Bound::LowerBound, Bound::UpperBound, Bound::LowerBound];
        let mut line = Vec::new();
        for (text, bound) in ["d2d4", "d7d5", "c2c4"].into_iter().zip(bounds) {
            let before = pos.hash();
            let mv = play(&mut pos, text);
            tt.save(before, 4, line.len(), 10, bound, mv);
            line.push(mv);
        }
        assert_eq!(reconstruct_pv(&tt, &root, line[0]), line[..2].to_vec());
    }

    #[test]
    fn rejects_moves_that_do_not_fit_the_position() {
        let tt = TranspositionTable::new(1);
        let root = Position::startpos();
        let bogus = Move::new(Square::E4, Square::E5);
        tt.save(root.hash(), 4, 0, 0, Bound::Exact, bogus);
        let best = Move::new(Square::G1, Square::F3);
        assert_eq!(reconstruct_pv(&tt, &root, best), vec![best]);
    }

    #[test]
    fn empty_table_falls_back_to_root_best() {
        let tt = TranspositionTable::new(1);
        let best = Move::new(Square::E2, Square::E4);
        assert_eq!(reconstruct_pv(&tt, &Position::startpos(), best), vec![best]);
        assert!(reconstruct_pv(&tt, &Position::startpos(), Move::NONE).is_empty());
    }

    #[test]
    fn cyclic_line_is_bounded() {
        let tt = TranspositionTable::new(1);
        let root = Position::startpos();
        let mut pos = root.clone();
        let mut first = Move::NONE;
        for (i, text) in ["g1f3", "g8f6", "f3g1", "f6g8"].into_iter().enumerate() {
            let before = pos.hash();
            let mv = play(&mut pos, text);
            if i == 0 {
                first = mv;
            }
            tt.save(before, 4, i, 0, Bound::Exact, mv);
        }
        let pv = reconstruct_pv(&tt, &root, first);
        assert!(pv.len() <= MAX_PV_LEN);
        assert_eq!(pv.len(), 4);
    }
}
