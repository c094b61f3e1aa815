//! Leaf-node counting for move generator verification.

use crate::movegen::{MoveList, generate_moves};
use crate::position::Position;

/// Number of legal move sequences of length `depth` from `pos`.
pub fn perft(pos: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut list = MoveList::new();
    generate_moves(pos, &mut list);

    let mut nodes = 0;
    for sm in list.iter() {
        if pos.make_move(sm.mv) {
            nodes += if depth == 1 { 1 } else { perft(pos, depth - 1) };
            pos.unmake_move(sm.mv);
        }
    }
    nodes
}

/// Per-root-move breakdown of [`perft`], sorted by move text.
pub fn divide(pos: &mut Position, depth: u32) -> Vec<(String, u64)> {
    let mut list = MoveList::new();
    generate_moves(pos, &mut list);

    let mut out = Vec::with_capacity(list.len());
    for sm in list.iter() {
        if pos.make_move(sm.mv) {
            let count = perft(pos, depth.saturating_sub(1));
            pos.unmake_move(sm.mv);
            out.push((sm.mv.to_string(), count));
        }
    }
    out.sort();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(fen: &str, depth: u32) -> u64 {
        let mut pos: Position = fen.parse().unwrap();
        perft(&mut pos, depth)
    }

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    const ENDGAME: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
    const PROMOTIONS: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
    const TALKCHESS: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";

    #[test]
    fn startpos_depths_one_to_four() {
        let mut pos = Position::startpos();
        assert_eq!(perft(&mut pos, 1), 20);
        assert_eq!(perft(&mut pos, 2), 400);
        assert_eq!(perft(&mut pos, 3), 8_902);
        assert_eq!(perft(&mut pos, 4), 197_281);
    }

    #[test]
    #[ignore] // slow
    fn startpos_depth_five() {
        let mut pos = Position::startpos();
        assert_eq!(perft(&mut pos, 5), 4_865_609);
    }

    #[test]
    fn kiwipete() {
        assert_eq!(count(KIWIPETE, 1), 48);
        assert_eq!(count(KIWIPETE, 2), 2_039);
        assert_eq!(count(KIWIPETE, 3), 97_862);
    }

    #[test]
    fn rook_and_pawn_endgame() {
        assert_eq!(count(ENDGAME, 1), 14);
        assert_eq!(count(ENDGAME, 2), 191);
        assert_eq!(count(ENDGAME, 3), 2_812);
        assert_eq!(count(ENDGAME, 4), 43_238);
    }

    #[test]
    fn promotion_heavy() {
        assert_eq!(count(PROMOTIONS, 1), 6);
        assert_eq!(count(PROMOTIONS, 2), 264);
        assert_eq!(count(PROMOTIONS, 3), 9_467);
    }

    #[test]
    fn talkchess() {
        assert_eq!(count(TALKCHESS, 1), 44);
        assert_eq!(count(TALKCHESS, 2), 1_486);
        assert_eq!(count(TALKCHESS, 3), 62_379);
    }

    #[test]
    fn perft_leaves_the_position_intact() {
        let mut pos: Position = KIWIPETE.parse().unwrap();
        let hash = pos.hash();
        perft(&mut pos, 3);
        assert_eq!(pos.hash(), hash);
        assert_eq!(pos.to_string(), KIWIPETE);
    }

    #[test]
    fn divide_sums_to_perft() {
        let mut pos = Position::startpos();
        let parts = divide(&mut pos, 3);
        assert_eq!(parts.len(), 20);
        assert_eq!(parts.iter().map(|(_, n)| n).sum::<u64>(), 8_902);
    }
}
