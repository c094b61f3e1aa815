//! Game phase from remaining non-pawn material.

use corvid_core::{PieceKind, Position};

/// Phase with the full starting complement of pieces.
///
/// Weights: knight 1, bishop 1, rook 2, queen 4.
pub const MAX_PHASE: i32 = 24;

/// `MAX_PHASE` in the opening down to 0 with only kings and pawns left.
/// Promotions cannot push the value past `MAX_PHASE`.
pub fn game_phase(pos: &Position) -> i32 {
    let count = |kind| pos.pieces(kind).count() as i32;
    let phase = count(PieceKind::Knight)
        + count(PieceKind::Bishop)
        + 2 * count(PieceKind::Rook)
        + 4 * count(PieceKind::Queen);
    phase.min(MAX_PHASE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_is_full_phase() {
        assert_eq!(game_phase(&Position::startpos()), MAX_PHASE);
    }

    #[test]
    fn pawn_ending_is_zero() {
        let pos: Position = "4k3/pp6/8/8/8/8/6PP/4K3 w - - 0 1".parse().unwrap();
        assert_eq!(game_phase(&pos), 0);
    }

    #[test]
    fn queenless_middlegame() {
        let pos: Position = "rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNB1KBNR w KQkq - 0 1"
            .parse()
            .unwrap();
        assert_eq!(game_phase(&pos), 16);
    }
}
