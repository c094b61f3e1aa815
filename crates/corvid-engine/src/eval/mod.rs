//! Static evaluation: tapered material and piece-square tables.

pub mod material;
pub mod phase;
pub mod pst;
pub mod score;

use corvid_core::{Color, PieceKind, Position};

use crate::search::score::MIN_MATE;

pub use phase::{MAX_PHASE, game_phase};
pub use score::{S, Score};

/// Small bonus for having the move.
const TEMPO: i32 = 10;

/// Evaluations never come within this distance of the mate band.
const EVAL_LIMIT: i32 = MIN_MATE - 1;

/// Score `pos` from the side to move's point of view, in centipawns.
pub fn evaluate(pos: &Position) -> i32 {
    let white = side_score(pos, Color::White) - side_score(pos, Color::Black);
    let cp = white.taper(game_phase(pos));
    let relative = match pos.side_to_move() {
        Color::White => cp,
        Color::Black => -cp,
    };
    (relative + TEMPO).clamp(-EVAL_LIMIT, EVAL_LIMIT)
}

fn side_score(pos: &Position, color: Color) -> Score {
    let mut total = Score::ZERO;
    for kind in PieceKind::ALL {
        let bb = pos.pieces_of(color, kind);
        total += material::piece_value(kind) * bb.count() as i32;
        for sq in bb {
            total += pst::pst(color, kind, sq);
        }
    }
    if pos.pieces_of(color, PieceKind::Bishop).several() {
        total += material::BISHOP_PAIR;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval_fen(fen: &str) -> i32 {
        evaluate(&fen.parse::<Position>().unwrap())
    }

    #[test]
    fn startpos_is_tempo_only() {
        assert_eq!(evaluate(&Position::startpos()), TEMPO);
    }

    #[test]
    fn evaluation_is_side_relative() {
        let white = eval_fen("4k3/8/8/8/8/8/8/3QK3 w - - 0 1");
        let black = eval_fen("4k3/8/8/8/8/8/8/3QK3 b - - 0 1");
        assert!(white > 800);
        assert!(black < -800);
        assert_eq!(white - TEMPO, -(black - TEMPO));
    }

    #[test]
    fn mirrored_positions_score_equal() {
        let a = eval_fen("r3k2r/ppp2ppp/2n5/3p4/3P4/2N5/PPP2PPP/R3K2R w KQkq - 0 1");
        let b = eval_fen("r3k2r/ppp2ppp/2n5/3p4/3P4/2N5/PPP2PPP/R3K2R b KQkq - 0 1");
        assert_eq!(a, b);
    }

    #[test]
    fn bishop_pair_counts() {
        let pair = eval_fen("4k3/8/8/8/8/8/8/2B1KB2 w - - 0 1");
        let knight_bishop = eval_fen("4k3/8/8/8/8/8/8/2B1KN2 w - - 0 1");
        assert!(pair > knight_bishop);
    }

    #[test]
    fn stays_inside_mate_band() {
        let crushing = eval_fen("QQQQkQQQ/QQQQQQQQ/8/8/8/8/QQQQQQQQ/QQQQKQQQ b - - 0 1");
        assert!(crushing.abs() < MIN_MATE);
    }
}
