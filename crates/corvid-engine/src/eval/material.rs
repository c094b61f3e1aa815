//! Piece values.

use corvid_core::PieceKind;

use crate::eval::score::{S, Score};

/// Indexed by [`PieceKind::index`]. The king carries no material.
pub const PIECE_VALUE: [Score; 6] = [
    S(90, 115),
    S(320, 295),
    S(335, 315),
    S(480, 530),
    S(960, 990),
    S(0, 0),
];

/// Bonus for holding both bishops.
pub const BISHOP_PAIR: Score = S(28, 52);

#[inline]
pub fn piece_value(kind: PieceKind) -> Score {
    PIECE_VALUE[kind.index()]
}
