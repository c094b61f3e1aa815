//! Piece-square tables.
//!
//! Tables are laid out as a board seen from White's side: the first row is
//! rank 8, the last row rank 1. [`pst`] mirrors the lookup for Black.

use corvid_core::{Color, PieceKind, Square};

use crate::eval::score::{S, Score};

#[rustfmt::skip]
const PAWN_MG: [i32; 64] = [
      0,   0,   0,   0,   0,   0,   0,   0,
     60,  70,  55,  65,  65,  55,  70,  60,
     12,  18,  28,  34,  34,  28,  18,  12,
      2,   8,  12,  26,  26,  12,   8,   2,
     -4,   0,   6,  20,  20,   6,   0,  -4,
     -2,  -4,   2,   6,   6,   2,  -4,  -2,
     -4,   4,   4, -14, -14,   4,   4,  -4,
      0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const PAWN_EG: [i32; 64] = [
      0,   0,   0,   0,   0,   0,   0,   0,
    110, 105, 100,  95,  95, 100, 105, 110,
     60,  58,  50,  45,  45,  50,  58,  60,
     28,  24,  18,  14,  14,  18,  24,  28,
     12,  10,   4,   2,   2,   4,  10,  12,
      4,   6,   0,   4,   4,   0,   6,   4,
      6,   6,   8,  10,  10,   8,   6,   6,
      0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const KNIGHT_MG: [i32; 64] = [
    -90, -40, -30, -25, -25, -30, -40, -90,
    -35, -20,   6,  10,  10,   6, -20, -35,
    -20,  10,  22,  30,  30,  22,  10, -20,
    -12,   8,  20,  28,  28,  20,   8, -12,
    -14,   4,  16,  20,  20,  16,   4, -14,
    -22,  -2,  10,  12,  12,  10,  -2, -22,
    -30, -20,  -4,   2,   2,  -4, -20, -30,
    -60, -26, -30, -20, -20, -30, -26, -60,
];

#[rustfmt::skip]
const KNIGHT_EG: [i32; 64] = [
    -60, -40, -25, -20, -20, -25, -40, -60,
    -35, -18,  -6,   0,   0,  -6, -18, -35,
    -20,  -4,  10,  14,  14,  10,  -4, -20,
    -16,   2,  16,  22,  22,  16,   2, -16,
    -18,   0,  14,  20,  20,  14,   0, -18,
    -24,  -6,   4,  12,  12,   4,  -6, -24,
    -38, -20,  -8,  -2,  -2,  -8, -20, -38,
    -55, -42, -28, -22, -22, -28, -42, -55,
];

#[rustfmt::skip]
const BISHOP_MG: [i32; 64] = [
    -24, -10, -14, -18, -18, -14, -10, -24,
    -16,   0,  -4,  -6,  -6,  -4,   0, -16,
     -8,  10,  12,  10,  10,  12,  10,  -8,
     -6,   4,  10,  20,  20,  10,   4,  -6,
     -4,   6,   8,  18,  18,   8,   6,  -4,
      0,  10,  10,   8,   8,  10,  10,   0,
      2,  14,   8,   2,   2,   8,  14,   2,
    -14,  -4, -10,  -8,  -8, -10,  -4, -14,
];

#[rustfmt::skip]
const BISHOP_EG: [i32; 64] = [
    -16, -10,  -8,  -6,  -6,  -8, -10, -16,
     -8,  -2,   2,   0,   0,   2,  -2,  -8,
     -4,   4,   6,   6,   6,   6,   4,  -4,
     -2,   6,  10,  12,  12,  10,   6,  -2,
     -4,   2,   8,  10,  10,   8,   2,  -4,
     -8,   0,   4,   6,   6,   4,   0,  -8,
    -12,  -6,  -2,   2,   2,  -2,  -6, -12,
    -18, -10, -14,  -6,  -6, -14, -10, -18,
];

#[rustfmt::skip]
const ROOK_MG: [i32; 64] = [
     14,  16,  12,  20,  20,  12,  16,  14,
     20,  24,  30,  34,  34,  30,  24,  20,
      0,   8,  10,  14,  14,  10,   8,   0,
    -10,  -4,   2,   6,   6,   2,  -4, -10,
    -16, -10,  -6,   0,   0,  -6, -10, -16,
    -22, -12,  -8,  -6,  -6,  -8, -12, -22,
    -28, -14, -10,  -4,  -4, -10, -14, -28,
    -10,  -8,   0,   8,   8,   2,  -8, -10,
];

#[rustfmt::skip]
const ROOK_EG: [i32; 64] = [
     12,  12,  14,  12,  12,  14,  12,  12,
     10,  12,  12,  10,  10,  12,  12,  10,
      6,   6,   6,   4,   4,   6,   6,   6,
      4,   4,   6,   2,   2,   6,   4,   4,
      2,   4,   4,   0,   0,   4,   4,   2,
     -4,   0,  -2,  -4,  -4,  -2,   0,  -4,
     -6,  -6,  -2,  -2,  -2,  -2,  -6,  -6,
     -8,  -2,   0,  -2,  -2,   0,  -2,  -8,
];

#[rustfmt::skip]
const QUEEN_MG: [i32; 64] = [
    -20, -10,  -4,   0,   0,  -4, -10, -20,
    -16, -24,  -2,   0,   0,  -2, -24, -16,
     -8,  -4,   4,   8,   8,   4,  -4,  -8,
    -10,  -8,   0,   4,   4,   0,  -8, -10,
     -8,  -6,  -2,   2,   2,  -2,  -6,  -8,
    -10,   0,  -2,  -2,  -2,  -2,   0, -10,
    -20,  -6,   6,   2,   2,   6,  -6, -20,
    -24, -20, -12,   6,   6, -12, -20, -24,
];

#[rustfmt::skip]
const QUEEN_EG: [i32; 64] = [
    -10,  10,  12,  16,  16,  12,  10, -10,
    -12,  10,  20,  28,  28,  20,  10, -12,
    -14,   4,  16,  30,  30,  16,   4, -14,
     -2,  14,  20,  34,  34,  20,  14,  -2,
    -12,  12,  14,  26,  26,  14,  12, -12,
    -14, -20,   6,   4,   4,   6, -20, -14,
    -20, -22, -26, -14, -14, -26, -22, -20,
    -30, -24, -20, -30, -30, -20, -24, -30,
];

#[rustfmt::skip]
const KING_MG: [i32; 64] = [
    -60, -60, -60, -70, -70, -60, -60, -60,
    -50, -50, -55, -65, -65, -55, -50, -50,
    -45, -45, -50, -60, -60, -50, -45, -45,
    -40, -40, -45, -55, -55, -45, -40, -40,
    -35, -35, -40, -50, -50, -40, -35, -35,
    -20, -25, -30, -35, -35, -30, -25, -20,
     10,  10, -10, -20, -20, -10,  10,  10,
     20,  35,  12, -12,   0,  10,  35,  22,
];

#[rustfmt::skip]
const KING_EG: [i32; 64] = [
    -60, -36, -24, -14, -14, -24, -36, -60,
    -24,   8,  12,  14,  14,  12,   8, -24,
    -10,  16,  24,  26,  26,  24,  16, -10,
    -12,  16,  28,  32,  32,  28,  16, -12,
    -18,   4,  20,  28,  28,  20,   4, -18,
    -22,  -4,  10,  18,  18,  10,  -4, -22,
    -30, -12,  -2,   6,   6,  -2, -12, -30,
    -52, -36, -24, -16, -16, -24, -36, -52,
];

const TABLES: [(&[i32; 64], &[i32; 64]); 6] = [
    (&PAWN_MG, &PAWN_EG),
    (&KNIGHT_MG, &KNIGHT_EG),
    (&BISHOP_MG, &BISHOP_EG),
    (&ROOK_MG, &ROOK_EG),
    (&QUEEN_MG, &QUEEN_EG),
    (&KING_MG, &KING_EG),
];

/// Positional bonus for a `color` piece of `kind` standing on `sq`.
#[inline]
pub fn pst(color: Color, kind: PieceKind, sq: Square) -> Score {
    // Row 0 of each table is rank 8, so White reads it rank-flipped.
    let idx = match color {
        Color::White => sq.flip_rank().index(),
        Color::Black => sq.index(),
    };
    let (mg, eg) = TABLES[kind.index()];
    S(mg[idx], eg[idx])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_mirror_between_colors() {
        for kind in PieceKind::ALL {
            for sq in Square::all() {
                assert_eq!(pst(Color::White, kind, sq), pst(Color::Black, kind, sq.flip_rank()));
            }
        }
    }

    #[test]
    fn central_knight_beats_rim_knight() {
        let center = pst(Color::White, PieceKind::Knight, Square::E4);
        let rim = pst(Color::White, PieceKind::Knight, Square::A1);
        assert!(center.mg > rim.mg);
        assert!(center.eg > rim.eg);
    }

    #[test]
    fn advanced_pawns_gain_in_endgame() {
        let seventh = pst(Color::White, PieceKind::Pawn, Square::D7);
        let second = pst(Color::White, PieceKind::Pawn, Square::D2);
        assert!(seventh.eg > second.eg);
        let black_second = pst(Color::Black, PieceKind::Pawn, Square::D2);
        assert_eq!(black_second, seventh);
    }
}
