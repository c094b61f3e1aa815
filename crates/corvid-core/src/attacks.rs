//! Attack sets for every piece kind.
//!
//! Leapers use precomputed per-square tables. Sliders use classical ray
//! tables: the nearest blocker along each ray truncates it.

use crate::bitboard::Bitboard;
use crate::piece::Color;
use crate::square::Square;

/// `(file delta, rank delta)` for the eight ray directions. The first four
/// increase the square index, the last four decrease it.
const DIRECTIONS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (-1, 1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (1, -1),
];

const ROOK_DIRS: [usize; 4] = [0, 2, 4, 6];
const BISHOP_DIRS: [usize; 4] = [1, 3, 5, 7];

const fn leaper_table(deltas: &[(i8, i8)]) -> [Bitboard; 64] {
    let mut table = [Bitboard::EMPTY; 64];
    let mut sq = 0;
    while sq < 64 {
        let file = (sq % 8) as i8;
        let rank = (sq / 8) as i8;
        let mut bits = 0u64;
        let mut i = 0;
        while i < deltas.len() {
            let f = file + deltas[i].0;
            let r = rank + deltas[i].1;
            if f >= 0 && f < 8 && r >= 0 && r < 8 {
                bits |= 1u64 << (r * 8 + f);
            }
            i += 1;
        }
        table[sq] = Bitboard::new(bits);
        sq += 1;
    }
    table
}

static KNIGHT: [Bitboard; 64] = leaper_table(&[
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
]);

static KING: [Bitboard; 64] = leaper_table(&[
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
]);

static PAWN: [[Bitboard; 64]; 2] = [
    leaper_table(&[(-1, 1), (1, 1)]),
    leaper_table(&[(-1, -1), (1, -1)]),
];

/// `RAYS[dir][sq]`: every square from `sq` to the edge along `dir`, exclusive of `sq`.
static RAYS: [[Bitboard; 64]; 8] = {
    let mut rays = [[Bitboard::EMPTY; 64]; 8];
    let mut dir = 0;
    while dir < 8 {
        let (df, dr) = DIRECTIONS[dir];
        let mut sq = 0;
        while sq < 64 {
            let mut f = (sq % 8) as i8 + df;
            let mut r = (sq / 8) as i8 + dr;
            let mut bits = 0u64;
            while f >= 0 && f < 8 && r >= 0 && r < 8 {
                bits |= 1u64 << (r * 8 + f);
                f += df;
                r += dr;
            }
            rays[dir][sq] = Bitboard::new(bits);
            sq += 1;
        }
        dir += 1;
    }
    rays
};

/// Squares strictly between two aligned squares; empty when not aligned.
static BETWEEN: [[Bitboard; 64]; 64] = {
    let mut table = [[Bitboard::EMPTY; 64]; 64];
    let mut from = 0;
    while from < 64 {
        let mut dir = 0;
        while dir < 8 {
            let (df, dr) = DIRECTIONS[dir];
            let mut f = (from % 8) as i8 + df;
            let mut r = (from / 8) as i8 + dr;
            let mut path = 0u64;
            while f >= 0 && f < 8 && r >= 0 && r < 8 {
                let to = (r * 8 + f) as usize;
                table[from][to] = Bitboard::new(path);
                path |= 1u64 << to;
                f += df;
                r += dr;
            }
            dir += 1;
        }
        from += 1;
    }
    table
};

#[inline]
fn ray_attacks(sq: Square, occupied: Bitboard, dir: usize) -> Bitboard {
    let ray = RAYS[dir][sq.index()];
    let blockers = ray & occupied;
    let nearest = if dir < 4 { blockers.first() } else { blockers.last() };
    match nearest {
        Some(blocker) => ray & !RAYS[dir][blocker.index()],
        None => ray,
    }
}

#[inline]
pub fn knight_attacks(sq: Square) -> Bitboard {
    KNIGHT[sq.index()]
}

#[inline]
pub fn king_attacks(sq: Square) -> Bitboard {
    KING[sq.index()]
}

/// Squares a pawn of `color` standing on `sq` attacks.
#[inline]
pub fn pawn_attacks(color: Color, sq: Square) -> Bitboard {
    PAWN[color.index()][sq.index()]
}

pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    ROOK_DIRS
        .iter()
        .fold(Bitboard::EMPTY, |acc, &dir| acc | ray_attacks(sq, occupied, dir))
}

pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    BISHOP_DIRS
        .iter()
        .fold(Bitboard::EMPTY, |acc, &dir| acc | ray_attacks(sq, occupied, dir))
}

#[inline]
pub fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    rook_attacks(sq, occupied) | bishop_attacks(sq, occupied)
}

#[inline]
pub fn between(a: Square, b: Square) -> Bitboard {
    BETWEEN[a.index()][b.index()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knight_counts() {
        assert_eq!(knight_attacks(Square::E4).count(), 8);
        assert_eq!(knight_attacks(Square::A1).count(), 2);
        assert_eq!(knight_attacks(Square::H8).count(), 2);
    }

    #[test]
    fn king_counts() {
        assert_eq!(king_attacks(Square::E4).count(), 8);
        assert_eq!(king_attacks(Square::A1).count(), 3);
    }

    #[test]
    fn pawn_attacks_do_not_wrap() {
        assert_eq!(pawn_attacks(Color::White, Square::A2), Square::B3.bitboard());
        assert_eq!(pawn_attacks(Color::Black, Square::H7), Square::G6.bitboard());
        assert_eq!(
            pawn_attacks(Color::White, Square::E4),
            Square::D5.bitboard() | Square::F5.bitboard()
        );
    }

    #[test]
    fn rook_on_empty_board_sees_fourteen() {
        assert_eq!(rook_attacks(Square::D4, Bitboard::EMPTY).count(), 14);
    }

    #[test]
    fn bishop_stops_at_blockers() {
        let occ = Square::F6.bitboard() | Square::B2.bitboard();
        let att = bishop_attacks(Square::D4, occ);
        assert!(att.contains(Square::F6));
        assert!(!att.contains(Square::G7));
        assert!(att.contains(Square::B2));
        assert!(!att.contains(Square::A1));
        assert!(att.contains(Square::A7));
        assert!(att.contains(Square::G1));
    }

    #[test]
    fn rook_blocked_on_both_sides_of_a_file() {
        let occ = Square::D6.bitboard() | Square::D2.bitboard();
        let att = rook_attacks(Square::D4, occ);
        assert!(att.contains(Square::D5) && att.contains(Square::D6));
        assert!(!att.contains(Square::D7));
        assert!(att.contains(Square::D3) && att.contains(Square::D2));
        assert!(!att.contains(Square::D1));
    }

    #[test]
    fn between_squares() {
        assert_eq!(between(Square::A1, Square::D4), Square::B2.bitboard() | Square::C3.bitboard());
        assert_eq!(between(Square::E1, Square::E3), Square::E2.bitboard());
        assert!(between(Square::A1, Square::B3).is_empty());
        assert!(between(Square::A1, Square::B2).is_empty());
    }
}
