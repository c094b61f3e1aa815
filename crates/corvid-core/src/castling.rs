//! Castling rights as a 4-bit set.

use std::fmt;

use crate::error::FenError;
use crate::piece::Color;
use crate::square::Square;

/// Bit 0 = white short, 1 = white long, 2 = black short, 3 = black long.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastleRights(u8);

impl CastleRights {
    pub const NONE: CastleRights = CastleRights(0);
    pub const WHITE_SHORT: CastleRights = CastleRights(0b0001);
    pub const WHITE_LONG: CastleRights = CastleRights(0b0010);
    pub const BLACK_SHORT: CastleRights = CastleRights(0b0100);
    pub const BLACK_LONG: CastleRights = CastleRights(0b1000);
    pub const ALL: CastleRights = CastleRights(0b1111);

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn contains(self, other: CastleRights) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn union(self, other: CastleRights) -> CastleRights {
        CastleRights(self.0 | other.0)
    }

    /// Rights that survive a move touching `from` and `to`.
    #[inline]
    pub const fn after_move(self, from: Square, to: Square) -> CastleRights {
        CastleRights(self.0 & KEEP[from.index()] & KEEP[to.index()])
    }

    pub const fn short(color: Color) -> CastleRights {
        match color {
            Color::White => Self::WHITE_SHORT,
            Color::Black => Self::BLACK_SHORT,
        }
    }

    pub const fn long(color: Color) -> CastleRights {
        match color {
            Color::White => Self::WHITE_LONG,
            Color::Black => Self::BLACK_LONG,
        }
    }

    pub fn from_fen(field: &str) -> Result<CastleRights, FenError> {
        if field == "-" {
            return Ok(CastleRights::NONE);
        }
        field.chars().try_fold(CastleRights::NONE, |acc, c| {
            let flag = match c {
                'K' => Self::WHITE_SHORT,
                'Q' => Self::WHITE_LONG,
                'k' => Self::BLACK_SHORT,
                'q' => Self::BLACK_LONG,
                _ => return Err(FenError::Castling(c)),
            };
            Ok(acc.union(flag))
        })
    }
}

/// Per-square mask of rights kept when a piece leaves or lands on that square.
const KEEP: [u8; 64] = {
    let mut keep = [0b1111u8; 64];
    keep[Square::E1.index()] = 0b1100;
    keep[Square::H1.index()] = 0b1110;
    keep[Square::A1.index()] = 0b1101;
    keep[Square::E8.index()] = 0b0011;
    keep[Square::H8.index()] = 0b1011;
    keep[Square::A8.index()] = 0b0111;
    keep
};

impl fmt::Display for CastleRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return f.write_str("-");
        }
        for (flag, c) in [
            (Self::WHITE_SHORT, 'K'),
            (Self::WHITE_LONG, 'Q'),
            (Self::BLACK_SHORT, 'k'),
            (Self::BLACK_LONG, 'q'),
        ] {
            if self.contains(flag) {
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for CastleRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CastleRights({self})")
    }
}
