//! Moves packed into 16 bits.
//!
//! ```text
//! bits  0-5   from square
//! bits  6-11  to square
//! bits 12-13  promotion piece (knight, bishop, rook, queen)
//! bits 14-15  kind (normal, promotion, en passant, castling)
//! ```
//!
//! The packed form is what the transposition table stores.

use std::fmt;

use crate::error::MoveParseError;
use crate::movegen::{MoveList, generate_moves};
use crate::piece::PieceKind;
use crate::position::Position;
use crate::square::Square;

const TO_SHIFT: u16 = 6;
const PROMO_SHIFT: u16 = 12;
const KIND_SHIFT: u16 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    Normal = 0,
    Promotion = 1,
    EnPassant = 2,
    Castling = 3,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Move(u16);

impl Move {
    /// The "no move" sentinel. A1-A1 is never generated.
    pub const NONE: Move = Move(0);

    #[inline]
    const fn pack(from: Square, to: Square, promo: u16, kind: MoveKind) -> Move {
        Move(
            from.index() as u16
                | (to.index() as u16) << TO_SHIFT
                | promo << PROMO_SHIFT
                | (kind as u16) << KIND_SHIFT,
        )
    }

    #[inline]
    pub const fn new(from: Square, to: Square) -> Move {
        Move::pack(from, to, 0, MoveKind::Normal)
    }

    /// `promo` must be a knight, bishop, rook or queen.
    #[inline]
    pub const fn promotion(from: Square, to: Square, promo: PieceKind) -> Move {
        debug_assert!(matches!(
            promo,
            PieceKind::Knight | PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen
        ));
        Move::pack(from, to, promo as u16 - 1, MoveKind::Promotion)
    }

    #[inline]
    pub const fn en_passant(from: Square, to: Square) -> Move {
        Move::pack(from, to, 0, MoveKind::EnPassant)
    }

    /// A castling move, encoded by the king's origin and destination.
    #[inline]
    pub const fn castle(from: Square, to: Square) -> Move {
        Move::pack(from, to, 0, MoveKind::Castling)
    }

    #[inline]
    pub const fn from(self) -> Square {
        Square::from_index_unchecked((self.0 & 0x3F) as u8)
    }

    #[inline]
    pub const fn to(self) -> Square {
        Square::from_index_unchecked(((self.0 >> TO_SHIFT) & 0x3F) as u8)
    }

    #[inline]
    pub const fn kind(self) -> MoveKind {
        match self.0 >> KIND_SHIFT {
            0 => MoveKind::Normal,
            1 => MoveKind::Promotion,
            2 => MoveKind::EnPassant,
            _ => MoveKind::Castling,
        }
    }

    /// The promoted-to piece, if this is a promotion.
    #[inline]
    pub const fn promoted(self) -> Option<PieceKind> {
        if !matches!(self.kind(), MoveKind::Promotion) {
            return None;
        }
        Some(match (self.0 >> PROMO_SHIFT) & 3 {
            0 => PieceKind::Knight,
            1 => PieceKind::Bishop,
            2 => PieceKind::Rook,
            _ => PieceKind::Queen,
        })
    }

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }

    #[inline]
    pub const fn from_raw(raw: u16) -> Move {
        Move(raw)
    }

    /// Resolve coordinate notation (`e2e4`, `e7e8q`) against the
    /// pseudolegal moves of `pos`, rejecting moves that leave the king in check.
    pub fn parse(text: &str, pos: &Position) -> Result<Move, MoveParseError> {
        let syntax = || MoveParseError::Syntax(text.to_string());
        if !(4..=5).contains(&text.len()) || !text.is_ascii() {
            return Err(syntax());
        }
        let from = Square::parse(&text[0..2]).ok_or_else(syntax)?;
        let to = Square::parse(&text[2..4]).ok_or_else(syntax)?;
        let promo = match text[4..].chars().next() {
            None => None,
            Some(c) => match PieceKind::from_letter(c) {
                Some(kind @ (PieceKind::Knight | PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen)) => {
                    Some(kind)
                }
                _ => return Err(syntax()),
            },
        };

        let mut list = MoveList::new();
        generate_moves(pos, &mut list);
        let found = list
            .iter()
            .map(|sm| sm.mv)
            .find(|mv| mv.from() == from && mv.to() == to && mv.promoted() == promo)
            .ok_or_else(|| MoveParseError::Illegal(text.to_string()))?;

        let mut probe = pos.clone();
        if !probe.make_move(found) {
            return Err(MoveParseError::Illegal(text.to_string()));
        }
        Ok(found)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return f.write_str("0000");
        }
        write!(f, "{}{}", self.from(), self.to())?;
        if let Some(kind) = self.promoted() {
            write!(f, "{}", kind.letter())?;
        }
        Ok(())
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({self} {:?})", self.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fits_in_two_bytes() {
        assert_eq!(std::mem::size_of::<Move>(), 2);
    }

    #[test]
    fn fields_survive_packing() {
        let mv = Move::promotion(Square::G7, Square::H8, PieceKind::Knight);
        assert_eq!(mv.from(), Square::G7);
        assert_eq!(mv.to(), Square::H8);
        assert_eq!(mv.kind(), MoveKind::Promotion);
        assert_eq!(mv.promoted(), Some(PieceKind::Knight));
        assert_eq!(Move::from_raw(mv.raw()), mv);
        assert_eq!(mv.to_string(), "g7h8n");
    }

    #[test]
    fn sentinel_renders_as_zeros() {
        assert!(Move::NONE.is_none());
        assert_eq!(Move::NONE.to_string(), "0000");
        assert!(!Move::new(Square::E2, Square::E4).is_none());
    }

    #[test]
    fn parse_resolves_special_kinds() {
        let pos: Position = "r3k2r/8/8/3pP3/8/8/8/R3K2R w KQkq d6 0 1".parse().unwrap();
        assert_eq!(Move::parse("e1g1", &pos).unwrap().kind(), MoveKind::Castling);
        assert_eq!(Move::parse("e5d6", &pos).unwrap().kind(), MoveKind::EnPassant);
        assert_eq!(Move::parse("a1a8", &pos).unwrap().kind(), MoveKind::Normal);
    }

    #[test]
    fn parse_rejects_bad_input() {
        let pos = Position::startpos();
        assert!(matches!(Move::parse("e2e5", &pos), Err(MoveParseError::Illegal(_))));
        assert!(matches!(Move::parse("zz", &pos), Err(MoveParseError::Syntax(_))));
        assert!(matches!(Move::parse("e7e8x", &pos), Err(MoveParseError::Syntax(_))));
    }
}
