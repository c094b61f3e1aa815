//! FEN parsing and serialization.

use std::fmt;
use std::str::FromStr;

use crate::attacks::pawn_attacks;
use crate::castling::CastleRights;
use crate::error::FenError;
use crate::piece::{Color, Piece, PieceKind};
use crate::position::Position;
use crate::square::Square;

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl FromStr for Position {
    type Err = FenError;

    /// Parses a FEN record. The two move counters may be omitted.
    fn from_str(fen: &str) -> Result<Position, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if !(4..=6).contains(&fields.len()) {
            return Err(FenError::FieldCount(fields.len()));
        }

        let mut pos = Position::empty();

        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::RankCount(ranks.len()));
        }
        for (row, text) in ranks.iter().enumerate() {
            let rank = 7 - row as u8;
            let mut file = 0u8;
            for c in text.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as u8;
                    continue;
                }
                let piece = Piece::from_fen_char(c).ok_or(FenError::Piece(c))?;
                let sq = Square::from_coords(file, rank).ok_or(FenError::RankLength {
                    rank: row,
                    squares: file as usize + 1,
                })?;
                pos.put(sq, piece);
                file += 1;
            }
            if file != 8 {
                return Err(FenError::RankLength {
                    rank: row,
                    squares: file as usize,
                });
            }
        }

        let side = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::SideToMove(other.to_string())),
        };
        pos.set_side(side);
        pos.set_castling(CastleRights::from_fen(fields[2])?);

        let en_passant = match fields[3] {
            "-" => None,
            text => match Square::parse(text) {
                Some(sq) if sq.rank() == 2 || sq.rank() == 5 => Some(sq),
                _ => return Err(FenError::EnPassant(text.to_string())),
            },
        };
        // Only a capturable en-passant square is part of the position's identity.
        let en_passant = en_passant
            .filter(|&sq| (pawn_attacks(!side, sq) & pos.pieces_of(side, PieceKind::Pawn)).any());
        pos.set_en_passant(en_passant);

        let counter = |idx: usize, field: &'static str, default: u16| -> Result<u16, FenError> {
            match fields.get(idx) {
                None => Ok(default),
                Some(text) => text.parse().map_err(|_| FenError::Counter {
                    field,
                    value: text.to_string(),
                }),
            }
        };
        let fifty = counter(4, "halfmove clock", 0)?;
        let fullmove = counter(5, "fullmove number", 1)?;
        pos.set_counters(fifty, fullmove);

        for (color, name) in [(Color::White, "white"), (Color::Black, "black")] {
            let count = pos.pieces_of(color, PieceKind::King).count();
            if count != 1 {
                return Err(FenError::KingCount { color: name, count });
            }
        }
        if pos.in_check(!side) {
            return Err(FenError::OpponentInCheck);
        }

        Ok(pos)
    }
}

impl fmt::Display for Position {
    /// Writes the position as a FEN record.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8u8).rev() {
            let mut empty = 0;
            for file in 0..8u8 {
                let piece = Square::from_coords(file, rank).and_then(|sq| self.piece_on(sq));
                match piece {
                    Some(piece) => {
                        if empty > 0 {
                            write!(f, "{empty}")?;
                            empty = 0;
                        }
                        write!(f, "{}", piece.fen_char())?;
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                write!(f, "{empty}")?;
            }
            if rank > 0 {
                f.write_str("/")?;
            }
        }

        let side = match self.side_to_move() {
            Color::White => 'w',
            Color::Black => 'b',
        };
        write!(f, " {side} {} ", self.castling())?;
        match self.en_passant() {
            Some(sq) => write!(f, "{sq}")?,
            None => f.write_str("-")?,
        }
        write!(f, " {} {}", self.fifty_move_counter(), self.fullmove_number())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_known_positions() {
        for fen in [
            STARTING_FEN,
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3",
        ] {
            let pos: Position = fen.parse().unwrap();
            assert_eq!(pos.to_string(), fen);
            assert_eq!(pos.hash(), pos.compute_hash());
        }
    }

    #[test]
    fn missing_counters_default() {
        let pos: Position = "4k3/8/8/8/8/8/8/4K3 b - -".parse().unwrap();
        assert_eq!(pos.fifty_move_counter(), 0);
        assert_eq!(pos.fullmove_number(), 1);
    }

    #[test]
    fn rejects_malformed_records() {
        assert_eq!("8/8 w - -".parse::<Position>().unwrap_err(), FenError::RankCount(2));
        assert!(matches!(
            "4k3/8/8/8/8/8/8/4K3 x - - 0 1".parse::<Position>(),
            Err(FenError::SideToMove(_))
        ));
        assert!(matches!(
            "4k3/8/8/8/8/8/8/4K2 w - - 0 1".parse::<Position>(),
            Err(FenError::RankLength { .. })
        ));
        assert!(matches!(
            "4k3/8/8/8/8/8/8/8 w - - 0 1".parse::<Position>(),
            Err(FenError::KingCount { .. })
        ));
        assert!(matches!(
            "4k3/8/8/8/8/8/8/4K3 w - e4 0 1".parse::<Position>(),
            Err(FenError::EnPassant(_))
        ));
    }

    #[test]
    fn rejects_side_not_to_move_in_check() {
        let result = "4k3/8/8/8/8/8/8/4R1K1 w - - 0 1".parse::<Position>();
        assert_eq!(result.unwrap_err(), FenError::OpponentInCheck);
    }
}
