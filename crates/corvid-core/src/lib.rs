//! Board model for corvid: positions with make/unmake, pseudolegal move
//! generation, static exchange evaluation, and perft.

mod attacks;
mod bitboard;
mod castling;
mod error;
mod fen;
pub mod movegen;
mod moves;
pub mod perft;
mod piece;
mod position;
mod see;
mod square;
mod zobrist;

pub use attacks::{between, bishop_attacks, king_attacks, knight_attacks, pawn_attacks, queen_attacks, rook_attacks};
pub use bitboard::Bitboard;
pub use castling::CastleRights;
pub use error::{FenError, MoveParseError};
pub use fen::STARTING_FEN;
pub use movegen::{MAX_MOVES, MoveList, ScoredMove, generate_captures, generate_evasions, generate_moves};
pub use moves::{Move, MoveKind};
pub use piece::{Color, Piece, PieceKind};
pub use position::Position;
pub use see::see_value;
pub use square::Square;
