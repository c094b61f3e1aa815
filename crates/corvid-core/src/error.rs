//! Error types for position setup and move parsing.

/// Errors produced while parsing a FEN string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FenError {
    #[error("expected at least 4 FEN fields, found {0}")]
    FieldCount(usize),

    #[error("expected 8 ranks in piece placement, found {0}")]
    RankCount(usize),

    #[error("rank {rank} describes {squares} squares, expected 8")]
    RankLength { rank: usize, squares: usize },

    #[error("invalid piece character '{0}'")]
    Piece(char),

    #[error("invalid side to move \"{0}\"")]
    SideToMove(String),

    #[error("invalid castling character '{0}'")]
    Castling(char),

    #[error("invalid en passant square \"{0}\"")]
    EnPassant(String),

    #[error("invalid {field}: \"{value}\"")]
    Counter { field: &'static str, value: String },

    #[error("{color} must have exactly one king, found {count}")]
    KingCount { color: &'static str, count: u32 },

    #[error("side not to move is in check")]
    OpponentInCheck,
}

/// Errors produced while resolving a coordinate-notation move.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveParseError {
    #[error("malformed move text \"{0}\"")]
    Syntax(String),

    #[error("move {0} is not legal in this position")]
    Illegal(String),
}
