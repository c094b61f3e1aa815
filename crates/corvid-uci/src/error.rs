//! UCI protocol errors.

use corvid_core::{FenError, MoveParseError};

/// Errors raised while reading and interpreting UCI input.
#[derive(Debug, thiserror::Error)]
pub enum UciError {
    /// `position` without `startpos` or `fen`.
    #[error("malformed position command: missing startpos or fen keyword")]
    MalformedPosition,

    #[error("invalid FEN \"{fen}\": {source}")]
    InvalidFen {
        fen: String,
        #[source]
        source: FenError,
    },

    /// A move after `moves` that is malformed or illegal where it is played.
    #[error("invalid move {uci_move}: {source}")]
    InvalidMove {
        uci_move: String,
        #[source]
        source: MoveParseError,
    },

    #[error("missing value for {param}")]
    MissingGoValue { param: String },

    #[error("invalid value for {param}: {value}")]
    InvalidGoValue { param: String, value: String },

    /// `setoption` without a `name` token.
    #[error("malformed setoption command")]
    MalformedOption,

    #[error("unknown option: {name}")]
    UnknownOption { name: String },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}
