//! Zobrist keys, generated at compile time from a fixed seed.

use crate::castling::CastleRights;
use crate::piece::Piece;
use crate::square::Square;

pub(crate) struct Keys {
    pub pieces: [[u64; 64]; 12],
    pub black_to_move: u64,
    pub castling: [u64; 16],
    pub en_passant_file: [u64; 8],
}

/// SplitMix64 step: returns `(output, next_state)`.
const fn splitmix(state: u64) -> (u64, u64) {
    let next = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = next;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    (z ^ (z >> 31), next)
}

pub(crate) static KEYS: Keys = {
    let mut state = 0x636f_7276_6964_2121;
    let mut pieces = [[0u64; 64]; 12];
    let mut p = 0;
    while p < 12 {
        let mut sq = 0;
        while sq < 64 {
            let (key, next) = splitmix(state);
            pieces[p][sq] = key;
            state = next;
            sq += 1;
        }
        p += 1;
    }

    let (black_to_move, next) = splitmix(state);
    state = next;

    let mut castling = [0u64; 16];
    let mut i = 1;
    while i < 16 {
        let (key, next) = splitmix(state);
        castling[i] = key;
        state = next;
        i += 1;
    }

    let mut en_passant_file = [0u64; 8];
    let mut f = 0;
    while f < 8 {
        let (key, next) = splitmix(state);
        en_passant_file[f] = key;
        state = next;
        f += 1;
    }

    Keys {
        pieces,
        black_to_move,
        castling,
        en_passant_file,
    }
};

#[inline]
pub(crate) fn piece(piece: Piece, sq: Square) -> u64 {
    KEYS.pieces[piece.index()][sq.index()]
}

#[inline]
pub(crate) fn castling(rights: CastleRights) -> u64 {
    KEYS.castling[rights.bits() as usize]
}

#[inline]
pub(crate) fn en_passant(sq: Option<Square>) -> u64 {
    sq.map_or(0, |sq| KEYS.en_passant_file[sq.file() as usize])
}
