//! Score constants and mate-distance helpers.

use std::fmt;

/// Score for delivering mate at the root. Mates found `n` plies deep score
/// `MATE - n`.
pub const MATE: i32 = 32_000;

/// Bound strictly outside every reachable score.
pub const INFINITY: i32 = MATE + 1;

/// Scores at or beyond this magnitude encode a forced mate.
pub const MIN_MATE: i32 = MATE - 1000;

/// Score of the side to move being mated at `ply`.
#[inline]
pub const fn mated_in(ply: usize) -> i32 {
    -MATE + ply as i32
}

#[inline]
pub const fn is_mate_score(score: i32) -> bool {
    score >= MIN_MATE || score <= -MIN_MATE
}

/// A score as the control protocol reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportedScore {
    Centipawns(i32),
    /// Moves (not plies) to mate; negative when the engine is being mated.
    Mate(i32),
}

impl ReportedScore {
    pub fn from_score(score: i32) -> ReportedScore {
        if is_mate_score(score) {
            let moves = (MATE - score.abs() + 1) / 2;
            ReportedScore::Mate(if score > 0 { moves } else { -moves })
        } else {
            ReportedScore::Centipawns(score)
        }
    }
}

impl fmt::Display for ReportedScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportedScore::Centipawns(cp) => write!(f, "cp {cp}"),
            ReportedScore::Mate(n) => write!(f, "mate {n}"),
        }
    }
}
