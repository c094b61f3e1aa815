//! Tunable search settings, adjusted through `setoption`.

use std::ops::RangeInclusive;
use std::time::Duration;

/// Accepted `Drawscore` values in centipawns.
pub const DRAW_SCORE_RANGE: RangeInclusive<i32> = -75..=75;

/// Upper bound on offload workers.
pub const MAX_WORKERS: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Score of a drawn position for the side to move. Negative values
    /// make the engine avoid draws.
    pub draw_score: i32,
    /// Half-width of the aspiration window around the previous score.
    pub aspiration_window: i32,
    /// Share of the target time after which no new iteration starts.
    pub stop_fraction: f64,
    /// Offload workers for root scouts; zero searches everything in-thread.
    pub workers: usize,
    /// How long the root waits for an offloaded scout before searching it itself.
    pub offload_timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            draw_score: 0,
            aspiration_window: 50,
            stop_fraction: 0.7,
            workers: 0,
            offload_timeout: Duration::from_secs(30),
        }
    }
}
