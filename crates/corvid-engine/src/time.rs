//! Time management: turn `go` parameters into a [`SearchControl`].

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use corvid_core::Color;

use crate::search::control::SearchControl;

/// Moves assumed left in the game when the GUI sends no `movestogo`.
pub const DEFAULT_MOVES_TO_GO: u32 = 30;

/// Never plan to spend more than this share of the remaining clock on one move.
const MAX_SHARE: f64 = 0.5;

/// Held back from the clock for protocol and scheduling latency.
const OVERHEAD_MS: u64 = 10;

/// Search limits carried by a `go` command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoParams {
    pub wtime: Option<Duration>,
    pub btime: Option<Duration>,
    pub winc: Option<Duration>,
    pub binc: Option<Duration>,
    pub movestogo: Option<u32>,
    pub movetime: Option<Duration>,
    pub depth: Option<u32>,
    pub nodes: Option<u64>,
    pub infinite: bool,
    pub ponder: bool,
}

/// Target time for one move on a running clock:
/// `remaining / movestogo + 3/4 increment`, capped at half the usable clock.
pub fn target_time(remaining: Duration, increment: Duration, moves_to_go: Option<u32>) -> Duration {
    let usable = remaining.saturating_sub(Duration::from_millis(OVERHEAD_MS));
    if usable.is_zero() {
        return Duration::from_millis(1);
    }
    let mtg = moves_to_go.unwrap_or(DEFAULT_MOVES_TO_GO).max(1);
    let target = usable / mtg + increment * 3 / 4;
    target
        .min(usable.mul_f64(MAX_SHARE))
        .max(Duration::from_millis(1))
}

/// Build the control for a search. `ponder` keeps the clock off until
/// `ponderhit`; `infinite` and depth/node-only searches have no clock.
pub fn limits_from_go(params: &GoParams, side: Color, stopped: Arc<AtomicBool>) -> SearchControl {
    let (remaining, increment) = match side {
        Color::White => (params.wtime, params.winc),
        Color::Black => (params.btime, params.binc),
    };

    let target = if params.infinite {
        None
    } else if let Some(movetime) = params.movetime {
        Some(movetime)
    } else {
        remaining.map(|rem| target_time(rem, increment.unwrap_or(Duration::ZERO), params.movestogo))
    };

    let control = match target {
        None => SearchControl::infinite(stopped),
        Some(t) if params.ponder => SearchControl::ponder(stopped, t, t),
        Some(t) => SearchControl::timed(stopped, t, t),
    };
    control.with_node_limit(params.nodes)
}
