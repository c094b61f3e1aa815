//! Search engine for corvid: evaluation, transposition tables, principal
//! variation search, time management, and the offload job queue.

mod config;
mod error;
pub mod eval;
pub mod perft;
pub mod search;
pub mod time;

pub use config::{DRAW_SCORE_RANGE, MAX_WORKERS, SearchConfig};
pub use error::{OffloadError, TtError};
pub use eval::evaluate;
pub use perft::{PerftTable, perft_hashed};
pub use search::control::SearchControl;
pub use search::offload::{JobResult, OffloadPool, SearchJob, Ticket};
pub use search::score::{INFINITY, MATE, MIN_MATE, ReportedScore};
pub use search::tt::{Bound, TranspositionTable};
pub use search::{MAX_DEPTH, ONE_PLY, SearchInfo, SearchResult, Searcher};
pub use time::{GoParams, limits_from_go};
