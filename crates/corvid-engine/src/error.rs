use thiserror::Error;

/// Transposition table construction errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TtError {
    #[error("cannot allocate {mb} MB for the transposition table")]
    Allocation { mb: usize },
    #[error("transposition table size must be at least 1 MB, got {0}")]
    ZeroSize(usize),
}

/// Failures of the offload job queue. Every variant is recoverable: the
/// caller searches the move itself.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OffloadError {
    #[error("offload pool has no workers")]
    NoWorkers,
    #[error("worker {0} disconnected")]
    WorkerGone(usize),
    #[error("worker {worker} did not answer within {millis} ms")]
    Timeout { worker: usize, millis: u128 },
}
