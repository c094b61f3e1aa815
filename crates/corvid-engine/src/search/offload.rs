//! Offload backend: independent root scouts searched on worker threads.
//!
//! Each worker owns a job channel and a reply channel, so every handoff is
//! single-producer/single-consumer. Jobs go out round-robin. Collecting a
//! result has a deadline, and every failure is reported to the caller, who
//! then searches the move itself. Workers share the host's transposition
//! table and stop flag and nothing else.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use corvid_core::{Move, Position};
use tracing::{debug, warn};

use crate::error::OffloadError;
use crate::search::ONE_PLY;
use crate::search::control::SearchControl;
use crate::search::pvs::pvs;
use crate::search::score::INFINITY;
use crate::search::session::SearchSession;
use crate::search::tt::TranspositionTable;

/// One move to search from `position`, with the window and depth of the
/// node `position` sits at.
#[derive(Debug, Clone)]
pub struct SearchJob {
    pub position: Position,
    pub mv: Move,
    /// Depth of the parent node in ply units; the move is searched one ply less.
    pub depth: i32,
    pub alpha: i32,
    pub beta: i32,
    pub ply: usize,
    pub draw_score: i32,
}

/// Score of `mv` from the parent's side to move, plus the nodes spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobResult {
    pub mv: Move,
    pub score: i32,
    pub nodes: u64,
}

/// Receipt for a submitted job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    worker: usize,
    id: u64,
}

struct Request {
    id: u64,
    job: SearchJob,
    stop: Arc<AtomicBool>,
}

struct Reply {
    id: u64,
    result: JobResult,
}

struct Worker {
    jobs: Option<Sender<Request>>,
    replies: Receiver<Reply>,
    handle: Option<JoinHandle<()>>,
}

pub struct OffloadPool {
    workers: Vec<Worker>,
    next_worker: usize,
    next_id: u64,
}

impl OffloadPool {
    /// Spawn `count` workers sharing `tt`. Workers that fail to spawn are
    /// logged and left out.
    pub fn new(count: usize, tt: Arc<TranspositionTable>) -> OffloadPool {
        let mut workers = Vec::with_capacity(count);
        for index in 0..count {
            let (job_tx, job_rx) = mpsc::channel::<Request>();
            let (reply_tx, reply_rx) = mpsc::channel::<Reply>();
            let tt = Arc::clone(&tt);
            let spawned = thread::Builder::new()
                .name(format!("corvid-offload-{index}"))
                .spawn(move || worker_loop(index, &tt, job_rx, reply_tx));
            match spawned {
                Ok(handle) => workers.push(Worker {
                    jobs: Some(job_tx),
                    replies: reply_rx,
                    handle: Some(handle),
                }),
                Err(e) => warn!(worker = index, error = %e, "failed to spawn offload worker"),
            }
        }
        debug!(workers = workers.len(), "offload pool ready");
        OffloadPool {
            workers,
            next_worker: 0,
            next_id: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Queue `job` on the next worker in turn. The worker gives up early
    /// once `stop` is set.
    pub fn submit(&mut self, job: SearchJob, stop: Arc<AtomicBool>) -> Result<Ticket, OffloadError> {
        if self.workers.is_empty() {
            return Err(OffloadError::NoWorkers);
        }
        let worker = self.next_worker;
        self.next_worker = (self.next_worker + 1) % self.workers.len();
        let id = self.next_id;
        self.next_id += 1;

        let sender = self.workers[worker]
            .jobs
            .as_ref()
            .ok_or(OffloadError::WorkerGone(worker))?;
        sender
            .send(Request { id, job, stop })
            .map_err(|_| OffloadError::WorkerGone(worker))?;
        Ok(Ticket { worker, id })
    }

    /// Wait up to `timeout` for the result of `ticket`. Replies to earlier
    /// tickets that were abandoned are skipped.
    pub fn collect(&mut self, ticket: Ticket, timeout: Duration) -> Result<JobResult, OffloadError> {
        let worker = self
            .workers
            .get(ticket.worker)
            .ok_or(OffloadError::WorkerGone(ticket.worker))?;
        let deadline = Instant::now() + timeout;
        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            match worker.replies.recv_timeout(left) {
                Ok(reply) if reply.id == ticket.id => return Ok(reply.result),
                Ok(reply) => debug!(stale = reply.id, wanted = ticket.id, "dropping stale offload reply"),
                Err(RecvTimeoutError::Timeout) => {
                    return Err(OffloadError::Timeout {
                        worker: ticket.worker,
                        millis: timeout.as_millis(),
                    });
                }
                Err(RecvTimeoutError::Disconnected) => return Err(OffloadError::WorkerGone(ticket.worker)),
            }
        }
    }
}

impl Drop for OffloadPool {
    fn drop(&mut self) {
        // Closing the job channels ends each worker loop.
        for worker in &mut self.workers {
            worker.jobs.take();
        }
        for worker in &mut self.workers {
            if let Some(handle) = worker.handle.take()
                && handle.join().is_err()
            {
                warn!("offload worker panicked");
            }
        }
    }
}

impl std::fmt::Debug for OffloadPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OffloadPool")
            .field("workers", &self.workers.len())
            .finish()
    }
}

fn worker_loop(index: usize, tt: &TranspositionTable, jobs: Receiver<Request>, replies: Sender<Reply>) {
    for Request { id, job, stop } in jobs {
        let control = SearchControl::infinite(stop);
        let mut session = SearchSession::new(tt, &control, job.draw_score);
        let result = run_job(&mut session, job);
        if replies.send(Reply { id, result }).is_err() {
            break;
        }
    }
    debug!(worker = index, "offload worker exiting");
}

/// Search one job with a private session.
pub(crate) fn run_job(s: &mut SearchSession<'_>, job: SearchJob) -> JobResult {
    let SearchJob {
        mut position,
        mv,
        depth,
        alpha,
        beta,
        ply,
        ..
    } = job;
    let score = if position.make_move(mv) {
        s.nodes += 1;
        -pvs(s, &mut position, ply + 1, depth - ONE_PLY, -beta, -alpha, true)
    } else {
        -INFINITY
    };
    JobResult {
        mv,
        score,
        nodes: s.nodes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::score::MATE;

    const SCHOLAR: &str = "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4";

    fn job(text: &str, alpha: i32, beta: i32) -> SearchJob {
        let position: Position = SCHOLAR.parse().unwrap();
        let mv = Move::parse(text, &position).unwrap();
        SearchJob {
            position,
            mv,
            depth: 2 * ONE_PLY,
            alpha,
            beta,
            ply: 0,
            draw_score: 0,
        }
    }

    fn flag() -> Arc<AtomicBool> {
        Arc::new(AtomicBool::new(false))
    }

    #[test]
    fn empty_pool_reports_no_workers() {
        let mut pool = OffloadPool::new(0, Arc::new(TranspositionTable::new(1)));
        assert!(pool.is_empty());
        let err = pool.submit(job("h5f7", -INFINITY, INFINITY), flag()).unwrap_err();
        assert_eq!(err, OffloadError::NoWorkers);
    }

    #[test]
    fn worker_scores_mating_move() {
        let mut pool = OffloadPool::new(1, Arc::new(TranspositionTable::new(1)));
        let ticket = pool.submit(job("h5f7", -INFINITY, INFINITY), flag()).unwrap();
        let result = pool.collect(ticket, Duration::from_secs(30)).unwrap();
        assert_eq!(result.mv.to_string(), "h5f7");
        assert_eq!(result.score, MATE - 1);
        assert!(result.nodes > 0);
    }

    #[test]
    fn results_match_tickets_across_workers() {
        let mut pool = OffloadPool::new(2, Arc::new(TranspositionTable::new(1)));
        let moves = ["h5f7", "a2a3", "c4f7", "h5h4"];
        let tickets: Vec<_> = moves
            .iter()
            .map(|m| pool.submit(job(m, -INFINITY, INFINITY), flag()).unwrap())
            .collect();
        assert_ne!(tickets[0].worker, tickets[1].worker);
        for (ticket, text) in tickets.into_iter().zip(moves) {
            let result = pool.collect(ticket, Duration::from_secs(30)).unwrap();
            assert_eq!(result.mv.to_string(), text);
        }
    }

    #[test]
    fn abandoned_reply_is_skipped() {
        let mut pool = OffloadPool::new(1, Arc::new(TranspositionTable::new(1)));
        let _first = pool.submit(job("a2a3", -INFINITY, INFINITY), flag()).unwrap();
        let second = pool.submit(job("h5f7", -INFINITY, INFINITY), flag()).unwrap();
        let result = pool.collect(second, Duration::from_secs(30)).unwrap();
        assert_eq!(result.mv.to_string(), "h5f7");
    }

    #[test]
    fn zero_timeout_reports_timeout() {
        let mut pool = OffloadPool::new(1, Arc::new(TranspositionTable::new(1)));
        let stop = flag();
        let mut long = job("a2a3", -INFINITY, INFINITY);
        long.depth = 40 * ONE_PLY;
        let ticket = pool.submit(long, Arc::clone(&stop)).unwrap();
        let err = pool.collect(ticket, Duration::ZERO).unwrap_err();
        assert!(matches!(err, OffloadError::Timeout { worker: 0, .. }));
        // Let the worker unwind so the pool can be dropped.
        stop.store(true, std::sync::atomic::Ordering::Relaxed);
    }

    #[test]
    fn stopped_job_returns_promptly() {
        let mut pool = OffloadPool::new(1, Arc::new(TranspositionTable::new(1)));
        let stop = Arc::new(AtomicBool::new(true));
        let mut long = job("a2a3", -INFINITY, INFINITY);
        long.depth = 60 * ONE_PLY;
        let ticket = pool.submit(long, stop).unwrap();
        assert!(pool.collect(ticket, Duration::from_secs(30)).is_ok());
    }
}
