//! Iterative deepening driver and the search building blocks.

pub mod control;
pub mod heuristics;
pub mod offload;
pub mod ordering;
pub mod pv;
mod pvs;
mod root;
pub mod score;
pub mod session;
pub mod tt;

use std::sync::Arc;
use std::time::Duration;

use corvid_core::{Move, MoveList, Position, generate_moves};
use tracing::{debug, info};

use crate::config::SearchConfig;
use control::SearchControl;
use offload::OffloadPool;
use pv::reconstruct_pv;
use root::{Offload, search_root};
use score::{INFINITY, mated_in};
use session::SearchSession;
use tt::{Bound, TranspositionTable};

/// Depth granularity: one ply is this many depth units.
pub const ONE_PLY: i32 = 2;

/// Deepest iteration the driver will start, in plies.
pub const MAX_DEPTH: u32 = 64;

/// Size of ply-indexed tables.
pub const MAX_PLY: usize = 128;

/// One `info` line worth of progress.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchInfo {
    pub depth: u32,
    pub score: i32,
    /// `Exact` for a completed iteration; otherwise the aspiration window
    /// it failed against.
    pub bound: Bound,
    pub elapsed: Duration,
    pub nodes: u64,
    pub pv: Vec<Move>,
}

impl SearchInfo {
    pub fn nps(&self) -> u64 {
        let ms = self.elapsed.as_millis().max(1);
        (self.nodes as u128 * 1000 / ms) as u64
    }
}

/// Outcome of [`Searcher::search`]: the last accepted iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// `Move::NONE` when the root has no legal move.
    pub best_move: Move,
    pub ponder_move: Option<Move>,
    pub pv: Vec<Move>,
    pub score: i32,
    /// Zero when no iteration completed.
    pub depth: u32,
    pub nodes: u64,
}

/// Owns the shared transposition table and the optional offload pool.
pub struct Searcher {
    tt: Arc<TranspositionTable>,
    config: SearchConfig,
    offload: Option<OffloadPool>,
}

impl Searcher {
    pub fn new(hash_mb: usize, config: SearchConfig) -> Searcher {
        let tt = Arc::new(TranspositionTable::new(hash_mb));
        let offload = spawn_offload(config.workers, &tt);
        Searcher { tt, config, offload }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Replace the settings, respawning offload workers if their count changed.
    pub fn set_config(&mut self, config: SearchConfig) {
        if config.workers != self.config.workers {
            self.offload = None;
            self.offload = spawn_offload(config.workers, &self.tt);
        }
        self.config = config;
    }

    pub fn tt(&self) -> &TranspositionTable {
        &self.tt
    }

    pub fn clear_tt(&self) {
        self.tt.clear();
    }

    /// Reallocate the table. Offload workers are rebuilt to share the new one.
    pub fn resize_tt(&mut self, mb: usize) {
        self.offload = None;
        self.tt = Arc::new(TranspositionTable::new(mb));
        self.offload = spawn_offload(self.config.workers, &self.tt);
    }

    /// Iterative deepening from `pos` up to `max_depth` plies (default and
    /// ceiling [`MAX_DEPTH`]).
    ///
    /// `on_info` sees every iteration, including aspiration failures. The
    /// result always comes from the last iteration whose score fell inside
    /// its window; a stop mid-iteration discards that iteration.
    ///
    /// With offload workers running, the control's stop flag is raised on
    /// return so that scouts still queued from an early root cutoff unwind.
    pub fn search<F>(
        &mut self,
        pos: &Position,
        max_depth: Option<u32>,
        control: &SearchControl,
        mut on_info: F,
    ) -> SearchResult
    where
        F: FnMut(&SearchInfo),
    {
        self.tt.new_search();
        let mut session = SearchSession::new(&self.tt, control, self.config.draw_score);
        let mut root = pos.clone();
        let max_depth = max_depth.unwrap_or(MAX_DEPTH).clamp(1, MAX_DEPTH);

        let Some(fallback) = first_legal_move(&mut root) else {
            let score = if root.in_check(root.side_to_move()) { mated_in(0) } else { self.config.draw_score };
            debug!(score, "no legal moves at root");
            return SearchResult {
                best_move: Move::NONE,
                ponder_move: None,
                pv: Vec::new(),
                score,
                depth: 0,
                nodes: 0,
            };
        };

        let mut result = SearchResult {
            best_move: fallback,
            ponder_move: None,
            pv: vec![fallback],
            score: 0,
            depth: 0,
            nodes: 0,
        };

        let window = self.config.aspiration_window;
        let (mut alpha, mut beta) = (-INFINITY, INFINITY);
        let mut depth = 1;

        loop {
            let offload = self.offload.as_mut().map(|pool| Offload {
                pool,
                timeout: self.config.offload_timeout,
            });
            let score = search_root(&mut session, &mut root, depth as i32 * ONE_PLY, alpha, beta, offload);
            if control.is_stopped() {
                debug!(depth, "iteration abandoned");
                break;
            }

            let bound = if score <= alpha {
                Bound::UpperBound
            } else if score >= beta {
                Bound::LowerBound
            } else {
                Bound::Exact
            };
            let pv = reconstruct_pv(&self.tt, &root, session.root_best);
            on_info(&SearchInfo {
                depth,
                score,
                bound,
                elapsed: control.elapsed(),
                nodes: session.nodes,
                pv: pv.clone(),
            });

            match bound {
                Bound::UpperBound => {
                    alpha = -INFINITY;
                    continue;
                }
                Bound::LowerBound => {
                    beta = INFINITY;
                    continue;
                }
                _ => {}
            }

            result = SearchResult {
                best_move: pv.first().copied().unwrap_or(session.root_best),
                ponder_move: pv.get(1).copied(),
                pv,
                score,
                depth,
                nodes: session.nodes,
            };

            if depth >= max_depth || control.past_fraction(self.config.stop_fraction) {
                break;
            }
            if depth >= 4 {
                alpha = score - window;
                beta = score + window;
            }
            depth += 1;
        }

        result.nodes = session.nodes;
        if self.offload.is_some() {
            control.stop();
        }
        info!(
            depth = result.depth,
            score = result.score,
            nodes = result.nodes,
            best = %result.best_move,
            "search finished"
        );
        result
    }
}

impl std::fmt::Debug for Searcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Searcher")
            .field("tt", &self.tt)
            .field("config", &self.config)
            .field("offload", &self.offload)
            .finish()
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Searcher::new(16, SearchConfig::default())
    }
}

fn spawn_offload(workers: usize, tt: &Arc<TranspositionTable>) -> Option<OffloadPool> {
    (workers > 0).then(|| OffloadPool::new(workers, Arc::clone(tt)))
}

fn first_legal_move(pos: &mut Position) -> Option<Move> {
    let mut list = MoveList::new();
    generate_moves(pos, &mut list);
    list.iter().map(|sm| sm.mv).find(|&mv| {
        let legal = pos.make_move(mv);
        if legal {
            pos.unmake_move(mv);
        }
        legal
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;

    use super::*;
    use score::MATE;

    fn control() -> SearchControl {
        SearchControl::infinite(Arc::new(AtomicBool::new(false)))
    }

    fn search(fen: &str, depth: u32) -> SearchResult {
        let pos: Position = fen.parse().unwrap();
        Searcher::new(1, SearchConfig::default()).search(&pos, Some(depth), &control(), |_| {})
    }

    #[test]
    fn depth_one_returns_a_legal_move() {
        let result = search(corvid_core::STARTING_FEN, 1);
        let mut pos = Position::startpos();
        assert!(pos.make_move(result.best_move));
        assert_eq!(result.depth, 1);
    }

    #[test]
    fn no_legal_moves_yields_none() {
        let mated = search("7k/6Q1/5K2/8/8/8/8/8 b - - 0 1", 4);
        assert!(mated.best_move.is_none());
        assert_eq!(mated.score, -MATE);

        let stalemate = search("k7/2K5/1Q6/8/8/8/8/8 b - - 0 1", 4);
        assert!(stalemate.best_move.is_none());
        assert_eq!(stalemate.score, 0);
    }

    #[test]
    fn every_iteration_is_reported() {
        let pos = Position::startpos();
        let mut depths = Vec::new();
        let mut searcher = Searcher::new(1, SearchConfig::default());
        let result = searcher.search(&pos, Some(5), &control(), |info| {
            if info.bound == Bound::Exact {
                depths.push(info.depth);
            }
            assert!(!info.pv.is_empty());
        });
        assert_eq!(depths, vec![1, 2, 3, 4, 5]);
        assert_eq!(result.pv.first(), Some(&result.best_move));
    }

    #[test]
    fn stopped_before_start_uses_first_legal_move() {
        let control = control();
        control.stop();
        let pos = Position::startpos();
        let result = Searcher::new(1, SearchConfig::default()).search(&pos, None, &control, |_| {});
        assert_eq!(result.depth, 0);
        let mut check = Position::startpos();
        assert!(check.make_move(result.best_move));
    }

    #[test]
    fn node_limit_ends_search() {
        let control = control().with_node_limit(Some(20_000));
        let pos = Position::startpos();
        let result = Searcher::new(1, SearchConfig::default()).search(&pos, None, &control, |_| {});
        assert!(result.depth >= 1);
        assert!(result.depth < MAX_DEPTH);
    }

    #[test]
    fn draw_score_applies_to_stalemate_root() {
        let config = SearchConfig {
            draw_score: -30,
            ..SearchConfig::default()
        };
        let pos: Position = "k7/2K5/1Q6/8/8/8/8/8 b - - 0 1".parse().unwrap();
        let result = Searcher::new(1, config).search(&pos, Some(3), &control(), |_| {});
        assert_eq!(result.score, -30);
    }

    #[test]
    fn info_nps_handles_zero_elapsed() {
        let info = SearchInfo {
            depth: 1,
            score: 0,
            bound: Bound::Exact,
            elapsed: Duration::ZERO,
            nodes: 500,
            pv: Vec::new(),
        };
        assert_eq!(info.nps(), 500_000);
    }
}
