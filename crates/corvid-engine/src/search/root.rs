//! Root move loop.

use std::sync::Arc;
use std::time::Duration;

use corvid_core::{Move, MoveList, Position, generate_evasions, generate_moves};
use tracing::{debug, warn};

use crate::search::ONE_PLY;
use crate::search::heuristics::is_quiet;
use crate::search::offload::{OffloadPool, SearchJob, Ticket};
use crate::search::ordering::{order_moves, pick_next};
use crate::search::pvs::{pvs, record_improvement, search_child};
use crate::search::score::{INFINITY, mated_in};
use crate::search::session::SearchSession;
use crate::search::tt::Bound;

/// Offload settings for one root search.
pub(crate) struct Offload<'p> {
    pub pool: &'p mut OffloadPool,
    pub timeout: Duration,
}

/// Search every root move at `depth` (ply units) inside `(alpha, beta)`.
///
/// Unlike interior nodes the root never takes a TT cutoff: the stored move
/// only orders the list. The best move of each improving search is kept in
/// `s.root_best`.
pub(crate) fn search_root(
    s: &mut SearchSession<'_>,
    pos: &mut Position,
    mut depth: i32,
    mut alpha: i32,
    beta: i32,
    mut offload: Option<Offload<'_>>,
) -> i32 {
    let in_check = pos.in_check(pos.side_to_move());
    if in_check {
        depth += ONE_PLY;
    }
    let hash = pos.hash();
    let tt_move = s.tt.probe(hash, 0, depth, alpha, beta).mv;

    let mut list = MoveList::new();
    if in_check {
        generate_evasions(pos, &mut list);
    } else {
        generate_moves(pos, &mut list);
    }
    order_moves(pos, &mut list, tt_move, 0, &s.killers, &s.history);
    let ordered: Vec<Move> = (0..list.len()).map(|i| pick_next(&mut list, i).mv).collect();

    let mut best_score = -INFINITY;
    let mut best_move = Move::NONE;
    let mut bound = Bound::UpperBound;
    let mut legal = 0;
    // Scouts already farmed out, keyed by move order.
    let mut pending: Vec<Option<(Ticket, i32)>> = vec![None; ordered.len()];

    for (index, &mv) in ordered.iter().enumerate() {
        let quiet = is_quiet(pos, mv);
        if !pos.make_move(mv) {
            continue;
        }
        s.nodes += 1;
        legal += 1;

        let value = match pending[index].take() {
            Some((ticket, scout_alpha)) => {
                // The job stays queued on the worker; its answer decides
                // whether this thread has to search the move again.
                let remote = offload
                    .as_mut()
                    .map(|o| o.pool.collect(ticket, o.timeout));
                match remote {
                    Some(Ok(result)) => {
                        s.nodes += result.nodes;
                        resolve_scout(s, pos, depth, alpha, beta, scout_alpha, result.score)
                    }
                    Some(Err(e)) => {
                        debug!(error = %e, mv = %mv, "offloaded scout failed, searching locally");
                        search_child(s, pos, 0, depth - ONE_PLY, alpha, beta, false)
                    }
                    None => search_child(s, pos, 0, depth - ONE_PLY, alpha, beta, false),
                }
            }
            None => search_child(s, pos, 0, depth - ONE_PLY, alpha, beta, legal == 1),
        };
        pos.unmake_move(mv);

        if s.stopped() {
            return 0;
        }

        if value > best_score {
            best_score = value;
            best_move = mv;
            if value > alpha {
                record_improvement(s, pos, mv, quiet, 0, depth, value >= beta);
                s.root_best = mv;
                if value >= beta {
                    s.tt.save(hash, depth, 0, value, Bound::LowerBound, mv);
                    return value;
                }
                alpha = value;
                bound = Bound::Exact;
            }
        }

        // Once the first move has set alpha, farm out the remaining scouts.
        if legal == 1
            && let Some(o) = offload.as_mut()
        {
            dispatch_scouts(s, o.pool, pos, &ordered, index + 1, depth, alpha, &mut pending);
        }
    }

    if legal == 0 {
        return if in_check { mated_in(0) } else { s.draw_score };
    }

    s.tt.save(hash, depth, 0, best_score, bound, best_move);
    best_score
}

/// Queue null-window searches of `ordered[from..]` around `alpha`.
#[allow(clippy::too_many_arguments)]
fn dispatch_scouts(
    s: &SearchSession<'_>,
    pool: &mut OffloadPool,
    pos: &Position,
    ordered: &[Move],
    from: usize,
    depth: i32,
    alpha: i32,
    pending: &mut [Option<(Ticket, i32)>],
) {
    for (index, &mv) in ordered.iter().enumerate().skip(from) {
        let job = SearchJob {
            position: pos.clone(),
            mv,
            depth,
            alpha,
            beta: alpha + 1,
            ply: 0,
            draw_score: s.draw_score,
        };
        match pool.submit(job, Arc::clone(s.control.stop_flag())) {
            Ok(ticket) => pending[index] = Some((ticket, alpha)),
            Err(e) => {
                warn!(error = %e, "offload unavailable, searching root moves locally");
                return;
            }
        }
    }
}

/// Turn an offloaded scout score into a final score for the move currently
/// made on `pos`. `scout_alpha` is the alpha the scout was run against.
fn resolve_scout(
    s: &mut SearchSession<'_>,
    pos: &mut Position,
    depth: i32,
    alpha: i32,
    beta: i32,
    scout_alpha: i32,
    scout: i32,
) -> i32 {
    if scout <= scout_alpha {
        // Fail-low proven, and alpha only ever grows.
        return scout;
    }
    if alpha != scout_alpha {
        // Alpha moved since dispatch; the old scout proves nothing.
        return search_child(s, pos, 0, depth - ONE_PLY, alpha, beta, false);
    }
    if scout >= beta {
        return scout;
    }
    -pvs(s, pos, 1, depth - ONE_PLY, -beta, -alpha, true)
}
