//! Principal variation search and quiescence search.

use corvid_core::{Move, MoveList, Position, generate_captures, generate_evasions, generate_moves};

use crate::eval::evaluate;
use crate::search::ONE_PLY;
use crate::search::heuristics::is_quiet;
use crate::search::ordering::{order_captures, order_moves, pick_next};
use crate::search::score::{INFINITY, is_mate_score, mated_in};
use crate::search::session::SearchSession;
use crate::search::tt::{Bound, null_reduction};

/// Futility margin added to a capture's SEE gain in quiescence.
pub const DELTA_MARGIN: i32 = 200;

/// Static null-move margins for one and two plies of remaining depth.
const STATIC_NULL_MARGIN: [i32; 2] = [260, 445];

/// Static eval lead at which a shallow node loses one ply instead of searching.
const STATIC_NULL_REDUCE: i32 = 900;

/// Recursive alpha-beta with a null window for every move after the first.
///
/// `depth` is in [`ONE_PLY`] units. The returned score is from the side to
/// move's point of view. When the search has been stopped the result is a
/// meaningless 0 that every caller discards.
pub(crate) fn pvs(
    s: &mut SearchSession<'_>,
    pos: &mut Position,
    ply: usize,
    mut depth: i32,
    mut alpha: i32,
    beta: i32,
    allow_null: bool,
) -> i32 {
    if s.checkpoint() {
        return 0;
    }

    // Never drop into quiescence while in check.
    let in_check = pos.in_check(pos.side_to_move());
    if in_check {
        depth += ONE_PLY;
    }

    if depth <= 0 {
        return quiescence(s, pos, alpha, beta);
    }

    if pos.repetition_draw() {
        return s.draw_score;
    }

    let hash = pos.hash();
    let probe = s.tt.probe(hash, ply, depth, alpha, beta);
    if let Some(score) = probe.score {
        return score;
    }
    let mut tt_move = probe.mv;

    // Null move, skipped in pawn endings where zugzwang is common.
    if allow_null && probe.allow_null && !in_check && pos.has_non_pawn_material(pos.side_to_move()) {
        if depth <= 3 * ONE_PLY {
            let static_eval = evaluate(pos);
            let margin = if depth <= ONE_PLY {
                Some(STATIC_NULL_MARGIN[0])
            } else if depth <= 2 * ONE_PLY {
                Some(STATIC_NULL_MARGIN[1])
            } else {
                None
            };
            if let Some(margin) = margin
                && static_eval - margin >= beta
            {
                return static_eval;
            }
            if static_eval - STATIC_NULL_REDUCE >= beta {
                depth -= ONE_PLY;
            }
        }

        pos.make_null_move();
        s.nodes += 1;
        let value = if depth <= 3 * ONE_PLY {
            -quiescence(s, pos, -beta, -beta + 1)
        } else {
            let reduced = depth - ONE_PLY - null_reduction(depth);
            -pvs(s, pos, ply + 1, reduced, -beta, -beta + 1, false)
        };
        pos.unmake_null_move();

        if s.stopped() {
            return 0;
        }
        if value >= beta {
            // A pass cannot prove a mate.
            return if is_mate_score(value) { beta } else { value };
        }
    }

    if beta - alpha > 1 && tt_move.is_none() && depth > 2 * ONE_PLY {
        tt_move = iterative_deepening_move(s, pos, ply, depth, alpha, beta);
        if s.stopped() {
            return 0;
        }
    }

    let mut list = MoveList::new();
    if in_check {
        generate_evasions(pos, &mut list);
    } else {
        generate_moves(pos, &mut list);
    }
    order_moves(pos, &mut list, tt_move, ply, &s.killers, &s.history);

    let mut best_score = -INFINITY;
    let mut best_move = Move::NONE;
    let mut bound = Bound::UpperBound;
    let mut legal = 0;

    for i in 0..list.len() {
        let mv = pick_next(&mut list, i).mv;
        let quiet = is_quiet(pos, mv);
        if !pos.make_move(mv) {
            continue;
        }
        s.nodes += 1;
        legal += 1;
        let value = search_child(s, pos, ply, depth - ONE_PLY, alpha, beta, legal == 1);
        pos.unmake_move(mv);

        if s.stopped() {
            return 0;
        }

        if value > best_score {
            best_score = value;
            best_move = mv;
            if value > alpha {
                record_improvement(s, pos, mv, quiet, ply, depth, value >= beta);
                if value >= beta {
                    s.tt.save(hash, depth, ply, value, Bound::LowerBound, mv);
                    return value;
                }
                alpha = value;
                bound = Bound::Exact;
            }
        }
    }

    if legal == 0 {
        return if in_check { mated_in(ply) } else { s.draw_score };
    }

    s.tt.save(hash, depth, ply, best_score, bound, best_move);
    best_score
}

/// Internal iterative deepening: a search two plies shallower whose only
/// product is the move it leaves in the table. A fail low is re-searched
/// with alpha opened so the stored move is a real best move.
fn iterative_deepening_move(
    s: &mut SearchSession<'_>,
    pos: &mut Position,
    ply: usize,
    depth: i32,
    alpha: i32,
    beta: i32,
) -> Move {
    let value = pvs(s, pos, ply, depth - 2 * ONE_PLY, alpha, beta, true);
    if value <= alpha {
        pvs(s, pos, ply, depth - 2 * ONE_PLY, -INFINITY, beta, true);
    }
    s.tt.probe(pos.hash(), ply, depth, alpha, beta).mv
}

/// Search the position after a just-made move and return its score for the
/// mover. The first move gets the full window; later ones a scout, widened
/// only when the scout lands strictly inside `(alpha, beta)`.
pub(crate) fn search_child(
    s: &mut SearchSession<'_>,
    pos: &mut Position,
    ply: usize,
    depth: i32,
    alpha: i32,
    beta: i32,
    full_window: bool,
) -> i32 {
    if full_window {
        return -pvs(s, pos, ply + 1, depth, -beta, -alpha, true);
    }
    let scout = -pvs(s, pos, ply + 1, depth, -alpha - 1, -alpha, true);
    if scout > alpha && scout < beta {
        -pvs(s, pos, ply + 1, depth, -beta, -alpha, true)
    } else {
        scout
    }
}

/// Killer and history bookkeeping for a move that raised alpha.
pub(crate) fn record_improvement(
    s: &mut SearchSession<'_>,
    pos: &Position,
    mv: Move,
    quiet: bool,
    ply: usize,
    depth: i32,
    cutoff: bool,
) {
    if !quiet {
        return;
    }
    s.history.reward(pos.side_to_move(), mv, depth / ONE_PLY);
    if cutoff {
        s.killers.store(ply, mv);
    }
}

/// Captures and promotions only, until the position is quiet.
pub(crate) fn quiescence(s: &mut SearchSession<'_>, pos: &mut Position, mut alpha: i32, beta: i32) -> i32 {
    if s.checkpoint() {
        return 0;
    }

    let stand_pat = evaluate(pos);
    if stand_pat > alpha {
        if stand_pat >= beta {
            return stand_pat;
        }
        alpha = stand_pat;
    }
    let mut best = stand_pat;

    let mut list = MoveList::new();
    generate_captures(pos, &mut list);
    order_captures(pos, &mut list);

    for i in 0..list.len() {
        let candidate = pick_next(&mut list, i);
        // Sorted by SEE: everything from here on loses material.
        if candidate.score < 0 {
            break;
        }
        // Later captures gain no more than this one.
        if stand_pat + candidate.score + DELTA_MARGIN < alpha {
            return best;
        }
        if !pos.make_move(candidate.mv) {
            continue;
        }
        s.nodes += 1;
        let value = -quiescence(s, pos, -beta, -alpha);
        pos.unmake_move(candidate.mv);

        if s.stopped() {
            return 0;
        }

        if value > best {
            best = value;
            if value > alpha {
                if value >= beta {
                    return value;
                }
                alpha = value;
            }
        }
    }
    best
}
