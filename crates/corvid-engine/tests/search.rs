//! End-to-end searches through the public API.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

use corvid_core::{Color, Position};
use corvid_engine::{
    Bound, GoParams, MATE, ReportedScore, SearchConfig, SearchControl, SearchResult, Searcher, limits_from_go,
};

const SCHOLARS_MATE_FEN: &str = "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4";

const BACK_RANK_FEN: &str = "6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1";

fn infinite() -> SearchControl {
    SearchControl::infinite(Arc::new(AtomicBool::new(false)))
}

fn search(fen: &str, depth: u32) -> SearchResult {
    let pos: Position = fen.parse().unwrap();
    Searcher::new(4, SearchConfig::default()).search(&pos, Some(depth), &infinite(), |_| {})
}

fn is_legal(fen: &str, result: &SearchResult) -> bool {
    let mut pos: Position = fen.parse().unwrap();
    pos.make_move(result.best_move)
}

#[test]
fn finds_scholars_mate() {
    let result = search(SCHOLARS_MATE_FEN, 3);
    assert_eq!(result.best_move.to_string(), "h5f7");
    assert_eq!(result.score, MATE - 1);
    assert_eq!(ReportedScore::from_score(result.score), ReportedScore::Mate(1));
}

#[test]
fn finds_back_rank_mate() {
    let result = search(BACK_RANK_FEN, 4);
    assert_eq!(result.best_move.to_string(), "a1a8");
    assert_eq!(ReportedScore::from_score(result.score), ReportedScore::Mate(1));
}

#[test]
fn wins_a_hanging_queen() {
    let fen = "4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1";
    let result = search(fen, 4);
    assert_eq!(result.best_move.to_string(), "d1d5");
    assert!(result.score > 300, "score {}", result.score);
}

#[test]
fn pv_starts_with_best_move_and_is_legal() {
    let result = search(corvid_core::STARTING_FEN, 5);
    assert_eq!(result.depth, 5);
    assert_eq!(result.pv.first(), Some(&result.best_move));
    assert_eq!(result.ponder_move, result.pv.get(1).copied());

    let mut pos = Position::startpos();
    for &mv in &result.pv {
        assert!(pos.make_move(mv), "illegal pv move {mv}");
    }
}

#[test]
fn every_depth_ends_in_one_exact_iteration() {
    let pos: Position = SCHOLARS_MATE_FEN.parse().unwrap();
    let mut searcher = Searcher::new(4, SearchConfig::default());
    let mut seen = Vec::new();
    let result = searcher.search(&pos, Some(6), &infinite(), |info| seen.push((info.depth, info.bound)));

    assert_eq!(result.depth, 6);
    let exact: Vec<u32> = seen.iter().filter(|(_, b)| *b == Bound::Exact).map(|(d, _)| *d).collect();
    assert_eq!(exact, vec![1, 2, 3, 4, 5, 6]);
    assert!(seen.iter().all(|(_, b)| *b != Bound::None));
}

#[test]
fn stalemate_root_returns_draw_score() {
    let pos: Position = "k7/2K5/1Q6/8/8/8/8/8 b - - 0 1".parse().unwrap();
    let config = SearchConfig {
        draw_score: -30,
        ..SearchConfig::default()
    };
    let result = Searcher::new(1, config).search(&pos, Some(3), &infinite(), |_| {});
    assert!(result.best_move.is_none());
    assert_eq!(result.score, -30);
}

#[test]
fn movetime_is_respected() {
    let pos = Position::startpos();
    let params = GoParams {
        movetime: Some(Duration::from_millis(100)),
        ..GoParams::default()
    };
    let control = limits_from_go(&params, Color::White, Arc::new(AtomicBool::new(false)));
    let start = Instant::now();
    let result = Searcher::new(4, SearchConfig::default()).search(&pos, None, &control, |_| {});
    assert!(start.elapsed() < Duration::from_secs(2), "took {:?}", start.elapsed());
    assert!(is_legal(corvid_core::STARTING_FEN, &result));
}

#[test]
fn node_limit_stops_the_search() {
    let pos = Position::startpos();
    let params = GoParams {
        nodes: Some(20_000),
        ..GoParams::default()
    };
    let control = limits_from_go(&params, Color::White, Arc::new(AtomicBool::new(false)));
    let result = Searcher::new(4, SearchConfig::default()).search(&pos, None, &control, |_| {});
    assert!(result.depth < 64);
    assert!(is_legal(corvid_core::STARTING_FEN, &result));
}

#[test]
fn search_reuses_the_table_between_calls() {
    let pos = Position::startpos();
    let mut searcher = Searcher::new(4, SearchConfig::default());
    let first = searcher.search(&pos, Some(5), &infinite(), |_| {});
    let second = searcher.search(&pos, Some(5), &infinite(), |_| {});
    assert_eq!(second.depth, first.depth);
    assert!(is_legal(corvid_core::STARTING_FEN, &second));

    searcher.clear_tt();
    let cleared = searcher.search(&pos, Some(5), &infinite(), |_| {});
    assert!(is_legal(corvid_core::STARTING_FEN, &cleared));
}
