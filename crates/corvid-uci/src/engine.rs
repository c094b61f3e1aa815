//! Event-driven UCI engine: the main thread handles commands while a
//! search thread owns the [`Searcher`].

use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::time::Instant;

use tracing::{debug, info, warn};

use corvid_core::{MoveList, Position, generate_moves};
use corvid_engine::{
    Bound, GoParams, PerftTable, ReportedScore, SearchControl, SearchInfo, SearchResult, Searcher,
    limits_from_go, perft_hashed,
};

use crate::command::{Command, parse_command};
use crate::error::UciError;
use crate::options::{EngineConfig, UciOption, option_lines};

/// Size of the perft counting table in megabytes.
const PERFT_HASH_MB: usize = 16;

enum EngineState {
    Idle,
    Searching,
    Pondering,
}

/// Events processed by the main engine loop.
enum EngineEvent {
    UciCommand(Result<Command, UciError>),
    SearchDone(SearchDone),
    InputClosed,
}

/// Returned by the search thread, handing the searcher back.
struct SearchDone {
    result: SearchResult,
    searcher: Searcher,
}

/// Table work requested while the search thread held the searcher.
#[derive(Default)]
struct Pending {
    clear_tt: bool,
    resize_tt: Option<usize>,
    config: bool,
}

/// The UCI engine: current position, searcher, and option state.
pub struct UciEngine {
    position: Position,
    /// `None` while a search thread owns it.
    searcher: Option<Searcher>,
    perft_table: PerftTable,
    state: EngineState,
    stop_flag: Arc<AtomicBool>,
    control: Option<Arc<SearchControl>>,
    /// The running search was started with `go infinite`.
    infinite: bool,
    /// A finished infinite or ponder search's reply, owed on `stop` or
    /// `ponderhit`.
    held_bestmove: Option<String>,
    config: EngineConfig,
    pending: Pending,
}

impl UciEngine {
    pub fn new() -> Self {
        let config = EngineConfig::default();
        Self {
            position: Position::startpos(),
            searcher: Some(Searcher::new(config.hash_mb, config.search.clone())),
            perft_table: PerftTable::new(PERFT_HASH_MB),
            state: EngineState::Idle,
            stop_flag: Arc::new(AtomicBool::new(false)),
            control: None,
            infinite: false,
            held_bestmove: None,
            config,
            pending: Pending::default(),
        }
    }

    /// Run the UCI event loop, reading from stdin until `quit` or input closes.
    pub fn run(mut self) -> Result<(), UciError> {
        let (tx, rx) = mpsc::channel::<EngineEvent>();

        let stdin_tx = tx.clone();
        std::thread::Builder::new()
            .name("corvid-stdin".to_string())
            .spawn(move || {
                for line in io::stdin().lock().lines() {
                    let Ok(line) = line else {
                        break;
                    };
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    debug!(cmd = %trimmed, "received UCI command");
                    if stdin_tx.send(EngineEvent::UciCommand(parse_command(trimmed))).is_err() {
                        return;
                    }
                }
                let _ = stdin_tx.send(EngineEvent::InputClosed);
            })?;

        for event in &rx {
            match event {
                EngineEvent::UciCommand(Ok(cmd)) => match cmd {
                    Command::Uci => self.handle_uci(),
                    Command::IsReady => println!("readyok"),
                    Command::UciNewGame => self.handle_ucinewgame(),
                    Command::Position(pos) => self.handle_position(pos),
                    Command::Go(params) => self.handle_go(params, &tx),
                    Command::SetOption { name, value } => self.handle_setoption(&name, value.as_deref()),
                    Command::PonderHit => self.handle_ponderhit(),
                    Command::Stop => self.handle_stop(),
                    Command::Perft(depth) => self.handle_perft(depth),
                    Command::Display => self.handle_display(),
                    Command::Quit => {
                        if !matches!(self.state, EngineState::Idle) {
                            self.handle_stop();
                            for ev in &rx {
                                if let EngineEvent::SearchDone(done) = ev {
                                    self.finish_search(done);
                                    break;
                                }
                            }
                        }
                        break;
                    }
                    Command::Unknown(cmd) => {
                        if !cmd.is_empty() {
                            debug!(%cmd, "ignoring unknown command");
                        }
                    }
                },
                EngineEvent::UciCommand(Err(e)) => {
                    warn!(error = %e, "UCI parse error");
                }
                EngineEvent::SearchDone(done) => self.finish_search(done),
                EngineEvent::InputClosed => {
                    self.handle_stop();
                    break;
                }
            }
        }

        info!("corvid shutting down");
        Ok(())
    }

    fn handle_uci(&self) {
        println!("id name corvid {}", env!("CARGO_PKG_VERSION"));
        println!("id author the corvid developers");
        for line in option_lines() {
            println!("{line}");
        }
        println!("uciok");
    }

    fn handle_ucinewgame(&mut self) {
        self.position = Position::startpos();
        self.clear_tables();
    }

    /// Clear both hash tables, deferring the search table until the
    /// search thread hands the searcher back.
    fn clear_tables(&mut self) {
        self.perft_table.clear();
        match self.searcher {
            Some(ref searcher) => searcher.clear_tt(),
            None => self.pending.clear_tt = true,
        }
    }

    fn handle_setoption(&mut self, name: &str, value: Option<&str>) {
        let option = match UciOption::resolve(name, value) {
            Ok(option) => option,
            Err(e) => {
                warn!(error = %e, "setoption ignored");
                return;
            }
        };
        debug!(?option, "setoption");
        self.config.apply(&option);

        match option {
            UciOption::Hash(mb) => match self.searcher {
                Some(ref mut searcher) => searcher.resize_tt(mb),
                None => self.pending.resize_tt = Some(mb),
            },
            UciOption::ClearHash => self.clear_tables(),
            UciOption::DrawScore(_) | UciOption::Workers(_) => match self.searcher {
                Some(ref mut searcher) => searcher.set_config(self.config.search.clone()),
                None => self.pending.config = true,
            },
            // Pondering is driven by `go ponder`; the option only advertises it.
            UciOption::Ponder(_) => {}
        }
    }

    fn handle_position(&mut self, pos: Position) {
        if !matches!(self.state, EngineState::Idle) {
            warn!("position received during search; it applies to the next go");
        }
        self.position = pos;
    }

    fn handle_go(&mut self, params: GoParams, tx: &mpsc::Sender<EngineEvent>) {
        if !matches!(self.state, EngineState::Idle) {
            warn!("go received while not idle, ignoring");
            return;
        }
        self.release_bestmove();
        let Some(mut searcher) = self.searcher.take() else {
            warn!("searcher unavailable, ignoring go");
            return;
        };

        self.stop_flag = Arc::new(AtomicBool::new(false));
        let control = Arc::new(limits_from_go(
            &params,
            self.position.side_to_move(),
            Arc::clone(&self.stop_flag),
        ));
        debug!(target_ms = ?control.target().map(|t| t.as_millis()), ?params, "starting search");

        let position = self.position.clone();
        let max_depth = params.depth;
        let search_control = Arc::clone(&control);
        let tx = tx.clone();

        let spawned = std::thread::Builder::new()
            .name("corvid-search".to_string())
            .spawn(move || {
                let result = searcher.search(&position, max_depth, &search_control, |info| {
                    println!("{}", format_info(info));
                });
                let _ = tx.send(EngineEvent::SearchDone(SearchDone { result, searcher }));
            });
        if let Err(e) = spawned {
            warn!(error = %e, "failed to spawn search thread");
            println!("bestmove 0000");
            return;
        }

        self.state = if params.ponder {
            EngineState::Pondering
        } else {
            EngineState::Searching
        };
        self.infinite = params.infinite;
        self.control = Some(control);
    }

    fn handle_ponderhit(&mut self) {
        if self.release_bestmove() {
            return;
        }
        if !matches!(self.state, EngineState::Pondering) {
            warn!("ponderhit received while not pondering, ignoring");
            return;
        }
        if let Some(ref control) = self.control {
            control.activate();
        }
        self.state = EngineState::Searching;
    }

    fn handle_stop(&mut self) {
        self.stop_flag.store(true, Ordering::Release);
        self.release_bestmove();
    }

    /// Print a held `bestmove`, if any. Returns whether one was printed.
    fn release_bestmove(&mut self) -> bool {
        match self.held_bestmove.take() {
            Some(line) => {
                println!("{line}");
                true
            }
            None => false,
        }
    }

    fn handle_perft(&mut self, depth: u32) {
        if !matches!(self.state, EngineState::Idle) {
            warn!("perft received during search, ignoring");
            return;
        }
        let start = Instant::now();
        let mut pos = self.position.clone();
        let mut list = MoveList::new();
        generate_moves(&pos, &mut list);

        let mut total = 0;
        for sm in list.iter() {
            if pos.make_move(sm.mv) {
                let count = perft_hashed(&mut pos, depth.saturating_sub(1), &self.perft_table);
                pos.unmake_move(sm.mv);
                println!("{}: {count}", sm.mv);
                total += count;
            }
        }
        let elapsed = start.elapsed();
        println!();
        println!("Nodes searched: {total}");
        info!(depth, nodes = total, elapsed_ms = elapsed.as_millis() as u64, "perft finished");
    }

    fn handle_display(&self) {
        println!("Fen: {}", self.position);
        println!("Key: {:016x}", self.position.hash());
    }

    fn finish_search(&mut self, done: SearchDone) {
        let mut searcher = done.searcher;
        let pending = std::mem::take(&mut self.pending);

        if pending.config {
            searcher.set_config(self.config.search.clone());
        }
        if let Some(mb) = pending.resize_tt {
            // A fresh allocation is already empty.
            searcher.resize_tt(mb);
        } else if pending.clear_tt {
            searcher.clear_tt();
        }

        // Infinite and ponder searches may not answer before the GUI asks.
        let must_wait = (self.infinite || matches!(self.state, EngineState::Pondering))
            && !self.stop_flag.load(Ordering::Acquire);

        self.searcher = Some(searcher);
        self.control = None;
        self.infinite = false;
        self.state = EngineState::Idle;

        let line = format_bestmove(&done.result);
        if must_wait {
            debug!(%line, "search finished early, holding bestmove");
            self.held_bestmove = Some(line);
        } else {
            println!("{line}");
        }
    }
}

impl Default for UciEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// `info depth D score ... time T nodes N nps R pv ...`
pub fn format_info(info: &SearchInfo) -> String {
    let mut line = format!("info depth {} score {}", info.depth, ReportedScore::from_score(info.score));
    match info.bound {
        Bound::LowerBound => line.push_str(" lowerbound"),
        Bound::UpperBound => line.push_str(" upperbound"),
        _ => {}
    }
    line.push_str(&format!(
        " time {} nodes {} nps {}",
        info.elapsed.as_millis(),
        info.nodes,
        info.nps()
    ));
    if !info.pv.is_empty() {
        line.push_str(" pv");
        for mv in &info.pv {
            line.push(' ');
            line.push_str(&mv.to_string());
        }
    }
    line
}

/// `bestmove M [ponder P]`; `0000` when there is no legal move.
pub fn format_bestmove(result: &SearchResult) -> String {
    match result.ponder_move {
        Some(pm) if !pm.is_none() && !result.best_move.is_none() => {
            format!("bestmove {} ponder {pm}", result.best_move)
        }
        _ => format!("bestmove {}", result.best_move),
    }
}
