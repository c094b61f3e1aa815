//! Engine options exposed through `setoption`.

use corvid_engine::{DRAW_SCORE_RANGE, MAX_WORKERS, SearchConfig};
use tracing::warn;

use crate::error::UciError;

pub const DEFAULT_HASH_MB: usize = 16;
pub const MAX_HASH_MB: usize = 65_536;

/// A validated `setoption` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciOption {
    /// Transposition table size in megabytes.
    Hash(usize),
    ClearHash,
    /// Draw score in centipawns; `Contempt` is accepted as an alias.
    DrawScore(i32),
    /// Offload worker count; zero disables the backend.
    Workers(usize),
    Ponder(bool),
}

impl UciOption {
    /// Resolve a `setoption` name and value. Option names are matched
    /// case-insensitively. A missing, malformed, or out-of-range value
    /// falls back to the option's default with a warning.
    pub fn resolve(name: &str, value: Option<&str>) -> Result<UciOption, UciError> {
        let option = match name.to_ascii_lowercase().as_str() {
            "hash" => UciOption::Hash(spin(name, value, DEFAULT_HASH_MB, 1..=MAX_HASH_MB)),
            "clear hash" => UciOption::ClearHash,
            "drawscore" | "contempt" => UciOption::DrawScore(spin(name, value, 0, DRAW_SCORE_RANGE)),
            "workers" => UciOption::Workers(spin(name, value, 0, 0..=MAX_WORKERS)),
            "ponder" => UciOption::Ponder(check(name, value)),
            _ => {
                return Err(UciError::UnknownOption {
                    name: name.to_string(),
                });
            }
        };
        Ok(option)
    }
}

fn spin<T>(name: &str, value: Option<&str>, default: T, range: std::ops::RangeInclusive<T>) -> T
where
    T: std::str::FromStr + PartialOrd + std::fmt::Display + Copy,
{
    match value.map(|v| v.trim().parse::<T>()) {
        Some(Ok(v)) if range.contains(&v) => v,
        Some(Ok(v)) => {
            warn!(option = name, value = %v, min = %range.start(), max = %range.end(), "value out of range, using default");
            default
        }
        _ => {
            warn!(option = name, value = ?value, "malformed value, using default");
            default
        }
    }
}

fn check(name: &str, value: Option<&str>) -> bool {
    match value.map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) if v == "true" => true,
        Some(v) if v == "false" => false,
        other => {
            warn!(option = name, value = ?other, "malformed value, using default");
            false
        }
    }
}

/// Settings adjustable via `setoption`.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub hash_mb: usize,
    pub search: SearchConfig,
    pub ponder: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            hash_mb: DEFAULT_HASH_MB,
            search: SearchConfig::default(),
            ponder: false,
        }
    }
}

impl EngineConfig {
    /// Record an option. `ClearHash` carries no setting and leaves the
    /// config unchanged.
    pub fn apply(&mut self, option: &UciOption) {
        match *option {
            UciOption::Hash(mb) => self.hash_mb = mb,
            UciOption::DrawScore(cp) => self.search.draw_score = cp,
            UciOption::Workers(n) => self.search.workers = n,
            UciOption::Ponder(on) => self.ponder = on,
            UciOption::ClearHash => {}
        }
    }
}

/// The `option` lines sent in reply to `uci`.
pub fn option_lines() -> Vec<String> {
    vec![
        format!("option name Hash type spin default {DEFAULT_HASH_MB} min 1 max {MAX_HASH_MB}"),
        "option name Clear Hash type button".to_string(),
        format!(
            "option name Drawscore type spin default 0 min {} max {}",
            DRAW_SCORE_RANGE.start(),
            DRAW_SCORE_RANGE.end()
        ),
        format!("option name Workers type spin default 0 min 0 max {MAX_WORKERS}"),
        "option name Ponder type check default false".to_string(),
    ]
}
