//! UCI front end for corvid: command parsing, option handling, and the
//! event loop that drives the searcher on a background thread.

pub mod command;
pub mod engine;
pub mod error;
pub mod options;

pub use command::{Command, parse_command};
pub use engine::UciEngine;
pub use error::UciError;
pub use options::{EngineConfig, UciOption};
