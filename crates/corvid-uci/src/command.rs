//! UCI command parsing.

use std::time::Duration;

use corvid_core::{Move, MoveParseError, Position};
use corvid_engine::GoParams;

use crate::error::UciError;

/// A parsed UCI command.
#[derive(Debug)]
pub enum Command {
    /// `uci` -- identify the engine and list its options.
    Uci,
    /// `isready` -- synchronization ping.
    IsReady,
    /// `ucinewgame` -- forget everything learned about the previous game.
    UciNewGame,
    /// `position` -- the resulting position, with the moves played into its
    /// history so repetitions are seen by the search.
    Position(Position),
    /// `go` -- start searching with the given limits.
    Go(GoParams),
    /// `setoption name <name> [value <value>]`. Names may contain spaces.
    SetOption { name: String, value: Option<String> },
    PonderHit,
    Stop,
    Quit,
    /// `perft <depth>` -- count leaf nodes from the current position.
    Perft(u32),
    /// `d` -- print the current position as FEN.
    Display,
    /// Unrecognized command (ignored).
    Unknown(String),
}

/// Parse a single line of UCI input into a [`Command`].
pub fn parse_command(line: &str) -> Result<Command, UciError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some(&head) = tokens.first() else {
        return Ok(Command::Unknown(String::new()));
    };

    match head {
        "uci" => Ok(Command::Uci),
        "isready" => Ok(Command::IsReady),
        "ucinewgame" => Ok(Command::UciNewGame),
        "stop" => Ok(Command::Stop),
        "quit" => Ok(Command::Quit),
        "ponderhit" => Ok(Command::PonderHit),
        "d" | "displayboard" => Ok(Command::Display),
        "position" => parse_position(&tokens[1..]),
        "go" => parse_go(&tokens[1..]),
        "setoption" => parse_setoption(&tokens[1..]),
        "perft" => Ok(Command::Perft(parse_int(tokens.get(1), "perft")?)),
        _ => Ok(Command::Unknown(head.to_string())),
    }
}

/// Parse the `position` arguments.
///
/// - `position startpos [moves e2e4 e7e5 ...]`
/// - `position fen <fields> [moves ...]`, where the FEN runs up to the
///   `moves` keyword so that positions without move counters are accepted.
fn parse_position(tokens: &[&str]) -> Result<Command, UciError> {
    let moves_at = tokens.iter().position(|&t| t == "moves").unwrap_or(tokens.len());
    let (setup, moves) = tokens.split_at(moves_at);

    let mut pos = match setup {
        ["startpos"] => Position::startpos(),
        ["fen", fields @ ..] => {
            let fen = fields.join(" ");
            fen.parse::<Position>().map_err(|source| UciError::InvalidFen { fen: fen.clone(), source })?
        }
        _ => return Err(UciError::MalformedPosition),
    };

    for &text in moves.iter().skip(1) {
        let invalid = |source: MoveParseError| UciError::InvalidMove {
            uci_move: text.to_string(),
            source,
        };
        let mv = Move::parse(text, &pos).map_err(invalid)?;
        if !pos.make_move(mv) {
            return Err(invalid(MoveParseError::Illegal(text.to_string())));
        }
    }

    Ok(Command::Position(pos))
}

/// Parse the `go` arguments. Unknown tokens are skipped.
fn parse_go(tokens: &[&str]) -> Result<Command, UciError> {
    let mut params = GoParams::default();

    let mut i = 0;
    while i < tokens.len() {
        let value = tokens.get(i + 1);
        match tokens[i] {
            "wtime" => params.wtime = Some(parse_millis(value, "wtime")?),
            "btime" => params.btime = Some(parse_millis(value, "btime")?),
            "winc" => params.winc = Some(parse_millis(value, "winc")?),
            "binc" => params.binc = Some(parse_millis(value, "binc")?),
            "movetime" => params.movetime = Some(parse_millis(value, "movetime")?),
            "movestogo" => params.movestogo = Some(parse_int(value, "movestogo")?),
            "depth" => params.depth = Some(parse_int(value, "depth")?),
            "nodes" => params.nodes = Some(parse_int(value, "nodes")?),
            "infinite" => {
                params.infinite = true;
                i += 1;
                continue;
            }
            "ponder" => {
                params.ponder = true;
                i += 1;
                continue;
            }
            _ => {
                i += 1;
                continue;
            }
        }
        i += 2;
    }

    Ok(Command::Go(params))
}

/// Parse `name <words...> [value <words...>]`.
fn parse_setoption(tokens: &[&str]) -> Result<Command, UciError> {
    let ["name", rest @ ..] = tokens else {
        return Err(UciError::MalformedOption);
    };
    let value_at = rest.iter().position(|&t| t == "value");
    let (name, value) = match value_at {
        Some(at) => (&rest[..at], Some(rest[at + 1..].join(" "))),
        None => (rest, None),
    };
    if name.is_empty() {
        return Err(UciError::MalformedOption);
    }
    Ok(Command::SetOption {
        name: name.join(" "),
        value,
    })
}

/// Parse a millisecond value. GUIs occasionally send negative clocks when a
/// side is already over time; those read as zero.
fn parse_millis(token: Option<&&str>, param: &str) -> Result<Duration, UciError> {
    let ms: i64 = parse_int(token, param)?;
    Ok(Duration::from_millis(ms.max(0) as u64))
}

fn parse_int<T: std::str::FromStr>(token: Option<&&str>, param: &str) -> Result<T, UciError> {
    let value = token.ok_or_else(|| UciError::MissingGoValue {
        param: param.to_string(),
    })?;
    value.parse().map_err(|_| UciError::InvalidGoValue {
        param: param.to_string(),
        value: value.to_string(),
    })
}
