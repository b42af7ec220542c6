//! Console command parsing
//!
//! Player commands mirror the controller API. Media events are simulated
//! with `ready`, `progress`, `ended` and `fail`; each accepts an optional
//! `#N` naming the request it answers (default: the latest one).

use crate::error::{CliError, Result};
use tunestream_core::TrackId;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // Player commands
    Play(TrackId),
    Queue { ids: Vec<TrackId>, start: TrackId },
    Next,
    Previous,
    Toggle,
    Seek(f64),
    SeekFraction(f64),
    Volume(f32),
    Mute,
    Stop,
    Retry,

    // Simulated media events
    Ready { token: Option<u64>, duration_seconds: Option<f64> },
    Progress { token: Option<u64>, position_seconds: f64 },
    Ended { token: Option<u64> },
    Fail { token: Option<u64>, reason: String },

    // Session
    Status,
    Queued,
    Tracks,
    Events,
    Help,
    Quit,
}

pub const HELP: &str = "\
player:   play <id> | queue <id>... [from <id>] | next | prev | toggle
          seek <secs> | seekpct <0-1> | vol <0-1> | mute | stop | retry
media:    ready [#N] [<duration>|?] | progress [#N] <secs> | ended [#N]
          fail [#N] <reason...>
session:  status | queue | tracks | events | help | quit";

/// Parse one input line; `Ok(None)` for blank lines
pub fn parse(line: &str) -> Result<Option<Command>> {
    let mut words: Vec<&str> = line.split_whitespace().collect();
    if words.is_empty() {
        return Ok(None);
    }
    let verb = words.remove(0).to_ascii_lowercase();

    let command = match verb.as_str() {
        "play" => Command::Play(TrackId::new(single(&verb, &words)?)),
        "queue" if words.is_empty() => Command::Queued,
        "queue" => parse_queue(&words)?,
        "next" | "n" => Command::Next,
        "prev" | "previous" | "p" => Command::Previous,
        "toggle" | "t" | "pause" => Command::Toggle,
        "seek" => Command::Seek(number(&verb, single(&verb, &words)?)?),
        "seekpct" => Command::SeekFraction(number(&verb, single(&verb, &words)?)?),
        "vol" | "volume" => Command::Volume(number(&verb, single(&verb, &words)?)?),
        "mute" => Command::Mute,
        "stop" => Command::Stop,
        "retry" => Command::Retry,

        "ready" => {
            let (token, rest) = take_token(&words)?;
            let duration_seconds = match rest {
                [] | ["?"] => None,
                [value] => Some(number(&verb, value)?),
                _ => return Err(usage(&verb)),
            };
            Command::Ready {
                token,
                duration_seconds,
            }
        }
        "progress" => {
            let (token, rest) = take_token(&words)?;
            Command::Progress {
                token,
                position_seconds: number(&verb, single(&verb, rest)?)?,
            }
        }
        "ended" => {
            let (token, rest) = take_token(&words)?;
            if !rest.is_empty() {
                return Err(usage(&verb));
            }
            Command::Ended { token }
        }
        "fail" => {
            let (token, rest) = take_token(&words)?;
            if rest.is_empty() {
                return Err(usage(&verb));
            }
            Command::Fail {
                token,
                reason: rest.join(" "),
            }
        }

        "status" | "s" => Command::Status,
        "tracks" => Command::Tracks,
        "events" => Command::Events,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        _ => return Err(CliError::Parse(format!("unknown command '{}'", verb))),
    };

    Ok(Some(command))
}

fn parse_queue(words: &[&str]) -> Result<Command> {
    let (list, start) = match words.iter().position(|w| w.eq_ignore_ascii_case("from")) {
        Some(at) => match &words[at + 1..] {
            [start] => (&words[..at], TrackId::new(*start)),
            _ => return Err(usage("queue")),
        },
        None => (words, TrackId::new(words[0])),
    };

    Ok(Command::Queue {
        ids: list.iter().map(|w| TrackId::new(*w)).collect(),
        start,
    })
}

fn take_token<'a>(words: &'a [&'a str]) -> Result<(Option<u64>, &'a [&'a str])> {
    let Some((first, rest)) = words.split_first() else {
        return Ok((None, words));
    };
    let Some(digits) = first.strip_prefix('#') else {
        return Ok((None, words));
    };

    let value = digits
        .parse()
        .map_err(|_| CliError::Parse(format!("bad request token '{}'", first)))?;
    Ok((Some(value), rest))
}

fn single<'a>(verb: &str, words: &[&'a str]) -> Result<&'a str> {
    match words {
        [word] => Ok(word),
        _ => Err(usage(verb)),
    }
}

fn number<T: std::str::FromStr>(verb: &str, word: &str) -> Result<T> {
    word.parse()
        .map_err(|_| CliError::Parse(format!("{}: '{}' is not a number", verb, word)))
}

fn usage(verb: &str) -> CliError {
    CliError::Parse(format!("wrong arguments for '{}' (see help)", verb))
}
