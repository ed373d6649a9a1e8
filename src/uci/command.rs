//! Parsing of incoming UCI commands into plain values.
//!
//! The reader thread parses without any board context; move text in
//! `position` and `go searchmoves` stays as strings until the driver can
//! check it against the actual position.

/// Clock and limit fields of a `go` command, verbatim.
#[derive(Clone, Debug, Default)]
pub struct GoParams {
    pub wtime: Option<u64>,
    pub btime: Option<u64>,
    pub winc: u64,
    pub binc: u64,
    pub movestogo: Option<u32>,
    pub depth: Option<i32>,
    pub nodes: Option<u64>,
    pub movetime: Option<u64>,
    pub mate: Option<i32>,
    pub infinite: bool,
    pub searchmoves: Vec<String>,
}

#[derive(Clone, Debug)]
pub enum Command {
    Uci,
    IsReady,
    NewGame,
    Position {
        fen: Option<String>,
        moves: Vec<String>,
    },
    Go(GoParams),
    SetOption {
        name: String,
        value: String,
    },
    Stop,
    Quit,
    Unknown(String),
}

/// Parse one input line. Empty lines yield `None`; anything else becomes a
/// command, if only `Unknown`.
#[must_use]
pub fn parse(line: &str) -> Option<Command> {
    let mut tokens = line.split_whitespace();
    let head = tokens.next()?;
    let rest: Vec<&str> = tokens.collect();

    let cmd = match head {
        "uci" => Command::Uci,
        "isready" => Command::IsReady,
        "ucinewgame" => Command::NewGame,
        "stop" => Command::Stop,
        "quit" => Command::Quit,
        "position" => parse_position(&rest),
        "go" => Command::Go(parse_go(&rest)),
        "setoption" => parse_setoption(&rest),
        _ => Command::Unknown(line.to_string()),
    };
    Some(cmd)
}

fn parse_position(tokens: &[&str]) -> Command {
    let moves_at = tokens.iter().position(|&t| t == "moves");
    let (spec, moves) = match moves_at {
        Some(i) => (&tokens[..i], &tokens[i + 1..]),
        None => (tokens, &[][..]),
    };

    let fen = match spec.first() {
        Some(&"startpos") | None => None,
        Some(&"fen") => Some(spec[1..].join(" ")),
        // Tolerate a bare FEN without the keyword.
        Some(_) => Some(spec.join(" ")),
    };

    Command::Position {
        fen,
        moves: moves.iter().map(|s| (*s).to_string()).collect(),
    }
}

fn next_number<'a, 'b>(
    iter: &mut std::iter::Peekable<std::slice::Iter<'a, &'b str>>,
) -> Option<u64> {
    iter.next().and_then(|v| v.parse::<u64>().ok())
}

fn parse_go(tokens: &[&str]) -> GoParams {
    let mut params = GoParams::default();
    let mut iter = tokens.iter().peekable();

    while let Some(&token) = iter.next() {
        match token {
            "wtime" => params.wtime = next_number(&mut iter),
            "btime" => params.btime = next_number(&mut iter),
            "winc" => params.winc = next_number(&mut iter).unwrap_or(0),
            "binc" => params.binc = next_number(&mut iter).unwrap_or(0),
            "movestogo" => params.movestogo = next_number(&mut iter).map(|v| v as u32),
            "depth" => params.depth = next_number(&mut iter).map(|v| v as i32),
            "nodes" => params.nodes = next_number(&mut iter),
            "movetime" => params.movetime = next_number(&mut iter),
            "mate" => params.mate = next_number(&mut iter).map(|v| v as i32),
            "infinite" => params.infinite = true,
            "searchmoves" => {
                while let Some(&&mv) = iter.peek() {
                    if mv.len() < 4 || !mv.as_bytes()[0].is_ascii_lowercase() {
                        break;
                    }
                    params.searchmoves.push(mv.to_string());
                    iter.next();
                }
            }
            _ => {}
        }
    }
    params
}

fn parse_setoption(tokens: &[&str]) -> Command {
    let name_at = tokens.iter().position(|&t| t == "name");
    let value_at = tokens.iter().position(|&t| t == "value");
    let name = match (name_at, value_at) {
        (Some(n), Some(v)) if v > n => tokens[n + 1..v].join(" "),
        (Some(n), None) => tokens[n + 1..].join(" "),
        _ => String::new(),
    };
    let value = value_at.map_or(String::new(), |v| tokens[v + 1..].join(" "));
    Command::SetOption { name, value }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_position_with_moves() {
        let cmd = parse("position startpos moves e2e4 e7e5").unwrap();
        match cmd {
            Command::Position { fen, moves } => {
                assert!(fen.is_none());
                assert_eq!(moves, vec!["e2e4", "e7e5"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_position_with_fen() {
        let cmd = parse("position fen 8/8/8/8/8/8/8/K1k5 w - - 0 1 moves a1a2").unwrap();
        match cmd {
            Command::Position { fen, moves } => {
                assert_eq!(fen.as_deref(), Some("8/8/8/8/8/8/8/K1k5 w - - 0 1"));
                assert_eq!(moves, vec!["a1a2"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_go_clock_fields() {
        let cmd = parse("go wtime 30000 btime 29000 winc 100 binc 100 movestogo 20").unwrap();
        match cmd {
            Command::Go(p) => {
                assert_eq!(p.wtime, Some(30_000));
                assert_eq!(p.btime, Some(29_000));
                assert_eq!(p.winc, 100);
                assert_eq!(p.movestogo, Some(20));
                assert!(!p.infinite);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_go_searchmoves() {
        let cmd = parse("go depth 6 searchmoves e2e4 d2d4").unwrap();
        match cmd {
            Command::Go(p) => {
                assert_eq!(p.depth, Some(6));
                assert_eq!(p.searchmoves, vec!["e2e4", "d2d4"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_setoption() {
        let cmd = parse("setoption name Hash value 64").unwrap();
        match cmd {
            Command::SetOption { name, value } => {
                assert_eq!(name, "Hash");
                assert_eq!(value, "64");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn malformed_input_is_unknown_not_fatal() {
        assert!(matches!(parse("banana"), Some(Command::Unknown(_))));
        assert!(parse("   ").is_none());
    }
}
